use winnow::ascii::{dec_int, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::{
    Accessor, Clause, Condition, Modifier, Operand, Operator, PropertyTest, RuleDefinition,
    RuleOptions, Tag, Test, Value,
};

use super::parser::ParsedRulebook;

const RESERVED: &[&str] = &[
    "rule", "where", "AND", "and", "OR", "or", "not", "is_a", "collect", "exists", "between",
    "as", "true", "false",
];

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers & keywords -------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

/// Dot-separated property path, e.g. `address.city`.
fn path<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (ident, repeat::<_, _, (), _, _>(0.., ('.', ident)))
        .take()
        .parse_next(input)
}

/// `word` not followed by another identifier character.
fn keyword<'i>(word: &'static str) -> impl FnMut(&mut &'i str) -> ModalResult<&'i str> {
    move |input: &mut &'i str| terminated(word, not(one_of(is_ident_char))).parse_next(input)
}

fn type_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ident
        .verify(|name: &str| !RESERVED.contains(&name))
        .parse_next(input)
}

fn tag_name(input: &mut &str) -> ModalResult<Tag> {
    ident.map(Tag::from).parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn negative_number(input: &mut &str) -> ModalResult<Value> {
    let neg_str = (
        '-',
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.'),
    )
        .take()
        .parse_next(input)?;
    if neg_str.contains('.') {
        let f: f64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Float(f))
    } else {
        let i: i64 = neg_str
            .parse()
            .map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Int(i))
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        keyword("true").value(Value::Bool(true)),
        keyword("false").value(Value::Bool(false)),
        negative_number,
        float_literal.map(Value::Float),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

fn tag_ref(input: &mut &str) -> ModalResult<Tag> {
    preceded('@', cut_err(tag_name)).parse_next(input)
}

// -- Property tests ---------------------------------------------------------

fn operator(input: &mut &str) -> ModalResult<Operator> {
    ws.parse_next(input)?;
    alt((
        (keyword("not"), ws, "==").value(Operator::NotEq),
        "==".value(Operator::Eq),
        "!=".value(Operator::Ne),
        "=~".value(Operator::Matches),
        ">=".value(Operator::Gte),
        ">".value(Operator::Gt),
        "<=".value(Operator::Lte),
        "<".value(Operator::Lt),
        keyword("between").value(Operator::Between),
        keyword("is_a").value(Operator::IsA),
    ))
    .parse_next(input)
}

fn between_operand(input: &mut &str) -> ModalResult<Operand> {
    ws.parse_next(input)?;
    alt((
        (tag_ref, ws, keyword("and"), ws, cut_err(tag_ref))
            .map(|(low, _, _, _, high)| Operand::Refs(vec![low, high])),
        (value, ws, keyword("and"), cut_err(value))
            .map(|(low, _, _, high)| Operand::Range(low, high)),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "two values or two @tags joined by 'and'",
    )))
    .parse_next(input)
}

fn operand_for(input: &mut &str, op: Operator) -> ModalResult<Operand> {
    ws.parse_next(input)?;
    match op {
        Operator::Matches => string_literal
            .map(Operand::Pattern)
            .context(StrContext::Expected(StrContextValue::Description(
                "regular expression string",
            )))
            .parse_next(input),
        Operator::Between => between_operand(input),
        Operator::IsA => type_name
            .map(|t: &str| Operand::Type(t.to_owned()))
            .context(StrContext::Expected(StrContextValue::Description("type name")))
            .parse_next(input),
        _ => alt((
            tag_ref.map(|t| Operand::Refs(vec![t])),
            value.map(Operand::Value),
            path.map(|p: &str| {
                Operand::Nested(Box::new(PropertyTest {
                    accessor: Accessor::parse(p),
                    tag: None,
                    op: None,
                    operand: Operand::None,
                }))
            }),
        ))
        .context(StrContext::Expected(StrContextValue::Description("operand")))
        .parse_next(input),
    }
}

fn property_test(input: &mut &str) -> ModalResult<PropertyTest> {
    ws.parse_next(input)?;
    let accessor = path
        .context(StrContext::Expected(StrContextValue::Description(
            "property path",
        )))
        .parse_next(input)?;
    let tag = opt(preceded((ws, keyword("as"), ws, ':'), cut_err(tag_name))).parse_next(input)?;
    let op = opt(operator).parse_next(input)?;
    let operand = match op {
        Some(op) => cut_err(|i: &mut &str| operand_for(i, op)).parse_next(input)?,
        None => Operand::None,
    };
    Ok(PropertyTest {
        accessor: Accessor::parse(accessor),
        tag,
        op,
        operand,
    })
}

fn where_block(input: &mut &str) -> ModalResult<Vec<Test>> {
    ws.parse_next(input)?;
    '{'.parse_next(input)?;
    let tests: Vec<PropertyTest> = separated(0.., property_test, (ws, ',')).parse_next(input)?;
    opt((ws, ',')).parse_next(input)?;
    (ws, '}').parse_next(input)?;
    Ok(tests.into_iter().map(Test::Property).collect())
}

// -- Clauses ----------------------------------------------------------------

fn modifier(input: &mut &str) -> ModalResult<Modifier> {
    alt((
        keyword("not").value(Modifier::Not),
        keyword("is_a").value(Modifier::IsA),
        keyword("collect").value(Modifier::Collect),
        keyword("exists").value(Modifier::Exists),
    ))
    .parse_next(input)
}

fn clause(input: &mut &str) -> ModalResult<Clause> {
    ws.parse_next(input)?;
    let modifiers: Vec<Modifier> = repeat(0.., terminated(modifier, ws)).parse_next(input)?;
    let target = opt(type_name).parse_next(input)?;
    let tag = opt(preceded((ws, ':'), cut_err(tag_name))).parse_next(input)?;
    let tests = opt(preceded((ws, keyword("where")), cut_err(where_block))).parse_next(input)?;

    if modifiers.is_empty() && target.is_none() && tag.is_none() && tests.is_none() {
        return Err(ErrMode::from_input(input));
    }

    let mut c = modifiers.into_iter().fold(Clause::new(), Clause::modifier);
    if let Some(target) = target {
        c = c.target(target);
    }
    if let Some(tag) = tag {
        c = c.tag(tag);
    }
    if let Some(tests) = tests {
        c = c.tests(tests);
    }
    Ok(c)
}

// -- Conditions (precedence: OR < AND < primary) ----------------------------

fn primary(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    alt((
        delimited('(', condition, (ws, cut_err(')'))),
        clause.map(Condition::Clause),
    ))
    .context(StrContext::Expected(StrContextValue::Description("clause")))
    .parse_next(input)
}

fn and_expr(input: &mut &str) -> ModalResult<Condition> {
    let first = primary(input)?;
    let rest: Vec<Condition> = repeat(
        0..,
        preceded((ws, alt((keyword("AND"), keyword("and")))), cut_err(primary)),
    )
    .parse_next(input)?;
    Ok(join(first, rest, Condition::And))
}

fn or_expr(input: &mut &str) -> ModalResult<Condition> {
    let first = and_expr(input)?;
    let rest: Vec<Condition> = repeat(
        0..,
        preceded((ws, alt((keyword("OR"), keyword("or")))), cut_err(and_expr)),
    )
    .parse_next(input)?;
    Ok(join(first, rest, Condition::Or))
}

fn join(
    first: Condition,
    rest: Vec<Condition>,
    group: fn(Vec<Condition>) -> Condition,
) -> Condition {
    if rest.is_empty() {
        first
    } else {
        let mut children = Vec::with_capacity(rest.len() + 1);
        children.push(first);
        children.extend(rest);
        group(children)
    }
}

fn condition(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Rule definitions -------------------------------------------------------

fn priority_annotation(input: &mut &str) -> ModalResult<i32> {
    let n: i64 = delimited(
        (ws, '(', ws, "priority", ws),
        cut_err(dec_int::<_, i64, _>),
        (ws, cut_err(')')),
    )
    .parse_next(input)?;
    i32::try_from(n).map_err(|_| ErrMode::from_input(input).cut())
}

fn rule_def(input: &mut &str) -> ModalResult<RuleDefinition> {
    ws.parse_next(input)?;
    keyword("rule").parse_next(input)?;
    ws.parse_next(input)?;

    let name = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description(
            "rule name",
        )))
        .parse_next(input)?;

    let priority = opt(priority_annotation).parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(':').parse_next(input)?;

    let body = cut_err(condition)
        .context(StrContext::Expected(StrContextValue::Description(
            "rule body",
        )))
        .parse_next(input)?;

    // A top-level AND is the rule's argument list.
    let conditions = match body {
        Condition::And(children) => children,
        other => vec![other],
    };
    let options = RuleOptions { priority };
    Ok(RuleDefinition::new(name, options, conditions))
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_rulebook(input: &mut &str) -> ModalResult<ParsedRulebook> {
    let rules: Vec<RuleDefinition> = repeat(0.., rule_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(ParsedRulebook { rules })
}
