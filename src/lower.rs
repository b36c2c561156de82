//! Lowering of a single clause into its head atom and property atoms.

use std::collections::HashMap;

use crate::{
    Accessor, Atom, AtomKind, Clause, ClausePattern, CompileError, FunctionTest, MatchMode,
    Matcher, Modifier, Operand, Operator, PatternKind, PropertyTest, Tag, Target, Template, Test,
    Token,
};

/// Where each tag of one rule variant was bound.
///
/// Created empty for every variant and filled clause by clause, so bindings
/// never leak between variants. Also owns the counter for generated tags.
#[derive(Debug, Default)]
pub struct TagPositions {
    positions: HashMap<Tag, (usize, Accessor)>,
    next: u32,
}

impl TagPositions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the clause that bound `tag`.
    #[must_use]
    pub fn position(&self, tag: &Tag) -> Option<usize> {
        self.positions.get(tag).map(|(index, _)| *index)
    }

    /// Property path `tag` was bound to. Root for clause heads.
    #[must_use]
    pub fn accessor(&self, tag: &Tag) -> Option<&Accessor> {
        self.positions.get(tag).map(|(_, accessor)| accessor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn generate(&mut self) -> Tag {
        loop {
            let tag = Tag::Generated(self.next);
            self.next += 1;
            if !self.positions.contains_key(&tag) {
                return tag;
            }
        }
    }

    fn insert(&mut self, tag: Tag, index: usize, accessor: Accessor) -> bool {
        if self.positions.contains_key(&tag) {
            return false;
        }
        self.positions.insert(tag, (index, accessor));
        true
    }
}

/// Compile one clause of rule `rule` sitting at position `index` in its
/// variant. Tags bound by the clause are recorded in `tags`.
///
/// # Errors
///
/// Returns [`CompileError`] if the clause is malformed, uses an unsupported
/// quantifier or operator, or references tags it cannot see.
pub fn compile_clause(
    rule: &str,
    clause: &Clause,
    tags: &mut TagPositions,
    index: usize,
) -> Result<ClausePattern, CompileError> {
    let shape = scan(rule, clause.tokens(), index)?;

    let template = match shape.target {
        Some(name) => Template::new(
            Target::Type(name.to_owned()),
            if shape.subtype {
                MatchMode::Subtype
            } else {
                MatchMode::Exact
            },
        ),
        None => Template::universal(),
    };
    let kind = PatternKind::select(
        shape.negated,
        template.mode == MatchMode::Subtype,
        shape.collect,
    );

    let mut lowering = Lowering {
        rule,
        index,
        template,
        tags,
        atoms: Vec::new(),
    };

    let head_tag = match shape.tag {
        Some(tag) => tag.clone(),
        None => lowering.tags.generate(),
    };
    lowering.register(head_tag.clone(), Accessor::root())?;
    let head = Atom {
        tag: head_tag,
        template: lowering.template.clone(),
        kind: AtomKind::Head,
    };

    for test in shape.tests {
        match test {
            Test::Property(property) => {
                lowering.property(property)?;
            }
            Test::Function(function) => lowering.function(function)?,
        }
    }

    Ok(ClausePattern {
        index,
        kind,
        head,
        atoms: lowering.atoms,
    })
}

#[derive(Default)]
struct Shape<'c> {
    negated: bool,
    subtype: bool,
    collect: bool,
    target: Option<&'c str>,
    tag: Option<&'c Tag>,
    tests: &'c [Test],
}

/// Walk the token list in its only legal order: modifiers, target, tag,
/// where-block. Anything left over is out of place.
fn scan<'c>(rule: &str, tokens: &'c [Token], index: usize) -> Result<Shape<'c>, CompileError> {
    let mut shape = Shape::default();
    let mut pos = 0;

    while let Some(Token::Modifier(modifier)) = tokens.get(pos) {
        match modifier {
            Modifier::Not => shape.negated = true,
            Modifier::IsA => shape.subtype = true,
            Modifier::Collect => shape.collect = true,
            Modifier::Exists => {
                return Err(CompileError::UnsupportedQuantifier {
                    rule: rule.to_owned(),
                    clause: index,
                    quantifier: modifier.to_string(),
                });
            }
        }
        pos += 1;
    }
    if let Some(Token::Target(name)) = tokens.get(pos) {
        shape.target = Some(name.as_str());
        pos += 1;
    }
    if let Some(Token::Tag(tag)) = tokens.get(pos) {
        shape.tag = Some(tag);
        pos += 1;
    }
    if let Some(Token::Where(tests)) = tokens.get(pos) {
        shape.tests = tests.as_slice();
        pos += 1;
    }

    if let Some(extra) = tokens.get(pos) {
        let reason = match pos.checked_sub(1).and_then(|p| tokens.get(p)) {
            Some(prev) => format!("unexpected {} after {}", extra.describe(), prev.describe()),
            None => format!("unexpected {}", extra.describe()),
        };
        return Err(CompileError::InvalidClauseSyntax {
            rule: rule.to_owned(),
            clause: index,
            reason,
        });
    }
    Ok(shape)
}

struct Lowering<'a> {
    rule: &'a str,
    index: usize,
    template: Template,
    tags: &'a mut TagPositions,
    atoms: Vec<Atom>,
}

impl Lowering<'_> {
    fn register(&mut self, tag: Tag, accessor: Accessor) -> Result<(), CompileError> {
        if self.tags.insert(tag.clone(), self.index, accessor) {
            Ok(())
        } else {
            Err(CompileError::DuplicateTag {
                rule: self.rule.to_owned(),
                clause: self.index,
                tag,
            })
        }
    }

    fn syntax(&self, reason: String) -> CompileError {
        CompileError::InvalidClauseSyntax {
            rule: self.rule.to_owned(),
            clause: self.index,
            reason,
        }
    }

    /// Lower `test` and any nested operand, children first. Returns the tag
    /// the test's value was bound to.
    fn property(&mut self, test: &PropertyTest) -> Result<Tag, CompileError> {
        let accessor = test.accessor.clone();
        let property = accessor.to_string();

        if test.op == Some(Operator::Ne) {
            return Err(CompileError::DisallowedOperator {
                rule: self.rule.to_owned(),
                clause: self.index,
                property,
                operator: Operator::Ne,
            });
        }

        let kind = match (test.op, &test.operand) {
            (None, Operand::None) => AtomKind::Bind { accessor },
            (None, operand) => {
                return Err(self.syntax(format!(
                    "operand '{operand}' on '{property}' has no operator"
                )));
            }
            (Some(op), Operand::None) => {
                return Err(self.syntax(format!("'{property} {op}' has no operand")));
            }
            (Some(op), Operand::Value(value)) => match op {
                Operator::Eq => AtomKind::Equals {
                    accessor,
                    value: value.clone(),
                },
                Operator::NotEq => AtomKind::NotEquals {
                    accessor,
                    value: value.clone(),
                },
                _ => match op.comparison() {
                    Some(cmp) => AtomKind::Compare {
                        accessor,
                        op: cmp,
                        value: value.clone(),
                    },
                    None => {
                        return Err(self.syntax(format!(
                            "'{property} {op}' does not take a single value"
                        )));
                    }
                },
            },
            (Some(Operator::Between), Operand::Range(low, high)) => AtomKind::Between {
                accessor,
                low: low.clone(),
                high: high.clone(),
            },
            (Some(Operator::Matches), Operand::Pattern(source)) => {
                let pattern =
                    Matcher::new(source).map_err(|e| CompileError::InvalidPattern {
                        rule: self.rule.to_owned(),
                        clause: self.index,
                        pattern: source.clone(),
                        message: e.to_string(),
                    })?;
                AtomKind::Matches { accessor, pattern }
            }
            (Some(Operator::IsA), Operand::Type(type_name)) => AtomKind::IsA {
                accessor,
                type_name: type_name.clone(),
            },
            (Some(op), Operand::Refs(refs)) => self.binding(&accessor, op, refs)?,
            (Some(op), Operand::Nested(child)) => {
                let child_tag = self.property(child)?;
                self.binding(&accessor, op, &[child_tag])?
            }
            (Some(op), operand) => {
                return Err(self.syntax(format!(
                    "'{property} {op}' cannot take operand '{operand}'"
                )));
            }
        };

        let tag = match &test.tag {
            Some(tag) => tag.clone(),
            None => self.tags.generate(),
        };
        self.register(tag.clone(), test.accessor.clone())?;
        self.atoms.push(Atom {
            tag: tag.clone(),
            template: self.template.clone(),
            kind,
        });
        Ok(tag)
    }

    /// Decide whether `op` on `accessor` compares against this clause's own
    /// properties or against earlier clauses.
    fn binding(
        &self,
        accessor: &Accessor,
        op: Operator,
        refs: &[Tag],
    ) -> Result<AtomKind, CompileError> {
        if refs.len() != op.binding_arity() {
            return Err(self.syntax(format!(
                "'{accessor} {op}' takes {} binding(s), got {}",
                op.binding_arity(),
                refs.len()
            )));
        }

        let mut local = Vec::new();
        let mut external = 0;
        for tag in refs {
            match self.tags.positions.get(tag) {
                None => {
                    return Err(CompileError::UnresolvableBinding {
                        rule: self.rule.to_owned(),
                        clause: self.index,
                        property: accessor.to_string(),
                        tag: tag.clone(),
                    });
                }
                Some((pos, bound)) if *pos == self.index => local.push(bound.clone()),
                Some(_) => external += 1,
            }
        }

        match (local.is_empty(), external) {
            (true, _) => Ok(AtomKind::Reference {
                accessor: accessor.clone(),
                op,
                tags: refs.to_vec(),
            }),
            (false, 0) => Ok(AtomKind::SelfReference {
                accessor: accessor.clone(),
                op,
                accessors: local,
            }),
            (false, _) => Err(CompileError::MixedBindingScope {
                rule: self.rule.to_owned(),
                clause: self.index,
                property: accessor.to_string(),
                operator: op,
                tags: refs.to_vec(),
            }),
        }
    }

    fn function(&mut self, test: &FunctionTest) -> Result<(), CompileError> {
        let tag = self.tags.generate();
        self.register(tag.clone(), Accessor::root())?;
        self.atoms.push(Atom {
            tag,
            template: self.template.clone(),
            kind: AtomKind::Function {
                args: test.args.clone(),
                predicate: test.predicate.clone(),
            },
        });
        Ok(())
    }
}
