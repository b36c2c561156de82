use std::fmt;

use super::fact::{Fact, Predicate};
use super::{Tag, Value};

/// Operators available in property tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    /// Explicit negation of equality, written `not ==`.
    NotEq,
    /// The standalone `!=` form. Accepted by the builders and the DSL so it
    /// can be reported precisely, but always rejected by the compiler.
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Matches,
    Between,
    IsA,
}

/// Ordering comparisons, the subset of [`Operator`] carried by compare atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    #[must_use]
    pub fn comparison(self) -> Option<CompareOp> {
        match self {
            Operator::Gt => Some(CompareOp::Gt),
            Operator::Gte => Some(CompareOp::Gte),
            Operator::Lt => Some(CompareOp::Lt),
            Operator::Lte => Some(CompareOp::Lte),
            _ => None,
        }
    }

    /// Number of bound values the operator compares against when its operand
    /// is a list of tag references.
    #[must_use]
    pub fn binding_arity(self) -> usize {
        match self {
            Operator::Between => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "==",
            Operator::NotEq => "not ==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Matches => "=~",
            Operator::Between => "between",
            Operator::IsA => "is_a",
        };
        f.write_str(s)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

/// A property path such as `address.city`. The empty path denotes the matched
/// object itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Accessor(Vec<String>);

impl Accessor {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// The accessor of a clause head: the object itself.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "self")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

/// Right-hand side of a property test.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand: the property is only captured.
    None,
    Value(Value),
    Range(Value, Value),
    /// Regular-expression source, compiled when the clause is lowered.
    Pattern(String),
    Type(String),
    /// Values bound to other tags.
    Refs(Vec<Tag>),
    /// Another property of the same object, lowered before its parent.
    Nested(Box<PropertyTest>),
}

/// One test on one property of the clause's object.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTest {
    pub accessor: Accessor,
    /// Explicit tag for the captured value; generated when absent.
    pub tag: Option<Tag>,
    pub op: Option<Operator>,
    pub operand: Operand,
}

/// An externally supplied predicate, attached to the clause as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTest {
    pub args: Vec<Value>,
    pub predicate: Predicate,
}

/// An entry of a clause's where-block.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Property(PropertyTest),
    Function(FunctionTest),
}

impl From<PropertyTest> for Test {
    fn from(t: PropertyTest) -> Self {
        Test::Property(t)
    }
}

impl From<PropertyExpr> for Test {
    fn from(p: PropertyExpr) -> Self {
        Test::Property(p.capture())
    }
}

impl From<FunctionTest> for Test {
    fn from(t: FunctionTest) -> Self {
        Test::Function(t)
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Value(v.into())
                }
            }
        )*
    };
}

literal_operand!(Value, i64, i32, f64, bool, &str, String);

/// Intermediate builder for property tests.
/// Created by [`property()`]; an operator method turns it into a [`PropertyTest`].
#[derive(Debug, Clone)]
pub struct PropertyExpr {
    accessor: Accessor,
    tag: Option<Tag>,
}

/// A [`PropertyExpr`] after `.not()`; only equality may follow.
#[derive(Debug, Clone)]
pub struct NegatedPropertyExpr {
    inner: PropertyExpr,
}

impl PropertyExpr {
    /// Bind the property's value to `tag` so other tests can reference it.
    #[must_use]
    pub fn bind(mut self, tag: impl Into<Tag>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn not(self) -> NegatedPropertyExpr {
        NegatedPropertyExpr { inner: self }
    }

    /// Capture the property without testing it.
    #[must_use]
    pub fn capture(self) -> PropertyTest {
        self.test(None, Operand::None)
    }

    #[must_use]
    pub fn eq(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Eq), rhs.into())
    }

    /// Standalone inequality. Compiling a clause that contains it fails; use
    /// `.not().eq(..)` instead.
    #[must_use]
    pub fn ne(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Ne), rhs.into())
    }

    #[must_use]
    pub fn gt(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Gt), rhs.into())
    }

    #[must_use]
    pub fn gte(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Gte), rhs.into())
    }

    #[must_use]
    pub fn lt(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Lt), rhs.into())
    }

    #[must_use]
    pub fn lte(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.test(Some(Operator::Lte), rhs.into())
    }

    #[must_use]
    pub fn matches(self, pattern: &str) -> PropertyTest {
        self.test(Some(Operator::Matches), Operand::Pattern(pattern.to_owned()))
    }

    #[must_use]
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> PropertyTest {
        self.test(
            Some(Operator::Between),
            Operand::Range(low.into(), high.into()),
        )
    }

    /// Range membership with both bounds taken from other tags.
    #[must_use]
    pub fn between_refs(self, low: impl Into<Tag>, high: impl Into<Tag>) -> PropertyTest {
        self.test(
            Some(Operator::Between),
            Operand::Refs(vec![low.into(), high.into()]),
        )
    }

    #[must_use]
    pub fn is_a(self, type_name: &str) -> PropertyTest {
        self.test(Some(Operator::IsA), Operand::Type(type_name.to_owned()))
    }

    fn test(self, op: Option<Operator>, operand: Operand) -> PropertyTest {
        PropertyTest {
            accessor: self.accessor,
            tag: self.tag,
            op,
            operand,
        }
    }
}

impl NegatedPropertyExpr {
    #[must_use]
    pub fn eq(self, rhs: impl Into<Operand>) -> PropertyTest {
        self.inner.test(Some(Operator::NotEq), rhs.into())
    }
}

impl From<PropertyExpr> for Operand {
    fn from(p: PropertyExpr) -> Self {
        Operand::Nested(Box::new(p.capture()))
    }
}

impl From<PropertyTest> for Operand {
    fn from(t: PropertyTest) -> Self {
        Operand::Nested(Box::new(t))
    }
}

/// Start a property test on `path` (dot-separated for nested accessors).
#[must_use]
pub fn property(path: &str) -> PropertyExpr {
    PropertyExpr {
        accessor: Accessor::parse(path),
        tag: None,
    }
}

/// Operand referring to the value bound to `tag`.
#[must_use]
pub fn var(tag: impl Into<Tag>) -> Operand {
    Operand::Refs(vec![tag.into()])
}

/// Operand referring to the values bound to several tags.
#[must_use]
pub fn vars<T: Into<Tag>>(tags: impl IntoIterator<Item = T>) -> Operand {
    Operand::Refs(tags.into_iter().map(Into::into).collect())
}

/// A test backed by an externally supplied function. `args` are handed to
/// the function on every call, after the fact being matched.
#[must_use]
pub fn function(
    args: Vec<Value>,
    f: impl Fn(&dyn Fact, &[Value]) -> bool + Send + Sync + 'static,
) -> FunctionTest {
    FunctionTest {
        args,
        predicate: Predicate::new(f),
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Value(v) => write!(f, "{v}"),
            Operand::Range(low, high) => write!(f, "{low} and {high}"),
            Operand::Pattern(p) => write!(f, "{p:?}"),
            Operand::Type(t) => write!(f, "{t}"),
            Operand::Refs(tags) => {
                let refs: Vec<String> = tags
                    .iter()
                    .map(|t| match t {
                        Tag::Named(name) => format!("@{name}"),
                        Tag::Generated(n) => format!("@#{n}"),
                    })
                    .collect();
                write!(f, "{}", refs.join(" and "))
            }
            Operand::Nested(inner) => write!(f, "({inner})"),
        }
    }
}

impl fmt::Display for PropertyTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.accessor)?;
        if let Some(tag) = &self.tag {
            write!(f, " as {tag}")?;
        }
        if let Some(op) = self.op {
            write!(f, " {op} {}", self.operand)?;
        }
        Ok(())
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Test::Property(p) => write!(f, "{p}"),
            Test::Function(func) => {
                let args: Vec<String> = func.args.iter().map(ToString::to_string).collect();
                write!(f, "fn({})", args.join(", "))
            }
        }
    }
}
