use std::fmt;

use regex::Regex;

use super::expr::{Accessor, CompareOp, Operator};
use super::fact::Predicate;
use super::{Tag, Template, Value};

/// A compiled regular expression. Equality compares the source text.
#[derive(Debug, Clone)]
pub struct Matcher(Regex);

impl Matcher {
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `source` is not a valid expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// The smallest compiled match unit.
///
/// Every atom carries the tag its value is bound to and the template of the
/// clause it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub tag: Tag,
    pub template: Template,
    pub kind: AtomKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    /// Binds the clause's object to the tag.
    Head,
    /// Captures a property value without testing it.
    Bind { accessor: Accessor },
    Equals { accessor: Accessor, value: Value },
    NotEquals { accessor: Accessor, value: Value },
    Compare {
        accessor: Accessor,
        op: CompareOp,
        value: Value,
    },
    Matches { accessor: Accessor, pattern: Matcher },
    Between {
        accessor: Accessor,
        low: Value,
        high: Value,
    },
    IsA { accessor: Accessor, type_name: String },
    /// Compares against values fixed by earlier clauses of the rule.
    Reference {
        accessor: Accessor,
        op: Operator,
        tags: Vec<Tag>,
    },
    /// Compares against other properties of the same object. `accessors`
    /// lists, in binding order, the paths the referenced tags were bound to.
    SelfReference {
        accessor: Accessor,
        op: Operator,
        accessors: Vec<Accessor>,
    },
    Function { args: Vec<Value>, predicate: Predicate },
}

impl Atom {
    /// Property the atom tests, if it tests one.
    #[must_use]
    pub fn accessor(&self) -> Option<&Accessor> {
        match &self.kind {
            AtomKind::Head | AtomKind::Function { .. } => None,
            AtomKind::Bind { accessor }
            | AtomKind::Equals { accessor, .. }
            | AtomKind::NotEquals { accessor, .. }
            | AtomKind::Compare { accessor, .. }
            | AtomKind::Matches { accessor, .. }
            | AtomKind::Between { accessor, .. }
            | AtomKind::IsA { accessor, .. }
            | AtomKind::Reference { accessor, .. }
            | AtomKind::SelfReference { accessor, .. } => Some(accessor),
        }
    }

    /// Tags of earlier clauses this atom depends on.
    #[must_use]
    pub fn external_tags(&self) -> &[Tag] {
        match &self.kind {
            AtomKind::Reference { tags, .. } => tags,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        matches!(self.kind, AtomKind::Head)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = &self.tag;
        match &self.kind {
            AtomKind::Head => write!(f, "{tag} <- {}", self.template),
            AtomKind::Bind { accessor } => write!(f, "{tag} <- {accessor}"),
            AtomKind::Equals { accessor, value } => write!(f, "{tag} <- {accessor} == {value}"),
            AtomKind::NotEquals { accessor, value } => {
                write!(f, "{tag} <- {accessor} not == {value}")
            }
            AtomKind::Compare { accessor, op, value } => {
                write!(f, "{tag} <- {accessor} {op} {value}")
            }
            AtomKind::Matches { accessor, pattern } => {
                write!(f, "{tag} <- {accessor} =~ {:?}", pattern.as_str())
            }
            AtomKind::Between {
                accessor,
                low,
                high,
            } => write!(f, "{tag} <- {accessor} between {low} and {high}"),
            AtomKind::IsA {
                accessor,
                type_name,
            } => write!(f, "{tag} <- {accessor} is_a {type_name}"),
            AtomKind::Reference { accessor, op, tags } => {
                let refs: Vec<String> = tags.iter().map(ToString::to_string).collect();
                write!(f, "{tag} <- {accessor} {op} ref({})", refs.join(", "))
            }
            AtomKind::SelfReference {
                accessor,
                op,
                accessors,
            } => {
                let refs: Vec<String> = accessors.iter().map(ToString::to_string).collect();
                write!(f, "{tag} <- {accessor} {op} self({})", refs.join(", "))
            }
            AtomKind::Function { args, .. } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{tag} <- fn({})", args.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(kind: AtomKind) -> Atom {
        Atom {
            tag: Tag::Generated(1),
            template: Template::exact("Order"),
            kind,
        }
    }

    #[test]
    fn matcher_equality_by_source() {
        let a = Matcher::new("^a+$").unwrap();
        let b = Matcher::new("^a+$").unwrap();
        let c = Matcher::new("^b+$").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.regex().is_match("aaa"));
    }

    #[test]
    fn matcher_rejects_bad_source() {
        assert!(Matcher::new("(unclosed").is_err());
    }

    #[test]
    fn accessor_of_property_atoms() {
        let a = atom(AtomKind::Equals {
            accessor: Accessor::parse("status"),
            value: Value::from("open"),
        });
        assert_eq!(a.accessor(), Some(&Accessor::parse("status")));
        assert_eq!(atom(AtomKind::Head).accessor(), None);
    }

    #[test]
    fn external_tags_only_for_references() {
        let r = atom(AtomKind::Reference {
            accessor: Accessor::parse("customer"),
            op: Operator::Eq,
            tags: vec![Tag::named("c")],
        });
        assert_eq!(r.external_tags(), &[Tag::named("c")]);
        let s = atom(AtomKind::SelfReference {
            accessor: Accessor::parse("limit"),
            op: Operator::Gte,
            accessors: vec![Accessor::parse("balance")],
        });
        assert!(s.external_tags().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(atom(AtomKind::Head).to_string(), "#1 <- Order");
        let cmp = atom(AtomKind::Compare {
            accessor: Accessor::parse("total"),
            op: CompareOp::Gt,
            value: Value::Int(5),
        });
        assert_eq!(cmp.to_string(), "#1 <- total > 5");
        let r = atom(AtomKind::Reference {
            accessor: Accessor::parse("customer"),
            op: Operator::Eq,
            tags: vec![Tag::named("c")],
        });
        assert_eq!(r.to_string(), "#1 <- customer == ref(:c)");
    }
}
