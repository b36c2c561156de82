use std::fmt;

/// Identifies one clause occurrence, or one captured property, while a rule
/// variant is being compiled.
///
/// Named tags come from the rule author. Generated tags are small integers
/// handed out by a per-variant counter, so two variants compiled from the same
/// source may reuse the same generated numbers without ever seeing each
/// other's bindings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Named(String),
    Generated(u32),
}

impl Tag {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Tag::Named(name.to_owned())
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        matches!(self, Tag::Generated(_))
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::named(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Named(name)
    }
}

impl From<&Tag> for Tag {
    fn from(tag: &Tag) -> Self {
        tag.clone()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Named(name) => write!(f, ":{name}"),
            Tag::Generated(n) => write!(f, "#{n}"),
        }
    }
}
