use std::fmt;

/// The type a clause head is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The universal type: any value of any type.
    Any,
    Type(String),
}

/// How strictly a value's type must agree with the [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// The value must be of exactly the target type.
    Exact,
    /// The value may be an instance of the target type or any descendant.
    Subtype,
}

/// Target type paired with a match mode. Every atom of a clause carries the
/// clause's template so the engine knows which objects the atom applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Template {
    pub target: Target,
    pub mode: MatchMode,
}

impl Template {
    #[must_use]
    pub fn new(target: Target, mode: MatchMode) -> Self {
        Self { target, mode }
    }

    #[must_use]
    pub fn exact(type_name: &str) -> Self {
        Self::new(Target::Type(type_name.to_owned()), MatchMode::Exact)
    }

    #[must_use]
    pub fn subtype(type_name: &str) -> Self {
        Self::new(Target::Type(type_name.to_owned()), MatchMode::Subtype)
    }

    /// Matches every value. Always uses [`MatchMode::Subtype`].
    #[must_use]
    pub fn universal() -> Self {
        Self::new(Target::Any, MatchMode::Subtype)
    }

    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.target == Target::Any
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Any => write!(f, "*"),
            Target::Type(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            MatchMode::Exact => write!(f, "{}", self.target),
            MatchMode::Subtype => write!(f, "is_a {}", self.target),
        }
    }
}
