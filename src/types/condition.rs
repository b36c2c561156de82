use std::fmt;

use super::Clause;

/// A boolean combination of clauses, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Clause(Clause),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl From<Clause> for Condition {
    fn from(c: Clause) -> Self {
        Condition::Clause(c)
    }
}

impl Condition {
    /// Conjunction with `other`. Chained calls extend one flat AND node.
    #[must_use]
    pub fn and(self, other: impl Into<Condition>) -> Condition {
        match self {
            Condition::And(mut children) => {
                children.push(other.into());
                Condition::And(children)
            }
            first => Condition::And(vec![first, other.into()]),
        }
    }

    /// Disjunction with `other`. Chained calls extend one flat OR node.
    #[must_use]
    pub fn or(self, other: impl Into<Condition>) -> Condition {
        match self {
            Condition::Or(mut children) => {
                children.push(other.into());
                Condition::Or(children)
            }
            first => Condition::Or(vec![first, other.into()]),
        }
    }

    /// Number of clause leaves in the tree.
    #[must_use]
    pub fn clause_count(&self) -> usize {
        match self {
            Condition::Clause(_) => 1,
            Condition::And(children) | Condition::Or(children) => {
                children.iter().map(Condition::clause_count).sum()
            }
        }
    }

    /// Number of rule variants normalization will produce, without building
    /// them. Saturates instead of overflowing.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        match self {
            Condition::Clause(_) => 1,
            Condition::Or(children) => children
                .iter()
                .fold(0_usize, |acc, c| acc.saturating_add(c.variant_count())),
            Condition::And(children) => children
                .iter()
                .fold(1_usize, |acc, c| acc.saturating_mul(c.variant_count())),
        }
    }

    /// Reject trees that cannot be normalized into at least one rule.
    ///
    /// Returns a description of the first malformed node.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            Condition::Clause(_) => Ok(()),
            Condition::And(children) if children.is_empty() => {
                Err("AND group has no children".to_owned())
            }
            Condition::Or(children) if children.is_empty() => {
                Err("OR group has no children".to_owned())
            }
            Condition::And(children) | Condition::Or(children) => {
                children.iter().try_for_each(Condition::validate)
            }
        }
    }
}

/// AND of all `children`.
#[must_use]
pub fn all_of<C: Into<Condition>>(children: impl IntoIterator<Item = C>) -> Condition {
    Condition::And(children.into_iter().map(Into::into).collect())
}

/// OR of all `children`.
#[must_use]
pub fn any_of<C: Into<Condition>>(children: impl IntoIterator<Item = C>) -> Condition {
    Condition::Or(children.into_iter().map(Into::into).collect())
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, sep) = match self {
            Condition::Clause(c) => return write!(f, "{c}"),
            Condition::And(children) => (children, " AND "),
            Condition::Or(children) => (children, " OR "),
        };
        let parts: Vec<String> = children.iter().map(ToString::to_string).collect();
        write!(f, "({})", parts.join(sep))
    }
}
