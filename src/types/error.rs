use thiserror::Error;

use super::{Operator, Tag};

/// Errors raised while compiling one rule definition. Each is fatal to that
/// rule; nothing produced before the error is kept.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed condition in rule '{rule}': {reason}")]
    MalformedCombinator { rule: String, reason: String },

    #[error("the '{quantifier}' quantifier is not yet supported (rule '{rule}', clause {clause})")]
    UnsupportedQuantifier {
        rule: String,
        clause: usize,
        quantifier: String,
    },

    #[error(
        "operator '{operator}' on '{property}' is not allowed (rule '{rule}', clause {clause}); use 'not ==' instead"
    )]
    DisallowedOperator {
        rule: String,
        clause: usize,
        property: String,
        operator: Operator,
    },

    #[error(
        "'{property} {operator}' binds to both the current clause and an earlier clause ({}) in rule '{rule}', clause {clause}",
        tags.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    MixedBindingScope {
        rule: String,
        clause: usize,
        property: String,
        operator: Operator,
        tags: Vec<Tag>,
    },

    #[error("unresolvable binding '{tag}' on '{property}' in rule '{rule}', clause {clause}")]
    UnresolvableBinding {
        rule: String,
        clause: usize,
        property: String,
        tag: Tag,
    },

    #[error("invalid clause syntax in rule '{rule}', clause {clause}: {reason}")]
    InvalidClauseSyntax {
        rule: String,
        clause: usize,
        reason: String,
    },

    #[error("duplicate tag '{tag}' in rule '{rule}', clause {clause}")]
    DuplicateTag {
        rule: String,
        clause: usize,
        tag: Tag,
    },

    #[error("invalid pattern {pattern:?} in rule '{rule}', clause {clause}: {message}")]
    InvalidPattern {
        rule: String,
        clause: usize,
        pattern: String,
        message: String,
    },

    #[error("rule '{rule}' expands to {variants} variants, over the limit of {limit}")]
    TooManyVariants {
        rule: String,
        variants: usize,
        limit: usize,
    },
}

impl CompileError {
    /// Name of the rule the error belongs to.
    #[must_use]
    pub fn rule(&self) -> &str {
        match self {
            CompileError::MalformedCombinator { rule, .. }
            | CompileError::UnsupportedQuantifier { rule, .. }
            | CompileError::DisallowedOperator { rule, .. }
            | CompileError::MixedBindingScope { rule, .. }
            | CompileError::UnresolvableBinding { rule, .. }
            | CompileError::InvalidClauseSyntax { rule, .. }
            | CompileError::DuplicateTag { rule, .. }
            | CompileError::InvalidPattern { rule, .. }
            | CompileError::TooManyVariants { rule, .. } => rule,
        }
    }

    /// Index of the offending clause within its rule variant, when the error
    /// is tied to one clause.
    #[must_use]
    pub fn clause(&self) -> Option<usize> {
        match self {
            CompileError::UnsupportedQuantifier { clause, .. }
            | CompileError::DisallowedOperator { clause, .. }
            | CompileError::MixedBindingScope { clause, .. }
            | CompileError::UnresolvableBinding { clause, .. }
            | CompileError::InvalidClauseSyntax { clause, .. }
            | CompileError::DuplicateTag { clause, .. }
            | CompileError::InvalidPattern { clause, .. } => Some(*clause),
            CompileError::MalformedCombinator { .. } | CompileError::TooManyVariants { .. } => None,
        }
    }
}
