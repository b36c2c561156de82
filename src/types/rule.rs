use std::fmt;

use super::{Condition, Pattern};

/// Recognized rule options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleOptions {
    /// Conflict-resolution priority handed to the engine. Defaults to 0.
    pub priority: Option<i32>,
}

impl RuleOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }
}

/// Budget for the Cartesian product performed during normalization.
///
/// Every OR nested under an AND multiplies the number of rule variants;
/// `max_variants` caps that number for one rule definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileLimits {
    /// `None` means unbounded.
    pub max_variants: Option<usize>,
}

impl CompileLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_variants(mut self, max: usize) -> Self {
        self.max_variants = Some(max);
        self
    }
}

/// An authored rule before compilation: name, options and the ordered
/// argument list, which is implicitly AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    pub name: String,
    pub options: RuleOptions,
    pub conditions: Vec<Condition>,
}

impl RuleDefinition {
    #[must_use]
    pub fn new(name: &str, options: RuleOptions, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.to_owned(),
            options,
            conditions,
        }
    }

    /// The argument list as a single AND node.
    #[must_use]
    pub fn condition(&self) -> Condition {
        Condition::And(self.conditions.clone())
    }
}

/// One fully conjunctive compiled rule, ready for an engine.
///
/// All variants produced from one [`RuleDefinition`] share `name`, `action`
/// and `priority`; only `pattern` differs.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<A> {
    pub name: String,
    pub pattern: Pattern,
    pub action: A,
    pub priority: i32,
}

impl<A> fmt::Display for Rule<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {} (priority {}): {}",
            self.name, self.priority, self.pattern
        )
    }
}
