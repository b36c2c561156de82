mod atom;
mod clause;
mod condition;
mod error;
mod expr;
mod fact;
mod pattern;
mod rule;
mod rulebook;
mod tag;
mod template;
mod value;

pub use atom::{Atom, AtomKind, Matcher};
pub use clause::{Clause, Modifier, Token, clause};
pub use condition::{Condition, all_of, any_of};
pub use error::CompileError;
pub use expr::{
    Accessor, CompareOp, FunctionTest, NegatedPropertyExpr, Operand, Operator, PropertyExpr,
    PropertyTest, Test, function, property, var, vars,
};
pub use fact::{Fact, Predicate};
pub use pattern::{ClausePattern, Pattern, PatternKind};
pub use rule::{CompileLimits, Rule, RuleDefinition, RuleOptions};
pub use rulebook::{Engine, Rulebook};
pub use tag::Tag;
pub use template::{MatchMode, Target, Template};
pub use value::Value;
