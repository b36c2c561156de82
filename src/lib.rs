//! Compiles AND/OR condition trees over typed pattern clauses into flat rule
//! variants for a forward-chaining engine.
//!
//! A rule is authored as a list of [`Condition`]s, either with the builder
//! ([`clause`], [`property`], [`all_of`], [`any_of`]) or in the text DSL
//! ([`parse::parse`]). [`compile_rule`] normalizes the tree into disjunctive
//! normal form, emits one [`Rule`] per disjunct and lowers every clause into
//! atoms with resolved bindings. [`Rulebook`] hands the results to an
//! [`Engine`].

mod compile;
mod error;
mod lower;
mod normalize;
pub mod parse;
mod types;

pub use compile::{assemble, compile_definition, compile_rule};
pub use error::Error;
pub use lower::{TagPositions, compile_clause};
pub use normalize::{Dnf, normalize};
pub use types::{
    Accessor, Atom, AtomKind, Clause, ClausePattern, CompareOp, CompileError, CompileLimits,
    Condition, Engine, Fact, FunctionTest, MatchMode, Matcher, Modifier, NegatedPropertyExpr,
    Operand, Operator, Pattern, PatternKind, Predicate, PropertyExpr, PropertyTest, Rule,
    RuleDefinition, RuleOptions, Rulebook, Tag, Target, Template, Test, Token, Value, all_of,
    any_of, clause, function, property, var, vars,
};
