#[cfg(feature = "logging")]
use tracing::debug;

use super::condition::Condition;
use super::error::CompileError;
use super::rule::{CompileLimits, Rule, RuleDefinition, RuleOptions};

/// The receiving side of compilation: anything that can take compiled rules.
pub trait Engine {
    type Action: Clone;

    fn assert_rule(&mut self, rule: Rule<Self::Action>);
}

/// Collects rules in registration order.
impl<A: Clone> Engine for Vec<Rule<A>> {
    type Action = A;

    fn assert_rule(&mut self, rule: Rule<A>) {
        self.push(rule);
    }
}

/// Compiles rule definitions and registers every resulting variant with an
/// [`Engine`].
///
/// Each call compiles all variants before registering any of them, so a
/// failing definition leaves the engine untouched.
///
/// # Example
///
/// ```
/// use clausal::{Rule, RuleOptions, Rulebook, any_of, clause, property, var};
///
/// let mut book = Rulebook::new(Vec::<Rule<&str>>::new());
/// let added = book
///     .rule(
///         "vip_order",
///         RuleOptions::new().priority(5),
///         vec![
///             clause("Customer").tag("c").into(),
///             any_of([
///                 clause("Order").test(property("customer").eq(var("c"))),
///                 clause("Quote").test(property("customer").eq(var("c"))),
///             ]),
///         ],
///         "notify",
///     )
///     .unwrap();
/// assert_eq!(added, 2);
/// assert_eq!(book.engine().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Rulebook<E> {
    engine: E,
    limits: CompileLimits,
}

impl<E: Engine> Rulebook<E> {
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            limits: CompileLimits::default(),
        }
    }

    /// Apply `limits` to every later compilation.
    #[must_use]
    pub fn with_limits(mut self, limits: CompileLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn limits(&self) -> &CompileLimits {
        &self.limits
    }

    /// Compile a rule from its argument list and register its variants.
    /// Returns how many variants were registered.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if compilation fails. Nothing is registered.
    pub fn rule(
        &mut self,
        name: &str,
        options: RuleOptions,
        args: Vec<Condition>,
        action: E::Action,
    ) -> Result<usize, CompileError> {
        self.define(&RuleDefinition::new(name, options, args), action)
    }

    /// Compile an authored definition and register its variants.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if compilation fails. Nothing is registered.
    pub fn define(
        &mut self,
        definition: &RuleDefinition,
        action: E::Action,
    ) -> Result<usize, CompileError> {
        let rules = crate::compile::compile_definition(definition, action, &self.limits)?;
        Ok(self.register(rules))
    }

    /// Parse DSL text, compile every rule in it and register the results.
    /// `action_for` supplies the action of each parsed definition.
    ///
    /// The whole input is compiled before anything is registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on parse or compile failure.
    pub fn load_dsl(
        &mut self,
        input: &str,
        mut action_for: impl FnMut(&RuleDefinition) -> E::Action,
    ) -> Result<usize, crate::Error> {
        let parsed = crate::parse::parse(input)?;
        let mut compiled = Vec::new();
        for definition in &parsed.rules {
            let action = action_for(definition);
            compiled.extend(crate::compile::compile_definition(
                definition,
                action,
                &self.limits,
            )?);
        }
        Ok(self.register(compiled))
    }

    /// Read a DSL file and load it with [`load_dsl`](Self::load_dsl).
    ///
    /// # Errors
    ///
    /// Returns [`Error`](crate::Error) on I/O, parse, or compile failure.
    pub fn load_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
        action_for: impl FnMut(&RuleDefinition) -> E::Action,
    ) -> Result<usize, crate::Error> {
        let input = std::fs::read_to_string(path)?;
        self.load_dsl(&input, action_for)
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }

    fn register(&mut self, rules: Vec<Rule<E::Action>>) -> usize {
        let count = rules.len();
        for rule in rules {
            #[cfg(feature = "logging")]
            debug!(rule = %rule.name, priority = rule.priority, "registering rule variant");
            self.engine.assert_rule(rule);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Clause, any_of, clause, property, var};

    #[derive(Default)]
    struct Recorder {
        names: Vec<String>,
    }

    impl Engine for Recorder {
        type Action = u8;

        fn assert_rule(&mut self, rule: Rule<u8>) {
            self.names.push(format!("{}:{}", rule.name, rule.action));
        }
    }

    #[test]
    fn registers_every_variant_in_order() {
        let mut book = Rulebook::new(Recorder::default());
        let n = book
            .rule(
                "r",
                RuleOptions::new(),
                vec![clause("A").into(), any_of([clause("B"), clause("C")])],
                1,
            )
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(book.engine().names, vec!["r:1", "r:1"]);
    }

    #[test]
    fn failing_rule_registers_nothing() {
        let mut book = Rulebook::new(Vec::<Rule<()>>::new());
        let err = book
            .rule(
                "r",
                RuleOptions::new(),
                vec![Condition::from(clause("A")).or(Clause::new().exists().target("B"))],
                (),
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedQuantifier { .. }));
        assert!(book.engine().is_empty());
    }

    #[test]
    fn limits_apply_to_rules() {
        let mut book =
            Rulebook::new(Vec::<Rule<()>>::new()).with_limits(CompileLimits::new().max_variants(1));
        let err = book
            .rule(
                "r",
                RuleOptions::new(),
                vec![any_of([clause("A"), clause("B")])],
                (),
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::TooManyVariants { .. }));
    }

    #[test]
    fn load_dsl_assigns_actions_per_definition() {
        let mut book = Rulebook::new(Vec::<Rule<String>>::new());
        let n = book
            .load_dsl(
                "rule a:\n    X OR Y\nrule b (priority 2):\n    Z",
                |def| format!("act_{}", def.name),
            )
            .unwrap();
        assert_eq!(n, 3);
        let rules = book.into_engine();
        assert_eq!(rules[0].action, "act_a");
        assert_eq!(rules[1].action, "act_a");
        assert_eq!(rules[2].action, "act_b");
        assert_eq!(rules[2].priority, 2);
    }

    #[test]
    fn load_dsl_is_all_or_nothing() {
        let mut book = Rulebook::new(Vec::<Rule<()>>::new());
        let result = book.load_dsl(
            "rule ok:\n    X\nrule bad:\n    Y where { v == @missing }",
            |_| (),
        );
        assert!(matches!(
            result,
            Err(crate::Error::Compile(CompileError::UnresolvableBinding { .. }))
        ));
        assert!(book.engine().is_empty());
    }

    #[test]
    fn load_dsl_reports_parse_errors() {
        let mut book = Rulebook::new(Vec::<Rule<()>>::new());
        let result = book.load_dsl("rule :", |_| ());
        assert!(matches!(result, Err(crate::Error::Parse(_))));
    }

    #[test]
    fn define_reference_rule() {
        let mut book = Rulebook::new(Vec::<Rule<()>>::new());
        let def = RuleDefinition::new(
            "match",
            RuleOptions::new(),
            vec![
                clause("Customer").tag("c").into(),
                clause("Order")
                    .test(property("customer").eq(var("c")))
                    .into(),
            ],
        );
        assert_eq!(book.define(&def, ()).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut book = Rulebook::new(Vec::<Rule<()>>::new());
        let result = book.load_file("/nonexistent/path/rules.rules", |_| ());
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
