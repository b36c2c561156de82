#[cfg(feature = "logging")]
use tracing::debug;

use crate::lower::{TagPositions, compile_clause};
use crate::normalize::{Dnf, normalize};
use crate::{Clause, CompileError, CompileLimits, Condition, Pattern, Rule, RuleDefinition, RuleOptions};

/// Compile a rule from its argument list, which is implicitly AND-ed.
///
/// Returns one [`Rule`] per disjunct of the normalized condition, in authoring
/// order. Every variant carries `name`, a clone of `action` and the priority.
///
/// # Errors
///
/// Returns [`CompileError`] on the first malformed group or clause. Nothing is
/// returned for the other variants in that case.
pub fn compile_rule<A: Clone>(
    name: &str,
    options: RuleOptions,
    args: Vec<Condition>,
    action: A,
) -> Result<Vec<Rule<A>>, CompileError> {
    let definition = RuleDefinition::new(name, options, args);
    compile_definition(&definition, action, &CompileLimits::default())
}

/// Compile an authored definition under the given limits.
///
/// # Errors
///
/// Returns [`CompileError::TooManyVariants`] before normalizing if the
/// definition would expand past `limits.max_variants`, and any clause error
/// otherwise.
pub fn compile_definition<A: Clone>(
    definition: &RuleDefinition,
    action: A,
    limits: &CompileLimits,
) -> Result<Vec<Rule<A>>, CompileError> {
    let name = definition.name.as_str();
    if definition.conditions.is_empty() {
        return Err(CompileError::MalformedCombinator {
            rule: name.to_owned(),
            reason: "rule has no conditions".to_owned(),
        });
    }

    let condition = definition.condition();
    condition
        .validate()
        .map_err(|reason| CompileError::MalformedCombinator {
            rule: name.to_owned(),
            reason,
        })?;

    let variants = condition.variant_count();
    if let Some(limit) = limits.max_variants {
        if variants > limit {
            return Err(CompileError::TooManyVariants {
                rule: name.to_owned(),
                variants,
                limit,
            });
        }
    }

    let dnf = normalize(&condition);
    #[cfg(feature = "logging")]
    debug!(rule = name, variants = dnf.len(), "normalized rule");

    assemble(name, &dnf, &definition.options, action)
}

/// Turn each disjunct of `dnf` into a standalone rule.
///
/// Each disjunct is compiled with its own [`TagPositions`], so generated tags
/// restart at zero and no binding crosses from one variant to another.
///
/// # Errors
///
/// Returns the first [`CompileError`] raised by any clause.
pub fn assemble<A: Clone>(
    name: &str,
    dnf: &Dnf,
    options: &RuleOptions,
    action: A,
) -> Result<Vec<Rule<A>>, CompileError> {
    let priority = options.effective_priority();
    dnf.disjuncts()
        .into_iter()
        .map(|clauses| -> Result<Rule<A>, CompileError> {
            let pattern = compile_variant(name, clauses)?;
            Ok(Rule {
                name: name.to_owned(),
                pattern,
                action: action.clone(),
                priority,
            })
        })
        .collect()
}

fn compile_variant(name: &str, clauses: &[Clause]) -> Result<Pattern, CompileError> {
    let mut tags = TagPositions::new();
    let mut pattern: Option<Pattern> = None;
    for (index, clause) in clauses.iter().enumerate() {
        let compiled = Pattern::Clause(compile_clause(name, clause, &mut tags, index)?);
        pattern = Some(match pattern {
            Some(prev) => prev.and(compiled),
            None => compiled,
        });
    }
    #[cfg(feature = "logging")]
    debug!(rule = name, clauses = clauses.len(), tags = tags.len(), "compiled variant");

    pattern.ok_or_else(|| CompileError::MalformedCombinator {
        rule: name.to_owned(),
        reason: "rule variant has no clauses".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomKind, PatternKind, Tag, all_of, any_of, clause, property, var};

    fn leaf(name: &str) -> Condition {
        clause(name).into()
    }

    fn clause_types(rule: &Rule<&str>) -> Vec<String> {
        rule.pattern
            .clauses()
            .iter()
            .map(|c| c.head.template.to_string())
            .collect()
    }

    #[test]
    fn or_of_leaf_and_conjunction_gives_two_rules() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![any_of([leaf("A"), all_of([leaf("B"), leaf("C")])])],
            "act",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(clause_types(&rules[0]), vec!["A"]);
        assert_eq!(clause_types(&rules[1]), vec!["B", "C"]);
        for rule in &rules {
            assert_eq!(rule.name, "r");
            assert_eq!(rule.action, "act");
            assert_eq!(rule.priority, 0);
        }
    }

    #[test]
    fn and_over_two_ors_gives_four_rules() {
        let rules = compile_rule(
            "r",
            RuleOptions::new().priority(7),
            vec![
                leaf("X"),
                any_of([leaf("Y"), leaf("Z")]),
                any_of([leaf("P"), leaf("Q")]),
            ],
            "act",
        )
        .unwrap();
        let shapes: Vec<Vec<String>> = rules.iter().map(clause_types).collect();
        assert_eq!(
            shapes,
            vec![
                vec!["X", "Y", "P"],
                vec!["X", "Y", "Q"],
                vec!["X", "Z", "P"],
                vec!["X", "Z", "Q"],
            ]
        );
        assert!(rules.iter().all(|r| r.priority == 7));
    }

    #[test]
    fn clause_indices_follow_variant_order() {
        let rules = compile_rule("r", RuleOptions::new(), vec![leaf("A"), leaf("B")], ()).unwrap();
        let indices: Vec<usize> = rules[0].pattern.clauses().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn variants_do_not_share_tags() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![any_of([clause("A").tag("a"), clause("B").tag("a")])],
            (),
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        for rule in &rules {
            assert_eq!(rule.pattern.clauses()[0].head.tag, Tag::named("a"));
        }
    }

    #[test]
    fn generated_tags_restart_per_variant() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![leaf("X"), any_of([leaf("Y"), leaf("Z")])],
            (),
        )
        .unwrap();
        for rule in &rules {
            let tags: Vec<Tag> = rule
                .pattern
                .clauses()
                .iter()
                .map(|c| c.head.tag.clone())
                .collect();
            assert_eq!(tags, vec![Tag::Generated(0), Tag::Generated(1)]);
        }
    }

    #[test]
    fn binding_only_resolves_in_variants_that_define_it() {
        // The :c tag exists only in the first alternative.
        let err = compile_rule(
            "r",
            RuleOptions::new(),
            vec![
                any_of([clause("Customer").tag("c").into(), leaf("Guest")]),
                clause("Order")
                    .test(property("customer").eq(var("c")))
                    .into(),
            ],
            (),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UnresolvableBinding { clause: 1, .. }));
    }

    #[test]
    fn tag_bound_in_leading_or_reaches_later_clause() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![
                any_of([clause("Customer").tag("c"), clause("Vip").tag("c")]),
                clause("Order")
                    .test(property("customer").eq(var("c")))
                    .into(),
            ],
            "act",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(clause_types(&rules[0]), vec!["Customer", "Order"]);
        assert_eq!(clause_types(&rules[1]), vec!["Vip", "Order"]);
        for rule in &rules {
            let order = rule.pattern.clauses()[1];
            assert_eq!(order.index, 1);
            assert!(matches!(
                &order.atoms[0].kind,
                AtomKind::Reference { tags, .. } if tags == &[Tag::named("c")]
            ));
        }
    }

    #[test]
    fn cross_clause_reference() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![
                clause("Customer").tag("c").into(),
                clause("Order")
                    .test(property("customer").eq(var("c")))
                    .into(),
            ],
            (),
        )
        .unwrap();
        let clauses = rules[0].pattern.clauses();
        assert!(matches!(
            &clauses[1].atoms[0].kind,
            AtomKind::Reference { tags, .. } if tags == &[Tag::named("c")]
        ));
    }

    #[test]
    fn negated_clause_kind() {
        let rules = compile_rule(
            "r",
            RuleOptions::new(),
            vec![clause("A").into(), Clause::new().not().target("B").into()],
            (),
        )
        .unwrap();
        assert_eq!(rules[0].pattern.clauses()[1].kind, PatternKind::NotObject);
    }

    #[test]
    fn empty_argument_list_is_malformed() {
        let err = compile_rule::<()>("r", RuleOptions::new(), vec![], ()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedCombinator { .. }));
    }

    #[test]
    fn empty_group_is_malformed() {
        let err = compile_rule(
            "r",
            RuleOptions::new(),
            vec![leaf("A"), any_of(Vec::<Condition>::new())],
            (),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed condition in rule 'r': OR group has no children"
        );
    }

    #[test]
    fn variant_budget_is_enforced_before_compiling() {
        let def = RuleDefinition::new(
            "wide",
            RuleOptions::new(),
            vec![
                any_of([leaf("A"), leaf("B")]),
                any_of([leaf("C"), leaf("D")]),
                any_of([leaf("E"), leaf("F")]),
            ],
        );
        let err = compile_definition(&def, (), &CompileLimits::new().max_variants(4)).unwrap_err();
        assert!(matches!(
            err,
            CompileError::TooManyVariants { variants: 8, limit: 4, .. }
        ));
        let ok = compile_definition(&def, (), &CompileLimits::new().max_variants(8)).unwrap();
        assert_eq!(ok.len(), 8);
    }

    #[test]
    fn first_error_aborts_whole_rule() {
        let err = compile_rule(
            "r",
            RuleOptions::new(),
            vec![any_of([
                leaf("Fine"),
                Clause::new().exists().target("Bad").into(),
            ])],
            (),
        )
        .unwrap_err();
        assert_eq!(err.rule(), "r");
        assert!(matches!(err, CompileError::UnsupportedQuantifier { .. }));
    }
}
