
use clausal::{
    AtomKind, CompileError, Condition, Rule, RuleOptions, Tag, clause, compile_rule, normalize,
    property, var,
};
use proptest::prelude::*;
use strategies::{
    arb_assignment, arb_branched, arb_chain, arb_condition, arb_layout, eval_condition, eval_dnf,
};

fn compile(args: Vec<Condition>) -> Result<Vec<Rule<()>>, CompileError> {
    compile_rule("prop", RuleOptions::new(), args, ())
}

// ---------------------------------------------------------------------------
// Invariant 1: Semantic equivalence
//
// For every truth assignment of the clauses, the normalized form holds exactly
// when the original tree holds.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn dnf_is_equivalent(cond in arb_condition(4), assignment in arb_assignment()) {
        let dnf = normalize(&cond);
        prop_assert_eq!(
            eval_condition(&cond, assignment),
            eval_dnf(&dnf, assignment),
            "normalization changed meaning of {}", cond
        );
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Flatness and size
//
// Every disjunct is a non-empty flat conjunction, and the number of disjuncts
// is the predicted variant count.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn disjuncts_are_flat_and_counted(cond in arb_condition(4)) {
        let dnf = normalize(&cond);
        prop_assert_eq!(dnf.len(), cond.variant_count());
        for conj in dnf.disjuncts() {
            prop_assert!(!conj.is_empty());
        }
    }

    #[test]
    fn one_rule_per_disjunct(cond in arb_condition(3)) {
        let expected = normalize(&Condition::And(vec![cond.clone()])).len();
        let rules = compile(vec![cond]).unwrap();
        prop_assert_eq!(rules.len(), expected);
        for rule in &rules {
            prop_assert_eq!(rule.name.as_str(), "prop");
            prop_assert_eq!(rule.priority, 0);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Cartesian completeness
//
// k groups of sizes n1..nk give n1 * ... * nk variants. Each one holds every
// fixed clause and exactly one alternative of each group, all at the position
// the author wrote them.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn cartesian_completeness(layout in arb_layout()) {
        let dnf = normalize(&layout.condition());
        prop_assert_eq!(dnf.len(), layout.expected_variants());

        let mut seen = std::collections::HashSet::new();
        for conj in dnf.disjuncts() {
            let names: Vec<String> = conj.iter().map(ToString::to_string).collect();
            prop_assert!(layout.admits(&names), "{:?} does not follow {:?}", names, layout);
            seen.insert(names);
        }
        prop_assert_eq!(seen.len(), layout.expected_variants());
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Binding directionality
//
// Every tag a Reference atom depends on was bound by a strictly earlier clause
// of the same variant.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn references_point_backwards(chain in arb_chain()) {
        let rules = compile(chain.conditions()).unwrap();
        for rule in &rules {
            let clauses = rule.pattern.clauses();
            for (index, cp) in clauses.iter().enumerate() {
                prop_assert_eq!(cp.index, index);
                for atom in &cp.atoms {
                    for tag in atom.external_tags() {
                        let bound_at = clauses
                            .iter()
                            .position(|c| &c.head.tag == tag)
                            .expect("referenced tag is a clause head");
                        prop_assert!(bound_at < index);
                    }
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn tags_bound_in_leading_groups_resolve(branched in arb_branched()) {
        let rules = compile(branched.conditions()).unwrap();
        prop_assert_eq!(rules.len(), branched.expected_variants());

        let groups = branched.groups.len();
        for rule in &rules {
            let clauses = rule.pattern.clauses();
            prop_assert_eq!(clauses.len(), groups + branched.refs.len());
            for (g, cp) in clauses[..groups].iter().enumerate() {
                let prefix = format!("H{g}_");
                prop_assert!(cp.head.template.to_string().starts_with(&prefix));
                prop_assert_eq!(&cp.head.tag, &Tag::Named(format!("h{g}")));
            }
            for (cp, &g) in clauses[groups..].iter().zip(&branched.refs) {
                prop_assert_eq!(cp.head.template.to_string(), "Follower");
                let is_reference = matches!(
                    &cp.atoms[0].kind,
                    AtomKind::Reference { tags, .. } if tags == &[Tag::Named(format!("h{g}"))]
                );
                prop_assert!(is_reference);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Variant independence
//
// Generated tags restart in every variant, so untagged clauses get heads
// #0, #1, ... in each one.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn generated_tags_restart(cond in arb_condition(3)) {
        let rules = compile(vec![cond]).unwrap();
        for rule in &rules {
            for (i, cp) in rule.pattern.clauses().iter().enumerate() {
                let expected = Tag::Generated(u32::try_from(i).unwrap());
                prop_assert_eq!(&cp.head.tag, &expected);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 6: Mixed-binding rejection
//
// An operator whose bindings span the current clause and an earlier one is
// always rejected, whichever order the tags are listed in.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn mixed_bindings_rejected(local_first in any::<bool>(), prefix in 0_usize..3) {
        let mut args: Vec<Condition> = (0..prefix)
            .map(|i| clause(&format!("P{i}")).into())
            .collect();
        args.push(clause("Range").test(property("min").bind("ext").capture()).into());
        let (low, high) = if local_first { ("own", "ext") } else { ("ext", "own") };
        args.push(
            clause("Reading")
                .test(property("cap").bind("own").capture())
                .test(property("value").between_refs(low, high))
                .into(),
        );

        let err = compile(args).unwrap_err();
        let is_mixed = matches!(err, CompileError::MixedBindingScope { .. });
        prop_assert!(is_mixed, "expected MixedBindingScope, got {}", err);
        prop_assert_eq!(err.clause(), Some(prefix + 1));
    }

    #[test]
    fn self_and_external_references_are_classified(prefix in 0_usize..3) {
        let mut args: Vec<Condition> = (0..prefix)
            .map(|i| clause(&format!("P{i}")).into())
            .collect();
        args.push(clause("Customer").tag("c").into());
        args.push(
            clause("Order")
                .test(property("customer").eq(var("c")))
                .test(property("limit").gte(property("total")))
                .into(),
        );

        let rules = compile(args).unwrap();
        let clauses = rules[0].pattern.clauses();
        let last = clauses.last().unwrap();
        let is_reference = matches!(last.atoms[0].kind, AtomKind::Reference { .. });
        let is_self = matches!(last.atoms[2].kind, AtomKind::SelfReference { .. });
        prop_assert!(is_reference);
        prop_assert!(is_self);
    }
}
