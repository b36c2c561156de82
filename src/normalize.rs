//! Conversion of AND/OR condition trees into disjunctive normal form.

use std::fmt;

use crate::{Clause, Condition};

/// A condition in disjunctive normal form.
///
/// `And` means the source had no branching and yields one rule variant. `Or`
/// holds one flat conjunction per variant, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Dnf {
    And(Vec<Clause>),
    Or(Vec<Vec<Clause>>),
}

impl Dnf {
    /// Number of rule variants this form produces.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Dnf::And(_) => 1,
            Dnf::Or(disjuncts) => disjuncts.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The conjunctions, one per rule variant.
    #[must_use]
    pub fn disjuncts(&self) -> Vec<&[Clause]> {
        match self {
            Dnf::And(clauses) => vec![clauses.as_slice()],
            Dnf::Or(disjuncts) => disjuncts.iter().map(Vec::as_slice).collect(),
        }
    }

    #[must_use]
    pub fn into_disjuncts(self) -> Vec<Vec<Clause>> {
        match self {
            Dnf::And(clauses) => vec![clauses],
            Dnf::Or(disjuncts) => disjuncts,
        }
    }
}

/// Normalize `condition` into disjunctive normal form.
///
/// AND distributes over OR by taking the Cartesian product of every branching
/// child, so the output size is the product of the branch counts. Each
/// produced conjunction keeps source order: a non-branching child contributes
/// its clauses where it sits, and a branching child contributes one of its
/// alternatives at that same position. Alternatives of the first branching
/// child vary slowest.
#[must_use]
pub fn normalize(condition: &Condition) -> Dnf {
    match condition {
        Condition::Clause(c) => Dnf::And(vec![c.clone()]),
        Condition::Or(children) => {
            let mut disjuncts = Vec::new();
            for child in children {
                match normalize(child) {
                    Dnf::And(clauses) => disjuncts.push(clauses),
                    Dnf::Or(nested) => disjuncts.extend(nested),
                }
            }
            Dnf::Or(disjuncts)
        }
        Condition::And(children) => {
            let mut combos = vec![Vec::new()];
            let mut branching = false;
            for child in children {
                let alternatives = normalize(child).into_disjuncts();
                branching |= alternatives.len() != 1;
                combos = splice(&combos, &alternatives);
            }
            if branching {
                Dnf::Or(combos)
            } else {
                Dnf::And(combos.into_iter().flatten().collect())
            }
        }
    }
}

/// Extend every prefix with every alternative, prefixes varying slowest.
fn splice(prefixes: &[Vec<Clause>], alternatives: &[Vec<Clause>]) -> Vec<Vec<Clause>> {
    prefixes
        .iter()
        .flat_map(|prefix| {
            alternatives.iter().map(move |alternative| {
                let mut combo = prefix.clone();
                combo.extend(alternative.iter().cloned());
                combo
            })
        })
        .collect()
}

impl fmt::Display for Dnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conj = |clauses: &[Clause]| {
            let parts: Vec<String> = clauses.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(" AND "))
        };
        match self {
            Dnf::And(clauses) => write!(f, "{}", conj(clauses)),
            Dnf::Or(disjuncts) => {
                let parts: Vec<String> = disjuncts.iter().map(|d| conj(d)).collect();
                write!(f, "{}", parts.join(" OR "))
            }
        }
    }
}
