use std::fmt;

use super::Atom;

/// How the engine interprets one clause's atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// Presence of an object of exactly the target type.
    Object,
    /// All matching objects, collected together.
    Collect,
    /// Presence of an object of the target type or a subtype.
    Inherits,
    /// Absence of any object of exactly the target type.
    NotObject,
    /// Absence of any object of the target type or a subtype.
    NotInherits,
}

impl PatternKind {
    /// Pick the kind for a clause's modifier flags.
    ///
    /// Negation wins over everything, then subtype matching, then collection.
    #[must_use]
    pub fn select(negated: bool, subtype: bool, collect: bool) -> Self {
        match (negated, subtype, collect) {
            (true, true, _) => PatternKind::NotInherits,
            (true, false, _) => PatternKind::NotObject,
            (false, true, _) => PatternKind::Inherits,
            (false, false, true) => PatternKind::Collect,
            (false, false, false) => PatternKind::Object,
        }
    }

    #[must_use]
    pub fn is_negated(self) -> bool {
        matches!(self, PatternKind::NotObject | PatternKind::NotInherits)
    }
}

/// The compiled form of one clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ClausePattern {
    /// Position of the clause in its rule variant.
    pub index: usize,
    pub kind: PatternKind,
    pub head: Atom,
    pub atoms: Vec<Atom>,
}

/// Conjunction of clause patterns, built left to right in clause order.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Clause(ClausePattern),
    And(Box<Pattern>, Box<Pattern>),
}

impl Pattern {
    #[must_use]
    pub fn and(self, other: Pattern) -> Pattern {
        Pattern::And(Box::new(self), Box::new(other))
    }

    /// Clause patterns in clause order.
    #[must_use]
    pub fn clauses(&self) -> Vec<&ClausePattern> {
        let mut out = Vec::new();
        collect_clauses(self, &mut out);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Pattern::Clause(_) => 1,
            Pattern::And(a, b) => a.len() + b.len(),
        }
    }

    /// Always `false`: a pattern holds at least one clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

fn collect_clauses<'a>(pattern: &'a Pattern, out: &mut Vec<&'a ClausePattern>) {
    match pattern {
        Pattern::Clause(c) => out.push(c),
        Pattern::And(a, b) => {
            collect_clauses(a, out);
            collect_clauses(b, out);
        }
    }
}

impl From<ClausePattern> for Pattern {
    fn from(c: ClausePattern) -> Self {
        Pattern::Clause(c)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternKind::Object => "object",
            PatternKind::Collect => "collect",
            PatternKind::Inherits => "inherits",
            PatternKind::NotObject => "not-object",
            PatternKind::NotInherits => "not-inherits",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ClausePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.kind, self.head)?;
        for atom in &self.atoms {
            write!(f, "; {atom}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Clause(c) => write!(f, "{c}"),
            Pattern::And(a, b) => write!(f, "({a} AND {b})"),
        }
    }
}
