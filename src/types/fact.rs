use std::fmt;
use std::sync::Arc;

use super::Value;

/// The view of a matched object that function tests receive.
///
/// Implemented by the engine for whatever it stores in working memory. The
/// compiler never calls these methods itself.
pub trait Fact {
    /// Name of the object's concrete type.
    fn type_name(&self) -> &str;

    /// Value reached by following `path` from the object, if any.
    fn property(&self, path: &[String]) -> Option<Value>;
}

type PredicateFn = dyn Fn(&dyn Fact, &[Value]) -> bool + Send + Sync;

/// A shared, externally supplied test function.
///
/// Two predicates are equal only when they share the same allocation, which
/// is what happens when one clause is copied into several rule variants.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new(f: impl Fn(&dyn Fact, &[Value]) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the predicate against a fact with the arguments captured at
    /// authoring time.
    #[must_use]
    pub fn call(&self, fact: &dyn Fact, args: &[Value]) -> bool {
        (self.0)(fact, args)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
