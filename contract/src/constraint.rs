//! Named constraints built from closures.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::contract::Contract;
use crate::evidence::Inspect;
use crate::filter::{Filter, FilterState};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// The name of the degenerate constraint that keeps everything.
pub const NO_CONSTRAINT: &str = "no_constraint";

/// A named predicate usable as a [`Contract`].
///
/// Constraints are identified by name: two constraints with the same name
/// compare equal, whatever their predicates.
pub struct Constraint<T: ?Sized> {
    name: Arc<str>,
    predicate: Option<Predicate<T>>,
}

impl<T: ?Sized> Constraint<T> {
    /// Creates a constraint that keeps values for which `predicate` holds.
    pub fn new<F>(name: impl Into<Arc<str>>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// The degenerate constraint that keeps every value.
    #[must_use]
    pub fn none() -> Self {
        Self {
            name: Arc::from(NO_CONSTRAINT),
            predicate: None,
        }
    }

    /// Returns the constraint's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for [`Constraint::none`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.predicate.is_none()
    }
}

impl<T: ?Sized> Clone for Constraint<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint").field(&self.name).finish()
    }
}

impl<T: ?Sized> PartialEq for Constraint<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T: ?Sized> Eq for Constraint<T> {}

impl<T: ?Sized> Hash for Constraint<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T: ?Sized> Filter<T> for Constraint<T> {
    fn filter(&self, value: &T) -> FilterState {
        match &self.predicate {
            Some(predicate) => FilterState::from_bool(predicate(value)),
            None => FilterState::Kept,
        }
    }
}

impl<T: Inspect + ?Sized> Contract<T> for Constraint<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn terms(&self) -> String {
        if self.is_none() {
            "no constraint: every value is kept".to_string()
        } else {
            format!("the value must satisfy constraint `{}`", self.name)
        }
    }
}
