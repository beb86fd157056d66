//! Failure values: a declared none sentinel paired with the violation that
//! produced it.

use nomos_contract::Violation;
use serde::Serialize;

use crate::value::Value;

/// The result of an operation that yields a none sentinel on failure.
pub type Outcome<T> = Result<T, Failure>;

/// A none sentinel carrying the violation that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{violation} (yielding none {none})")]
pub struct Failure {
    none: Value,
    #[source]
    violation: Violation,
}

impl Failure {
    /// Pairs a none sentinel with a violation.
    #[must_use]
    pub fn new(none: Value, violation: Violation) -> Self {
        Self { none, violation }
    }

    /// The none sentinel returned in place of a result.
    #[must_use]
    pub fn none(&self) -> &Value {
        &self.none
    }

    /// The violation that caused the failure.
    #[must_use]
    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// Returns true if the failure was caused by the named contract.
    #[must_use]
    pub fn is_violation_of(&self, contract: &str) -> bool {
        self.violation.is_violation_of(contract)
    }

    /// Splits the failure into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Value, Violation) {
        (self.none, self.violation)
    }
}
