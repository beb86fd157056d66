//! Violations: inspectable records of failed contract checks.

use std::error::Error;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::evidence::Evidence;

/// An underlying failure chained onto a [`Violation`].
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// A record of a contract that rejected a value.
///
/// Violations are built by [`Contract::violation`](crate::Contract::violation)
/// and are immutable afterwards, except that a cause may be attached.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{contract} violated by {plaintiff}: {terms} (inspected: {evidence})")]
pub struct Violation {
    contract: String,
    terms: String,
    plaintiff: String,
    evidence: Evidence,
    #[source]
    cause: Option<Cause>,
}

impl Violation {
    /// Creates a violation of the named contract.
    ///
    /// `plaintiff` names the component that requested the check.
    #[must_use]
    pub fn new(
        contract: impl Into<String>,
        terms: impl Into<String>,
        plaintiff: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            contract: contract.into(),
            terms: terms.into(),
            plaintiff: plaintiff.into(),
            evidence,
            cause: None,
        }
    }

    /// Returns the name of the contract that was violated.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Returns the human-readable terms of the violated contract.
    #[must_use]
    pub fn terms(&self) -> &str {
        &self.terms
    }

    /// Returns the component that requested the check.
    #[must_use]
    pub fn plaintiff(&self) -> &str {
        &self.plaintiff
    }

    /// Returns the snapshot of the inspected value.
    #[must_use]
    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    /// Returns the chained cause, if one was attached.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Returns true if this is a violation of the named contract.
    #[must_use]
    pub fn is_violation_of(&self, contract: &str) -> bool {
        self.contract == contract
    }

    /// Returns this violation with `cause` chained onto it.
    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Chains an already shared cause onto this violation.
    pub fn attach_cause(&mut self, cause: Cause) {
        self.cause = Some(cause);
    }

    /// Returns the messages of every chained cause, nearest first.
    #[must_use]
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next: Option<&(dyn Error + 'static)> = self.source();
        while let Some(error) = next {
            chain.push(error.to_string());
            next = error.source();
        }
        chain
    }
}

/// Two violations are equal when they record the same contract, terms,
/// plaintiff and evidence. Causes are not compared.
impl PartialEq for Violation {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract
            && self.terms == other.terms
            && self.plaintiff == other.plaintiff
            && self.evidence == other.evidence
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Violation", 5)?;
        record.serialize_field("contract", &self.contract)?;
        record.serialize_field("terms", &self.terms)?;
        record.serialize_field("plaintiff", &self.plaintiff)?;
        record.serialize_field("evidence", &self.evidence)?;
        record.serialize_field("causes", &self.cause_chain())?;
        record.end()
    }
}
