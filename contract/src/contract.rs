//! The [`Contract`] trait.

use crate::evidence::{Evidence, Inspect};
use crate::filter::Filter;
use crate::violation::{Cause, Violation};

/// A named [`Filter`] that manufactures typed [`Violation`]s.
///
/// Stateless contracts are unit structs and compare equal to every other
/// instance of themselves. Contracts bound to some state (a particular
/// symbol table, an expected type) compare by that bound state.
///
/// # Example
///
/// ```
/// use nomos_contract::{Contract, Evidence, Filter, FilterState};
///
/// struct MustBeEven;
///
/// impl Filter<i64> for MustBeEven {
///     fn filter(&self, value: &i64) -> FilterState {
///         FilterState::from_bool(value % 2 == 0)
///     }
/// }
///
/// impl Contract<i64> for MustBeEven {
///     fn name(&self) -> &str {
///         "MustBeEven"
///     }
///
///     fn terms(&self) -> String {
///         "the value must be even".to_string()
///     }
/// }
///
/// assert!(MustBeEven.enforce("doc", &4).is_ok());
/// let violation = MustBeEven.enforce("doc", &3).unwrap_err();
/// assert_eq!(violation.evidence(), &Evidence::capture(&3_i64));
/// ```
pub trait Contract<T: Inspect + ?Sized>: Filter<T> {
    /// The contract's name, recorded in every violation.
    fn name(&self) -> &str;

    /// A human-readable statement of what the contract requires.
    fn terms(&self) -> String;

    /// Captures the evidence recorded when `inspected` is rejected.
    fn evidence(&self, inspected: &T) -> Evidence {
        inspected.evidence()
    }

    /// Builds a violation of this contract.
    ///
    /// Always succeeds; values that cannot be serialized are recorded as a
    /// descriptive stand-in.
    fn violation(&self, plaintiff: &str, inspected: &T) -> Violation {
        Violation::new(self.name(), self.terms(), plaintiff, self.evidence(inspected))
    }

    /// Builds a violation of this contract chained onto an underlying cause.
    fn violation_with_cause(&self, plaintiff: &str, inspected: &T, cause: Cause) -> Violation {
        let mut violation = self.violation(plaintiff, inspected);
        violation.attach_cause(cause);
        violation
    }

    /// Filters `inspected`, turning a discard into a violation.
    ///
    /// # Errors
    ///
    /// Returns the violation of this contract when `inspected` is discarded.
    fn enforce(&self, plaintiff: &str, inspected: &T) -> Result<(), Violation> {
        if self.filter(inspected).is_kept() {
            Ok(())
        } else {
            Err(self.violation(plaintiff, inspected))
        }
    }
}
