//! Nomos contracts.
//!
//! A [`Contract`] is a named predicate ([`Filter`]) that also knows how to
//! manufacture a typed [`Violation`] describing why a value was rejected.
//! Violations are ordinary values: they are returned, embedded in results,
//! and chained, never thrown.
//!
//! # Entry Point
//!
//! ```
//! use nomos_contract::{Constraint, Contract, Filter, FilterState};
//!
//! let non_empty = Constraint::new("length>=1", |s: &String| !s.is_empty());
//! assert_eq!(non_empty.filter(&"abc".to_string()), FilterState::Kept);
//!
//! let violation = non_empty.violation("example", &String::new());
//! assert_eq!(violation.contract(), "length>=1");
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod constraint;
pub mod contract;
pub mod evidence;
pub mod filter;
pub mod violation;

pub use constraint::Constraint;
pub use contract::Contract;
pub use evidence::{Evidence, Inspect};
pub use filter::{Filter, FilterState};
pub use violation::{Cause, Violation};
