//! Shared fixtures for nomos tests and benches.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use nomos_contract::Constraint;
use nomos_typing::{NamespaceKey, Registry, Tag, TypeBuilder, Value, ValueClass};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber driven by `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The `length>=1` value constraint.
#[must_use]
pub fn length_at_least_one() -> Constraint<Value> {
    Constraint::new("length>=1", |value: &Value| {
        value.length().is_some_and(|n| n >= 1)
    })
}

/// A registry holding a `string` type, an `int` type and a `nonempty` tag,
/// all in the root namespace.
#[derive(Debug)]
pub struct Fixture {
    /// The registry.
    pub registry: Registry,
    /// `string`: text values, none `""`.
    pub string: NamespaceKey,
    /// `int`: integer values, none `0`.
    pub int: NamespaceKey,
    /// `nonempty`: a tag carrying [`length_at_least_one`].
    pub nonempty: NamespaceKey,
}

impl Fixture {
    /// Builds the fixture.
    ///
    /// # Errors
    ///
    /// Returns the violation of any registration that fails.
    pub fn new() -> anyhow::Result<Self> {
        let mut registry = Registry::new();
        let root = registry.root();
        let string = registry.add_type(
            root,
            TypeBuilder::new("string", ValueClass::Text, Value::text(""))?,
        )?;
        let int = registry.add_type(
            root,
            TypeBuilder::new("int", ValueClass::Int, Value::Int(0))?,
        )?;
        let nonempty = registry.add_tag(
            root,
            Tag::new("nonempty")?.with_constraint(length_at_least_one()),
        )?;
        Ok(Self {
            registry,
            string,
            int,
            nonempty,
        })
    }
}
