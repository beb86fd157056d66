//! Nomos typing core.
//!
//! A runtime type and symbol framework: named, identifier-addressed
//! entities (types, tags, constants, operations, namespaces, constraints)
//! organised into nested symbol tables held by a [`Registry`]. Failures are
//! values: every check is a [`Contract`](nomos_contract::Contract) and every
//! rejection a [`Violation`](nomos_contract::Violation), returned alongside
//! the relevant none sentinel as a [`Failure`].
//!
//! # Entry Point
//!
//! ```
//! use nomos_contract::Constraint;
//! use nomos_typing::{Registry, Tag, TypeBuilder, Value, ValueClass};
//!
//! let mut registry = Registry::new();
//! let root = registry.root();
//! let string = registry
//!     .add_type(root, TypeBuilder::new("string", ValueClass::Text, Value::text("")).unwrap())
//!     .unwrap();
//! let nonempty = Tag::new("nonempty").unwrap().with_constraint(Constraint::new(
//!     "length>=1",
//!     |v: &Value| v.length().is_some_and(|n| n >= 1),
//! ));
//! let nonempty = registry.add_tag(root, nonempty).unwrap();
//!
//! let derived = registry.sub_type(string, &[nonempty]).unwrap();
//! let ty = registry.get_type(derived).unwrap();
//! assert_eq!(ty.id().name(), "string[nonempty]");
//! assert!(!ty.is_instance(&Value::text("")));
//!
//! // Already tagged: the same type comes back.
//! assert_eq!(registry.sub_type(derived, &[nonempty]).unwrap(), derived);
//! ```
//!
//! # Modules
//!
//! - [`id`]: identifiers, visibility and arena keys
//! - [`table`]: ordered symbol tables
//! - [`namespace`]: namespaces and capability traits
//! - [`types`], [`tag`], [`kind`]: the type hierarchy
//! - [`subtype`]: the sub-typing pipeline
//! - [`operation`]: operation evaluation and casts
//! - [`walker`], [`audit`]: traversal and structural checks

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod audit;
pub mod config;
pub mod contracts;
pub mod failure;
pub mod id;
pub mod kind;
pub mod namespace;
pub mod operation;
pub mod registry;
pub mod subtype;
pub mod symbol;
pub mod table;
pub mod tag;
pub mod types;
pub mod value;
pub mod walker;

pub use audit::{audit, AuditReport, AuditResult, Severity};
pub use config::{ConfigError, TypingConfig};
pub use failure::{Failure, Outcome};
pub use id::{NamespaceKey, SymbolId, SymbolKind, TypeId, Visibility};
pub use kind::Kind;
pub use namespace::{
    ConstraintBearing, Identified, Namespace, Node, Renamable, RootNamespace, Scope,
};
pub use operation::{Cast, Operation, Signature, StandardOperation};
pub use registry::{Registration, Registry};
pub use subtype::{Mutation, Mutator, SubTypePipeline, SubTypeStage, SubTypeWorkBench};
pub use symbol::{Constant, Symbol};
pub use table::SymbolTable;
pub use tag::Tag;
pub use types::{Type, TypeBuilder, TypeVariant};
pub use value::{Value, ValueClass};
pub use walker::{NamespaceVisitor, NamespaceWalker, Visit, WalkStatus};
