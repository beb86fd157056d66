//! Symbols stored in symbol tables.

use std::sync::Arc;

use nomos_contract::{Constraint, Evidence, Inspect};
use serde_json::json;

use crate::id::{NamespaceKey, SymbolKind};
use crate::operation::Operation;
use crate::value::Value;

/// A named constant of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    type_key: NamespaceKey,
    value: Value,
}

impl Constant {
    /// Creates a constant of the type at `type_key`.
    #[must_use]
    pub fn new(type_key: NamespaceKey, value: Value) -> Self {
        Self { type_key, value }
    }

    /// The key of the constant's type.
    #[must_use]
    pub fn type_key(&self) -> NamespaceKey {
        self.type_key
    }

    /// The constant's value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// An entry of a [`SymbolTable`](crate::SymbolTable).
///
/// Namespace-like symbols refer to registry nodes by key; the registry owns
/// the nodes themselves.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// A plain namespace node.
    Namespace(NamespaceKey),
    /// A type node.
    Type(NamespaceKey),
    /// A tag node.
    Tag(NamespaceKey),
    /// A constant.
    Constant(Constant),
    /// An operation.
    Operation(Arc<dyn Operation>),
    /// A named value constraint.
    Constraint(Constraint<Value>),
}

impl Symbol {
    pub(crate) fn for_node(kind: SymbolKind, key: NamespaceKey) -> Self {
        match kind {
            SymbolKind::Type => Self::Type(key),
            SymbolKind::Tag => Self::Tag(key),
            _ => Self::Namespace(key),
        }
    }

    /// The runtime kind of this symbol.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Namespace(_) => SymbolKind::Namespace,
            Self::Type(_) => SymbolKind::Type,
            Self::Tag(_) => SymbolKind::Tag,
            Self::Constant(_) => SymbolKind::Constant,
            Self::Operation(_) => SymbolKind::Operation,
            Self::Constraint(_) => SymbolKind::Constraint,
        }
    }

    /// The node key for namespace-like symbols.
    #[must_use]
    pub fn namespace_key(&self) -> Option<NamespaceKey> {
        match self {
            Self::Namespace(key) | Self::Type(key) | Self::Tag(key) => Some(*key),
            _ => None,
        }
    }

    /// The constant, if this is one.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// The operation, if this is one.
    #[must_use]
    pub fn as_operation(&self) -> Option<&Arc<dyn Operation>> {
        match self {
            Self::Operation(operation) => Some(operation),
            _ => None,
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Namespace(a), Self::Namespace(b))
            | (Self::Type(a), Self::Type(b))
            | (Self::Tag(a), Self::Tag(b)) => a == b,
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Operation(a), Self::Operation(b)) => {
                Arc::ptr_eq(a, b) || (a.id() == b.id() && a.signature() == b.signature())
            }
            (Self::Constraint(a), Self::Constraint(b)) => a == b,
            _ => false,
        }
    }
}

impl Inspect for Symbol {
    fn evidence(&self) -> Evidence {
        let detail = match self {
            Self::Namespace(key) | Self::Type(key) | Self::Tag(key) => json!(key),
            Self::Constant(constant) => json!({
                "type": constant.type_key,
                "value": constant.value,
            }),
            Self::Operation(operation) => json!(operation.id()),
            Self::Constraint(constraint) => json!(constraint.name()),
        };
        Evidence::Snapshot(json!({ "kind": self.kind(), "symbol": detail }))
    }
}
