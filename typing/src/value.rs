//! Runtime values and their classes.

use core::fmt;
use std::sync::Arc;

use nomos_contract::{Evidence, Inspect};
use serde::{Deserialize, Serialize};

use crate::id::{SymbolId, TypeId};

/// A runtime value checked against types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// The unit value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// Text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A list of values.
    List(Vec<Value>),
    /// A reference to a symbol.
    Symbol(SymbolId),
    /// A reference to a type.
    Type(TypeId),
    /// A value of a class only known by name.
    Opaque {
        /// Name of the class.
        class: Arc<str>,
        /// Printable representation.
        repr: String,
    },
}

impl Value {
    /// Creates a text value.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates an opaque value of the named class.
    pub fn opaque(class: impl Into<Arc<str>>, repr: impl Into<String>) -> Self {
        Self::Opaque {
            class: class.into(),
            repr: repr.into(),
        }
    }

    /// The class this value belongs to.
    #[must_use]
    pub fn class(&self) -> ValueClass {
        match self {
            Self::Unit => ValueClass::Unit,
            Self::Bool(_) => ValueClass::Bool,
            Self::Int(_) => ValueClass::Int,
            Self::Float(_) => ValueClass::Float,
            Self::Text(_) => ValueClass::Text,
            Self::Bytes(_) => ValueClass::Bytes,
            Self::List(_) => ValueClass::List,
            Self::Symbol(_) => ValueClass::Symbol,
            Self::Type(_) => ValueClass::Type,
            Self::Opaque { class, .. } => ValueClass::Named(Arc::clone(class)),
        }
    }

    /// Length of text (in chars), bytes or lists.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text.chars().count()),
            Self::Bytes(bytes) => Some(bytes.len()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Symbol(id) => write!(f, "{id}"),
            Self::Type(id) => write!(f, "{id}"),
            Self::Opaque { class, repr } => write!(f, "{class}({repr})"),
        }
    }
}

impl Inspect for Value {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

/// The class of values a type admits.
///
/// Replaces reflective instance checks: [`ValueClass::admits`] matches on the
/// value's discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    /// Admits every value.
    Any,
    /// [`Value::Unit`].
    Unit,
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Int`].
    Int,
    /// [`Value::Float`].
    Float,
    /// [`Value::Text`].
    Text,
    /// [`Value::Bytes`].
    Bytes,
    /// [`Value::List`].
    List,
    /// [`Value::Symbol`].
    Symbol,
    /// [`Value::Type`].
    Type,
    /// [`Value::Opaque`] values of the named class.
    Named(Arc<str>),
}

impl ValueClass {
    /// Returns true if `value` is an instance of this class.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Named(name) => {
                matches!(value, Value::Opaque { class, .. } if class == name)
            }
            other => *other == value.class(),
        }
    }

    /// Creates a named class.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            other => write!(f, "{}", format!("{other:?}").to_lowercase()),
        }
    }
}

impl Inspect for ValueClass {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}
