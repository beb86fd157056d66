//! Evidence: safe-to-retain snapshots of inspected values.
//!
//! A violation must outlive the value that caused it, so contracts capture a
//! snapshot when the violation is built. Values that serialize are captured
//! as JSON; anything else is reduced to a descriptive stand-in string.
//! Capturing evidence never fails.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A snapshot of the value a contract inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Evidence {
    /// A JSON snapshot of the inspected value.
    Snapshot(serde_json::Value),
    /// A description standing in for a value that could not be serialized.
    StandIn(String),
}

impl Evidence {
    /// Snapshots `value` as JSON, falling back to its `Debug` rendering when
    /// serialization fails.
    #[must_use]
    pub fn capture<T: Serialize + fmt::Debug + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => Self::Snapshot(json),
            Err(_) => Self::StandIn(format!("{value:?}")),
        }
    }

    /// Builds a stand-in from a description.
    #[must_use]
    pub fn stand_in(description: impl Into<String>) -> Self {
        Self::StandIn(description.into())
    }

    /// Returns true if this evidence is a JSON snapshot.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }

    /// Returns the JSON snapshot, if any.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Snapshot(json) => Some(json),
            Self::StandIn(_) => None,
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(json) => write!(f, "{json}"),
            Self::StandIn(description) => write!(f, "<{description}>"),
        }
    }
}

/// Types that can describe themselves as [`Evidence`].
///
/// Every value a [`Contract`](crate::Contract) inspects implements this, so
/// that building a violation never depends on the value still being alive.
pub trait Inspect {
    /// Captures a snapshot of `self`.
    fn evidence(&self) -> Evidence;
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn evidence(&self) -> Evidence {
        (**self).evidence()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn evidence(&self) -> Evidence {
        match self {
            Some(value) => value.evidence(),
            None => Evidence::Snapshot(serde_json::Value::Null),
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn evidence(&self) -> Evidence {
        let items = self
            .iter()
            .map(|item| match item.evidence() {
                Evidence::Snapshot(json) => json,
                Evidence::StandIn(description) => serde_json::Value::String(description),
            })
            .collect();
        Evidence::Snapshot(serde_json::Value::Array(items))
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn evidence(&self) -> Evidence {
        self.as_slice().evidence()
    }
}

impl Inspect for str {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for String {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for bool {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for i64 {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for u64 {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for usize {
    fn evidence(&self) -> Evidence {
        Evidence::capture(self)
    }
}

impl Inspect for f64 {
    fn evidence(&self) -> Evidence {
        if self.is_finite() {
            Evidence::capture(self)
        } else {
            Evidence::stand_in(format!("non-finite float {self}"))
        }
    }
}

impl Inspect for serde_json::Value {
    fn evidence(&self) -> Evidence {
        Evidence::Snapshot(self.clone())
    }
}
