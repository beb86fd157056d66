//! Filters: side-effect free keep/discard decisions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of running a [`Filter`] over a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterState {
    /// The value satisfies the filter.
    Kept,
    /// The value was rejected by the filter.
    Discarded,
}

impl FilterState {
    /// Maps `true` to [`FilterState::Kept`] and `false` to
    /// [`FilterState::Discarded`].
    #[must_use]
    pub const fn from_bool(keep: bool) -> Self {
        if keep {
            Self::Kept
        } else {
            Self::Discarded
        }
    }

    /// Returns true for [`FilterState::Kept`].
    #[must_use]
    pub const fn is_kept(self) -> bool {
        matches!(self, Self::Kept)
    }

    /// Returns true for [`FilterState::Discarded`].
    #[must_use]
    pub const fn is_discarded(self) -> bool {
        matches!(self, Self::Discarded)
    }

    /// Kept only if both states are kept.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        Self::from_bool(self.is_kept() && other.is_kept())
    }

    /// Returns the lowercase label used in logs and serialized evidence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kept => "kept",
            Self::Discarded => "discarded",
        }
    }
}

impl From<bool> for FilterState {
    fn from(keep: bool) -> Self {
        Self::from_bool(keep)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pure keep/discard decision over values of type `T`.
///
/// Implementations must not mutate hidden state: filtering the same value
/// twice yields the same [`FilterState`]. Filters that read live external
/// state (a registry, for instance) document that they are dynamic.
pub trait Filter<T: ?Sized> {
    /// Decides whether `value` is kept or discarded.
    fn filter(&self, value: &T) -> FilterState;
}
