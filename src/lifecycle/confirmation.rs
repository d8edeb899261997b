//! Tri-state readings of a status check.

use crate::error::LifecycleError;

/// The outcome of asking the lifecycle API whether a condition holds.
///
/// `Unknown` keeps the reason the service could not answer, so a poller can
/// retry instead of reading it as a negative answer. The boolean checks on
/// [`super::HostLifecycleClient`] collapse `Unknown` to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The service answered and the condition does or does not hold.
    Confirmed(bool),
    /// The service could not be read.
    Unknown(LifecycleError),
}

impl Confirmation {
    /// True only for a positive confirmation; `Unknown` counts as false.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(true))
    }

    /// Whether the service could not be read.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// The confirmed answer, if the service gave one.
    #[must_use]
    pub const fn answer(&self) -> Option<bool> {
        match self {
            Self::Confirmed(value) => Some(*value),
            Self::Unknown(_) => None,
        }
    }
}
