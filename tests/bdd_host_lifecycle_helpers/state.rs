//! Scenario state for host lifecycle BDD tests.

use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Convenience alias for step outcomes.
pub type StepResult<T> = Result<T, String>;

/// How the mock fleet API behaves for a scenario.
#[derive(Clone, Debug)]
pub enum FleetBehaviour {
    /// Replace and terminate requests answer with this status.
    ChangeStatus(u16),
    /// Status queries answer 200 with this JSON body.
    StatusHistory(serde_json::Value),
    /// Status queries answer with this non-200 status.
    StatusFailure(u16),
}

/// Outcome of a replace or terminate call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The call returned normally with this acceptance flag.
    Accepted(bool),
    /// The call failed because no token was available.
    MissingToken,
    /// The call failed with another error.
    Failed {
        /// The `Display` representation of the error.
        message: String,
    },
}

/// Both boolean status checks for one host.
#[derive(Clone, Copy, Debug)]
pub struct StatusReading {
    /// Result of `is_terminated`.
    pub terminated: bool,
    /// Result of `is_pending_termination`.
    pub pending: bool,
}

/// State shared across host lifecycle scenarios.
#[derive(Default, ScenarioState)]
pub struct HostLifecycleState {
    /// Behaviour of the mock fleet API.
    pub(crate) fleet: Slot<FleetBehaviour>,
    /// Default token the client is configured with.
    pub(crate) token: Slot<Option<String>>,
    /// Outcome of the most recent replace or terminate call.
    pub(crate) change: Slot<ChangeOutcome>,
    /// Outcome of the most recent status checks.
    pub(crate) status: Slot<StatusReading>,
    /// Number of requests the mock fleet API received.
    pub(crate) requests: Slot<usize>,
}

/// Fixture providing fresh state for each scenario.
#[rstest::fixture]
pub fn host_lifecycle_state() -> HostLifecycleState {
    HostLifecycleState::default()
}
