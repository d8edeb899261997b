//! Interpretation of host status histories.
//!
//! The lifecycle API answers a status query with a JSON array of status
//! records, newest first. The service purges terminated hosts instead of
//! marking them, so an empty history is evidence of completed termination.
//!
//! The two checks read different parts of the same payload and are kept
//! independent: the termination check looks only at emptiness, the pending
//! check only at the first record's `pendingTerminate` flag.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One entry of a host's status history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostStatusRecord {
    /// Whether the service has marked the host for removal.
    #[serde(rename = "pendingTerminate")]
    pub pending_terminate: bool,

    /// Remaining service metadata, kept verbatim.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A host's status history in service order, newest first.
///
/// Records are kept as raw JSON so that a malformed record further down the
/// history never affects the checks, which only ever read the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusHistory {
    records: Vec<Value>,
}

impl StatusHistory {
    /// Wraps records that are already in service order.
    #[must_use]
    pub const fn from_records(records: Vec<Value>) -> Self {
        Self { records }
    }

    /// Parses a response body, which must be a JSON array.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not a JSON array.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<Value>>(body).map(Self::from_records)
    }

    /// The raw records, newest first.
    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Number of records in the history.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the service returned no records at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decodes the most recent record, if there is one.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the first record is not an object
    /// with a boolean `pendingTerminate` field.
    pub fn most_recent(&self) -> Result<Option<HostStatusRecord>, serde_json::Error> {
        self.records
            .first()
            .map(HostStatusRecord::deserialize)
            .transpose()
    }

    /// Whether the host is gone: true exactly when the history is empty.
    ///
    /// Record contents are never inspected.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the host is pending termination or already gone.
    ///
    /// An empty history counts as gone. Otherwise the first record's
    /// `pendingTerminate` flag is returned verbatim; later records are ignored.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the first record cannot be decoded.
    pub fn is_pending_termination(&self) -> Result<bool, serde_json::Error> {
        Ok(self
            .most_recent()?
            .is_none_or(|record| record.pending_terminate))
    }

    /// Collapses the history into a single verdict.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the first record cannot be decoded.
    pub fn verdict(&self) -> Result<StatusVerdict, serde_json::Error> {
        StatusVerdict::from_history(self)
    }
}

/// The observable state of a host, derived from its status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusVerdict {
    /// The host has a record and is not marked for removal.
    Present,
    /// The host's newest record marks it for removal.
    PendingTermination,
    /// The service no longer has any record of the host.
    Terminated,
}

impl StatusVerdict {
    /// Derives the verdict for a history.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the history is non-empty and its first
    /// record cannot be decoded.
    pub fn from_history(history: &StatusHistory) -> Result<Self, serde_json::Error> {
        Ok(match history.most_recent()? {
            None => Self::Terminated,
            Some(record) if record.pending_terminate => Self::PendingTermination,
            Some(_) => Self::Present,
        })
    }

    /// Whether this verdict means the host is gone.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Whether this verdict means the host is pending termination or gone.
    #[must_use]
    pub const fn is_pending_or_terminated(self) -> bool {
        matches!(self, Self::PendingTermination | Self::Terminated)
    }
}
