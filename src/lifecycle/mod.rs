//! Host lifecycle operations against the fleet API.
//!
//! The lifecycle API replaces or terminates hosts that belong to a cluster,
//! and reports each host's status history. Termination is asynchronous on the
//! service side: a successful replace or terminate request only means the
//! request was accepted, so callers poll the status checks (or use
//! [`crate::watch::wait_for`]) to confirm the outcome.
//!
//! [`HostLifecycleClient`] is the async client. [`BlockingHostLifecycleClient`]
//! drives the same client on a private runtime for synchronous callers, and
//! the [`HostLifecycle`] trait lets orchestration code take either a real
//! client or a mock.

mod blocking;
mod client;
mod confirmation;
mod endpoint;
mod status;


use std::future::Future;
use std::pin::Pin;

pub use blocking::BlockingHostLifecycleClient;
pub use client::HostLifecycleClient;
pub use confirmation::Confirmation;
pub use status::{HostStatusRecord, StatusHistory, StatusVerdict};

use crate::error::Result;

/// A boxed future for async trait methods.
///
/// This type alias enables `mockall::automock` compatibility and trait object
/// usage for async methods in [`HostLifecycle`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identifies a host within its cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostRef {
    /// Provider instance identifier, sent as the request body.
    pub instance_id: String,
    /// Cluster the host belongs to, used to build the endpoint path.
    pub cluster_id: String,
}

impl HostRef {
    /// Creates a host reference.
    #[must_use]
    pub fn new(instance_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            cluster_id: cluster_id.into(),
        }
    }
}

/// Lifecycle operations used by orchestration code.
///
/// Production code uses [`HostLifecycleClient`], while tests inject mock
/// implementations via `mockall`. Arguments are owned so the returned future
/// borrows only the implementor.
#[cfg_attr(test, mockall::automock)]
pub trait HostLifecycle: Send + Sync {
    /// Requests replacement of `host`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is available.
    fn replace_host(&self, host: HostRef, token: Option<String>) -> BoxFuture<'_, Result<bool>>;

    /// Requests termination of `host`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is available.
    fn terminate_host(&self, host: HostRef, token: Option<String>)
    -> BoxFuture<'_, Result<bool>>;

    /// Reads whether `host_name` is pending termination or gone.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is available.
    fn pending_termination(
        &self,
        host_name: String,
        token: Option<String>,
    ) -> BoxFuture<'_, Result<Confirmation>>;

    /// Reads whether `host_name` is gone.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no token is available.
    fn termination(
        &self,
        host_name: String,
        token: Option<String>,
    ) -> BoxFuture<'_, Result<Confirmation>>;
}

impl HostLifecycle for HostLifecycleClient {
    fn replace_host(&self, host: HostRef, token: Option<String>) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move { Self::replace_host(self, &host, token.as_deref()).await })
    }

    fn terminate_host(
        &self,
        host: HostRef,
        token: Option<String>,
    ) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move { Self::terminate_host(self, &host, token.as_deref()).await })
    }

    fn pending_termination(
        &self,
        host_name: String,
        token: Option<String>,
    ) -> BoxFuture<'_, Result<Confirmation>> {
        Box::pin(async move {
            Self::pending_termination(self, &host_name, token.as_deref()).await
        })
    }

    fn termination(
        &self,
        host_name: String,
        token: Option<String>,
    ) -> BoxFuture<'_, Result<Confirmation>> {
        Box::pin(async move { Self::termination(self, &host_name, token.as_deref()).await })
    }
}
