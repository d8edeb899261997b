//! Synchronous facade over [`HostLifecycleClient`].

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use super::HostRef;
use super::client::HostLifecycleClient;
use super::confirmation::Confirmation;
use super::status::{StatusHistory, StatusVerdict};
use crate::config::ClientConfig;
use crate::error::{HostcycleError, LifecycleError, Result};

/// Blocking lifecycle client for callers without an async runtime.
///
/// Each handle drives the async client on a private current-thread runtime.
/// Clones and rebound handles share both the runtime and the connection pool.
///
/// Calls made from inside an async context fail with
/// [`LifecycleError::BlockingInAsyncContext`] instead of blocking; use
/// [`HostLifecycleClient`] there. Dropping the last handle inside an async
/// context is not supported either.
#[derive(Debug, Clone)]
pub struct BlockingHostLifecycleClient {
    inner: HostLifecycleClient,
    runtime: Arc<Runtime>,
}

impl BlockingHostLifecycleClient {
    /// Builds a blocking client and its runtime.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`HostLifecycleClient::from_config`], or
    /// [`LifecycleError::RuntimeCreationFailed`] if the runtime cannot be
    /// created.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let runtime = create_runtime()?;
        // reqwest registers its connector with the runtime it is built under.
        let inner = {
            let _guard = runtime.enter();
            HostLifecycleClient::from_config(config)?
        };
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// The async client this facade drives.
    #[must_use]
    pub const fn as_async(&self) -> &HostLifecycleClient {
        &self.inner
    }

    /// Base URL of the lifecycle API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Environment that cluster endpoints are scoped to.
    #[must_use]
    pub fn environment(&self) -> &str {
        self.inner.environment()
    }

    /// The default token, if one is configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.inner.token()
    }

    /// Returns a handle bound to another base URL.
    #[must_use]
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        self.wrap(self.inner.with_base_url(base_url))
    }

    /// Returns a handle bound to another environment.
    #[must_use]
    pub fn with_environment(&self, environment: impl Into<String>) -> Self {
        self.wrap(self.inner.with_environment(environment))
    }

    /// Returns a handle with another default token.
    #[must_use]
    pub fn with_token(&self, token: Option<String>) -> Self {
        self.wrap(self.inner.with_token(token))
    }

    fn block_on<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        if Handle::try_current().is_ok() {
            return Err(LifecycleError::BlockingInAsyncContext.into());
        }
        self.runtime.block_on(future)
    }

    fn wrap(&self, inner: HostLifecycleClient) -> Self {
        Self {
            inner,
            runtime: Arc::clone(&self.runtime),
        }
    }

    /// See [`HostLifecycleClient::replace_host`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn replace_host(&self, host: &HostRef, token: Option<&str>) -> Result<bool> {
        self.block_on(self.inner.replace_host(host, token))
    }

    /// See [`HostLifecycleClient::terminate_host`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn terminate_host(&self, host: &HostRef, token: Option<&str>) -> Result<bool> {
        self.block_on(self.inner.terminate_host(host, token))
    }

    /// See [`HostLifecycleClient::query_status`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn query_status(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Option<StatusHistory>> {
        self.block_on(self.inner.query_status(host_name, token))
    }

    /// See [`HostLifecycleClient::pending_termination`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn pending_termination(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Confirmation> {
        self.block_on(self.inner.pending_termination(host_name, token))
    }

    /// See [`HostLifecycleClient::termination`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn termination(&self, host_name: &str, token: Option<&str>) -> Result<Confirmation> {
        self.block_on(self.inner.termination(host_name, token))
    }

    /// See [`HostLifecycleClient::is_pending_termination`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn is_pending_termination(&self, host_name: &str, token: Option<&str>) -> Result<bool> {
        self.block_on(self.inner.is_pending_termination(host_name, token))
    }

    /// See [`HostLifecycleClient::is_terminated`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn is_terminated(&self, host_name: &str, token: Option<&str>) -> Result<bool> {
        self.block_on(self.inner.is_terminated(host_name, token))
    }

    /// See [`HostLifecycleClient::status_verdict`].
    ///
    /// # Errors
    ///
    /// Returns the errors of the async method, or
    /// [`LifecycleError::BlockingInAsyncContext`] inside an async context.
    pub fn status_verdict(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Option<StatusVerdict>> {
        self.block_on(self.inner.status_verdict(host_name, token))
    }
}

/// Create a tokio runtime for synchronous operations.
fn create_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            HostcycleError::from(LifecycleError::RuntimeCreationFailed {
                message: e.to_string(),
            })
        })
}
