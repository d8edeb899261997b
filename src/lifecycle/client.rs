//! Async client for the host lifecycle API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{error, info, warn};

use super::HostRef;
use super::confirmation::Confirmation;
use super::endpoint::{Endpoint, HostAction, require_id};
use super::status::{StatusHistory, StatusVerdict};
use crate::config::ClientConfig;
use crate::error::{LifecycleError, Result};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("hostcycle/", env!("CARGO_PKG_VERSION"));

/// Statuses that mean a replace or terminate request was accepted.
const ACCEPTED_STATUSES: [StatusCode; 2] = [StatusCode::OK, StatusCode::NO_CONTENT];

/// Client for requesting host replacement or termination and confirming the
/// outcome.
///
/// Every operation performs exactly one request. Transport and protocol
/// failures are logged and folded into the result. The only errors an
/// operation returns are configuration errors (a missing token or an empty
/// host identifier), raised before any request is sent.
///
/// Clones and rebound handles ([`Self::with_environment`] and friends) share
/// one connection pool. A handle's configuration never changes after
/// construction.
#[derive(Debug, Clone)]
pub struct HostLifecycleClient {
    http: reqwest::Client,
    endpoint: Arc<Endpoint>,
}

impl HostLifecycleClient {
    /// Builds a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails
    /// [`ClientConfig::validate`], or [`LifecycleError::ClientBuildFailed`] if
    /// the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint = Endpoint::from_config(config)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LifecycleError::ClientBuildFailed {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            endpoint: Arc::new(endpoint),
        })
    }

    /// Builds a client on top of an existing `reqwest` client and its pool.
    ///
    /// `request_timeout_secs` is not applied; the given client's own timeout
    /// settings are used.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails
    /// [`ClientConfig::validate`].
    pub fn with_http_client(http: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        let endpoint = Endpoint::from_config(config)?;
        Ok(Self {
            http,
            endpoint: Arc::new(endpoint),
        })
    }

    /// Base URL of the lifecycle API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }

    /// Environment that cluster endpoints are scoped to.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.endpoint.environment
    }

    /// The default token, if one is configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.endpoint.token.as_deref()
    }

    /// Returns a handle bound to another base URL, sharing this pool.
    #[must_use]
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        self.rebind(|endpoint| endpoint.base_url = base_url.into())
    }

    /// Returns a handle bound to another environment, sharing this pool.
    #[must_use]
    pub fn with_environment(&self, environment: impl Into<String>) -> Self {
        self.rebind(|endpoint| endpoint.environment = environment.into())
    }

    /// Returns a handle with another default token, sharing this pool.
    ///
    /// `None` or an empty token leaves the handle without a default, so every
    /// call must then supply an override.
    #[must_use]
    pub fn with_token(&self, token: Option<String>) -> Self {
        self.rebind(|endpoint| endpoint.token = token.filter(|t| !t.is_empty()))
    }

    fn rebind(&self, change: impl FnOnce(&mut Endpoint)) -> Self {
        let mut endpoint = Endpoint::clone(&self.endpoint);
        change(&mut endpoint);
        Self {
            http: self.http.clone(),
            endpoint: Arc::new(endpoint),
        }
    }

    /// Asks the service to replace a host in its cluster.
    ///
    /// Returns `Ok(true)` when the request was accepted (HTTP 200 or 204).
    /// Acceptance does not mean the replacement has finished; poll
    /// [`Self::is_pending_termination`] or [`Self::is_terminated`] for that.
    /// Any other status or transport failure is logged and yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn replace_host(&self, host: &HostRef, token: Option<&str>) -> Result<bool> {
        self.request_change(HostAction::Replace, host, token).await
    }

    /// Asks the service to terminate a host in its cluster.
    ///
    /// Same contract as [`Self::replace_host`] against the termination
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn terminate_host(&self, host: &HostRef, token: Option<&str>) -> Result<bool> {
        self.request_change(HostAction::Terminate, host, token).await
    }

    async fn request_change(
        &self,
        action: HostAction,
        host: &HostRef,
        token: Option<&str>,
    ) -> Result<bool> {
        require_id("instance_id", &host.instance_id)?;
        require_id("cluster_id", &host.cluster_id)?;
        let authorization = self.endpoint.authorization(token)?;
        let url = self.endpoint.action_url(action, &host.cluster_id);
        info!(
            action = action.label(),
            instance_id = %host.instance_id,
            cluster_id = %host.cluster_id,
            %url,
            "requesting host {} via lifecycle API",
            action.label()
        );

        match self.send_change(&url, &authorization, host).await {
            Ok(()) => Ok(true),
            Err(failure) => {
                log_change_failure(action, host, &failure);
                Ok(false)
            }
        }
    }

    async fn send_change(
        &self,
        url: &str,
        authorization: &str,
        host: &HostRef,
    ) -> std::result::Result<(), LifecycleError> {
        let response = self
            .http
            .delete(url)
            .header(AUTHORIZATION, authorization)
            .json(&[host.instance_id.as_str()])
            .send()
            .await
            .map_err(|e| LifecycleError::Transport {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if ACCEPTED_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(LifecycleError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            })
        }
    }

    /// Fetches a host's status history.
    ///
    /// Returns `Ok(None)` when the service does not answer 200 with a JSON
    /// array, or cannot be reached. `None` means unknown, not terminated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn query_status(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Option<StatusHistory>> {
        let authorization = self.status_authorization(host_name, token)?;
        Ok(self.read_status(host_name, &authorization).await.ok())
    }

    /// Reads whether a host is pending termination or already gone.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn pending_termination(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Confirmation> {
        let authorization = self.status_authorization(host_name, token)?;
        let history = match self.read_status(host_name, &authorization).await {
            Ok(history) => history,
            Err(failure) => return Ok(Confirmation::Unknown(failure)),
        };

        Ok(match history.is_pending_termination() {
            Ok(pending) => Confirmation::Confirmed(pending),
            Err(e) => {
                let failure = LifecycleError::MalformedBody {
                    url: self.endpoint.host_status_url(host_name),
                    message: e.to_string(),
                };
                warn!(host_name, error = %failure, "failed to parse host status");
                Confirmation::Unknown(failure)
            }
        })
    }

    /// Reads whether a host is gone, meaning the service has no record of it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn termination(&self, host_name: &str, token: Option<&str>) -> Result<Confirmation> {
        let authorization = self.status_authorization(host_name, token)?;
        Ok(match self.read_status(host_name, &authorization).await {
            Ok(history) => Confirmation::Confirmed(history.is_terminated()),
            Err(failure) => Confirmation::Unknown(failure),
        })
    }

    /// Whether a host is pending termination or already gone.
    ///
    /// `false` also when the service cannot be read; use
    /// [`Self::pending_termination`] to tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn is_pending_termination(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<bool> {
        Ok(self.pending_termination(host_name, token).await?.is_confirmed())
    }

    /// Whether a host is gone.
    ///
    /// `false` also when the service cannot be read; use
    /// [`Self::termination`] to tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn is_terminated(&self, host_name: &str, token: Option<&str>) -> Result<bool> {
        Ok(self.termination(host_name, token).await?.is_confirmed())
    }

    /// Collapses a host's status history into a verdict.
    ///
    /// `Ok(None)` when the service cannot be read or its newest record is
    /// unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError::MissingToken`] if neither
    /// `token` nor the configured token is set, or
    /// [`crate::error::ConfigError::InvalidValue`] for an empty host
    /// identifier. No request is sent.
    pub async fn status_verdict(
        &self,
        host_name: &str,
        token: Option<&str>,
    ) -> Result<Option<StatusVerdict>> {
        let authorization = self.status_authorization(host_name, token)?;
        let Ok(history) = self.read_status(host_name, &authorization).await else {
            return Ok(None);
        };
        Ok(history
            .verdict()
            .inspect_err(|e| warn!(host_name, error = %e, "failed to parse host status"))
            .ok())
    }

    fn status_authorization(&self, host_name: &str, token: Option<&str>) -> Result<String> {
        require_id("host_name", host_name)?;
        Ok(self.endpoint.authorization(token)?)
    }

    async fn read_status(
        &self,
        host_name: &str,
        authorization: &str,
    ) -> std::result::Result<StatusHistory, LifecycleError> {
        let url = self.endpoint.host_status_url(host_name);
        info!(host_name, %url, "checking host status via lifecycle API");
        self.fetch_status(&url, authorization)
            .await
            .inspect_err(|failure| log_status_failure(host_name, failure))
    }

    async fn fetch_status(
        &self,
        url: &str,
        authorization: &str,
    ) -> std::result::Result<StatusHistory, LifecycleError> {
        let transport = |e: reqwest::Error| LifecycleError::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        };

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LifecycleError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        StatusHistory::parse(&body).map_err(|e| LifecycleError::MalformedBody {
            url: url.to_owned(),
            message: e.to_string(),
        })
    }
}

fn log_change_failure(action: HostAction, host: &HostRef, failure: &LifecycleError) {
    match failure {
        LifecycleError::UnexpectedStatus { url, status } => warn!(
            action = action.label(),
            instance_id = %host.instance_id,
            cluster_id = %host.cluster_id,
            %url,
            status,
            "lifecycle API refused to {} host",
            action.label()
        ),
        _ => error!(
            action = action.label(),
            instance_id = %host.instance_id,
            cluster_id = %host.cluster_id,
            error = %failure,
            "host {} request failed",
            action.label()
        ),
    }
}

fn log_status_failure(host_name: &str, failure: &LifecycleError) {
    match failure {
        LifecycleError::Transport { .. } => {
            error!(host_name, error = %failure, "host status check failed");
        }
        _ => warn!(host_name, error = %failure, "could not read host status"),
    }
}
