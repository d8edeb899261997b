//! Endpoint binding: URL templating and token resolution.

use std::fmt;

use crate::config::{ClientConfig, EndpointTemplates};
use crate::error::ConfigError;

/// Scheme prefix of the lifecycle API's `Authorization` header.
const TOKEN_SCHEME: &str = "token";

/// The state-changing operations the lifecycle API offers for a cluster host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostAction {
    /// Remove the host and let the cluster provision a substitute.
    Replace,
    /// Remove the host for good.
    Terminate,
}

impl HostAction {
    /// Lower-case name used in log events.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Terminate => "terminate",
        }
    }
}

/// Everything a client needs to address the lifecycle API.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub(crate) base_url: String,
    pub(crate) environment: String,
    pub(crate) token: Option<String>,
    pub(crate) templates: EndpointTemplates,
}

impl Endpoint {
    /// Binds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`ClientConfig::validate`].
    pub(crate) fn from_config(config: &ClientConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.clone().unwrap_or_default(),
            environment: config.environment.clone().unwrap_or_default(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            templates: config.endpoints.clone(),
        })
    }

    pub(crate) fn host_status_url(&self, host_name: &str) -> String {
        join_url(
            &self.base_url,
            &self.templates.host_status.replace("{host}", host_name),
        )
    }

    pub(crate) fn action_url(&self, action: HostAction, cluster_id: &str) -> String {
        let template = match action {
            HostAction::Replace => &self.templates.replace,
            HostAction::Terminate => &self.templates.terminate,
        };
        let path = template
            .replace("{environment}", &self.environment)
            .replace("{cluster}", cluster_id);
        join_url(&self.base_url, &path)
    }

    /// Builds the `Authorization` header value for one call.
    ///
    /// A non-empty override wins, then the configured token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when neither is available.
    pub(crate) fn authorization(
        &self,
        override_token: Option<&str>,
    ) -> Result<String, ConfigError> {
        override_token
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
            .map(|token| format!("{TOKEN_SCHEME} {token}"))
            .ok_or(ConfigError::MissingToken)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("environment", &self.environment)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("templates", &self.templates)
            .finish()
    }
}

/// Rejects an empty host identifier before it reaches a URL or body.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming `field` when `value` is empty.
pub(crate) fn require_id(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: String::from("must not be empty"),
        });
    }
    Ok(())
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
