//! Configuration data types for hostcycle.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Path templates for the lifecycle API, appended to the base URL.
///
/// Placeholders are substituted verbatim: `{host}` in `host_status`,
/// `{environment}` and `{cluster}` in `replace` and `terminate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointTemplates {
    /// Per-host status history endpoint.
    pub host_status: String,

    /// Cluster host replacement endpoint.
    pub replace: String,

    /// Cluster host termination endpoint.
    pub terminate: String,
}

impl Default for EndpointTemplates {
    fn default() -> Self {
        Self {
            host_status: String::from("/hosts/{host}"),
            replace: String::from("/{environment}/clusters/{cluster}/replace"),
            terminate: String::from("/{environment}/clusters/{cluster}/terminate"),
        }
    }
}

/// Root client configuration.
///
/// Loaded from defaults, a configuration file, and `HOSTCYCLE_*` environment
/// variables, in increasing order of precedence.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `HOSTCYCLE_CONFIG_PATH` environment variable
/// 2. `.hostcycle.toml` in the current working directory
/// 3. `.hostcycle.toml` in the home directory
/// 4. `~/.config/hostcycle/config.toml` (XDG default)
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "HOSTCYCLE",
    post_merge_hook,
    discovery(
        app_name = "hostcycle",
        env_var = "HOSTCYCLE_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".hostcycle.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct ClientConfig {
    /// Base URL of the lifecycle API, for example `https://fleet.example.com/v1`.
    pub base_url: Option<String>,

    /// Deployment environment the cluster endpoints are scoped to.
    pub environment: Option<String>,

    /// Default API token. Individual calls may override it.
    pub token: Option<String>,

    /// Timeout applied to every request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Endpoint path templates.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub endpoints: EndpointTemplates,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            environment: None,
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            endpoints: EndpointTemplates::default(),
        }
    }
}

impl ClientConfig {
    /// Validates that the fields needed to build a client are present.
    ///
    /// The token is not required here; every call may supply
    /// its own, and a missing token is reported per call.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` listing every missing or empty
    /// field among `base_url` and `environment`, or
    /// `ConfigError::InvalidValue` if `request_timeout_secs` is zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        let mut missing = Vec::new();
        if is_blank(self.base_url.as_deref()) {
            missing.push("base_url");
        }
        if is_blank(self.environment.as_deref()) {
            missing.push("environment");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: missing.join(", "),
            }
            .into());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("request_timeout_secs"),
                reason: String::from("must be greater than zero"),
            }
            .into());
        }
        Ok(())
    }

    /// Returns whether a non-empty default token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !is_blank(self.token.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl PostMergeHook for ClientConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank strings from empty environment variables mean "unset".
        for field in [&mut self.base_url, &mut self.environment, &mut self.token] {
            if is_blank(field.as_deref()) {
                *field = None;
            }
        }
        Ok(())
    }
}
