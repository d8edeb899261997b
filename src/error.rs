//! Semantic error types for the hostcycle client.
//!
//! Configuration errors signal a misconfigured deployment or call (no token,
//! an empty host identifier) and are the only errors an async lifecycle
//! operation returns to its caller. Lifecycle errors
//! describe transport and protocol failures; the client logs them and folds
//! them into `false`/`None` results, or carries them inside
//! [`crate::lifecycle::Confirmation::Unknown`] for callers that want the
//! tri-state reading.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// Neither a per-call override nor a configured lifecycle API token is set.
    #[error("lifecycle API token is not set")]
    MissingToken,

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while talking to the host lifecycle API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// The URL the request was sent to.
        url: String,
        /// A description of the transport failure.
        message: String,
    },

    /// The service answered with a status the operation does not accept.
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// The URL the request was sent to.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },

    /// The response body could not be interpreted as a status history.
    #[error("malformed host status from {url}: {message}")]
    MalformedBody {
        /// The URL the response came from.
        url: String,
        /// A description of the parse failure.
        message: String,
    },

    /// The pooled HTTP client could not be constructed.
    #[error("failed to build lifecycle HTTP client: {message}")]
    ClientBuildFailed {
        /// A description of the build failure.
        message: String,
    },

    /// The blocking client was called from inside an async runtime.
    #[error("blocking lifecycle client called from within an async runtime")]
    BlockingInAsyncContext,

    /// The runtime backing the blocking client could not be created.
    #[error("failed to create runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },
}

/// Top-level error type for hostcycle.
#[derive(Debug, Error)]
pub enum HostcycleError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while setting up or using the lifecycle client.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// A specialised `Result` type for hostcycle operations.
pub type Result<T> = std::result::Result<T, HostcycleError>;
