//! Configuration system for hostcycle.
//!
//! This module provides the endpoint configuration consumed by
//! [`crate::lifecycle::HostLifecycleClient`]. Configuration loading and
//! precedence merging is handled by the `ortho_config` crate. Precedence:
//! environment variables override configuration files, which override
//! defaults.
//!
//! The configuration file is expected at `~/.config/hostcycle/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! base_url = "https://fleet.example.com/v1"
//! environment = "prod"
//! token = "s3cr3t"
//! request_timeout_secs = 30
//!
//! [endpoints]
//! host_status = "/hosts/{host}"
//! replace = "/{environment}/clusters/{cluster}/replace"
//! terminate = "/{environment}/clusters/{cluster}/terminate"
//! ```

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{ClientConfig, EndpointTemplates};
