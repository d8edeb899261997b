//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use mockable::MockEnv;
use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::ClientConfig;

/// Fixture providing a `ClientConfig` parsed from a full TOML example.
#[fixture]
pub fn client_config_from_full_toml() -> ClientConfig {
    let toml = r#"
        base_url = "https://fleet.example.com/v1"
        environment = "prod"
        token = "s3cr3t"
        request_timeout_secs = 5

        [endpoints]
        host_status = "/v2/hosts/{host}"
        replace = "/envs/{environment}/clusters/{cluster}/replace"
        terminate = "/envs/{environment}/clusters/{cluster}/terminate"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `ClientConfig` parsed from a minimal TOML example.
#[fixture]
pub fn client_config_from_partial_toml() -> ClientConfig {
    let toml = r#"
        base_url = "https://fleet.example.com"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a `ClientConfig` that passes validation.
#[fixture]
pub fn valid_client_config() -> ClientConfig {
    ClientConfig {
        base_url: Some(String::from("https://fleet.example.com")),
        environment: Some(String::from("prod")),
        ..ClientConfig::default()
    }
}

/// Creates a `MockEnv` that returns `None` for every variable.
pub fn empty_env() -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(|_| None);
    env
}

/// Creates a `MockEnv` with custom mappings for environment variables.
pub fn env_with_vars(mappings: &'static [(&'static str, &'static str)]) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        mappings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| String::from(*v))
    });
    env
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(ClientConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `ClientConfig`.
pub fn merge_config(
    composer: MergeComposer,
) -> Result<ClientConfig, Arc<ortho_config::OrthoError>> {
    ClientConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &ClientConfig) {
    assert!(config.base_url.is_none(), "base_url should be None");
    assert!(config.environment.is_none(), "environment should be None");
    assert!(config.token.is_none(), "token should be None");
    assert_eq!(
        config.request_timeout_secs, 30,
        "request_timeout_secs should be 30"
    );
    assert_eq!(config.endpoints.host_status, "/hosts/{host}");
    assert_eq!(
        config.endpoints.replace,
        "/{environment}/clusters/{cluster}/replace"
    );
    assert_eq!(
        config.endpoints.terminate,
        "/{environment}/clusters/{cluster}/terminate"
    );
}
