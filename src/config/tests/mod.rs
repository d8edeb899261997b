//! Unit tests for hostcycle configuration.
//!
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and TOML deserialisation
//! - [`validation`] - `ClientConfig::validate` tests
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests
//! - [`loader_tests`] - `load_config_with_env` against a mock environment

mod helpers;
