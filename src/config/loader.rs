//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: application defaults, configuration file,
//! environment variables. Layers are composed manually with
//! `MergeComposer` so that typed environment values fail fast instead of
//! being silently ignored, and so that the environment can be injected
//! through `mockable::Env` in tests.
//!
//! Empty variables are treated as unset. Non-empty string fields (e.g.
//! `HOSTCYCLE_BASE_URL`) are always accepted. Typed fields
//! such as `HOSTCYCLE_REQUEST_TIMEOUT_SECS` must parse or loading fails with
//! `ConfigError::InvalidValue`.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::ClientConfig;
use crate::error::{ConfigError, Result};

/// Environment variable naming an explicit configuration file.
const CONFIG_PATH_ENV_VAR: &str = "HOSTCYCLE_CONFIG_PATH";

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `HOSTCYCLE_BASE_URL`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["endpoints", "replace"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "HOSTCYCLE_BASE_URL",
        path: &["base_url"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_ENVIRONMENT",
        path: &["environment"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_TOKEN",
        path: &["token"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_REQUEST_TIMEOUT_SECS",
        path: &["request_timeout_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_ENDPOINTS_HOST_STATUS",
        path: &["endpoints", "host_status"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_ENDPOINTS_REPLACE",
        path: &["endpoints", "replace"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "HOSTCYCLE_ENDPOINTS_TERMINATE",
        path: &["endpoints", "terminate"],
        var_type: EnvVarType::String,
    },
];

/// Returns the list of environment variable names recognised by the loader.
///
/// Tests use this to clear every `HOSTCYCLE_*` variable without keeping a
/// hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
fn load_config_file(path: &Utf8Path, composer: &mut MergeComposer) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.to_owned()));
    Ok(())
}

/// Load configuration from the process environment with full layer precedence.
///
/// # Errors
///
/// See [`load_config_with_env`].
pub fn load_config(config_path: Option<&Utf8Path>) -> Result<ClientConfig> {
    load_config_with_env(config_path, &DefaultEnv::new())
}

/// Load configuration with full layer precedence using the given environment.
///
/// 1. Application defaults
/// 2. Configuration file: `config_path` when given, otherwise the first
///    existing candidate from `HOSTCYCLE_CONFIG_PATH` and the XDG/dotfile
///    discovery paths
/// 3. `HOSTCYCLE_*` environment variables
///
/// The result is not validated; call [`ClientConfig::validate`] or let
/// [`crate::lifecycle::HostLifecycleClient::from_config`] do it.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if an explicit `config_path` does not
/// exist, `ConfigError::ParseError` for unreadable or malformed files,
/// `ConfigError::InvalidValue` for unparseable typed environment values, and
/// `ConfigError::OrthoConfig` if the merged layers do not deserialise.
pub fn load_config_with_env<E: Env>(
    config_path: Option<&Utf8Path>,
    env: &E,
) -> Result<ClientConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(ClientConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = resolve_config_path(config_path, env)? {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let config =
        ClientConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Pick the configuration file to load, if any.
fn resolve_config_path<E: Env>(
    explicit: Option<&Utf8Path>,
    env: &E,
) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.as_std_path().to_path_buf(),
            }
            .into());
        }
        return Ok(Some(path.to_owned()));
    }

    if let Some(from_env) = env
        .string(CONFIG_PATH_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(Utf8PathBuf::from)
        .filter(|path| path.exists())
    {
        return Ok(Some(from_env));
    }

    let discovery = ConfigDiscovery::builder("hostcycle")
        .env_var(CONFIG_PATH_ENV_VAR)
        .config_file_name("config.toml")
        .dotfile_name(".hostcycle.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Collect `HOSTCYCLE_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable does not parse.
fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var).filter(|v| !v.is_empty()) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}
