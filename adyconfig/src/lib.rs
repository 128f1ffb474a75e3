//! # Adyen gateway configuration
//!
//! Configuration management for the gateway clients:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides (`ADYEN_CONFIG__GATEWAY__MERCHANT_ACCOUNT=...`)
//! - Typed getters for the gateway settings
//! - Transparent decryption of `encrypted:` passwords
//!
//! The configuration is loaded once and handed explicitly to the clients that
//! need it; there is no process-wide instance.
//!
//! ## Usage
//!
//! ```no_run
//! use adyconfig::Config;
//!
//! let config = Config::load_config("")?;
//! let environment = config.get_environment()?;
//! let (username, password) = config.get_api_credentials()?;
//! # Ok::<(), adyconfig::ConfigError>(())
//! ```

use dirs::home_dir;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Mutex,
};
use tracing::{info, warn};

pub mod encryption;
mod error;

pub use error::{ConfigError, Result};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("adyen.yaml");

const ENV_CONFIG_DIR: &str = "ADYEN_CONFIG";
const ENV_PREFIX: &str = "ADYEN_CONFIG__";
const CONFIG_DIR_NAME: &str = ".adyen";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Macro to generate getter/setter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_u64().unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                    warn!(value=%s, default=$default, "Invalid number in configuration");
                    $default
                }),
                _ => $default,
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Gateway environment, substituted into the endpoint URI (`pal-test`, `pal-live`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Test,
    Live,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "live" => Ok(Environment::Live),
            other => Err(ConfigError::InvalidValue {
                key: "gateway.environment".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration manager
///
/// Holds the embedded defaults merged with the YAML file, plus a separate
/// layer of environment overrides read at load time. A configuration loaded
/// from a directory writes the file layer back to `config.yaml` on every
/// change; environment overrides are never written. One built from a string
/// lives in memory only.
#[derive(Debug)]
pub struct Config {
    config_dir: Option<PathBuf>,
    path: Option<PathBuf>,
    data: Mutex<Value>,
    overrides: Value,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(self.lock().clone()),
            overrides: self.overrides.clone(),
        }
    }
}

impl Config {
    fn lock(&self) -> std::sync::MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return PathBuf::from(CONFIG_DIR_NAME);
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(CONFIG_DIR_NAME)
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(ConfigError::NotADirectory(path.display().to_string()));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;
        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `ADYEN_CONFIG` environment variable
    /// 3. `.adyen` in the current directory
    /// 4. `.adyen` in the user's home directory
    pub fn config_dir(directory: &str) -> Result<PathBuf> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(&dir_path)?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// Merges the embedded defaults with `config.yaml` (if present) and saves
    /// the merged result. Environment overrides are applied on read only.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let path = config_dir.join("config.yaml");
        let external = match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                serde_yaml::from_slice(&data)?
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
                Value::Mapping(Mapping::new())
            }
        };

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(Self::build_tree(&external)?),
            overrides: Self::env_overrides(),
        };

        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration from a YAML document
    ///
    /// The document is merged over the embedded defaults and environment
    /// overrides are applied, exactly as for [`Config::load_config`]. Nothing
    /// is written to disk.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let external: Value = serde_yaml::from_str(yaml)?;
        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(Self::build_tree(&external)?),
            overrides: Self::env_overrides(),
        })
    }

    fn build_tree(external: &Value) -> Result<Value> {
        let mut tree: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !external.is_null() {
            merge_yaml(&mut tree, &Self::lower_keys_value(external.clone()));
        }
        Ok(Self::lower_keys_value(tree))
    }

    /// Directory the configuration was loaded from, if any
    pub fn directory(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Saves the defaults merged with the file layer to config.yaml
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.lock())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// An environment override of the same path keeps precedence on read.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(ConfigError::NotAMapping(path[0].to_string()))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Environment overrides take precedence over the file and defaults.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let mut effective = self.lock().clone();
        merge_yaml(&mut effective, &self.overrides);
        Self::lookup(&effective, path)
    }

    fn lookup(tree: &Value, path: &[&str]) -> Result<Value> {
        let mut current = tree;
        for (i, key) in path.iter().enumerate() {
            let Value::Mapping(map) = current else {
                return Err(ConfigError::NotAMapping(path[..i].join(".")));
            };
            current = map
                .get(&Value::String(key.to_lowercase()))
                .ok_or_else(|| ConfigError::MissingPath(path[..=i].join(".")))?;
        }
        Ok(current.clone())
    }

    /// Gets a non-empty string, or [`ConfigError::NotConfigured`]
    pub fn get_required_string(&self, path: &[&str]) -> Result<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s),
            Ok(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ConfigError::not_configured(path)),
        }
    }

    /// Gets a non-empty string, or `None`
    pub fn get_optional_string(&self, path: &[&str]) -> Option<String> {
        self.get_required_string(path).ok()
    }

    /// Gets a password, decrypting `encrypted:` values
    pub fn get_password(&self, path: &[&str]) -> Result<String> {
        let raw = self.get_required_string(path)?;
        encryption::get_password(&raw)
    }

    fn env_overrides() -> Value {
        let mut overrides = Value::Mapping(Mapping::new());
        Self::apply_env_overrides(&mut overrides);
        overrides
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var = %key, error = %err, "Ignoring environment override");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Gets the gateway environment (`test` when unset)
    pub fn get_environment(&self) -> Result<Environment> {
        match self.get_value(&["gateway", "environment"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s.parse(),
            _ => Ok(Environment::default()),
        }
    }

    pub fn set_environment(&self, environment: Environment) -> Result<()> {
        self.set_value(
            &["gateway", "environment"],
            Value::String(environment.as_str().to_string()),
        )
    }

    /// Gets the default merchant account
    pub fn get_merchant_account(&self) -> Result<String> {
        self.get_required_string(&["gateway", "merchant_account"])
    }

    pub fn set_merchant_account(&self, account: &str) -> Result<()> {
        self.set_value(
            &["gateway", "merchant_account"],
            Value::String(account.to_string()),
        )
    }

    /// Gets the default webservice credentials (username, password)
    pub fn get_api_credentials(&self) -> Result<(String, String)> {
        let username = self.get_required_string(&["gateway", "api", "username"])?;
        let password = self.get_password(&["gateway", "api", "password"])?;
        Ok((username, password))
    }

    pub fn set_api_credentials(&self, username: &str, password: &str) -> Result<()> {
        self.set_value(
            &["gateway", "api", "username"],
            Value::String(username.to_string()),
        )?;
        self.set_value(
            &["gateway", "api", "password"],
            Value::String(password.to_string()),
        )
    }

    impl_u64_config!(
        get_http_timeout_secs,
        set_http_timeout_secs,
        &["gateway", "http_timeout_secs"],
        DEFAULT_HTTP_TIMEOUT_SECS
    );
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default value.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
