//! # LyricBox Configuration Module
//!
//! Configuration management for LyricBox:
//! - Embedded default YAML configuration
//! - Merging with an external `config.yaml` file
//! - Environment variable overrides (`LYRICBOX_CONFIG__SECTION__KEY`)
//! - Typed getters for configuration values
//!
//! Unlike a global singleton, a [`Config`] is constructed explicitly and
//! passed to whoever needs it, so independent instances (e.g. in tests)
//! never interfere.
//!
//! ## Usage
//!
//! ```no_run
//! use lyrconfig::Config;
//!
//! let config = Config::from_defaults()?;
//! let port = config.get_http_port();
//! let model = config.get_ai_model();
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use serde_yaml::{Mapping, Number, Value};
use std::{env, fs, path::Path, sync::Mutex};
use tracing::info;

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("lyricbox.yaml");

const ENV_PREFIX: &str = "LYRICBOX_CONFIG__";

// Default values used when a key is missing or has the wrong type
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AI_MAX_TOKENS: u64 = 500;
const DEFAULT_AI_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_QUESTION_LENGTH: usize = 500;
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SEARCH_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 86_400;
const DEFAULT_SEARCH_CACHE_TTI_SECS: u64 = 21_600;
const DEFAULT_URL_CACHE_CAPACITY: u64 = 500;
const DEFAULT_URL_CACHE_TTL_SECS: u64 = 1_800;
const DEFAULT_DEDUP_WINDOW_MS: u64 = 5_000;
const DEFAULT_DEDUP_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Macro to generate a getter for u64 values with a default
macro_rules! impl_u64_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
                Ok(Value::Number(n)) if n.is_i64() && n.as_i64().unwrap() >= 0 => {
                    n.as_i64().unwrap() as u64
                }
                _ => $default,
            }
        }
    };
}

/// Macro to generate a getter for string values with a default
macro_rules! impl_string_config {
    ($getter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) => s,
                _ => $default.to_string(),
            }
        }
    };
}

/// Configuration manager for LyricBox
///
/// Holds the merged YAML tree (embedded defaults, optional external file,
/// environment overrides) and exposes typed getters for every tunable the
/// application uses.
#[derive(Debug)]
pub struct Config {
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Builds a configuration from the embedded defaults plus environment
    /// variable overrides, without touching the filesystem.
    pub fn from_defaults() -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        value = Self::lower_keys_value(value);
        Self::apply_env_overrides(&mut value);
        Ok(Self {
            data: Mutex::new(value),
        })
    }

    /// Loads the configuration, merging in order:
    /// 1. the embedded default configuration
    /// 2. `<directory>/config.yaml` if present
    /// 3. `LYRICBOX_CONFIG__*` environment variables
    pub fn load(directory: &str) -> Result<Self> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let config_file = Path::new(directory).join("config.yaml");
        if let Ok(data) = fs::read(&config_file) {
            info!(config_file=%config_file.display(), "Loaded config file");
            let external_value: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut default_value, &external_value);
        } else {
            info!(config_file=%config_file.display(), "Config file not found, using embedded defaults");
        }

        let mut config_value = Self::lower_keys_value(default_value);
        Self::apply_env_overrides(&mut config_value);

        Ok(Self {
            data: Mutex::new(config_value),
        })
    }

    /// Sets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["ai", "model"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
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
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();
                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    // ============ Server ============

    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["server", "http_port"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as u16,
            _ => DEFAULT_HTTP_PORT,
        }
    }

    impl_string_config!(get_base_url, &["server", "base_url"], "http://localhost:8080");

    // ============ AI backend ============

    impl_string_config!(get_ai_base_url, &["ai", "base_url"], "https://api.openai.com/v1");
    impl_string_config!(get_ai_api_key, &["ai", "api_key"], "");
    impl_string_config!(get_ai_model, &["ai", "model"], "gpt-4o");
    impl_u64_config!(get_ai_max_tokens, &["ai", "max_tokens"], DEFAULT_AI_MAX_TOKENS);

    /// AI request timeout in seconds, clamped to 1..=300
    pub fn get_ai_timeout_secs(&self) -> u64 {
        let raw = match self.get_value(&["ai", "timeout_secs"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
            _ => DEFAULT_AI_TIMEOUT_SECS,
        };
        raw.clamp(1, 300)
    }

    pub fn get_ai_temperature(&self) -> f64 {
        match self.get_value(&["ai", "temperature"]) {
            Ok(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_AI_TEMPERATURE),
            _ => DEFAULT_AI_TEMPERATURE,
        }
    }

    // ============ Proxy ============

    /// Returns `Some((host, port))` when an outbound HTTP proxy is enabled
    pub fn get_proxy(&self) -> Option<(String, u16)> {
        match self.get_value(&["proxy", "enabled"]) {
            Ok(Value::Bool(true)) => {}
            _ => return None,
        }
        let host = match self.get_value(&["proxy", "host"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => return None,
        };
        let port = match self.get_value(&["proxy", "port"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as u16,
            _ => return None,
        };
        Some((host, port))
    }

    // ============ Application ============

    pub fn get_max_question_length(&self) -> usize {
        match self.get_value(&["app", "max_question_length"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as usize,
            _ => DEFAULT_MAX_QUESTION_LENGTH,
        }
    }

    // ============ Music catalog ============

    impl_string_config!(
        get_catalog_search_url,
        &["catalog", "search_url"],
        "https://music.163.com/api/search/get/web"
    );
    impl_string_config!(
        get_catalog_song_url,
        &["catalog", "song_url"],
        "https://wyy-api-three.vercel.app/song/url"
    );
    impl_string_config!(get_catalog_quality, &["catalog", "quality"], "flac");
    impl_u64_config!(
        get_catalog_timeout_secs,
        &["catalog", "timeout_secs"],
        DEFAULT_CATALOG_TIMEOUT_SECS
    );

    // ============ Caches ============

    impl_u64_config!(
        get_search_cache_capacity,
        &["cache", "search_capacity"],
        DEFAULT_SEARCH_CACHE_CAPACITY
    );
    impl_u64_config!(
        get_search_cache_ttl_secs,
        &["cache", "search_ttl_secs"],
        DEFAULT_SEARCH_CACHE_TTL_SECS
    );
    impl_u64_config!(
        get_search_cache_tti_secs,
        &["cache", "search_tti_secs"],
        DEFAULT_SEARCH_CACHE_TTI_SECS
    );
    impl_u64_config!(
        get_url_cache_capacity,
        &["cache", "url_capacity"],
        DEFAULT_URL_CACHE_CAPACITY
    );
    impl_u64_config!(
        get_url_cache_ttl_secs,
        &["cache", "url_ttl_secs"],
        DEFAULT_URL_CACHE_TTL_SECS
    );

    // ============ Request deduplication ============

    impl_u64_config!(get_dedup_window_ms, &["dedup", "window_ms"], DEFAULT_DEDUP_WINDOW_MS);
    impl_u64_config!(
        get_dedup_sweep_interval_ms,
        &["dedup", "sweep_interval_ms"],
        DEFAULT_DEDUP_SWEEP_INTERVAL_MS
    );
}

/// Recursively merges `other` into `base`, `other` taking precedence
fn merge_yaml(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Mapping(base_map), Value::Mapping(other_map)) => {
            for (k, v) in other_map {
                match base_map.get_mut(k) {
                    Some(base_v) => merge_yaml(base_v, v),
                    None => {
                        base_map.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (base, other) => *base = other.clone(),
    }
}

/// Helper to build a YAML number from a u64 (used by tests and callers)
pub fn yaml_u64(value: u64) -> Value {
    Value::Number(Number::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loaded() {
        let config = Config::from_defaults().unwrap();
        assert_eq!(config.get_http_port(), 8080);
        assert_eq!(config.get_ai_model(), "gpt-4o");
        assert_eq!(config.get_ai_timeout_secs(), 30);
        assert_eq!(config.get_max_question_length(), 500);
        assert_eq!(config.get_dedup_window_ms(), 5_000);
        assert_eq!(config.get_dedup_sweep_interval_ms(), 60_000);
        assert_eq!(config.get_search_cache_capacity(), 1_000);
        assert_eq!(config.get_url_cache_ttl_secs(), 1_800);
        assert!(config.get_proxy().is_none());
    }

    #[test]
    fn set_and_get_roundtrip() {
        let config = Config::from_defaults().unwrap();
        config
            .set_value(&["ai", "model"], Value::String("gpt-4o-mini".into()))
            .unwrap();
        assert_eq!(config.get_ai_model(), "gpt-4o-mini");
    }

    #[test]
    fn timeout_is_clamped() {
        let config = Config::from_defaults().unwrap();
        config.set_value(&["ai", "timeout_secs"], yaml_u64(0)).unwrap();
        assert_eq!(config.get_ai_timeout_secs(), 1);
        config.set_value(&["ai", "timeout_secs"], yaml_u64(900)).unwrap();
        assert_eq!(config.get_ai_timeout_secs(), 300);
    }

    #[test]
    fn proxy_requires_enabled_flag() {
        let config = Config::from_defaults().unwrap();
        assert!(config.get_proxy().is_none());
        config.set_value(&["proxy", "enabled"], Value::Bool(true)).unwrap();
        assert_eq!(config.get_proxy(), Some(("127.0.0.1".to_string(), 7890)));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let config = Config::from_defaults().unwrap();
        assert_eq!(
            config.get_value(&["AI", "MODEL"]).unwrap(),
            Value::String("gpt-4o".into())
        );
    }

    #[test]
    fn clone_is_independent() {
        let config = Config::from_defaults().unwrap();
        let cloned = config.clone();
        config
            .set_value(&["ai", "model"], Value::String("other".into()))
            .unwrap();
        assert_eq!(cloned.get_ai_model(), "gpt-4o");
    }
}
