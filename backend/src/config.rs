//! Runtime configuration.
//!
//! Values come from the process environment, which the binary seeds from an
//! optional `.env` file. Every setting has a default so the CLI works without any
//! configuration for local files.

use std::env;

use crate::error::{ConfigError, ConfigResult};
use crate::reshape::{IndexErrorPolicy, ReshapeOptions};

/// Default data-set API prefix.
pub const DEFAULT_API_PREFIX: &str = "http://localhost:5000/api/data-sets";

/// Environment variable holding the data-set API prefix.
pub const ENV_API_PREFIX: &str = "DATASET_API_PREFIX";

/// Environment variable holding a ready-made `Authorization` header value.
pub const ENV_API_AUTH: &str = "DATASET_API_AUTH";

/// Environment variable toggling forward-filling of gaps (`true`/`false`).
pub const ENV_FILL_GAPS: &str = "DATASET_FILL_GAPS";

/// Environment variable selecting the index error policy (`skip`/`abort`).
pub const ENV_INDEX_ERRORS: &str = "DATASET_INDEX_ERRORS";

/// Settings shared by the CLI commands.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_prefix: String,
    pub api_auth: Option<String>,
    pub reshape: ReshapeOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            api_auth: None,
            reshape: ReshapeOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// `.env` is not read here; the binary loads it once at startup.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(prefix) = lookup(ENV_API_PREFIX).filter(|p| !p.trim().is_empty()) {
            settings.api_prefix = prefix.trim().trim_end_matches('/').to_string();
        }

        settings.api_auth = lookup(ENV_API_AUTH).filter(|a| !a.trim().is_empty());

        if let Some(fill) = lookup(ENV_FILL_GAPS) {
            settings.reshape.fill_gaps =
                parse_bool(&fill).ok_or_else(|| ConfigError::InvalidBool {
                    var: ENV_FILL_GAPS,
                    value: fill.clone(),
                })?;
        }

        if let Some(policy) = lookup(ENV_INDEX_ERRORS) {
            settings.reshape.on_index_error = policy
                .parse::<IndexErrorPolicy>()
                .map_err(|_| ConfigError::InvalidPolicy {
                    var: ENV_INDEX_ERRORS,
                    value: policy.trim().to_string(),
                })?;
        }

        Ok(settings)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> ConfigResult<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.api_prefix, DEFAULT_API_PREFIX);
        assert_eq!(s.api_auth, None);
        assert!(s.reshape.fill_gaps);
        assert_eq!(s.reshape.on_index_error, IndexErrorPolicy::Skip);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            (ENV_API_PREFIX, "https://example.org/api/data-sets/"),
            (ENV_API_AUTH, "Bearer abc"),
            (ENV_FILL_GAPS, "off"),
            (ENV_INDEX_ERRORS, "ABORT"),
        ])
        .unwrap();
        assert_eq!(s.api_prefix, "https://example.org/api/data-sets");
        assert_eq!(s.api_auth.as_deref(), Some("Bearer abc"));
        assert!(!s.reshape.fill_gaps);
        assert_eq!(s.reshape.on_index_error, IndexErrorPolicy::Abort);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            settings(&[(ENV_FILL_GAPS, "maybe")]).unwrap_err(),
            ConfigError::InvalidBool {
                var: ENV_FILL_GAPS,
                value: "maybe".into()
            }
        );
        assert!(matches!(
            settings(&[(ENV_INDEX_ERRORS, "ignore")]),
            Err(ConfigError::InvalidPolicy { .. })
        ));
    }
}
