use serde::Serialize;

use crate::{
    catalog_db::CatalogDb,
    error::{Error, Result},
    ranker::RESULT_CEILING,
};

pub const DEFAULT_LIMIT: usize = RESULT_CEILING;
pub const DEFAULT_SLOW_QUERY_MS: u64 = 200;

pub const DEFAULT_LIMIT_KEY: &str = "default_limit";
pub const MAX_RESULTS_KEY: &str = "max_results";
pub const SLOW_QUERY_MS_KEY: &str = "slow_query_ms";

/// Setting keys accepted by `config set`.
pub const KEYS: &[&str] = &[DEFAULT_LIMIT_KEY, MAX_RESULTS_KEY, SLOW_QUERY_MS_KEY];

pub const DEFAULT_LIMIT_ENV_VAR: &str = "SHELFSEARCH_DEFAULT_LIMIT";
pub const MAX_RESULTS_ENV_VAR: &str = "SHELFSEARCH_MAX_RESULTS";

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Page size used when a request does not name one.
    pub default_limit: usize,
    /// Largest page served. Never above [`RESULT_CEILING`].
    pub max_results: usize,
    /// Searches slower than this are logged at warn level.
    pub slow_query_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_results: RESULT_CEILING,
            slow_query_ms: DEFAULT_SLOW_QUERY_MS,
        }
    }
}

impl SearchConfig {
    /// Resolve the config from, in order of priority:
    /// 1. The `SHELFSEARCH_DEFAULT_LIMIT` / `SHELFSEARCH_MAX_RESULTS`
    ///    environment variables
    /// 2. The settings table in the catalog
    /// 3. Built-in defaults
    pub fn resolve(db: &CatalogDb) -> Result<Self> {
        Self::resolve_with(
            |key| db.get_setting(key),
            |var| std::env::var(var).ok(),
        )
    }

    /// Resolution with injectable lookups, so tests need neither a
    /// database nor process environment.
    pub fn resolve_with(
        setting: impl Fn(&str) -> Result<Option<String>>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let lookup = |key: &str, var: Option<&str>| -> Result<Option<String>> {
            if let Some(value) = var.and_then(&env) {
                return Ok(Some(value));
            }
            setting(key)
        };

        let default_limit = match lookup(DEFAULT_LIMIT_KEY, Some(DEFAULT_LIMIT_ENV_VAR))? {
            Some(raw) => parse_setting(DEFAULT_LIMIT_KEY, &raw)?,
            None => defaults.default_limit,
        };
        let max_results = match lookup(MAX_RESULTS_KEY, Some(MAX_RESULTS_ENV_VAR))? {
            Some(raw) => parse_setting(MAX_RESULTS_KEY, &raw)?,
            None => defaults.max_results,
        };
        let slow_query_ms = match lookup(SLOW_QUERY_MS_KEY, None)? {
            Some(raw) => parse_setting(SLOW_QUERY_MS_KEY, &raw)?,
            None => defaults.slow_query_ms,
        };

        Ok(Self {
            default_limit,
            max_results,
            slow_query_ms,
        }
        .clamped())
    }

    /// Pull the page sizes back inside `1..=RESULT_CEILING`, with the
    /// default never larger than the maximum.
    pub fn clamped(self) -> Self {
        let max_results = self.max_results.clamp(1, RESULT_CEILING);
        Self {
            default_limit: self.default_limit.clamp(1, max_results),
            max_results,
            slow_query_ms: self.slow_query_ms,
        }
    }
}

/// Check a `config set` pair before it is stored.
pub fn validate_setting(key: &str, value: &str) -> Result<()> {
    match key {
        DEFAULT_LIMIT_KEY | MAX_RESULTS_KEY => {
            let n: usize = parse_setting(key, value)?;
            if n == 0 || n > RESULT_CEILING {
                return Err(Error::Config(format!(
                    "{key} must be between 1 and {RESULT_CEILING}, got {n}"
                )));
            }
            Ok(())
        }
        SLOW_QUERY_MS_KEY => parse_setting::<u64>(key, value).map(|_| ()),
        _ => Err(Error::Config(format!(
            "unknown setting '{key}' (expected one of: {})",
            KEYS.join(", ")
        ))),
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::Config(format!("invalid value for {key}: '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = SearchConfig::resolve_with(|_| Ok(None), |_| None).unwrap();
        assert_eq!(cfg, SearchConfig::default());
        assert_eq!(cfg.default_limit, 50);
        assert_eq!(cfg.max_results, 50);
    }

    #[test]
    fn stored_settings_apply() {
        let stored = settings(&[("default_limit", "10"), ("slow_query_ms", "50")]);
        let cfg = SearchConfig::resolve_with(|k| Ok(stored.get(k).cloned()), |_| None)
            .unwrap();
        assert_eq!(cfg.default_limit, 10);
        assert_eq!(cfg.slow_query_ms, 50);
    }

    #[test]
    fn env_beats_stored_settings() {
        let stored = settings(&[("max_results", "30")]);
        let cfg = SearchConfig::resolve_with(
            |k| Ok(stored.get(k).cloned()),
            |var| (var == MAX_RESULTS_ENV_VAR).then(|| "15".to_string()),
        )
        .unwrap();
        assert_eq!(cfg.max_results, 15);
        assert_eq!(cfg.default_limit, 15);
    }

    #[test]
    fn max_results_never_exceeds_ceiling() {
        let stored = settings(&[("max_results", "500")]);
        let cfg = SearchConfig::resolve_with(|k| Ok(stored.get(k).cloned()), |_| None)
            .unwrap();
        assert_eq!(cfg.max_results, RESULT_CEILING);
    }

    #[test]
    fn garbage_setting_is_a_config_error() {
        let stored = settings(&[("default_limit", "lots")]);
        let err = SearchConfig::resolve_with(|k| Ok(stored.get(k).cloned()), |_| None)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_setting_checks_keys_and_ranges() {
        assert!(validate_setting("default_limit", "25").is_ok());
        assert!(validate_setting("max_results", "0").is_err());
        assert!(validate_setting("max_results", "51").is_err());
        assert!(validate_setting("slow_query_ms", "abc").is_err());
        assert!(validate_setting("colour", "blue").is_err());
    }
}
