//! Runtime configuration
//!
//! Paths come from the command line; catalog settings can be overridden with
//! environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://api.deckbrew.com";

/// Remote card catalog settings
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: String,
    /// Pause before every request
    pub request_delay: Duration,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            request_delay: Duration::from_millis(100),
            max_retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CatalogConfig {
    /// Construct catalog configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CUBEALYZER_CATALOG_URL` - Catalog base URL (default: https://api.deckbrew.com)
    /// - `CUBEALYZER_REQUEST_DELAY_MS` - Delay before each request (default: 100)
    /// - `CUBEALYZER_MAX_RETRIES` - Retries per card (default: 3)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("CUBEALYZER_CATALOG_URL").filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse(&lookup, "CUBEALYZER_REQUEST_DELAY_MS") {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(retries) = parse(&lookup, "CUBEALYZER_MAX_RETRIES") {
            config.max_retries = retries;
        }

        config
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    lookup(key)?.trim().parse().ok()
}

/// Everything the binary needs to run an analysis
#[derive(Clone, Debug)]
pub struct Config {
    /// Cube list (CSV, one card name per row)
    pub cube_path: PathBuf,
    /// JSON card cache
    pub cache_path: PathBuf,
    /// Never contact the catalog
    pub offline: bool,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn new(cube_path: PathBuf, cache_path: Option<PathBuf>, offline: bool) -> Self {
        let cache_path = cache_path.unwrap_or_else(|| default_cache_path(&cube_path));
        Config {
            cube_path,
            cache_path,
            offline,
            catalog: CatalogConfig::from_env(),
        }
    }
}

/// The cube file with its extension swapped for `.json`
pub fn default_cache_path(cube_path: &Path) -> PathBuf {
    cube_path.with_extension("json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.request_delay, Duration::from_millis(100));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_env_overrides() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CUBEALYZER_CATALOG_URL", "http://localhost:8080/"),
            ("CUBEALYZER_REQUEST_DELAY_MS", "0"),
            ("CUBEALYZER_MAX_RETRIES", "5"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_bad_values_fall_back_to_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("CUBEALYZER_CATALOG_URL", "  "),
            ("CUBEALYZER_MAX_RETRIES", "many"),
        ]));
        assert_eq!(config.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_default_cache_path() {
        assert_eq!(
            default_cache_path(Path::new("cubes/vintage.csv")),
            PathBuf::from("cubes/vintage.json")
        );
        assert_eq!(
            default_cache_path(Path::new("legacy")),
            PathBuf::from("legacy.json")
        );
    }
}
