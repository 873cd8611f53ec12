//! Environment settings for the catalog indexer.

use std::env;

use crate::IndexingError;
use catalog_indexer_pipeline::loader::DEFAULT_BATCH_SIZE;
use catalog_indexer_pipeline::source::PostgresConfig;
use catalog_indexer_repository::config::DEFAULT_INDEX_NAME;
use catalog_indexer_repository::OpenSearchCredentials;

/// Default search engine URL.
pub const DEFAULT_ES_HOST: &str = "http://localhost:9200";

/// Settings for the search engine side of a run.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub host: String,
    pub credentials: Option<OpenSearchCredentials>,
    pub index_name: String,
    pub bulk_batch_size: usize,
}

/// Everything a sync run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub postgres: PostgresConfig,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `PGHOST`, `PGPORT`, `PGUSER`, `PGPASSWORD`, `PGDATABASE`: required
    /// - everything read by `SearchSettings::from_env`
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which returns the value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = required(&lookup, "PGPORT")?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| IndexingError::config(format!("PGPORT must be a port number, got '{}'", port)))?;

        let postgres = PostgresConfig {
            host: required(&lookup, "PGHOST")?,
            port,
            user: required(&lookup, "PGUSER")?,
            password: required(&lookup, "PGPASSWORD")?,
            database: required(&lookup, "PGDATABASE")?,
        };

        Ok(Self {
            postgres,
            search: SearchSettings::from_lookup(lookup)?,
        })
    }
}

impl SearchSettings {
    /// Load settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ES_HOST`: search engine URL (default: http://localhost:9200)
    /// - `ES_USERNAME` / `ES_PASSWORD`: basic auth, used only when both are set
    /// - `ES_INDEX`: target index (default: products)
    /// - `ES_BULK_BATCH_SIZE`: documents per bulk request (default: 500)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = match (optional(&lookup, "ES_USERNAME"), optional(&lookup, "ES_PASSWORD")) {
            (Some(username), Some(password)) => Some(OpenSearchCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(IndexingError::config(
                    "ES_USERNAME and ES_PASSWORD must be set together",
                ))
            }
        };

        let bulk_batch_size = match optional(&lookup, "ES_BULK_BATCH_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(IndexingError::config(format!(
                        "ES_BULK_BATCH_SIZE must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => DEFAULT_BATCH_SIZE,
        };

        Ok(Self {
            host: optional(&lookup, "ES_HOST").unwrap_or_else(|| DEFAULT_ES_HOST.to_string()),
            credentials,
            index_name: optional(&lookup, "ES_INDEX").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            bulk_batch_size,
        })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .ok_or_else(|| IndexingError::config(format!("Missing required environment variable {}", key)))
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

    const PG_VARS: [(&str, &str); 5] = [
        ("PGHOST", "db"),
        ("PGPORT", "5432"),
        ("PGUSER", "postgres"),
        ("PGPASSWORD", "secret"),
        ("PGDATABASE", "adventureworks"),
    ];

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&PG_VARS)).unwrap();

        assert_eq!(settings.postgres.port, 5432);
        assert_eq!(settings.postgres.database, "adventureworks");
        assert_eq!(settings.search.host, "http://localhost:9200");
        assert_eq!(settings.search.index_name, "products");
        assert_eq!(settings.search.bulk_batch_size, 500);
        assert!(settings.search.credentials.is_none());
    }

    #[test]
    fn test_missing_required_variable_is_named() {
        let vars: Vec<(&str, &str)> = PG_VARS.iter().copied().filter(|(k, _)| *k != "PGUSER").collect();

        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable PGUSER"
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = PG_VARS.to_vec();
        vars[1] = ("PGPORT", "postgres");

        let err = Settings::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, IndexingError::ConfigError(ref m) if m.contains("PGPORT")));
    }

    #[test]
    fn test_search_overrides() {
        let settings = SearchSettings::from_lookup(lookup(&[
            ("ES_HOST", "https://search.internal:9200"),
            ("ES_USERNAME", "elastic"),
            ("ES_PASSWORD", "changeme"),
            ("ES_INDEX", "catalog"),
            ("ES_BULK_BATCH_SIZE", "250"),
        ]))
        .unwrap();

        assert_eq!(settings.host, "https://search.internal:9200");
        assert_eq!(settings.index_name, "catalog");
        assert_eq!(settings.bulk_batch_size, 250);
        assert_eq!(settings.credentials.unwrap().username, "elastic");
    }

    #[test]
    fn test_invalid_batch_size() {
        for raw in ["0", "-1", "many"] {
            let result = SearchSettings::from_lookup(lookup(&[("ES_BULK_BATCH_SIZE", raw)]));
            assert!(matches!(result, Err(IndexingError::ConfigError(_))));
        }
    }

    #[test]
    fn test_half_configured_credentials() {
        let result = SearchSettings::from_lookup(lookup(&[("ES_USERNAME", "elastic")]));
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[test]
    fn test_search_settings_do_not_need_postgres() {
        assert!(SearchSettings::from_lookup(lookup(&[])).is_ok());
    }
}
