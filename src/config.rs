//! Configuration types for opentdb-import

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest batch the OpenTDB batch endpoint will serve in one request
pub const MAX_PAGE_SIZE: u32 = 50;

/// OpenTDB endpoint configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the trivia API (default: "https://opentdb.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to every outbound request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Scope of the in-memory seen-set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// A fresh seen-set per category (default)
    #[default]
    Category,
    /// One seen-set shared by every category of the run
    Run,
}

/// Paginated crawl behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Questions requested per page (default: 50, capped at 50)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between consecutive page requests (default: 200 ms)
    ///
    /// Always applied; the public API rate-limits per IP.
    #[serde(default = "default_page_delay", with = "millis_serde")]
    pub page_delay: Duration,

    /// Consecutive pages without a new question before giving up on a category (default: 3)
    #[serde(default = "default_max_stalled_pages")]
    pub max_stalled_pages: u32,

    /// Whether the seen-set spans one category or the whole run
    #[serde(default)]
    pub dedup_scope: DedupScope,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_delay: default_page_delay(),
            max_stalled_pages: default_max_stalled_pages(),
            dedup_scope: DedupScope::default(),
        }
    }
}

impl ImportConfig {
    /// Page size clamped to the API cap
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Storage locations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database path (default: "./opentdb.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// JSON token file (e.g. "./tokens.json"); when unset the token lives in the database
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            token_file: None,
        }
    }
}

/// Retry configuration for transient transport failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// A category to import: OpenTDB numeric id plus display name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// OpenTDB category id (e.g. 9 for "General Knowledge")
    pub id: i64,
    /// Display name stored in the categories table
    pub name: String,
}

impl CategoryConfig {
    /// Convenience constructor
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Main configuration for the importer
///
/// Every field has a default, so an empty JSON object is a valid configuration
/// (it simply imports no categories).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// OpenTDB endpoint settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Crawl behaviour
    #[serde(default)]
    pub import: ImportConfig,

    /// Storage locations
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Transport retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Categories to import, processed in order
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", self.api.base_url, e),
            key: Some("api.base_url".to_string()),
        })?;

        if self.api.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeout must be greater than zero".to_string(),
                key: Some("api.request_timeout".to_string()),
            });
        }

        if self.import.page_size == 0 {
            return Err(Error::Config {
                message: "page size must be at least 1".to_string(),
                key: Some("import.page_size".to_string()),
            });
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for category in &self.categories {
            if !ids.insert(category.id) {
                return Err(Error::Config {
                    message: format!("category id {} listed twice", category.id),
                    key: Some("categories".to_string()),
                });
            }
            if !names.insert(category.name.as_str()) {
                return Err(Error::Config {
                    message: format!("category name '{}' listed twice", category.name),
                    key: Some("categories".to_string()),
                });
            }
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://opentdb.com".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("opentdb-import/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_page_delay() -> Duration {
    Duration::from_millis(200)
}

fn default_max_stalled_pages() -> u32 {
    3
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./opentdb.db")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api.base_url, "https://opentdb.com");
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.import.page_size, 50);
        assert_eq!(config.import.page_delay, Duration::from_millis(200));
        assert_eq!(config.import.dedup_scope, DedupScope::Category);
        assert!(config.persistence.token_file.is_none());
        assert!(config.categories.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: Config = serde_json::from_str(
            r#"{
                "import": { "page_delay": 500, "dedup_scope": "run" },
                "persistence": { "token_file": "tokens.json" },
                "categories": [ { "id": 9, "name": "General Knowledge" } ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.import.page_delay, Duration::from_millis(500));
        assert_eq!(config.import.page_size, 50);
        assert_eq!(config.import.dedup_scope, DedupScope::Run);
        assert_eq!(
            config.persistence.token_file.as_deref(),
            Some(Path::new("tokens.json"))
        );
        assert_eq!(
            config.categories,
            vec![CategoryConfig::new(9, "General Knowledge")]
        );
    }

    #[test]
    fn test_page_size_is_capped() {
        let import = ImportConfig {
            page_size: 500,
            ..Default::default()
        };
        assert_eq!(import.effective_page_size(), 50);

        let import = ImportConfig {
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(import.effective_page_size(), 10);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.import.page_size = 0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, Error::Config { key: Some(ref k), .. } if k == "import.page_size"),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_validate_rejects_zero_request_timeout() {
        let mut config = Config::default();
        config.api.request_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, Error::Config { key: Some(ref k), .. } if k == "api.request_timeout"),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_categories() {
        let mut config = Config::default();
        config.categories = vec![
            CategoryConfig::new(9, "General Knowledge"),
            CategoryConfig::new(9, "Books"),
        ];
        assert!(config.validate().is_err());

        config.categories = vec![
            CategoryConfig::new(9, "General Knowledge"),
            CategoryConfig::new(10, "General Knowledge"),
        ];
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(
            &path,
            r#"{ "categories": [ { "id": 10, "name": "Entertainment: Books" } ] }"#,
        )
        .await
        .unwrap();

        let config = Config::from_file(&path).await.unwrap();
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].id, 10);

        let missing = Config::from_file(&dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(Error::Config { .. })));
    }
}
