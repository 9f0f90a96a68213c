//! Test configuration helpers: a config aimed at the mock server and a wired-up importer

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

use opentdb_import::config::{ApiConfig, ImportConfig, PersistenceConfig, RetryConfig};
use opentdb_import::{
    CategoryConfig, Config, Database, FileTokenStore, Importer, OpenTdbClient, TokenManager,
};

/// Config pointing at `server`, storing everything under `dir`
pub fn test_config(server: &MockServer, dir: &TempDir, categories: Vec<CategoryConfig>) -> Config {
    Config {
        api: ApiConfig {
            base_url: server.uri(),
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        },
        import: ImportConfig {
            page_delay: Duration::from_millis(1),
            ..Default::default()
        },
        persistence: PersistenceConfig {
            database_path: dir.path().join("opentdb.db"),
            token_file: Some(dir.path().join("tokens.json")),
        },
        retry: RetryConfig {
            max_attempts: 0,
            ..Default::default()
        },
        categories,
    }
}

/// Open the database and build an importer the way the binary does
pub async fn open_importer(config: &Config) -> (Arc<Database>, Importer) {
    let db = Arc::new(
        Database::new(&config.persistence.database_path)
            .await
            .unwrap(),
    );
    let client = Arc::new(OpenTdbClient::new(&config.api, config.retry.clone()).unwrap());
    let token_file = config
        .persistence
        .token_file
        .clone()
        .unwrap();
    let tokens = TokenManager::new(client.clone(), Arc::new(FileTokenStore::new(token_file)));
    let importer = Importer::new(client, db.clone(), tokens, config.import.clone());
    (db, importer)
}
