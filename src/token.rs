//! Session token lifecycle
//!
//! OpenTDB hands out session tokens that remember which questions were already
//! served, so repeated batch requests never return the same question twice.
//! The [`TokenManager`] reuses a persisted token when one exists, requests a new
//! one otherwise, and retires it when the batch endpoint reports it exhausted.
//!
//! Tokens are persisted through a [`TokenStore`]: either a JSON file
//! ([`FileTokenStore`], `{"token": ..., "createdAt": ...}`) or the database's
//! runtime state table.

use crate::api::OpenTdbClient;
use crate::db::Database;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runtime state key under which [`Database`] keeps the token record
pub const TOKEN_STATE_KEY: &str = "opentdb_token";

/// A persisted session token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The token string issued by the API
    pub token: String,
    /// When the token was issued
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Durable storage for the session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Previously persisted token, if any
    async fn load(&self) -> Result<Option<TokenRecord>>;

    /// Persist a token, replacing any previous one
    async fn persist(&self, record: &TokenRecord) -> Result<()>;

    /// Forget the persisted token
    async fn clear(&self) -> Result<()>;
}

/// Token store backed by a JSON file
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // An unreadable file is treated like no token at all
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                Ok(None)
            }
        }
    }

    async fn persist(&self, record: &TokenRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[async_trait]
impl TokenStore for Database {
    async fn load(&self) -> Result<Option<TokenRecord>> {
        match self.get_state(TOKEN_STATE_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    warn!(error = %e, "Ignoring corrupt token record in runtime state");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn persist(&self, record: &TokenRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.set_state(TOKEN_STATE_KEY, &json).await
    }

    async fn clear(&self) -> Result<()> {
        self.clear_state(TOKEN_STATE_KEY).await
    }
}

/// Where the manager stands with its token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// No token known yet (the store has not been consulted or was empty)
    Absent,
    /// A token usable for batch requests
    Valid(TokenRecord),
    /// The batch endpoint reported this token exhausted
    Expired(TokenRecord),
}

/// Acquires, persists and retires the session token
pub struct TokenManager {
    client: Arc<OpenTdbClient>,
    store: Arc<dyn TokenStore>,
    state: TokenState,
}

impl TokenManager {
    /// Create a manager; nothing is loaded until the first [`get_token`](Self::get_token)
    pub fn new(client: Arc<OpenTdbClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            state: TokenState::Absent,
        }
    }

    /// Current token state
    pub fn state(&self) -> &TokenState {
        &self.state
    }

    /// Previously persisted token, if any
    pub async fn load(&self) -> Result<Option<TokenRecord>> {
        self.store.load().await
    }

    /// Persist `token` as issued at `created_at`
    pub async fn persist(&self, token: &str, created_at: DateTime<Utc>) -> Result<()> {
        self.store
            .persist(&TokenRecord {
                token: token.to_string(),
                created_at,
            })
            .await
    }

    /// Return a usable token, reusing a persisted one or requesting a new one
    ///
    /// # Errors
    /// Fails with [`Error::TokenAcquisition`] when a new token is needed and
    /// the token endpoint does not issue one.
    pub async fn get_token(&mut self) -> Result<String> {
        if let TokenState::Valid(record) = &self.state {
            return Ok(record.token.clone());
        }

        // An expired token was cleared from the store; only look there when
        // nothing is known yet.
        if self.state == TokenState::Absent {
            match self.store.load().await {
                Ok(Some(record)) => {
                    debug!(created_at = %record.created_at, "Reusing persisted session token");
                    let token = record.token.clone();
                    self.state = TokenState::Valid(record);
                    return Ok(token);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Failed to load persisted token, requesting a new one"),
            }
        }

        let token = self.client.request_token().await?;
        let record = TokenRecord {
            token,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.persist(&record).await {
            warn!(error = %e, "Failed to persist session token, continuing with in-memory token");
        }

        info!("Acquired new session token");
        let token = record.token.clone();
        self.state = TokenState::Valid(record);
        Ok(token)
    }

    /// Mark the current token unusable and forget the persisted copy
    ///
    /// The next [`get_token`](Self::get_token) requests a fresh token.
    pub async fn retire(&mut self) {
        self.state = match std::mem::replace(&mut self.state, TokenState::Absent) {
            TokenState::Valid(record) | TokenState::Expired(record) => {
                info!(created_at = %record.created_at, "Retiring session token");
                TokenState::Expired(record)
            }
            TokenState::Absent => TokenState::Absent,
        };

        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted token");
        }
    }
}
