//! Token repository trait and in-memory implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

use super::RememberMeError;

/// A stored remember-me token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentToken {
    pub series: String,
    pub username: String,
    /// Hex SHA-256 of the keyed token value
    pub token_digest: String,
    pub last_used: DateTime<Utc>,
}

/// Token repository trait
///
/// Implementations must be safe for concurrent use; operations on a single
/// series must be linearizable.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a new token; fails if the series already exists
    async fn create(&self, token: PersistentToken) -> Result<(), RememberMeError>;

    /// Get a token by series
    async fn get(&self, series: &str) -> Result<Option<PersistentToken>, RememberMeError>;

    /// Replace the token value of an existing series
    async fn update(
        &self,
        series: &str,
        token_digest: &str,
        last_used: DateTime<Utc>,
    ) -> Result<bool, RememberMeError>;

    /// Remove a single series
    async fn remove(&self, series: &str) -> Result<bool, RememberMeError>;

    /// Remove every token belonging to a user, returning how many were removed
    async fn remove_user_tokens(&self, username: &str) -> Result<usize, RememberMeError>;
}

/// Volatile token repository for development and tests
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<String, PersistentToken>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: PersistentToken) -> Result<(), RememberMeError> {
        let mut tokens = self.tokens.write();
        if tokens.contains_key(&token.series) {
            return Err(RememberMeError::DuplicateSeries(token.series));
        }
        debug!("Storing remember-me series for user: {}", token.username);
        tokens.insert(token.series.clone(), token);
        Ok(())
    }

    async fn get(&self, series: &str) -> Result<Option<PersistentToken>, RememberMeError> {
        Ok(self.tokens.read().get(series).cloned())
    }

    async fn update(
        &self,
        series: &str,
        token_digest: &str,
        last_used: DateTime<Utc>,
    ) -> Result<bool, RememberMeError> {
        let mut tokens = self.tokens.write();
        match tokens.get_mut(series) {
            Some(token) => {
                token.token_digest = token_digest.to_string();
                token.last_used = last_used;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, series: &str) -> Result<bool, RememberMeError> {
        Ok(self.tokens.write().remove(series).is_some())
    }

    async fn remove_user_tokens(&self, username: &str) -> Result<usize, RememberMeError> {
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, t| t.username != username);
        Ok(before - tokens.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn token(series: &str, username: &str) -> PersistentToken {
        PersistentToken {
            series: series.to_string(),
            username: username.to_string(),
            token_digest: "digest".to_string(),
            last_used: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let repo = InMemoryTokenRepository::new();
        repo.create(token("s1", "admin")).await.unwrap();

        let stored = repo.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.username, "admin");

        assert!(repo.remove("s1").await.unwrap());
        assert!(!repo.remove("s1").await.unwrap());
        assert!(repo.get("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_series_rejected() {
        let repo = InMemoryTokenRepository::new();
        repo.create(token("s1", "admin")).await.unwrap();
        assert_eq!(
            repo.create(token("s1", "test1")).await,
            Err(RememberMeError::DuplicateSeries("s1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryTokenRepository::new();
        repo.create(token("s1", "admin")).await.unwrap();

        let later = Utc::now() + chrono::Duration::minutes(5);
        assert!(repo.update("s1", "new-digest", later).await.unwrap());
        let stored = repo.get("s1").await.unwrap().unwrap();
        assert_eq!(stored.token_digest, "new-digest");
        assert_eq!(stored.last_used, later);

        assert!(!repo.update("missing", "x", later).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_user_tokens() {
        let repo = InMemoryTokenRepository::new();
        repo.create(token("s1", "admin")).await.unwrap();
        repo.create(token("s2", "admin")).await.unwrap();
        repo.create(token("s3", "test1")).await.unwrap();

        assert_eq!(repo.remove_user_tokens("admin").await.unwrap(), 2);
        assert_eq!(repo.len(), 1);
        assert!(repo.get("s3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let repo = Arc::new(InMemoryTokenRepository::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(token(&format!("s{}", i), "admin")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(repo.len(), 32);
    }
}
