//! Remember-me token issuance and validation

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use super::repository::{InMemoryTokenRepository, PersistentToken, TokenRepository};
use super::RememberMeError;

/// Random bytes per series and per token value
const TOKEN_BYTES: usize = 16;

/// Token as carried in the cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberMeToken {
    pub series: String,
    pub value: String,
}

impl RememberMeToken {
    fn generate() -> Self {
        Self {
            series: random_hex(),
            value: random_hex(),
        }
    }

    /// Cookie representation, `series:value`
    pub fn cookie_value(&self) -> String {
        format!("{}:{}", self.series, self.value)
    }

    /// Parse a cookie value
    pub fn parse(cookie: &str) -> Result<Self, RememberMeError> {
        let (series, value) = cookie.split_once(':').ok_or(RememberMeError::Invalid)?;
        let well_formed = |s: &str| {
            s.len() == TOKEN_BYTES * 2 && s.chars().all(|c| c.is_ascii_hexdigit())
        };
        if !well_formed(series) || !well_formed(value) {
            return Err(RememberMeError::Invalid);
        }
        Ok(Self {
            series: series.to_string(),
            value: value.to_string(),
        })
    }
}

/// Random 128-bit value, hex encoded
pub fn random_hex() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compare two secrets without an early exit on the first differing byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Issues, validates and revokes remember-me tokens
pub struct RememberMeService<R = InMemoryTokenRepository> {
    repository: R,
    key: String,
    validity: Duration,
}

impl<R: TokenRepository> RememberMeService<R> {
    /// `key` is mixed into stored digests so tokens only validate on
    /// deployments sharing it
    pub fn new(repository: R, key: &str, validity_seconds: i64) -> Self {
        Self {
            repository,
            key: key.to_string(),
            validity: Duration::seconds(validity_seconds),
        }
    }

    pub fn validity_seconds(&self) -> i64 {
        self.validity.num_seconds()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn digest(&self, token: &RememberMeToken) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key.as_bytes());
        hasher.update(b":");
        hasher.update(token.series.as_bytes());
        hasher.update(b":");
        hasher.update(token.value.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Mint a new token for a user
    pub async fn issue(&self, username: &str) -> Result<RememberMeToken, RememberMeError> {
        let token = RememberMeToken::generate();
        self.repository
            .create(PersistentToken {
                series: token.series.clone(),
                username: username.to_string(),
                token_digest: self.digest(&token),
                last_used: Utc::now(),
            })
            .await?;

        info!("Issued remember-me token for user: {}", username);
        Ok(token)
    }

    /// Look up the stored token and check value and age
    async fn check(
        &self,
        cookie: &str,
    ) -> Result<(RememberMeToken, PersistentToken), RememberMeError> {
        let token = RememberMeToken::parse(cookie)?;
        let stored = self
            .repository
            .get(&token.series)
            .await?
            .ok_or(RememberMeError::Invalid)?;

        if !constant_time_eq(&stored.token_digest, &self.digest(&token)) {
            warn!(
                "Remember-me value mismatch for user {}, revoking all tokens",
                stored.username
            );
            self.repository.remove_user_tokens(&stored.username).await?;
            return Err(RememberMeError::CookieTheft(stored.username));
        }

        if stored.last_used + self.validity < Utc::now() {
            debug!("Remember-me token expired for user: {}", stored.username);
            self.repository.remove(&stored.series).await?;
            return Err(RememberMeError::Expired);
        }

        Ok((token, stored))
    }

    /// Validate a cookie value and return the username it belongs to
    pub async fn validate(&self, cookie: &str) -> Result<String, RememberMeError> {
        let (_, stored) = self.check(cookie).await?;
        Ok(stored.username)
    }

    /// Validate and replace the token value, keeping the series
    ///
    /// Used on automatic login so a captured cookie is only good until the
    /// next legitimate use.
    pub async fn rotate(&self, cookie: &str) -> Result<(String, RememberMeToken), RememberMeError> {
        let (token, stored) = self.check(cookie).await?;

        let rotated = RememberMeToken {
            series: token.series,
            value: random_hex(),
        };
        let updated = self
            .repository
            .update(&rotated.series, &self.digest(&rotated), Utc::now())
            .await?;
        if !updated {
            return Err(RememberMeError::Invalid);
        }

        debug!("Rotated remember-me token for user: {}", stored.username);
        Ok((stored.username, rotated))
    }

    /// Revoke the series named by a cookie value
    pub async fn invalidate(&self, cookie: &str) -> Result<(), RememberMeError> {
        let token = RememberMeToken::parse(cookie)?;
        self.repository.remove(&token.series).await?;
        Ok(())
    }

    /// Revoke every token of a user
    pub async fn invalidate_user(&self, username: &str) -> Result<usize, RememberMeError> {
        let removed = self.repository.remove_user_tokens(username).await?;
        debug!("Removed {} remember-me tokens for user: {}", removed, username);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("a1b2", "a1b2"));
        assert!(!constant_time_eq("a1b2", "a1b3"));
        assert!(!constant_time_eq("a1b2", "a1b2c3"));
        assert!(!constant_time_eq("", "a"));
        assert!(constant_time_eq("", ""));
    }

    fn service() -> RememberMeService {
        RememberMeService::new(InMemoryTokenRepository::new(), "test-key", 86400)
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let service = service();
        let token = service.issue("admin").await.unwrap();
        let username = service.validate(&token.cookie_value()).await.unwrap();
        assert_eq!(username, "admin");
    }

    #[tokio::test]
    async fn test_invalidated_token_is_rejected() {
        let service = service();
        let cookie = service.issue("admin").await.unwrap().cookie_value();
        service.invalidate(&cookie).await.unwrap();
        assert_eq!(service.validate(&cookie).await, Err(RememberMeError::Invalid));
    }

    #[tokio::test]
    async fn test_malformed_cookie() {
        let service = service();
        for cookie in ["", "nocolon", "abc:def", "zz:zz"] {
            assert_eq!(service.validate(cookie).await, Err(RememberMeError::Invalid));
        }
    }

    #[tokio::test]
    async fn test_rotation_keeps_series_and_retires_old_value() {
        let service = service();
        let original = service.issue("test1").await.unwrap();

        let (username, rotated) = service.rotate(&original.cookie_value()).await.unwrap();
        assert_eq!(username, "test1");
        assert_eq!(rotated.series, original.series);
        assert_ne!(rotated.value, original.value);

        assert_eq!(
            service.validate(&rotated.cookie_value()).await.unwrap(),
            "test1"
        );
    }

    #[tokio::test]
    async fn test_stale_value_revokes_all_user_tokens() {
        let service = service();
        let original = service.issue("test1").await.unwrap();
        let other = service.issue("test1").await.unwrap();
        let unrelated = service.issue("admin").await.unwrap();
        service.rotate(&original.cookie_value()).await.unwrap();

        assert_eq!(
            service.validate(&original.cookie_value()).await,
            Err(RememberMeError::CookieTheft("test1".to_string()))
        );
        assert_eq!(
            service.validate(&other.cookie_value()).await,
            Err(RememberMeError::Invalid)
        );
        assert!(service.validate(&unrelated.cookie_value()).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token() {
        let service = RememberMeService::new(InMemoryTokenRepository::new(), "test-key", 60);
        let token = service.issue("admin").await.unwrap();

        let long_ago = Utc::now() - Duration::seconds(120);
        let digest = service.digest(&token);
        service
            .repository()
            .update(&token.series, &digest, long_ago)
            .await
            .unwrap();

        assert_eq!(
            service.validate(&token.cookie_value()).await,
            Err(RememberMeError::Expired)
        );
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn test_key_is_part_of_the_digest() {
        let repo_service = service();
        let token = repo_service.issue("admin").await.unwrap();
        let other_key = RememberMeService::new(InMemoryTokenRepository::new(), "other-key", 86400);
        assert_ne!(repo_service.digest(&token), other_key.digest(&token));
    }

    #[tokio::test]
    async fn test_invalidate_user() {
        let service = service();
        let first = service.issue("admin").await.unwrap();
        service.issue("admin").await.unwrap();
        service.issue("test1").await.unwrap();

        assert_eq!(service.invalidate_user("admin").await.unwrap(), 2);
        assert_eq!(
            service.validate(&first.cookie_value()).await,
            Err(RememberMeError::Invalid)
        );
        assert_eq!(service.repository().len(), 1);
    }
}
