//! Password encoding
//!
//! Argon2id with a random 16-byte salt per hash, keyed with a server-side
//! secret so stored hashes are useless without the deployment's key.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::AuthError;

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashSettings {
    /// OWASP Password Storage: Argon2id with m=19456, t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Keyed Argon2id password encoder
#[derive(Clone)]
pub struct PasswordEncoder {
    secret: Vec<u8>,
    params: Params,
}

impl std::fmt::Debug for PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordEncoder")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PasswordEncoder {
    pub fn new(secret: &str, settings: HashSettings) -> Result<Self, AuthError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| AuthError::PasswordHash(format!("invalid argon2 parameters: {}", e)))?;

        let encoder = Self {
            secret: secret.as_bytes().to_vec(),
            params,
        };
        // Reject secrets argon2 will not accept before the first login does
        encoder.argon2()?;
        Ok(encoder)
    }

    fn argon2(&self) -> Result<Argon2<'_>, AuthError> {
        if self.secret.is_empty() {
            return Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            ));
        }
        Argon2::new_with_secret(
            &self.secret,
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| AuthError::PasswordHash(format!("invalid encoder secret: {}", e)))
    }

    /// Hash a raw password into a PHC string
    pub fn encode(&self, raw: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()?
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check a raw password against a stored hash
    ///
    /// A malformed stored hash is an error, not a mismatch.
    pub fn matches(&self, raw: &str, encoded: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(encoded)
            .map_err(|e| AuthError::PasswordHash(format!("failed to parse password hash: {}", e)))?;

        match self.argon2()?.verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHash(e.to_string())),
        }
    }
}

/// Cheap parameters for tests
#[cfg(test)]
pub(crate) fn fast_settings() -> HashSettings {
    HashSettings {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_match() {
        let encoder = PasswordEncoder::new("pepper", fast_settings()).unwrap();
        let hash = encoder.encode("123456").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(encoder.matches("123456", &hash).unwrap());
        assert!(!encoder.matches("654321", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let encoder = PasswordEncoder::new("pepper", fast_settings()).unwrap();
        let first = encoder.encode("asdfgh").unwrap();
        let second = encoder.encode("asdfgh").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_secret_is_part_of_the_hash() {
        let encoder = PasswordEncoder::new("pepper", fast_settings()).unwrap();
        let other = PasswordEncoder::new("another-pepper", fast_settings()).unwrap();
        let hash = encoder.encode("asdfgh").unwrap();

        assert!(!other.matches("asdfgh", &hash).unwrap());
    }

    #[test]
    fn test_empty_secret_is_allowed() {
        let encoder = PasswordEncoder::new("", fast_settings()).unwrap();
        let hash = encoder.encode("asdfgh").unwrap();
        assert!(encoder.matches("asdfgh", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let encoder = PasswordEncoder::new("pepper", fast_settings()).unwrap();
        assert!(matches!(
            encoder.matches("123456", "not-a-hash"),
            Err(AuthError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let settings = HashSettings {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            PasswordEncoder::new("pepper", settings),
            Err(AuthError::PasswordHash(_))
        ));
    }
}
