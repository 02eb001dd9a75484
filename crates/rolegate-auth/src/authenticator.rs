//! Credential verification

use rolegate_core::{AuthMethod, Principal};
use rolegate_directory::CredentialDirectory;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::password::PasswordEncoder;

/// Turns presented credentials into a session principal
#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<dyn CredentialDirectory>,
    encoder: PasswordEncoder,
    /// Verified in place of a real hash for unknown users
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        directory: Arc<dyn CredentialDirectory>,
        encoder: PasswordEncoder,
    ) -> Result<Self, AuthError> {
        let dummy_hash = encoder.encode("timing-guard-never-matches")?;
        Ok(Self {
            directory,
            encoder,
            dummy_hash,
        })
    }

    /// Verify a username and password
    ///
    /// Unknown users still pay for a hash verification so response timing
    /// does not reveal which usernames exist.
    pub fn authenticate(&self, username: &str, presented: &str) -> Result<Principal, AuthError> {
        debug!("Authentication attempt for user: {}", username);

        let user = self.directory.lookup(username);
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(self.dummy_hash.as_str());

        let secret_ok = self.encoder.matches(presented, hash)?;

        let user = match (user, secret_ok) {
            (Some(u), true) => u,
            (Some(_), false) => {
                warn!("Bad credentials for user: {}", username);
                return Err(AuthError::BadSecret);
            }
            (None, _) => {
                warn!("Authentication attempt for unknown user: {}", username);
                return Err(AuthError::UnknownUser);
            }
        };

        if !user.enabled {
            warn!("Authentication attempt for disabled user: {}", username);
            return Err(AuthError::Disabled);
        }

        Ok(Principal::from_user(&user, AuthMethod::Form))
    }

    /// Rebuild a principal without a password, e.g. from a remember-me token
    pub fn load_principal(&self, username: &str, method: AuthMethod) -> Result<Principal, AuthError> {
        let user = self
            .directory
            .lookup(username)
            .ok_or(AuthError::UnknownUser)?;
        if !user.enabled {
            return Err(AuthError::Disabled);
        }
        Ok(Principal::from_user(&user, method))
    }

    pub fn encoder(&self) -> &PasswordEncoder {
        &self.encoder
    }
}
