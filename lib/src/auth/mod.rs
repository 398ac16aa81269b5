use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::api::AuthDuration;
use crate::db::{Collectable, Identifiable};
use crate::error::{ErrorKind, Result};

pub mod login;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

pub fn validate_password(password: &[u8], expected_password_hash: &str) -> Result<()> {
    let expected_password_hash = PasswordHash::new(expected_password_hash)
        .map_err(|_| ErrorKind::Other("Failed to parse hash in PHC string format.".to_string()))?;
    Argon2::default().verify_password(password, &expected_password_hash)?;

    Ok(())
}

pub type TokenId = Uuid;

/// Access token persisted in the db. The token id itself is the opaque
/// value handed out to clients, either as a bearer token or inside a
/// private cookie.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenMeta {
    pub id: TokenId,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub duration: AuthDuration,

    pub context: String,
}

impl Collectable for TokenMeta {
    fn get_collection_name() -> &'static str {
        "access_token"
    }
}

impl Identifiable for TokenMeta {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl TokenMeta {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: TokenId::new_v4(),
            user_id,
            issued_at: Utc::now(),
            duration: AuthDuration::Medium,
            context: "".to_string(),
        }
    }

    /// Returns true if the token is expired.
    pub fn is_expired(&self) -> bool {
        let delta_time = Utc::now() - self.issued_at;
        let duration: Duration = self.duration.into();
        delta_time.num_seconds() as u64 > duration.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(validate_password(b"hunter22", &hash).is_ok());
        assert!(validate_password(b"hunter23", &hash).is_err());
    }
}
