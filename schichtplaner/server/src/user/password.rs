use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

/// Error raised when a password cannot be hashed or a stored hash cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(pub(crate) String);

/// Turns plaintext passwords into storable hashes.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hashes `password` into a self-describing string suitable for storage.
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Checks `password` against a hash produced by [`CredentialHasher::hash_password`].
    ///
    /// The HTTP surface has no login yet; this is the entry point a login flow would use.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

/// Argon2id with the crate's default parameters and a random salt per password.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordHashError(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| PasswordHashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_hash_and_verify_password() {
        let hasher = Argon2Hasher::new();

        let hash = hasher.hash_password("hunter2").unwrap();

        assert_ne!(hash, "hunter2");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("hunter2", &hash).unwrap());
        assert!(!hasher.verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn can_salt_each_hash() {
        let hasher = Argon2Hasher::new();

        let first = hasher.hash_password("same").unwrap();
        let second = hasher.hash_password("same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn can_reject_malformed_hash() {
        let result = Argon2Hasher::new().verify_password("anything", "not-a-phc-string");

        assert!(result.is_err());
    }
}
