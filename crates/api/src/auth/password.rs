//! Password hashing and the account password policy.
//!
//! Hashes are Argon2id with a per-password random salt, stored in PHC
//! string form so the parameters travel with the hash. The policy checks
//! run before hashing in the registration flow.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use contracts_core::error::CoreError;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check a candidate password against the registration policy.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_and_rejects() {
        let hash = hash_password("договор-2026-пароль").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("договор-2026-пароль", &hash).unwrap());
        assert!(!verify_password("другой-пароль", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        // Each hash carries its own salt.
        let a = hash_password("secret-enough").unwrap();
        let b = hash_password("secret-enough").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_password_is_rejected() {
        let err = validate_password("акт1234").unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("at least 8")));
    }

    #[test]
    fn policy_counts_characters_not_bytes() {
        // Eight Cyrillic letters are sixteen bytes but still pass.
        assert!(validate_password("пароллль").is_ok());
        assert!(validate_password("long enough password").is_ok());
    }
}
