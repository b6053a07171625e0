//! Salted password hashing and verification.
//!
//! bcrypt embeds a fresh random salt in every hash; the cost factor is fixed
//! so hashing stays deliberately expensive.

use bcrypt::DEFAULT_COST;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("the password is too short")]
    WeakInput,
    #[error("failed to hash password")]
    Hash,
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Fails with [`PasswordError::WeakInput`] for passwords shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::WeakInput);
    }
    bcrypt::hash(password, DEFAULT_COST).map_err(|_| PasswordError::Hash)
}

/// Check a candidate password against a stored hash.
///
/// Never errors on mismatch; an unparseable stored hash also verifies false.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() -> Result<(), PasswordError> {
        let hash = hash_password("longpass1")?;
        assert!(verify_password("longpass1", &hash));
        assert!(!verify_password("longpass2", &hash));
        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> Result<(), PasswordError> {
        let first = hash_password("longpass1")?;
        let second = hash_password("longpass1")?;
        assert_ne!(first, second);
        Ok(())
    }

    #[test]
    fn short_password_is_weak_input() {
        assert_eq!(hash_password("short"), Err(PasswordError::WeakInput));
        assert_eq!(hash_password(""), Err(PasswordError::WeakInput));
        assert_eq!(hash_password("1234567"), Err(PasswordError::WeakInput));
    }

    #[test]
    fn eight_characters_is_enough() {
        assert!(hash_password("12345678").is_ok());
    }

    #[test]
    fn garbage_hash_verifies_false() {
        assert!(!verify_password("longpass1", "not-a-bcrypt-hash"));
    }
}
