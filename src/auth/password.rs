/// Password hashing and verification
///
/// bcrypt with the default cost (12 rounds). The salt is random per hash,
/// so identical passwords never produce identical hashes, and `verify`
/// always runs the full key derivation so timing does not reveal where a
/// mismatch occurred. A hashing failure is an internal error, never an
/// authentication failure.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_password() {
        let hash = hash_password("hunter2hunter2").expect("Failed to hash password");

        assert_ne!(hash, "hunter2hunter2");
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("hunter2hunter2").expect("Failed to hash password");
        let second = hash_password("hunter2hunter2").expect("Failed to hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn correct_password_verifies() {
        let hash = hash_password("hunter2hunter2").expect("Failed to hash password");

        let is_valid = verify_password("hunter2hunter2", &hash).expect("Failed to verify");
        assert!(is_valid);
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("hunter2hunter2").expect("Failed to hash password");

        let is_valid = verify_password("wrong-password", &hash).expect("Failed to verify");
        assert!(!is_valid);
    }
}
