/// Password Hashing and Verification
///
/// bcrypt is CPU bound, so both operations run on the blocking thread pool
/// instead of stalling the async workers serving other requests.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

const HASH_COST: u32 = 10;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt ignores bytes past 72

/// Hash a password for storage
///
/// # Errors
/// Returns error if the password fails strength rules or bcrypt fails
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, HASH_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash
///
/// `Ok(false)` means the password is wrong; an `Err` means the stored hash
/// itself is unusable.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Validate password strength requirements
///
/// Requirements:
/// - 8 to 72 bytes
/// - At least one digit, one lowercase and one uppercase letter
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("ValidPassword123").await.expect("Failed to hash password");

        assert!(hash.starts_with("$2"));
        assert!(verify_password("ValidPassword123", &hash).await.unwrap());
        assert!(!verify_password("WrongPassword123", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_internal_error() {
        let result = verify_password("anything", "not-a-bcrypt-hash").await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_strength_rules() {
        assert!(validate_password_strength("Short1").is_err());
        assert!(validate_password_strength("NoDigitsPassword").is_err());
        assert!(validate_password_strength("NOLOWERCASE1").is_err());
        assert!(validate_password_strength("nouppercase1").is_err());
        assert!(validate_password_strength(&("Aa1".to_string() + &"a".repeat(70))).is_err());
        assert!(validate_password_strength("ValidPassword123").is_ok());
    }
}
