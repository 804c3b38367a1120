/// Credential verification: email lookup plus bcrypt comparison.

use std::sync::Arc;

use crate::auth::password::verify_password;
use crate::error::{AppError, AuthError};
use crate::users::{UserProfile, UserRepository};

pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Check `password` against the stored hash for `email`
    ///
    /// # Errors
    /// - `UserNotFound` if no user has this email
    /// - `InvalidCredential` if the password does not match
    /// - `Internal`/`Database` if the lookup or the stored hash is broken
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserProfile, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredential.into());
        }

        Ok(UserProfile::from(user))
    }
}
