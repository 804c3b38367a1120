/// Login, refresh and logout flows
///
/// Composes the credential verifier, token issuer and refresh store. One
/// instance is built at startup and shared by every worker.

use std::sync::Arc;

use crate::auth::credentials::CredentialVerifier;
use crate::auth::jwt::TokenIssuer;
use crate::auth::refresh_token::RefreshStore;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::users::{UserProfile, UserRepository};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

pub struct AuthService {
    credentials: CredentialVerifier,
    issuer: TokenIssuer,
    refresh_store: Arc<dyn RefreshStore>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_store: Arc<dyn RefreshStore>,
        jwt_config: &JwtSettings,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(users),
            issuer: TokenIssuer::new(jwt_config),
            refresh_store,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Verify credentials, mint both tokens and register the refresh token
    ///
    /// Credential failures come back unchanged (`UserNotFound`,
    /// `InvalidCredential`). The email is trimmed, as it is when users are
    /// created.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = self.credentials.verify(email.trim(), password).await?;

        let access_token = self.issuer.issue_access_token(user.id)?;
        let (refresh_token, expires_at) = self.issuer.issue_refresh_token_with_expiry(user.id)?;
        self.refresh_store.register(&refresh_token, expires_at);

        tracing::info!(user_id = user.id, "User logged in successfully");

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Checks run in a fixed order: presence, store membership, then
    /// signature and expiry under the refresh key. The refresh token stays
    /// registered and can be redeemed again until it expires.
    pub fn redeem(&self, refresh_token: Option<&str>) -> Result<String, AppError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        if !self.refresh_store.is_member(token) {
            return Err(AuthError::TokenNotRecognized.into());
        }

        let claims = self.issuer.verify_refresh_token(token)?;
        let access_token = self.issuer.issue_access_token(claims.id)?;

        tracing::info!(user_id = claims.id, "Access token refreshed");
        Ok(access_token)
    }

    /// Remove a refresh token from the store
    ///
    /// Access tokens minted from it stay valid until their own expiry.
    pub fn revoke(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        if !self.refresh_store.revoke(token) {
            return Err(AuthError::TokenNotRecognized.into());
        }

        tracing::info!("Refresh token revoked");
        Ok(())
    }
}
