/// JWT Token Issuing and Verification
///
/// Mints and verifies the two token kinds. Each kind has its own HS256 key and
/// lifetime; a token signed with one key never verifies under the other.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: i64,
}

impl SigningKey {
    fn from_secret(secret: &str, expiry_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Returns the token together with its `exp`
    fn sign(&self, user_id: i32, now: i64) -> Result<(String, i64), AppError> {
        let claims = Claims::issued_at(user_id, now, self.expiry_seconds);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(|token| (token, claims.exp))
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Check the signature, then compare `exp` against `now`.
    ///
    /// Expiry is checked here rather than by `jsonwebtoken` so that the
    /// boundary is exact (no leeway) and the clock can be supplied.
    fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenFailure> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT decode error: {}", e);
                TokenFailure::Invalid
            })?;

        if claims.is_expired_at(now) {
            return Err(TokenFailure::Expired);
        }
        Ok(claims)
    }
}

enum TokenFailure {
    Invalid,
    Expired,
}

/// Issues and verifies access and refresh tokens
pub struct TokenIssuer {
    access: SigningKey,
    refresh: SigningKey,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            access: SigningKey::from_secret(&config.access_secret, config.access_token_expiry),
            refresh: SigningKey::from_secret(&config.refresh_secret, config.refresh_token_expiry),
        }
    }

    pub fn issue_access_token(&self, user_id: i32) -> Result<String, AppError> {
        self.issue_access_token_at(user_id, now())
    }

    pub fn issue_access_token_at(&self, user_id: i32, now: i64) -> Result<String, AppError> {
        self.access.sign(user_id, now).map(|(token, _)| token)
    }

    pub fn issue_refresh_token(&self, user_id: i32) -> Result<String, AppError> {
        self.issue_refresh_token_at(user_id, now())
    }

    pub fn issue_refresh_token_at(&self, user_id: i32, now: i64) -> Result<String, AppError> {
        self.refresh.sign(user_id, now).map(|(token, _)| token)
    }

    /// Mint a refresh token and return it with its `exp`, for registration
    pub fn issue_refresh_token_with_expiry(&self, user_id: i32) -> Result<(String, i64), AppError> {
        self.refresh.sign(user_id, now())
    }

    /// Verify an access token presented to a protected route
    ///
    /// # Errors
    /// - `InvalidToken` if malformed or the signature does not verify
    /// - `TokenExpired` if the token is past its expiry
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_access_token_at(token, now())
    }

    pub fn verify_access_token_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.access.verify(token, now).map_err(|failure| match failure {
            TokenFailure::Invalid => AuthError::InvalidToken,
            TokenFailure::Expired => AuthError::TokenExpired,
        })
    }

    /// Verify a refresh token; any failure, expiry included, is `InvalidRefreshToken`
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_refresh_token_at(token, now())
    }

    pub fn verify_refresh_token_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.refresh
            .verify(token, now)
            .map_err(|_| AuthError::InvalidRefreshToken)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 18000,
        }
    }

    const T0: i64 = 1_700_000_000;

    #[test]
    fn test_issue_and_verify_access_token() {
        let issuer = TokenIssuer::new(&get_test_config());

        let token = issuer.issue_access_token(7).expect("Failed to issue token");
        let claims = issuer.verify_access_token(&token).expect("Failed to verify token");

        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let issuer = TokenIssuer::new(&get_test_config());

        let token = issuer.issue_refresh_token_at(7, T0).unwrap();
        let claims = issuer.verify_refresh_token_at(&token, T0).unwrap();

        assert_eq!(claims.exp, T0 + 18000);
    }

    #[test]
    fn test_refresh_token_expiry_matches_claims() {
        let issuer = TokenIssuer::new(&get_test_config());

        let (token, expires_at) = issuer.issue_refresh_token_with_expiry(7).unwrap();
        let claims = issuer.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.exp, expires_at);
    }

    #[test]
    fn test_access_token_accepted_until_exact_expiry() {
        let issuer = TokenIssuer::new(&get_test_config());
        let token = issuer.issue_access_token_at(1, T0).unwrap();

        assert!(issuer.verify_access_token_at(&token, T0 + 3599).is_ok());
        assert!(issuer.verify_access_token_at(&token, T0 + 3600).is_ok());
        assert_eq!(
            issuer.verify_access_token_at(&token, T0 + 3601),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_genuinely_expired_token_reports_expired() {
        let issuer = TokenIssuer::new(&get_test_config());
        let token = issuer.issue_access_token_at(1, T0).unwrap();

        assert_eq!(issuer.verify_access_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_invalid_token() {
        let issuer = TokenIssuer::new(&get_test_config());

        assert_eq!(
            issuer.verify_access_token("invalid.token.here"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_tampered_token() {
        let issuer = TokenIssuer::new(&get_test_config());
        let token = issuer.issue_access_token(1).unwrap();

        let tampered = format!("{}X", token);

        assert_eq!(issuer.verify_access_token(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_forgery_reports_invalid() {
        let issuer = TokenIssuer::new(&get_test_config());
        let mut other = get_test_config();
        other.access_secret = "someone-elses-secret-entirely".to_string();
        let forger = TokenIssuer::new(&other);

        let token = forger.issue_access_token_at(1, T0).unwrap();

        assert_eq!(issuer.verify_access_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_token_kinds_do_not_cross_verify() {
        let issuer = TokenIssuer::new(&get_test_config());

        let access = issuer.issue_access_token(1).unwrap();
        let refresh = issuer.issue_refresh_token(1).unwrap();

        assert_eq!(issuer.verify_access_token(&refresh), Err(AuthError::InvalidToken));
        assert_eq!(
            issuer.verify_refresh_token(&access),
            Err(AuthError::InvalidRefreshToken)
        );
    }

    #[test]
    fn test_expired_refresh_token_is_invalid() {
        let issuer = TokenIssuer::new(&get_test_config());
        let token = issuer.issue_refresh_token_at(1, T0).unwrap();

        assert_eq!(
            issuer.verify_refresh_token_at(&token, T0 + 18001),
            Err(AuthError::InvalidRefreshToken)
        );
    }
}
