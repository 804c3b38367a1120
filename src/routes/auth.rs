/// Authentication Routes
///
/// Login, access token refresh and logout.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthService;
use crate::error::AppError;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh or logout request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Login response: both tokens plus the user's profile
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status_code: u16,
    pub access_token: String,
    pub refresh_token: String,
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// A missing or unreadable body counts as "no refresh token"
fn refresh_token_of(form: &Option<web::Json<RefreshRequest>>) -> Option<&str> {
    form.as_ref().and_then(|f| f.refresh_token.as_deref())
}

/// POST /login
///
/// # Errors
/// - 404: No user with this email
/// - 401: Wrong password
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let outcome = auth.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        status_code: 200,
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        id: outcome.user.id,
        first_name: outcome.user.first_name,
        last_name: outcome.user.last_name,
        email: outcome.user.email,
    }))
}

/// POST /token
///
/// Mint a new access token from a registered refresh token. The refresh
/// token is not rotated.
///
/// # Errors
/// - 401: No refresh token in the body
/// - 403: Token not issued by this process, or fails verification
pub async fn refresh(
    form: Option<web::Json<RefreshRequest>>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let access_token = auth.redeem(refresh_token_of(&form))?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse { access_token }))
}

/// POST /logout
///
/// Revoke a refresh token. Outstanding access tokens expire on their own.
///
/// # Errors
/// - 401: No refresh token in the body
/// - 403: Token not registered
pub async fn logout(
    form: Option<web::Json<RefreshRequest>>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.revoke(refresh_token_of(&form))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "statusCode": 200,
        "message": "Logged out"
    })))
}
