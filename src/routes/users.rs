/// User administration routes
///
/// All of these sit behind the auth gate.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::hash_password;
use crate::error::{AppError, DatabaseError};
use crate::middleware::AuthenticatedUser;
use crate::users::{NewUser, UserChanges, UserProfile, UserRepository};
use crate::validators::{is_valid_email, is_valid_name};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub skip: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    status_code: u16,
    data: Vec<UserProfile>,
    meta: PaginationMeta,
}

fn message(text: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "statusCode": 200,
        "message": text
    }))
}

fn user_not_found() -> AppError {
    AppError::Database(DatabaseError::NotFound("User not found".to_string()))
}

/// Clamp the requested page and size, then derive the offset
fn page_window(query: &PageQuery) -> (i64, i64, i64) {
    let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
    let limit = query
        .limit
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let skip = page.saturating_sub(1).saturating_mul(limit);
    (page, limit, skip)
}

fn pagination_meta(page: i64, limit: i64, skip: i64, total_count: i64) -> PaginationMeta {
    PaginationMeta {
        page,
        limit,
        total_count,
        total_pages: (total_count + limit - 1) / limit,
        skip,
    }
}

/// POST /user/create
///
/// # Errors
/// - 400: Invalid email, name or weak password
/// - 409: Email already registered
pub async fn create_user(
    caller: AuthenticatedUser,
    form: web::Json<CreateUserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let new_user = NewUser {
        first_name: is_valid_name("firstName", &form.first_name)?,
        last_name: is_valid_name("lastName", &form.last_name)?,
        email: is_valid_email(&form.email)?,
        password_hash: hash_password(&form.password).await?,
    };

    let id = users.create(new_user).await?;

    tracing::info!(caller_id = caller.id, user_id = id, "User created");
    Ok(message("User successfully created"))
}

/// GET /user?page=&limit=
pub async fn list_users(
    query: web::Query<PageQuery>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let (page, limit, skip) = page_window(&query);
    let result = users.list(skip, limit).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        status_code: 200,
        data: result.users,
        meta: pagination_meta(page, limit, skip, result.total_count),
    }))
}

/// PUT /user/{id}
///
/// Only the fields present in the body change; a new password is rehashed.
///
/// # Errors
/// - 400: Invalid field values
/// - 404: No user with this ID
/// - 409: Email already registered to another user
pub async fn update_user(
    caller: AuthenticatedUser,
    path: web::Path<i32>,
    form: web::Json<UpdateUserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let form = form.into_inner();

    if users.find_by_id(id).await?.is_none() {
        return Err(user_not_found());
    }

    let mut changes = UserChanges {
        first_name: form
            .first_name
            .map(|n| is_valid_name("firstName", &n))
            .transpose()?,
        last_name: form
            .last_name
            .map(|n| is_valid_name("lastName", &n))
            .transpose()?,
        email: form.email.map(|e| is_valid_email(&e)).transpose()?,
        password_hash: None,
    };
    if let Some(password) = form.password {
        changes.password_hash = Some(hash_password(&password).await?);
    }

    if !users.update(id, changes).await? {
        return Err(user_not_found());
    }

    tracing::info!(caller_id = caller.id, user_id = id, "User updated");
    Ok(message("User updated successfully"))
}

/// DELETE /user/{id}
///
/// # Errors
/// - 404: No user with this ID
pub async fn delete_user(
    caller: AuthenticatedUser,
    path: web::Path<i32>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    if !users.delete(id).await? {
        return Err(user_not_found());
    }

    tracing::info!(caller_id = caller.id, user_id = id, "User deleted");
    Ok(message("User deleted successfully"))
}
