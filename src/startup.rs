use actix_web::dev::Server;
use actix_web::{error::JsonPayloadError, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, RefreshStore};
use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_user, delete_user, health_check, list_users, login, logout, refresh, update_user,
};
use crate::users::UserRepository;

/// Build the HTTP server
///
/// `refresh_store` is created once by the caller and shared by every worker;
/// handing in a fresh store is equivalent to a process restart.
pub fn run(
    listener: TcpListener,
    users: Arc<dyn UserRepository>,
    refresh_store: Arc<dyn RefreshStore>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let auth = web::Data::new(AuthService::new(users.clone(), refresh_store, &jwt_config));
    let users = web::Data::from(users);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            // Shared state
            .app_data(auth.clone())
            .app_data(users.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/login", web::post().to(login))
            .route("/token", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            // Protected routes
            .service(
                web::scope("/user")
                    .wrap(JwtMiddleware)
                    .route("", web::get().to(list_users))
                    .route("/create", web::post().to(create_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::delete().to(delete_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
}
