//! Integration tests for the public health endpoint

use std::net::TcpListener;
use std::sync::Arc;

use session_auth::auth::InMemoryRefreshStore;
use session_auth::configuration::JwtSettings;
use session_auth::startup::run;
use session_auth::users::InMemoryUserRepository;

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let jwt_config = JwtSettings {
        access_secret: "health-access-secret".to_string(),
        refresh_secret: "health-refresh-secret".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 18000,
    };
    let server = run(
        listener,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryRefreshStore::new()),
        jwt_config,
    )
    .expect("Failed to create server");

    let _ = tokio::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/nowhere", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}
