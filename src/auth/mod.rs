/// Authentication module
///
/// Credential verification, JWT issuing/verification, password hashing and
/// refresh token tracking, composed into the login/refresh/logout flows.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::Claims;
pub use credentials::CredentialVerifier;
pub use jwt::TokenIssuer;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::{InMemoryRefreshStore, RefreshStore};
pub use service::{AuthService, LoginOutcome};
