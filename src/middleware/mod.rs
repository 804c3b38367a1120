/// Middleware module
///
/// The auth gate guarding protected routes.

mod jwt_middleware;

pub use jwt_middleware::{AuthenticatedUser, JwtMiddleware};
