/// JWT Claims structure
///
/// Payload shared by access and refresh tokens. The subject is carried as
/// `id`, the numeric user ID; `jti` keeps two tokens minted in the same second
/// for the same user distinct.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims for access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub id: i32,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID
    pub jti: String,
}

impl Claims {
    /// Claims issued at `iat`, expiring `expiry_seconds` later
    pub fn issued_at(user_id: i32, iat: i64, expiry_seconds: i64) -> Self {
        Self {
            id: user_id,
            iat,
            exp: iat + expiry_seconds,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// A token is live up to and including its `exp` second.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}
