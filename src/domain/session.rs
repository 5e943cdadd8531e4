use serde::{Deserialize, Serialize};

use super::ids::UserId;

pub const USERS_COLLECTION: &str = "users";

/// An authenticated user as the core consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
}

/// Stored account record under `users/{uid}`. The `uid` is repeated in the
/// payload so user documents are visible to user-scoped queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    /// Base64-encoded random salt.
    pub password_salt: String,
    /// Base64-encoded SHA-256 of salt followed by the password bytes.
    pub password_digest: String,
}
