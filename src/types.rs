/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Primary key of a row in the `users` table
pub type UserId = i64;

/// The authenticated identity behind a request.
///
/// Produced by the JWT middleware once the token is verified and the user
/// still exists, then handed to every resource operation as an explicit
/// argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: UserId,
    pub username: String,
}

impl Requester {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
