//! Object-level ownership policy.
//!
//! Read-only requests are always allowed. Anything that writes is allowed
//! only to the author of the object. The policy runs after the object has
//! been fetched and after authentication; it never replaces either.

use axum::http::Method;

use crate::error::ApiError;
use crate::types::{Requester, UserId};

/// Message returned when the policy denies a write
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Something with an author who alone may modify it
pub trait Owned {
    fn author_id(&self) -> UserId;
}

/// GET, HEAD and OPTIONS
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Pure ownership predicate
pub fn has_object_permission<T: Owned + ?Sized>(
    method: &Method,
    requester: &Requester,
    object: &T,
) -> bool {
    is_safe_method(method) || object.author_id() == requester.id
}

/// Run the policy, turning a denial into a Forbidden error
pub fn check_object_permission<T: Owned + ?Sized>(
    method: &Method,
    requester: &Requester,
    object: &T,
) -> Result<(), ApiError> {
    if has_object_permission(method, requester, object) {
        Ok(())
    } else {
        tracing::warn!(
            "Ownership policy denied {} by user {} on object owned by {}",
            method,
            requester.id,
            object.author_id()
        );
        Err(ApiError::forbidden(PERMISSION_DENIED))
    }
}

/// Explicit author guard used by update operations, with a resource-specific message
pub fn ensure_author<T: Owned + ?Sized>(
    requester: &Requester,
    object: &T,
    message: &str,
) -> Result<(), ApiError> {
    if object.author_id() == requester.id {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}
