pub mod auth;
pub mod extract;
pub mod response;

pub use auth::jwt_auth_middleware;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult};
