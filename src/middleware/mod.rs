pub mod auth;
pub mod response;

pub use auth::{require_login, resolve_identity, CurrentUser};
pub use response::ApiResponse;
