pub mod auth;
pub mod json;
pub mod params;
pub mod response;

pub use auth::{authenticate_user, require_admin, AuthUser};
pub use json::JsonBody;
pub use params::{PathParam, QueryParams};
pub use response::{ApiResponse, ApiResult};
