use serde_json::{json, Value};

use crate::middleware::auth::cleared_session_cookie;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/auth/logout - clear the session cookie
///
/// Tokens are stateless, so a bearer token stays valid until it expires.
pub async fn logout_post() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "logged_out": true })).with_cookie(cleared_session_cookie()))
}
