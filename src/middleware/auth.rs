use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{verify_token, Claims};
use crate::config;
use crate::error::ApiError;
use crate::types::Role;

/// Name of the httpOnly session cookie set at login
pub const SESSION_COOKIE: &str = "token";

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = claims
            .role
            .parse()
            .map_err(|_| ApiError::unauthorized("Token carries an unknown role"))?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

impl AuthUser {
    /// Fails with 403 unless the user's role is one of `roles`
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!("User {} with role '{}' denied; requires {:?}", self.email, self.role, roles);
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and managers see and manage everything
    pub fn is_staff(&self) -> bool {
        self.role.at_least(Role::Manager)
    }
}

/// JWT authentication middleware. Accepts a bearer token or the session cookie.
pub async fn authenticate_user(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = verify_token(&token).map_err(|e| {
        tracing::warn!("Rejected token: {}", e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Restricts a route group to admins. Must run after `authenticate_user`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    auth_user.require_role(&[Role::Admin])?;

    Ok(next.run(request).await)
}

/// Extract JWT from the Authorization header, falling back to the session cookie
pub fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    cookie_value(headers, SESSION_COOKIE).ok_or_else(|| "Missing Authorization header or session cookie".to_string())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying the session token
pub fn session_cookie(token: &str, max_age_secs: i64) -> HeaderValue {
    let secure = if config::config().security.require_https { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE, token, max_age_secs, secure
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("token=; Path=/; Max-Age=0"))
}

/// `Set-Cookie` value that clears the session cookie
pub fn cleared_session_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_token_is_extracted() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let map = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert!(extract_token(&map).is_err());
    }

    #[test]
    fn empty_bearer_is_rejected() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer   ")]);
        assert_eq!(extract_token(&map).unwrap_err(), "Empty JWT token");
    }

    #[test]
    fn cookie_is_used_without_authorization_header() {
        let map = headers(&[(header::COOKIE, "theme=dark; token=abc.def.ghi; lang=en")]);
        assert_eq!(extract_token(&map).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let map = headers(&[(header::COOKIE, "theme=dark")]);
        assert!(extract_token(&map).is_err());
    }

    #[test]
    fn require_role_checks_membership() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "m@example.com".to_string(),
            role: Role::Member,
        };
        assert!(user.require_role(&[Role::Admin]).is_err());
        assert!(user.require_role(&[Role::Admin, Role::Member]).is_ok());
        assert!(!user.is_staff());
    }

    #[test]
    fn unknown_role_claim_is_unauthorized() {
        let claims = Claims::with_expiry(
            Uuid::new_v4(),
            "x@example.com".to_string(),
            "superuser".to_string(),
            chrono::Duration::hours(1),
        );
        let err = AuthUser::try_from(claims).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn session_cookie_is_http_only() {
        let value = session_cookie("abc", 3600);
        let s = value.to_str().unwrap();
        assert!(s.starts_with("token=abc;"));
        assert!(s.contains("HttpOnly"));
        assert!(s.contains("Max-Age=3600"));
    }
}
