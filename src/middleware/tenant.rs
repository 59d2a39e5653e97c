use axum::http::HeaderMap;
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;

/// Header consulted when the route carries no tenant segment
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolves and authorizes the tenant a request acts on.
///
/// Handlers call this before touching any store so that authorization
/// failures short-circuit all work.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap, path_hint: Option<&str>) -> Result<Uuid, ApiError>;
}

/// Bearer-token resolver.
///
/// Tenant hint fallback order: path segment, then `X-Tenant-Id` header.
/// Superadmins act on the hinted tenant (or their own, if they have one).
/// Everyone else acts on their claim tenant and is refused if the hint
/// names another one.
pub struct JwtTenantResolver {
    secret: String,
}

impl JwtTenantResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    fn claims(&self, headers: &HeaderMap) -> Result<Claims, ApiError> {
        let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;
        validate_jwt(&token, &self.secret).map_err(|e| ApiError::unauthorized(e.to_string()))
    }
}

impl TenantResolver for JwtTenantResolver {
    fn resolve(&self, headers: &HeaderMap, path_hint: Option<&str>) -> Result<Uuid, ApiError> {
        let claims = self.claims(headers)?;
        let hint = tenant_hint(headers, path_hint)?;

        if claims.is_superadmin() {
            return hint
                .or(claims.tenant_id)
                .ok_or_else(|| ApiError::bad_request("Tenant must be specified in the path or X-Tenant-Id header"));
        }

        let own = claims.tenant_id.ok_or_else(|| {
            tracing::warn!("Token for '{}' carries no tenant", claims.sub);
            ApiError::forbidden("Token is not bound to a tenant")
        })?;

        match hint {
            Some(requested) if requested != own => {
                tracing::warn!("'{}' of tenant {} attempted to act on tenant {}", claims.sub, own, requested);
                Err(ApiError::forbidden(format!("Not authorized for tenant {}", requested)))
            }
            _ => Ok(own),
        }
    }
}

fn tenant_hint(headers: &HeaderMap, path_hint: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    let raw = match path_hint {
        Some(segment) => Some(segment.to_string()),
        None => headers
            .get(TENANT_HEADER)
            .map(|v| v.to_str().map(str::to_string))
            .transpose()
            .map_err(|_| ApiError::bad_request("Invalid X-Tenant-Id header"))?,
    };

    raw.map(|value| {
        Uuid::parse_str(value.trim()).map_err(|_| ApiError::bad_request(format!("Invalid tenant id: {}", value)))
    })
    .transpose()
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, ROLE_SUPERADMIN};
    use axum::http::{header, HeaderValue, StatusCode};

    const SECRET: &str = "test-secret";

    fn headers_for(claims: &Claims) -> HeaderMap {
        let token = generate_jwt(claims, SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        headers
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let resolver = JwtTenantResolver::new(SECRET);
        let err = resolver.resolve(&HeaderMap::new(), None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn tenant_user_resolves_own_tenant() {
        let tenant = Uuid::new_v4();
        let resolver = JwtTenantResolver::new(SECRET);
        let headers = headers_for(&Claims::new("admin", Some(tenant), "admin", 1));

        assert_eq!(resolver.resolve(&headers, None).unwrap(), tenant);
        assert_eq!(resolver.resolve(&headers, Some(&tenant.to_string())).unwrap(), tenant);
    }

    #[test]
    fn tenant_user_cannot_cross_tenants() {
        let resolver = JwtTenantResolver::new(SECRET);
        let mut headers = headers_for(&Claims::new("admin", Some(Uuid::new_v4()), "admin", 1));
        let other = Uuid::new_v4();

        let err = resolver.resolve(&headers, Some(&other.to_string())).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        headers.insert(TENANT_HEADER, HeaderValue::from_str(&other.to_string()).unwrap());
        let err = resolver.resolve(&headers, None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn superadmin_uses_hint_and_needs_one() {
        let resolver = JwtTenantResolver::new(SECRET);
        let mut headers = headers_for(&Claims::new("root", None, ROLE_SUPERADMIN, 1));

        let err = resolver.resolve(&headers, None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let target = Uuid::new_v4();
        assert_eq!(resolver.resolve(&headers, Some(&target.to_string())).unwrap(), target);

        headers.insert(TENANT_HEADER, HeaderValue::from_str(&target.to_string()).unwrap());
        assert_eq!(resolver.resolve(&headers, None).unwrap(), target);
    }

    #[test]
    fn malformed_hint_is_bad_request() {
        let resolver = JwtTenantResolver::new(SECRET);
        let headers = headers_for(&Claims::new("root", None, ROLE_SUPERADMIN, 1));
        let err = resolver.resolve(&headers, Some("not-a-uuid")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
