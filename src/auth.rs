//! Bearer-token authentication and route policy.
//!
//! One middleware consults a declarative `(method, path) → Access` table for
//! every route, so no handler carries its own ad hoc guard. HR-only routes
//! resolve the caller's role from the account store, not from the token.

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Tokens are short-lived: one hour.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims — subject is the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Issues and verifies HS256 tokens. Cheap to clone; lives in `AppState`.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
    expire_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, expire_secs: i64) -> Self {
        Self {
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
            validation: jsonwebtoken::Validation::default(),
            expire_secs,
        }
    }

    pub fn issue(&self, email: &str) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_string(),
            iat: now,
            exp: now + self.expire_secs,
        };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token encode: {e}")))
    }

    /// Returns the claims, or `Unauthorized` if the token is invalid,
    /// expired, or tampered with.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {e}")))
    }
}

// ── Route policy ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any account with a valid token.
    Authenticated,
    /// Valid token whose subject resolves to an HR account.
    HrOnly,
}

/// The single source of truth for per-route auth requirements. A `:segment`
/// matches any one path segment; first match wins, so literal paths must
/// precede patterns they would otherwise shadow (`/assets/request-count`
/// before `/assets/:id`).
const POLICIES: &[(&str, &str, Access)] = &[
    ("GET", "/", Access::Public),
    ("GET", "/health", Access::Public),
    ("GET", "/hr-account/:email", Access::Authenticated),
    ("POST", "/hr-account", Access::Public),
    ("GET", "/employee-account/:email", Access::Public),
    ("GET", "/employee-account", Access::Public),
    ("GET", "/employee-accounts/:email", Access::Public),
    ("POST", "/employee-account", Access::Public),
    ("PATCH", "/employee-account/:id", Access::HrOnly),
    ("GET", "/user/:email", Access::Public),
    ("GET", "/user", Access::Authenticated),
    ("POST", "/assets", Access::HrOnly),
    ("GET", "/assets", Access::Public),
    ("GET", "/assets/request-count", Access::HrOnly),
    ("GET", "/assets/:id", Access::Public),
    ("PATCH", "/assets/:id", Access::HrOnly),
    ("DELETE", "/assets/:id", Access::HrOnly),
    ("POST", "/requested-asset", Access::Authenticated),
    ("GET", "/requested-asset", Access::Authenticated),
    ("GET", "/requested-asset/pending", Access::Authenticated),
    ("GET", "/requested-asset/monthly", Access::Authenticated),
    ("PATCH", "/requested-asset/:id", Access::Authenticated),
    ("GET", "/requested-assets", Access::HrOnly),
    ("GET", "/requested-assets/pending", Access::HrOnly),
    ("POST", "/jwt", Access::Public),
];

/// Look up the access requirement for a route. Paths the table does not
/// know are public — the router 404s them before any handler runs.
pub fn route_policy(method: &Method, path: &str) -> Access {
    POLICIES
        .iter()
        .find(|(m, pattern, _)| *m == method.as_str() && pattern_matches(pattern, path))
        .map(|(_, _, access)| *access)
        .unwrap_or(Access::Public)
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern_segs: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segs: Vec<&str> = path.trim_matches('/').split('/').collect();
    pattern_segs.len() == path_segs.len()
        && pattern_segs
            .iter()
            .zip(&path_segs)
            .all(|(pat, seg)| pat.starts_with(':') || pat == seg)
}

// ── Gate middleware ──────────────────────────────────────────────────────────

/// Applied to the whole router. Public routes pass through untouched; the
/// rest require a valid bearer token, and HR-only routes additionally
/// require the claimed email to exist in `hr_accounts`. Verified claims are
/// stored in request extensions for handlers.
pub async fn gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let access = route_policy(request.method(), request.uri().path());
    if access == Access::Public {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
    let claims = state.jwt.verify(&token)?;

    if access == Access::HrOnly && !db::hr_account_exists(&state.db, &claims.sub).await? {
        return Err(AppError::Forbidden(format!(
            "{} is not an HR account",
            claims.sub
        )));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Token service ──────────────────────────────────────────────────────────

    #[test]
    fn issue_and_verify_round_trip() {
        let svc = JwtService::new("test-secret", TOKEN_TTL_SECS);
        let token = svc.issue("hr@corp.test").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "hr@corp.test");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let issuer = JwtService::new("secret-a", TOKEN_TTL_SECS);
        let verifier = JwtService::new("secret-b", TOKEN_TTL_SECS);
        let token = issuer.issue("e@corp.test").unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        // Past the default 60s validation leeway.
        let svc = JwtService::new("test-secret", -120);
        let token = svc.issue("e@corp.test").unwrap();
        assert!(matches!(svc.verify(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let svc = JwtService::new("test-secret", TOKEN_TTL_SECS);
        assert!(matches!(
            svc.verify("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
    }

    // ── Policy table ───────────────────────────────────────────────────────────

    #[test]
    fn public_routes_need_nothing() {
        assert_eq!(route_policy(&Method::GET, "/"), Access::Public);
        assert_eq!(route_policy(&Method::GET, "/assets"), Access::Public);
        assert_eq!(route_policy(&Method::POST, "/jwt"), Access::Public);
        assert_eq!(
            route_policy(&Method::GET, "/user/alice@corp.test"),
            Access::Public
        );
    }

    #[test]
    fn token_routes_require_authentication() {
        assert_eq!(route_policy(&Method::GET, "/user"), Access::Authenticated);
        assert_eq!(
            route_policy(&Method::POST, "/requested-asset"),
            Access::Authenticated
        );
        assert_eq!(
            route_policy(&Method::GET, "/hr-account/hr@corp.test"),
            Access::Authenticated
        );
    }

    #[test]
    fn mutation_routes_are_hr_only() {
        assert_eq!(route_policy(&Method::POST, "/assets"), Access::HrOnly);
        let id = "8f9e2f4a-0000-0000-0000-000000000000";
        assert_eq!(
            route_policy(&Method::PATCH, &format!("/assets/{id}")),
            Access::HrOnly
        );
        assert_eq!(
            route_policy(&Method::DELETE, &format!("/assets/{id}")),
            Access::HrOnly
        );
        assert_eq!(
            route_policy(&Method::PATCH, &format!("/employee-account/{id}")),
            Access::HrOnly
        );
        assert_eq!(
            route_policy(&Method::GET, "/requested-assets"),
            Access::HrOnly
        );
    }

    #[test]
    fn literal_segment_wins_over_pattern() {
        // /assets/request-count must not fall through to /assets/:id (Public).
        assert_eq!(
            route_policy(&Method::GET, "/assets/request-count"),
            Access::HrOnly
        );
    }

    #[test]
    fn method_disambiguates() {
        assert_eq!(route_policy(&Method::GET, "/assets"), Access::Public);
        assert_eq!(route_policy(&Method::POST, "/assets"), Access::HrOnly);
    }

    #[test]
    fn unknown_paths_fall_back_to_public() {
        assert_eq!(route_policy(&Method::GET, "/nope"), Access::Public);
    }
}
