use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Mahasiswa,
    Dosen,
}

/// Typed authentication context, resolved once per request from the identity
/// headers the frontend proxy injects. Handlers that only some roles may call
/// go through `require_dosen`; the rest treat the actor as optional context
/// (e.g. defaulting a filter to the caller's own id).
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub role: Option<Role>,
    pub dosen_id: Option<i64>,
    pub nim: Option<String>,
}

impl Actor {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let dosen_id = header_str(headers, "x-dosen-id").and_then(|v| v.parse::<i64>().ok());
        let nim = header_str(headers, "x-nim");

        let role = match header_str(headers, "x-user-role").as_deref() {
            Some(r) if r.eq_ignore_ascii_case("dosen") => Some(Role::Dosen),
            Some(r) if r.eq_ignore_ascii_case("mahasiswa") => Some(Role::Mahasiswa),
            // An instructor id without an explicit role still identifies an
            // instructor; the legacy clients send only the id header.
            _ => dosen_id.map(|_| Role::Dosen),
        };

        Self { role, dosen_id, nim }
    }

    /// Asserts the caller is an identified instructor and returns their id.
    pub fn require_dosen(&self) -> Result<i64, AppError> {
        match self.role {
            Some(Role::Dosen) => self.dosen_id.ok_or_else(|| {
                AppError::Unauthorized("x-dosen-id header required".to_string())
            }),
            Some(_) => Err(AppError::Forbidden("instructor role required".to_string())),
            None => Err(AppError::Unauthorized(
                "role not found in request headers".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor::from_headers(&parts.headers))
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
