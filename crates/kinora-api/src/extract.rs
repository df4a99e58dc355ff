//! Request extractors for caller identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kinora_core::validation::validate_owner_id;
use kinora_core::AppError;

use crate::error::HttpAppError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// Caller identity from the `X-Owner-Id` header, if sent.
#[derive(Debug, Clone)]
pub struct OwnerHeader(pub Option<String>);

impl<S> FromRequestParts<S> for OwnerHeader
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(OWNER_HEADER) else {
            return Ok(OwnerHeader(None));
        };

        let owner = value
            .to_str()
            .map_err(|_| AppError::InvalidInput("X-Owner-Id must be visible ASCII".to_string()))?
            .trim()
            .to_string();
        validate_owner_id(&owner)?;

        Ok(OwnerHeader(Some(owner)))
    }
}

/// Pick the explicitly supplied owner, else the header one.
pub fn resolve_owner(explicit: Option<String>, header: OwnerHeader) -> Result<String, AppError> {
    let owner = explicit
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .or(header.0)
        .ok_or_else(|| AppError::InvalidInput("owner_id is required".to_string()))?;
    validate_owner_id(&owner)?;
    Ok(owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_owner_wins_over_header() {
        let owner = resolve_owner(Some("body".into()), OwnerHeader(Some("header".into()))).unwrap();
        assert_eq!(owner, "body");
    }

    #[test]
    fn test_header_owner_used_when_body_omits_it() {
        let owner = resolve_owner(Some("  ".into()), OwnerHeader(Some("header".into()))).unwrap();
        assert_eq!(owner, "header");
    }

    #[test]
    fn test_missing_owner_is_invalid() {
        let err = resolve_owner(None, OwnerHeader(None)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
