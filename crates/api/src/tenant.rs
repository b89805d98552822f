//! Tenant selection for HTTP requests.
//!
//! The tenant is carried in the `x-tenant` header. Requests without the
//! header operate on the default (`public`) schema; an invalid name is a
//! 400 before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use atrium_core::tenant::Tenant;

use crate::error::AppError;

/// Header naming the tenant schema for this request.
pub const TENANT_HEADER: &str = "x-tenant";

/// Extractor yielding the request's [`Tenant`].
#[derive(Debug, Clone)]
pub struct RequestTenant(pub Tenant);

impl<S> FromRequestParts<S> for RequestTenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(TENANT_HEADER) {
            None => Ok(RequestTenant(Tenant::public())),
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    AppError::BadRequest(format!("{TENANT_HEADER} header must be ASCII"))
                })?;
                Ok(RequestTenant(Tenant::new(raw)?))
            }
        }
    }
}
