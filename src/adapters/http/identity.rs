//! Caller identity forwarded by the upstream auth layer.
//!
//! Authentication happens before requests reach this service. The gateway
//! in front of it forwards the result as headers:
//!
//! ```text
//! X-User-Id: <uuid>
//! X-User-Role: customer | admin
//! X-Gateway-Customer: cus_...
//! ```

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

use super::error::ApiError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const GATEWAY_CUSTOMER_HEADER: &str = "X-Gateway-Customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// Identity of the caller, possibly anonymous.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Option<UserId>,
    pub role: Role,
    pub gateway_customer_id: Option<String>,
}

impl Identity {
    /// The signed-in customer, or 401.
    pub fn require_user(&self) -> Result<UserId, ApiError> {
        self.user_id.ok_or_else(|| {
            ApiError(DomainError::new(
                ErrorCode::Unauthorized,
                "Authentication is required",
            ))
        })
    }

    /// The signed-in operator, or 401/403.
    pub fn require_admin(&self) -> Result<UserId, ApiError> {
        let user_id = self.require_user()?;
        if self.role != Role::Admin {
            return Err(ApiError(DomainError::new(
                ErrorCode::Forbidden,
                "Operator role required",
            )));
        }
        Ok(user_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let user_id = match header(USER_ID_HEADER) {
            Some(raw) => Some(raw.parse::<UserId>().map_err(|_| {
                ApiError(DomainError::new(
                    ErrorCode::Unauthorized,
                    "Invalid user identity",
                ))
            })?),
            None => None,
        };

        let role = match header(USER_ROLE_HEADER).as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::Customer,
        };

        Ok(Identity {
            user_id,
            role,
            gateway_customer_id: header(GATEWAY_CUSTOMER_HEADER),
        })
    }
}
