use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::Role,
    error::{AppError, AppResult},
    services::auth_service::decode_token,
    state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

/// Authorization filter derived from the caller's token and passed to every
/// catalog and order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Platform administrators see and change everything.
    Platform,
    /// Partner staff are confined to their partner's catalog and orders.
    Partner(Uuid),
    /// Customers read the catalog and manage their own orders.
    Customer(Uuid),
}

impl Scope {
    /// Partner id to filter catalog writes on, or `None` for platform admins.
    pub fn catalog_writer(&self) -> AppResult<Option<Uuid>> {
        match self {
            Scope::Platform => Ok(None),
            Scope::Partner(partner_id) => Ok(Some(*partner_id)),
            Scope::Customer(_) => Err(AppError::Forbidden),
        }
    }

    /// Partner id to filter catalog reads on.
    pub fn catalog_reader(&self) -> Option<Uuid> {
        match self {
            Scope::Partner(partner_id) => Some(*partner_id),
            Scope::Platform | Scope::Customer(_) => None,
        }
    }
}

impl AuthUser {
    pub fn scope(&self) -> AppResult<Scope> {
        match self.role {
            Role::PlatformAdmin => Ok(Scope::Platform),
            Role::PartnerAdmin | Role::PartnerOwner => self
                .company_id
                .map(Scope::Partner)
                .ok_or(AppError::Forbidden),
            Role::Customer => Ok(Scope::Customer(self.user_id)),
        }
    }

    pub fn is_platform_admin(&self) -> bool {
        self.role == Role::PlatformAdmin
    }
}

pub fn ensure_platform_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_platform_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// The caller must be the user in question or a platform admin.
pub fn ensure_self_or_admin(user: &AuthUser, user_id: Uuid) -> Result<(), AppError> {
    if user.user_id != user_id && !user.is_platform_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    };
    Ok(Some(token.trim()))
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = decode_token(&state.config, token)?;
    Ok(AuthUser {
        user_id: claims.user_id,
        role: claims.role,
        company_id: claims.company_id,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        authenticate(state, token)
    }
}

/// No header means an anonymous caller; a header that does not verify is
/// still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => authenticate(state, token).map(Some),
            None => Ok(None),
        }
    }
}
