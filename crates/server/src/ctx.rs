use crate::error::{Error, Result};
use crate::models::Role;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Authenticated caller, resolved from the bearer token
#[derive(Clone, Debug)]
pub struct Ctx {
    username: String,
    role: Role,
}

impl Ctx {
    pub fn new(username: String, role: Role) -> Self {
        Self { username, role }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Why a request carries no usable identity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CtxError {
    NoToken,
    TokenWrongFormat,
    InvalidToken,
}

impl From<CtxError> for Error {
    fn from(err: CtxError) -> Self {
        match err {
            CtxError::NoToken => Error::Unauthenticated("no auth token found"),
            CtxError::TokenWrongFormat => Error::Unauthenticated("auth token wrong format"),
            CtxError::InvalidToken => Error::InvalidToken,
        }
    }
}

/// Stored in request extensions by `mw_ctx_resolver`
pub type CtxResult = core::result::Result<Ctx, CtxError>;

/// Taking `Ctx` as a handler argument makes the route require a valid token.
impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<CtxResult>()
            .cloned()
            .ok_or_else(|| Error::Internal("Auth context missing".to_string()))?
            .map_err(Error::from)
    }
}
