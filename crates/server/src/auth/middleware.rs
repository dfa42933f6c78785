use crate::config::AppState;
use crate::ctx::{Ctx, CtxError, CtxResult};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Resolve the bearer token (if any) once per request.
///
/// Never rejects: public routes ignore the outcome, protected handlers take a
/// `Ctx` argument whose extractor surfaces the stored error.
pub async fn mw_ctx_resolver(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let ctx_result = resolve_ctx(&state, req.headers());
    if let Err(e) = &ctx_result {
        debug!("MIDDLEWARE: ctx_resolver - {:?}", e);
    }

    req.extensions_mut().insert(ctx_result);
    next.run(req).await
}

fn resolve_ctx(state: &AppState, headers: &HeaderMap) -> CtxResult {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(CtxError::NoToken)?
        .to_str()
        .map_err(|_| CtxError::TokenWrongFormat)?;

    // Format: "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(CtxError::TokenWrongFormat)?;

    let subject = state
        .auth
        .authenticate(token)
        .map_err(|_| CtxError::InvalidToken)?;

    Ok(Ctx::new(subject.username, subject.role))
}
