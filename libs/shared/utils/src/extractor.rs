use std::sync::Arc;

use axum::{
    extract::{FromRequest, State},
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// `Json` body extractor whose rejections become `AppError::BadRequest`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Validates the bearer token and stores the caller as a `User` request extension.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_value = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Allows the call when the user holds any of `roles`.
pub fn require_role(user: &User, roles: &[Role]) -> Result<(), AppError> {
    match user.role() {
        Some(role) if roles.contains(&role) => Ok(()),
        _ => Err(AppError::Forbidden(format!(
            "Requires one of the roles: {}",
            roles.iter().map(Role::to_string).collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Allows the call for the account owner or an admin.
pub fn require_self_or_admin(user: &User, account_id: &str) -> Result<(), AppError> {
    if user.id == account_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not authorized to access another account".to_string()))
    }
}
