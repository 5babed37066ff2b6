use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use sea_orm::DatabaseConnection;
use tracing::{error, warn};

use service::auth::claims::ClaimsPayload;
use service::auth::domain::{ChangePasswordInput, ChangePasswordOutput, RefreshRequest, RefreshedToken, TokenRequest};
use service::auth::errors::AuthError;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::tokens::TokenSigner;
use service::auth::AuthService;
use service::deletion::DeletionHooks;
use service::storage::BlobStore;
use service::{HairCutService, UserService};

use crate::errors::JsonApiError;
use crate::forms::JsonBody;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub haircuts: HairCutService,
    pub users: UserService,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>, auth: &configs::AuthConfig, max_upload_bytes: usize) -> Self {
        let hooks = DeletionHooks::with_tracing();
        let signer = TokenSigner::new(&auth.jwt_secret, auth.access_ttl_secs, auth.refresh_ttl_secs);
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        Self {
            haircuts: HairCutService::new(db.clone(), Arc::clone(&store), max_upload_bytes, hooks.clone()),
            users: UserService::new(db.clone(), store, max_upload_bytes, hooks),
            auth: Arc::new(AuthService::new(repo, signer)),
            db,
        }
    }
}

/// Routes reachable without a bearer token.
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS
        || path == "/health"
        || path.starts_with("/auth/")
        || path.starts_with("/media/")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
    {
        return true;
    }
    let haircut = path == "/haircut" || path.starts_with("/haircut/");
    let user_collection = path == "/user" || path == "/user/";
    (method == Method::GET && haircut) || (method == Method::POST && user_collection)
}

/// Global middleware: outside the public routes, require
/// `Authorization: Bearer <access token>`. A missing header is a 400, an
/// invalid or expired token a 401. The resolved `AuthUser` is stored in the
/// request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let token = match req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        None => {
            warn!(%path, "missing Authorization header");
            return Err(JsonApiError::bad_request("authentication credentials were not provided"));
        }
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                warn!(%path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("authorization header must use the Bearer scheme"));
            }
        },
    };

    match state.auth.verify_access(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e @ AuthError::Repository(_)) => Err(e.into()),
        Err(e) => {
            error!(%path, err = %e, "token validation failed");
            Err(JsonApiError::unauthorized("token is invalid or expired"))
        }
    }
}

#[utoipa::path(
    post, path = "/auth/token", tag = "auth",
    request_body = crate::openapi::TokenRequestDoc,
    responses(
        (status = 200, description = "Token pair and claims", body = crate::openapi::ClaimsDoc),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn obtain_token(
    State(state): State<ServerState>,
    JsonBody(input): JsonBody<TokenRequest>,
) -> Result<Json<ClaimsPayload>, JsonApiError> {
    Ok(Json(state.auth.obtain_token(input).await?))
}

#[utoipa::path(
    post, path = "/auth/token/refresh", tag = "auth",
    request_body = crate::openapi::RefreshRequestDoc,
    responses(
        (status = 200, description = "New access token", body = crate::openapi::RefreshedTokenDoc),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<ServerState>,
    JsonBody(input): JsonBody<RefreshRequest>,
) -> Result<Json<RefreshedToken>, JsonApiError> {
    Ok(Json(state.auth.refresh(input).await?))
}

#[utoipa::path(
    post, path = "/auth/change-password", tag = "auth",
    request_body = crate::openapi::ChangePasswordDoc,
    responses(
        (status = 200, description = "Password changed", body = crate::openapi::ChangePasswordDoc),
        (status = 400, description = "Unknown email or weak password")
    )
)]
pub async fn change_password(
    State(state): State<ServerState>,
    JsonBody(input): JsonBody<ChangePasswordInput>,
) -> Result<Json<ChangePasswordOutput>, JsonApiError> {
    Ok(Json(state.auth.change_password(input).await?))
}

#[cfg(test)]
mod tests {
    use super::is_public;
    use axum::http::Method;

    #[test]
    fn catalogue_reads_and_sign_up_are_public() {
        assert!(is_public(&Method::GET, "/haircut"));
        assert!(is_public(&Method::GET, "/haircut/5b1f"));
        assert!(is_public(&Method::POST, "/user"));
        assert!(is_public(&Method::POST, "/auth/token"));
        assert!(is_public(&Method::OPTIONS, "/user/5b1f"));
    }

    #[test]
    fn writes_and_user_reads_need_a_token() {
        assert!(!is_public(&Method::POST, "/haircut"));
        assert!(!is_public(&Method::DELETE, "/haircut/5b1f"));
        assert!(!is_public(&Method::GET, "/user"));
        assert!(!is_public(&Method::PATCH, "/user/5b1f"));
    }
}
