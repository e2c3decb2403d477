//! Route guard extractors.
//!
//! Protected handlers take [`RequireAuth`] or [`RequireAdmin`]. Both read the
//! credential from the session on every request and run
//! [`marigold_core::evaluate`]; a redirect decision short-circuits the
//! handler with a `303 See Other` to `/login?from=<requested location>`.

use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{Method, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use marigold_core::guard::{DEFAULT_CONTINUATION, LOGIN_PATH};
use marigold_core::{AccessLevel, Credential, RenderDecision, evaluate};

use crate::models::session_keys;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(credential): RequireAuth) -> impl IntoResponse {
///     // credential.token() is non-empty here
/// }
/// ```
pub struct RequireAuth(pub Credential);

/// Extractor that requires a signed-in administrator.
pub struct RequireAdmin(pub Credential);

/// Extractor that optionally gets the stored credential.
///
/// Never rejects; a missing or unreadable credential is `None`.
pub struct OptionalCredential(pub Option<Credential>);

/// Rejection returned when the guard does not let a request through.
#[derive(Debug)]
pub enum GuardRejection {
    /// Send the client to the login page.
    Redirect(String),
    /// The session layer is not installed.
    MissingSession,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(&target).into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer missing for guarded route");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, AccessLevel::Authenticated).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, AccessLevel::Admin).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for OptionalCredential
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credential = match parts.extensions.get::<Session>() {
            Some(session) => load_credential(session).await,
            None => None,
        };

        Ok(Self(credential))
    }
}

async fn guard(parts: &Parts, level: AccessLevel) -> Result<Credential, GuardRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(GuardRejection::MissingSession)?;

    let credential = load_credential(session).await;
    let requested = requested_location(parts);

    match (evaluate(level, &credential, &requested), credential) {
        (RenderDecision::Render, Some(credential)) => Ok(credential),
        (decision, _) => {
            debug!(?level, requested = %requested, "Guard redirected to login");
            let target = decision
                .redirect_target()
                .unwrap_or_else(|| LOGIN_PATH.to_string());
            Err(GuardRejection::Redirect(target))
        }
    }
}

/// Path and query the client asked for, before any router nesting.
fn requested_location(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);

    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

/// Read the credential from the session.
pub async fn load_credential(session: &Session) -> Option<Credential> {
    session
        .get::<Credential>(session_keys::CREDENTIAL)
        .await
        .ok()
        .flatten()
}

/// Helper to store the credential in the session (login).
///
/// The session id is cycled first so a pre-login session id cannot be
/// reused after authentication.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_credential(
    session: &Session,
    credential: &Credential,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CREDENTIAL, credential).await
}

/// Helper to clear the credential from the session (logout).
///
/// The cart stays; it belongs to the browser session, not the account.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_credential(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<Credential>(session_keys::CREDENTIAL)
        .await?;
    Ok(())
}

/// Drop a credential the backend no longer accepts and send the client to
/// log in again, continuing to `requested` afterwards.
pub async fn expire_credential(session: &Session, requested: &str) -> Redirect {
    if let Err(e) = clear_credential(session).await {
        tracing::error!("Failed to clear expired credential: {}", e);
    }
    tracing::info!(requested = %requested, "Backend rejected stored credential");

    let decision = evaluate(AccessLevel::Authenticated, &None::<Credential>, requested);
    let target = decision
        .redirect_target()
        .unwrap_or_else(|| LOGIN_PATH.to_string());
    Redirect::to(&target)
}

/// Response extension set when the backend refused the session credential.
///
/// [`expire_rejected_credential`] turns a response carrying it into a
/// logout plus a login redirect. `continue_to` overrides where the login
/// continues; by default a `GET` continues to itself.
#[derive(Debug, Clone, Default)]
pub struct CredentialRejected {
    pub continue_to: Option<String>,
}

impl CredentialRejected {
    /// Continue to `path` after logging in again.
    #[must_use]
    pub fn continue_to(path: impl Into<String>) -> Self {
        Self {
            continue_to: Some(path.into()),
        }
    }
}

/// Clear a credential the backend rejected while handling this request.
///
/// Must sit inside the session layer.
pub async fn expire_rejected_credential(request: Request, next: Next) -> Response {
    let session = request.extensions().get::<Session>().cloned();
    let requested = if request.method() == Method::GET {
        request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path().to_string(), ToString::to_string)
    } else {
        DEFAULT_CONTINUATION.to_string()
    };

    let response = next.run(request).await;

    let (Some(rejected), Some(session)) = (
        response.extensions().get::<CredentialRejected>().cloned(),
        session,
    ) else {
        return response;
    };

    let requested = rejected.continue_to.unwrap_or(requested);
    expire_credential(&session, &requested).await.into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::http::Request;

    fn parts(uri: &str) -> Parts {
        let (parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_requested_location_keeps_query() {
        assert_eq!(
            requested_location(&parts("/admin/orders?status=SHIPPED")),
            "/admin/orders?status=SHIPPED"
        );
    }

    #[test]
    fn test_requested_location_prefers_original_uri() {
        let mut parts = parts("/orders");
        parts
            .extensions
            .insert(OriginalUri("/admin/orders".parse().unwrap()));
        assert_eq!(requested_location(&parts), "/admin/orders");
    }

    #[tokio::test]
    async fn test_missing_session_is_rejected() {
        let parts = parts("/profile");
        let result = guard(&parts, AccessLevel::Authenticated).await;
        assert!(matches!(result, Err(GuardRejection::MissingSession)));
    }

    #[test]
    fn test_redirect_rejection_is_see_other() {
        let response = GuardRejection::Redirect("/login?from=%2Fprofile".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?from=%2Fprofile"
        );
    }

    fn rejecting_router() -> axum::Router {
        use axum::routing::{get, post};
        use tower_sessions::{MemoryStore, SessionManagerLayer};

        axum::Router::new()
            .route(
                "/admin/orders",
                get(|| async {
                    crate::error::AppError::Api(crate::api::ApiError::Unauthorized(
                        "Token expired".to_string(),
                    ))
                }),
            )
            .route(
                "/admin/categories/{id}/delete",
                post(|| async {
                    let mut response = StatusCode::SEE_OTHER.into_response();
                    response
                        .extensions_mut()
                        .insert(CredentialRejected::continue_to("/admin/categories"));
                    response
                }),
            )
            .layer(axum::middleware::from_fn(expire_rejected_credential))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_rejected_credential_on_page_redirects_back_to_it() {
        use tower::ServiceExt;

        let response = rejecting_router()
            .oneshot(
                Request::builder()
                    .uri("/admin/orders?status=PENDING")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?from=%2Fadmin%2Forders%3Fstatus%3DPENDING"
        );
    }

    #[tokio::test]
    async fn test_rejected_credential_on_form_uses_continuation() {
        use tower::ServiceExt;

        let response = rejecting_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/categories/3/delete")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?from=%2Fadmin%2Fcategories"
        );
    }
}
