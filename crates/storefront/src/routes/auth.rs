//! Authentication route handlers.
//!
//! Login exchanges email and password for a backend credential, which is
//! kept in the session until logout. Registration creates the account and
//! sends the user to the login page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::guard::{FROM_PARAM, LOGIN_PATH, continuation_target};

use crate::api::RegisterRequest;
use crate::filters;
use crate::middleware::{clear_credential, set_credential};
use crate::routes::layout::{Layout, redirect_error, redirect_success};
use crate::state::AppState;

const REGISTER_PATH: &str = "/register";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Continuation carried over from `/login?from=`.
    #[serde(default)]
    pub from: Option<String>,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

/// `?from=` on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub from: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(layout: Layout, Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        layout,
        from: query.from.unwrap_or_default(),
    }
}

/// Handle login form submission.
///
/// On success the credential goes into the session and the client continues
/// to the page it originally asked for (or `/profile`).
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let retry = login_retry_path(form.from.as_deref());
    let password = SecretString::from(form.password);

    match state.api().login(form.email.trim(), &password).await {
        Ok(credential) => {
            if let Err(e) = set_credential(&session, &credential).await {
                tracing::error!("Failed to set session: {}", e);
                return redirect_error(&retry, "Unable to sign in right now").into_response();
            }

            tracing::info!(role = credential.role_marker(), "Login succeeded");
            Redirect::to(&continuation_target(form.from.as_deref())).into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            redirect_error(&retry, &e.user_message()).into_response()
        }
    }
}

/// `/login`, keeping a continuation if one was carried.
fn login_retry_path(from: Option<&str>) -> String {
    match from.filter(|f| !f.is_empty()) {
        Some(from) => format!("{LOGIN_PATH}?{FROM_PARAM}={}", urlencoding::encode(from)),
        None => LOGIN_PATH.to_string(),
    }
}

/// Erase the credential and go home.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_credential(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    Redirect::to("/").into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(layout: Layout) -> impl IntoResponse {
    RegisterTemplate { layout }
}

/// Handle registration form submission.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if [&form.name, &form.email, &form.phone_number]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return redirect_error(REGISTER_PATH, "All fields are required").into_response();
    }
    if form.password.is_empty() {
        return redirect_error(REGISTER_PATH, "Password is required").into_response();
    }

    let request = RegisterRequest {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
        password: SecretString::from(form.password),
    };

    match state.api().register(&request).await {
        Ok(message) => redirect_success(LOGIN_PATH, &message).into_response(),
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            redirect_error(REGISTER_PATH, &e.user_message()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_retry_keeps_continuation() {
        assert_eq!(login_retry_path(None), "/login");
        assert_eq!(login_retry_path(Some("")), "/login");
        assert_eq!(
            login_retry_path(Some("/admin/orders")),
            "/login?from=%2Fadmin%2Forders"
        );
    }
}
