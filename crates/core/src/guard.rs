//! Route authorization guard.
//!
//! Decides, per navigation, whether a protected page renders or the client
//! is sent to the login page. The decision is a plain value; turning a
//! [`RenderDecision::Redirect`] into an HTTP response is the router's job.
//!
//! Evaluation is pure and synchronous. It reads the credential at call time
//! and must be repeated on every navigation so a login or logout takes
//! effect immediately.

use crate::types::{Credential, Role};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Where a successful login goes when no usable continuation was carried.
pub const DEFAULT_CONTINUATION: &str = "/profile";

/// Query parameter carrying the originally requested location.
pub const FROM_PARAM: &str = "from";

/// Privilege a page requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    /// Any signed-in user.
    Authenticated,
    /// Signed-in administrators only.
    Admin,
}

/// Synchronous view of the stored credential.
pub trait CredentialStore {
    /// True when a non-empty token is present.
    fn is_authenticated(&self) -> bool;

    /// True when authenticated and the role is the admin role.
    fn is_admin(&self) -> bool;

    /// Whether this credential satisfies `level`.
    fn satisfies(&self, level: AccessLevel) -> bool {
        match level {
            AccessLevel::Authenticated => self.is_authenticated(),
            AccessLevel::Admin => self.is_admin(),
        }
    }
}

impl CredentialStore for Credential {
    fn is_authenticated(&self) -> bool {
        self.has_token()
    }

    fn is_admin(&self) -> bool {
        self.has_token() && self.role() == Role::Admin
    }
}

impl<T: CredentialStore> CredentialStore for Option<T> {
    fn is_authenticated(&self) -> bool {
        self.as_ref().is_some_and(CredentialStore::is_authenticated)
    }

    fn is_admin(&self) -> bool {
        self.as_ref().is_some_and(CredentialStore::is_admin)
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn is_admin(&self) -> bool {
        (**self).is_admin()
    }
}

/// Per-navigation state. `Evaluating` moves straight to one of the two
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationState {
    Evaluating,
    Rendered,
    Redirected,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// The requested page may render.
    Render,
    /// Send the client to `to`, remembering where it was headed.
    Redirect { to: &'static str, from: String },
}

impl RenderDecision {
    /// The terminal navigation state this decision leads to.
    #[must_use]
    pub const fn state(&self) -> NavigationState {
        match self {
            Self::Render => NavigationState::Rendered,
            Self::Redirect { .. } => NavigationState::Redirected,
        }
    }

    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }

    /// Redirect location with the requested location as `?from=`.
    ///
    /// Returns `None` for [`RenderDecision::Render`].
    #[must_use]
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Self::Render => None,
            Self::Redirect { to, from } => Some(format!(
                "{to}?{FROM_PARAM}={}",
                urlencoding::encode(from)
            )),
        }
    }
}

/// Decide whether the page at `requested` renders for `credential`.
pub fn evaluate(
    level: AccessLevel,
    credential: &impl CredentialStore,
    requested: &str,
) -> RenderDecision {
    if credential.satisfies(level) {
        RenderDecision::Render
    } else {
        RenderDecision::Redirect {
            to: LOGIN_PATH,
            from: requested.to_string(),
        }
    }
}

/// Where to go after a successful login.
///
/// Only local absolute paths are honoured; anything that could leave the
/// site (`//host`, `https://...`, backslashes) falls back to
/// [`DEFAULT_CONTINUATION`]. The login page itself is never a continuation.
#[must_use]
pub fn continuation_target(from: Option<&str>) -> String {
    from.map(str::trim)
        .filter(|path| is_local_path(path))
        .filter(|path| !is_login_page(path))
        .map_or_else(|| DEFAULT_CONTINUATION.to_string(), ToString::to_string)
}

/// `/login` itself, with or without a query or fragment. `/login-help` is
/// a different page.
fn is_login_page(path: &str) -> bool {
    path.strip_prefix(LOGIN_PATH)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['?', '#']))
}

/// True for paths that stay on this site: `/...`, not `//...`, no
/// backslashes or control characters.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}
