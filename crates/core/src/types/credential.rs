//! Login credential held for the current session.
//!
//! The backend answers a successful login with an opaque bearer token and a
//! role marker. Both are kept verbatim; everything else about the session is
//! derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role marker that grants access to administrative pages.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Coarse privilege level derived from a role marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Any other signed-in user.
    Customer,
}

impl Role {
    /// Classify a raw role marker. Comparison ignores ASCII case, so the
    /// backend's `ADMIN` and a lower-case `admin` are the same role.
    #[must_use]
    pub fn from_marker(marker: &str) -> Self {
        if marker.trim().eq_ignore_ascii_case(ADMIN_ROLE) {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

/// Bearer token plus role marker.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    token: String,
    role: String,
}

impl Credential {
    /// Create a credential from a login response.
    #[must_use]
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: role.into(),
        }
    }

    /// The bearer token sent to the backend.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The raw role marker.
    #[must_use]
    pub fn role_marker(&self) -> &str {
        &self.role
    }

    /// The role this credential carries.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_marker(&self.role)
    }

    /// True when a non-empty token is present.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_marker_is_case_insensitive() {
        assert_eq!(Role::from_marker("ADMIN"), Role::Admin);
        assert_eq!(Role::from_marker("admin"), Role::Admin);
        assert_eq!(Role::from_marker("USER"), Role::Customer);
        assert_eq!(Role::from_marker("customer"), Role::Customer);
        assert_eq!(Role::from_marker(""), Role::Customer);
    }

    #[test]
    fn test_blank_token_is_not_a_token() {
        assert!(!Credential::new("   ", "ADMIN").has_token());
        assert!(Credential::new("abc", "USER").has_token());
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret-jwt", "ADMIN");
        let output = format!("{credential:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(output.contains("ADMIN"));
        assert!(!output.contains("super-secret-jwt"));
    }
}
