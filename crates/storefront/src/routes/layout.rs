//! Shared page chrome: navigation state and one-shot notifications.
//!
//! Notifications travel as `?error=` / `?success=` on redirect targets and
//! are shown by the page the redirect lands on.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use marigold_core::{CredentialStore, Page};
use marigold_core::guard::is_local_path;

use crate::middleware::{load_cart, load_credential};

/// Data every page template needs for the navigation bar and flash
/// messages.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub authenticated: bool,
    pub admin: bool,
    pub cart_count: u32,
    pub error: Option<String>,
    pub success: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FlashQuery {
    error: Option<String>,
    success: Option<String>,
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = Query::<FlashQuery>::try_from_uri(&parts.uri)
            .map(|query| query.0)
            .unwrap_or_default();

        let mut layout = Self {
            error: flash.error.filter(|m| !m.trim().is_empty()),
            success: flash.success.filter(|m| !m.trim().is_empty()),
            ..Self::default()
        };

        if let Some(session) = parts.extensions.get::<Session>() {
            let credential = load_credential(session).await;
            layout.authenticated = credential.is_authenticated();
            layout.admin = credential.is_admin();
            layout.cart_count = load_cart(session).await.item_count();
        }

        Ok(layout)
    }
}

/// Kind of one-shot notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Error,
    Success,
}

impl Flash {
    const fn param(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

/// Append a notification to `path`.
#[must_use]
pub fn with_flash(path: &str, flash: Flash, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!(
        "{path}{separator}{}={}",
        flash.param(),
        urlencoding::encode(message)
    )
}

/// Redirect to `path` showing an error.
#[must_use]
pub fn redirect_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_flash(path, Flash::Error, message))
}

/// Redirect to `path` showing a success message.
#[must_use]
pub fn redirect_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_flash(path, Flash::Success, message))
}

/// A form's `return_to` field if it is a local path, else `fallback`.
#[must_use]
pub fn return_path(return_to: Option<&str>, fallback: &str) -> String {
    return_to
        .map(str::trim)
        .filter(|path| is_local_path(path))
        .unwrap_or(fallback)
        .to_string()
}

/// Link prefix for page `n` of a listing; the page number is appended.
#[must_use]
pub fn page_href(path: &str, search: Option<&str>) -> String {
    match search.filter(|s| !s.is_empty()) {
        Some(search) => format!("{path}?search={}&page=", urlencoding::encode(search)),
        None => format!("{path}?page="),
    }
}

/// Pagination links for a listing template.
#[derive(Debug, Clone)]
pub struct Pager {
    pub href: String,
    pub links: Vec<PageLink>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

/// One numbered page link.
#[derive(Debug, Clone, Copy)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
}

impl Pager {
    /// Links for `page`; `href` is a [`page_href`] prefix.
    #[must_use]
    pub fn new<T>(page: &Page<T>, href: String) -> Self {
        Self {
            href,
            links: page
                .page_numbers()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    current: number == page.current_page,
                })
                .collect(),
            previous: page.has_previous().then(|| page.current_page - 1),
            next: page.has_next().then(|| page.current_page + 1),
        }
    }
}

/// `?page=` on listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_flash_picks_separator() {
        assert_eq!(
            with_flash("/cart", Flash::Error, "Out of stock"),
            "/cart?error=Out%20of%20stock"
        );
        assert_eq!(
            with_flash("/login?from=%2Fcart", Flash::Success, "ok"),
            "/login?from=%2Fcart&success=ok"
        );
    }

    #[test]
    fn test_return_path_rejects_offsite() {
        assert_eq!(return_path(Some("/product/4"), "/cart"), "/product/4");
        assert_eq!(return_path(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(return_path(Some("//evil.example"), "/cart"), "/cart");
        assert_eq!(return_path(None, "/cart"), "/cart");
    }

    #[test]
    fn test_page_href_keeps_search() {
        assert_eq!(page_href("/", Some("linen shirt")), "/?search=linen%20shirt&page=");
        assert_eq!(page_href("/category/2", None), "/category/2?page=");
    }

    #[test]
    fn test_pager_marks_current_and_neighbours() {
        let page = Page::slice((1..=25).collect::<Vec<_>>(), 2, 10);
        let pager = Pager::new(&page, page_href("/admin/products", None));

        assert_eq!(pager.links.len(), 3);
        assert!(pager.links.iter().any(|link| link.number == 2 && link.current));
        assert_eq!(pager.previous, Some(1));
        assert_eq!(pager.next, Some(3));
    }

    #[tokio::test]
    async fn test_layout_reads_flash_without_session() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/cart?error=Nope&success=")
            .body(())
            .unwrap()
            .into_parts();

        let layout = Layout::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(layout.error.as_deref(), Some("Nope"));
        assert!(layout.success.is_none());
        assert!(!layout.authenticated);
        assert_eq!(layout.cart_count, 0);
    }
}
