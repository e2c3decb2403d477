//! Custom Askama template filters.
//!
//! Route modules bring this module into scope as `filters` so templates can
//! use the filters by name.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Turns an upper-case marker such as `SHIPPED` into `Shipped`.
///
/// Usage in templates: `{{ item.status|title_case }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn title_case(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(capitalize(&value.to_string()))
}

fn capitalize(marker: &str) -> String {
    let lower = marker.to_lowercase();
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_marker() {
        assert_eq!(capitalize("SHIPPED"), "Shipped");
        assert_eq!(capitalize("pending"), "Pending");
        assert_eq!(capitalize(""), "");
    }
}
