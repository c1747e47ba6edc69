//! Custom Askama template filters.

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

/// Returns the content hash for main.css, computed by the build script.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// An item count with its noun, e.g. "1 article" or "3 articles".
///
/// French takes the singular for zero as well.
///
/// Usage in templates: `{{ cart.item_count|articles }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn articles(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(article_count(&count.to_string()))
}

fn article_count(count: &str) -> String {
    match count {
        "0" | "1" => format!("{count} article"),
        _ => format!("{count} articles"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_count() {
        assert_eq!(article_count("0"), "0 article");
        assert_eq!(article_count("1"), "1 article");
        assert_eq!(article_count("12"), "12 articles");
    }
}
