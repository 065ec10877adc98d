//! URL 验证模块
//!
//! Accepts an optional `http(s)://` scheme, an optional `www.` and then a run
//! of non-whitespace characters that contains a dot. The pattern is searched
//! for, not matched against the whole input, so text around a URL-looking run
//! (surrounding whitespace included) is accepted as is.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{Result, TinylinkError};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://)?(www\.)?\S+\.\S+").expect("URL pattern is a valid regex")
});

/// 验证 URL 格式
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(TinylinkError::invalid_url("URL cannot be empty"));
    }

    if !URL_PATTERN.is_match(url) {
        return Err(TinylinkError::invalid_url(format!(
            "'{}' is not a valid URL",
            url
        )));
    }

    Ok(())
}
