// Field-level normalization and validation. Raw input is corrected or
// rejected at the point of change; callers raise a change signal only
// when the normalized value differs from the last recorded one.

pub mod datetime;
pub mod machine_name;

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static POSITIVE_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]*$").expect("positive int pattern"));

static ZEROS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0+$").expect("zeros pattern"));

// A URL needs a scheme, a host without whitespace, and no embedded spaces.
static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[a-z0-9\-._~%]+(:[0-9]+)?([/?#]\S*)?$").expect("url pattern")
});

/// Rejections raised while normalizing a single field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Zero gets its own message; an empty field is how "unset" is
    /// expressed.
    #[error("zero is not a usable value; leave the field empty instead")]
    Zero,
    #[error("must be a positive whole number")]
    NotPositive,
    #[error("must be an http:// or https:// URL")]
    InvalidUrl,
}

/// Normalize a numeric field (`time_range`, `uid`). Empty means unset.
pub fn normalize_positive_int(raw: &str) -> Result<Option<u64>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if ZEROS.is_match(trimmed) {
        return Err(FieldError::Zero);
    }
    if !POSITIVE_INT.is_match(trimmed) {
        return Err(FieldError::NotPositive);
    }
    trimmed.parse().map(Some).map_err(|_| FieldError::NotPositive)
}

/// Normalize a URL field. A value missing its scheme gets a single
/// `http://` correction attempt before being rejected.
pub fn normalize_url(raw: &str) -> Result<Option<String>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if HTTP_URL.is_match(trimmed) {
        return Ok(Some(trimmed.to_string()));
    }
    let corrected = format!("http://{trimmed}");
    if HTTP_URL.is_match(&corrected) {
        return Ok(Some(corrected));
    }
    Err(FieldError::InvalidUrl)
}

/// Like [`normalize_url`], but also accepts the literal sentinel
/// `none` (a request arriving with no referrer header).
pub fn normalize_referer(raw: &str) -> Result<Option<String>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(Some("none".to_string()));
    }
    normalize_url(raw)
}

/// Trim a free-text field; empty means unset.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
