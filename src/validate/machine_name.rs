use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Literals reserved for the no-filter and ad-hoc lifecycle states; a
/// stored filter may not shadow them.
pub const RESERVED_NAMES: [&str; 2] = ["default", "adhoc"];

static VALID_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("name pattern"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("filter names need at least 2 characters")]
    TooShort,
    #[error("filter names are limited to 32 characters")]
    TooLong,
    #[error("filter names must start with a-z or _ and contain only a-z, 0-9 and _")]
    BadComposition,
    #[error("'{0}' is reserved")]
    Reserved(String),
    #[error("a filter named '{0}' already exists")]
    Taken(String),
}

/// Convert a free-text candidate name to machine form: lower-case,
/// spaces and hyphens to underscore, accented Latin letters to their
/// ASCII base, anything else left over to underscore.
pub fn machine_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' | '_' => out.push(c),
            ' ' | '-' => out.push('_'),
            other => match transliterate(other) {
                Some(ascii) => out.push_str(ascii),
                None => out.push('_'),
            },
        }
    }
    out
}

/// Validate a machine name against the composition rules and the set
/// of names already in use. `current` is the name being edited, which
/// may keep colliding with itself.
pub fn validate_name(
    name: &str,
    known: &BTreeSet<String>,
    current: Option<&str>,
) -> Result<(), NameError> {
    if name.len() < 2 {
        return Err(NameError::TooShort);
    }
    if name.len() > 32 {
        return Err(NameError::TooLong);
    }
    if !VALID_NAME.is_match(name) {
        return Err(NameError::BadComposition);
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(NameError::Reserved(name.to_string()));
    }
    if known.contains(name) && current != Some(name) {
        return Err(NameError::Taken(name.to_string()));
    }
    Ok(())
}

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ð' => "d",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'š' => "s",
        'ß' => "ss",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'þ' => "th",
        'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}
