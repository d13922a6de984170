//! CSS property parsers organized by category.
//!
//! Each `apply_*` function reads the declarations it understands, writes them into the
//! computed style and records every value it could not parse in `rejected`. Unknown
//! properties are ignored.

pub mod animation;
pub mod colors;
pub mod layout;
pub mod text;

use crate::error::StyleError;

pub(crate) fn invalid(property: &str, value: &str, reason: impl Into<String>) -> StyleError {
    StyleError::InvalidValue {
        property: property.to_owned(),
        value: value.to_owned(),
        reason: reason.into(),
    }
}

/// Parse an integer value (used for z-index).
pub(crate) fn parse_int(input: &str) -> Option<i32> {
    input.trim().parse::<i32>().ok()
}

/// Parse a `<time>` into seconds.
pub(crate) fn parse_seconds(input: &str) -> Option<f32> {
    let trimmed = input.trim();
    if let Some(millis) = trimmed.strip_suffix("ms") {
        return millis.trim().parse::<f32>().ok().map(|value| value / 1000.0);
    }
    trimmed
        .strip_suffix('s')
        .and_then(|seconds| seconds.trim().parse::<f32>().ok())
}

/// Split a comma-separated list, trimming each item.
pub(crate) fn split_list(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|item| !item.is_empty())
}
