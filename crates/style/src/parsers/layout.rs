//! Layout keywords that decide painting order: display, visibility, position, z-index, float.

use std::collections::HashMap;

use super::{invalid, parse_int};
use crate::error::StyleError;
use crate::model::{ComputedStyle, Display, Float, Position, Visibility};

pub fn apply_layout_keywords(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    rejected: &mut Vec<StyleError>,
) {
    if let Some(value) = decls.get("display") {
        match parse_display(value) {
            Some(display) => computed.display = display,
            None => rejected.push(invalid("display", value, "unknown display type")),
        }
    }
    if let Some(value) = decls.get("visibility") {
        computed.visibility = if value.eq_ignore_ascii_case("visible") {
            Visibility::Visible
        } else if value.eq_ignore_ascii_case("hidden") {
            Visibility::Hidden
        } else if value.eq_ignore_ascii_case("collapse") {
            Visibility::Collapse
        } else {
            rejected.push(invalid("visibility", value, "expected visible, hidden or collapse"));
            computed.visibility
        };
    }
    if let Some(value) = decls.get("position") {
        computed.position = if value.eq_ignore_ascii_case("static") {
            Position::Static
        } else if value.eq_ignore_ascii_case("relative") {
            Position::Relative
        } else if value.eq_ignore_ascii_case("absolute") {
            Position::Absolute
        } else if value.eq_ignore_ascii_case("fixed") {
            Position::Fixed
        } else if value.eq_ignore_ascii_case("sticky") {
            Position::Sticky
        } else {
            rejected.push(invalid("position", value, "unknown position"));
            computed.position
        };
    }
    if let Some(value) = decls.get("z-index") {
        if value.trim().eq_ignore_ascii_case("auto") {
            computed.z_index = None;
        } else if let Some(z_index) = parse_int(value) {
            computed.z_index = Some(z_index);
        } else {
            rejected.push(invalid("z-index", value, "expected an integer or auto"));
        }
    }
    if let Some(value) = decls.get("float") {
        computed.float = if value.eq_ignore_ascii_case("left") {
            Float::Left
        } else if value.eq_ignore_ascii_case("right") {
            Float::Right
        } else if value.eq_ignore_ascii_case("none") {
            Float::None
        } else {
            rejected.push(invalid("float", value, "expected left, right or none"));
            computed.float
        };
    }
}

/// Map a `display` keyword. Two-value syntax is reduced to its outer/inner pair.
pub fn parse_display(value: &str) -> Option<Display> {
    let normalized = value.trim().to_ascii_lowercase();
    let display = match normalized.as_str() {
        "inline" | "inline flow" => Display::Inline,
        "block" | "block flow" => Display::Block,
        "inline-block" | "inline flow-root" => Display::InlineBlock,
        "list-item" | "block flow list-item" => Display::ListItem,
        "flex" | "block flex" => Display::Flex,
        "inline-flex" | "inline flex" => Display::InlineFlex,
        "grid" | "block grid" => Display::Grid,
        "inline-grid" | "inline grid" => Display::InlineGrid,
        "table" | "block table" => Display::Table,
        "contents" => Display::Contents,
        "none" => Display::None,
        _ => return None,
    };
    Some(display)
}
