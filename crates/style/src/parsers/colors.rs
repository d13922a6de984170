//! Color and visual effects property parsers.

use std::collections::HashMap;

use csscolorparser::Color;

use super::invalid;
use crate::error::StyleError;
use crate::model::{ComputedStyle, Rgba};

/// Parse a CSS `<color>` into 8-bit RGBA channels.
pub fn parse_css_color(input: &str) -> Option<Rgba> {
    let parsed: Color = input.trim().parse().ok()?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    Some(Rgba {
        red,
        green,
        blue,
        alpha,
    })
}

pub fn apply_colors(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    rejected: &mut Vec<StyleError>,
) {
    if let Some(value) = decls.get("color") {
        match parse_css_color(value) {
            Some(color) => computed.color = color,
            None => rejected.push(invalid("color", value, "not a color")),
        }
    }
    if let Some(value) = decls.get("background-color") {
        match parse_css_color(value) {
            Some(color) => computed.background_color = color,
            None => rejected.push(invalid("background-color", value, "not a color")),
        }
    }
    // background shorthand: only the color component is used
    if let Some(value) = decls.get("background")
        && !decls.contains_key("background-color")
    {
        let color = parse_css_color(value).or_else(|| {
            value
                .split(|character: char| character.is_ascii_whitespace())
                .filter(|text| !text.is_empty())
                .find_map(parse_css_color)
        });
        if let Some(color) = color {
            computed.background_color = color;
        }
    }
}

/// Parse visual effects such as `opacity`.
pub fn apply_effects(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    rejected: &mut Vec<StyleError>,
) {
    if let Some(raw) = decls.get("opacity") {
        let trimmed = raw.trim();
        let parsed = if let Some(percent_str) = trimmed.strip_suffix('%') {
            percent_str
                .trim()
                .parse::<f32>()
                .ok()
                .map(|percent| percent / 100.0)
        } else {
            trimmed.parse::<f32>().ok()
        };
        match parsed.map(|alpha| alpha.clamp(0.0, 1.0)) {
            // None keeps the fully opaque fast path
            Some(alpha) if alpha >= 1.0 => computed.opacity = None,
            Some(alpha) => computed.opacity = Some(alpha),
            None => rejected.push(invalid("opacity", raw, "expected a number or percentage")),
        }
    }
}
