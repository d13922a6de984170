//! Animation and transition longhands, read so that frozen clones can be reported as such.

use std::collections::HashMap;

use super::{invalid, parse_seconds, split_list};
use crate::error::StyleError;
use crate::model::ComputedStyle;

pub fn apply_animation(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    rejected: &mut Vec<StyleError>,
) {
    if let Some(value) = decls.get("animation-duration") {
        let durations: Option<Vec<f32>> = split_list(value).map(parse_seconds).collect();
        match durations {
            Some(durations) if !durations.is_empty() => computed.animation_duration = durations,
            _ => rejected.push(invalid("animation-duration", value, "expected a list of times")),
        }
    }
    if let Some(value) = decls.get("transition-property") {
        computed.transition_property = if value.trim().eq_ignore_ascii_case("none") {
            Vec::new()
        } else {
            split_list(value).map(str::to_ascii_lowercase).collect()
        };
    } else if let Some(value) = decls.get("transition") {
        // shorthand: the first token of each item names the property
        computed.transition_property = if value.trim().eq_ignore_ascii_case("none") {
            Vec::new()
        } else {
            split_list(value)
                .filter_map(|item| item.split_ascii_whitespace().next())
                .filter(|token| parse_seconds(token).is_none())
                .map(str::to_ascii_lowercase)
                .collect()
        };
    }
}
