use crate::transform::Transform;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 0,
    };

    pub const BLACK: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        alpha: 255,
    };

    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.alpha == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
    Table,
    Contents,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Typed snapshot of the properties the snapshot pipeline consumes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub position: Position,
    pub z_index: Option<i32>,
    /// Optional opacity multiplier in [0.0, 1.0]. None represents 1.0 (fully opaque).
    pub opacity: Option<f32>,
    pub float: Float,
    /// `None` is `transform: none`.
    pub transform: Option<Transform>,
    pub background_color: Rgba,
    pub color: Rgba,
    /// Seconds, one entry per animation.
    pub animation_duration: Vec<f32>,
    /// Empty means `transition-property: none`.
    pub transition_property: Vec<String>,
    pub text_transform: TextTransform,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            visibility: Visibility::default(),
            position: Position::default(),
            z_index: None,
            opacity: None,
            float: Float::default(),
            transform: None,
            background_color: Rgba::TRANSPARENT,
            color: Rgba::BLACK,
            animation_duration: vec![0.0],
            transition_property: vec!["all".to_owned()],
            text_transform: TextTransform::default(),
        }
    }
}

impl ComputedStyle {
    #[inline]
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }

    /// Painted at all: displayed, not hidden and not fully transparent.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.display != Display::None
            && self.opacity() > 0.0
            && self.visibility == Visibility::Visible
    }

    #[inline]
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.position != Position::Static
    }

    #[inline]
    #[must_use]
    pub fn is_positioned_with_z_index(&self) -> bool {
        self.is_positioned() && self.z_index.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.float != Float::None
    }

    #[inline]
    #[must_use]
    pub const fn is_transformed(&self) -> bool {
        self.transform.is_some()
    }

    /// Settle animations and transitions: durations become zero and no property transitions.
    pub fn freeze_animations(&mut self) {
        for duration in &mut self.animation_duration {
            *duration = 0.0;
        }
        self.transition_property.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_visible_and_flow() {
        let style = ComputedStyle::default();
        assert!(style.is_visible());
        assert!(!style.is_positioned());
        assert!(!style.is_floating());
        assert!(!style.is_transformed());
        assert!(style.background_color.is_transparent());
    }

    #[test]
    fn zero_opacity_and_hidden_are_invisible() {
        let transparent = ComputedStyle {
            opacity: Some(0.0),
            ..ComputedStyle::default()
        };
        let hidden = ComputedStyle {
            visibility: Visibility::Hidden,
            ..ComputedStyle::default()
        };
        assert!(!transparent.is_visible());
        assert!(!hidden.is_visible());
    }

    #[test]
    fn z_index_only_counts_when_positioned() {
        let mut style = ComputedStyle {
            z_index: Some(3),
            ..ComputedStyle::default()
        };
        assert!(!style.is_positioned_with_z_index());
        style.position = Position::Relative;
        assert!(style.is_positioned_with_z_index());
    }

    #[test]
    fn freezing_zeroes_durations_and_drops_transitions() {
        let mut style = ComputedStyle {
            animation_duration: vec![1.5, 0.2],
            ..ComputedStyle::default()
        };
        style.freeze_animations();
        assert_eq!(style.animation_duration, vec![0.0, 0.0]);
        assert!(style.transition_property.is_empty());
    }
}
