//! Rectangle geometry shared by the DOM, the style layer and the render tree.

use serde::Serialize;

/// Axis-aligned rectangle in CSS pixels.
///
/// Values are immutable once constructed; every "mutating" helper returns a new rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Zero-sized rectangle at the origin.
    pub const EMPTY: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Offset the origin and grow the size by the given deltas.
    #[inline]
    #[must_use]
    pub const fn add(self, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(
            self.left + left,
            self.top + top,
            self.width + width,
            self.height + height,
        )
    }

    /// Translate a viewport-relative client rectangle into the coordinate space rooted
    /// at `window`'s origin (the scroll offset of the session).
    #[inline]
    #[must_use]
    pub const fn from_client_rect(rect: Self, window: &Self) -> Self {
        Self::new(
            rect.left + window.left,
            rect.top + window.top,
            rect.width,
            rect.height,
        )
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> f32 {
        self.left + self.width
    }

    #[inline]
    #[must_use]
    pub const fn bottom(self) -> f32 {
        self.top + self.height
    }

    /// Center point of the rectangle.
    #[inline]
    #[must_use]
    pub const fn center(self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rect_is_shifted_by_window_origin() {
        let window = Bounds::new(10.0, 200.0, 800.0, 600.0);
        let rect = Bounds::new(5.0, 5.0, 50.0, 20.0);
        let bounds = Bounds::from_client_rect(rect, &window);
        assert_eq!(bounds, Bounds::new(15.0, 205.0, 50.0, 20.0));
        assert!((bounds.right() - 65.0).abs() < f32::EPSILON);
        assert!((bounds.bottom() - 225.0).abs() < f32::EPSILON);
    }

    #[test]
    fn add_returns_a_new_rectangle() {
        let original = Bounds::new(1.0, 2.0, 3.0, 4.0);
        let grown = original.add(1.0, 1.0, 2.0, 2.0);
        assert_eq!(original, Bounds::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(grown, Bounds::new(2.0, 3.0, 5.0, 6.0));
    }
}
