//! Inclusive pixel rectangles used for damage tracking.

use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

/// An inclusive pixel rectangle `{x1..=x2, y1..=y2}`.
///
/// [`Rect::EMPTY`] (`x1 = MAX, x2 = 0`) marks "nothing pending". Every rect
/// with `x1 > x2` or `y1 > y2` is treated as empty.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    /// First column
    pub x1: u16,
    /// Last column (inclusive)
    pub x2: u16,
    /// First row
    pub y1: u16,
    /// Last row (inclusive)
    pub y2: u16,
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Rect {
    /// The "nothing pending" sentinel.
    pub const EMPTY: Self = Self {
        x1: u16::MAX,
        x2: 0,
        y1: u16::MAX,
        y2: 0,
    };

    /// Create a rectangle from inclusive bounds.
    #[must_use]
    pub const fn new(x1: u16, x2: u16, y1: u16, y2: u16) -> Self {
        Self { x1, x2, y1, y2 }
    }

    /// The rectangle covering a whole `width` × `height` surface.
    #[must_use]
    pub const fn full(width: u16, height: u16) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self::new(0, width - 1, 0, height - 1)
    }

    /// Damage of a draw call at `(x, y)` spanning `width` × `height` pixels.
    #[must_use]
    pub const fn from_origin_size(x: u16, y: u16, width: u16, height: u16) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self::new(
            x,
            x.saturating_add(width - 1),
            y,
            y.saturating_add(height - 1),
        )
    }

    /// Damage of a write to the byte range `first..=last` of a framebuffer
    /// whose rows are `line_length` bytes apart.
    ///
    /// Touched memory is widened to full rows and clipped to the surface.
    #[must_use]
    pub fn from_byte_range(
        first: usize,
        last: usize,
        line_length: usize,
        width: u16,
        height: u16,
    ) -> Self {
        if first >= last || line_length == 0 || width == 0 || height == 0 {
            return Self::EMPTY;
        }
        let y1 = first / line_length;
        let y2 = (last / line_length).min(usize::from(height) - 1);
        if y1 > y2 {
            return Self::EMPTY;
        }
        Self::new(0, width - 1, y1 as u16, y2 as u16)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    /// Bounding box of `self` and `other`. Empty operands are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Self {
            x1: self.x1.min(other.x1),
            x2: self.x2.max(other.x2),
            y1: self.y1.min(other.y1),
            y2: self.y2.max(other.y2),
        }
    }

    /// Clip to a `width` × `height` surface.
    #[must_use]
    pub fn clip(self, width: u16, height: u16) -> Self {
        if self.is_empty() || width == 0 || height == 0 {
            return Self::EMPTY;
        }
        let clipped = Self {
            x1: self.x1,
            x2: self.x2.min(width - 1),
            y1: self.y1,
            y2: self.y2.min(height - 1),
        };
        if clipped.is_empty() {
            Self::EMPTY
        } else {
            clipped
        }
    }

    /// Number of columns, 0 when empty. A full-range rect spans 65536.
    #[must_use]
    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            u32::from(self.x2) - u32::from(self.x1) + 1
        }
    }

    /// Number of rows, 0 when empty. A full-range rect spans 65536.
    #[must_use]
    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            u32::from(self.y2) - u32::from(self.y1) + 1
        }
    }

    /// Number of pixels covered, saturating where `usize` is narrow.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width() as usize).saturating_mul(self.height() as usize)
    }
}

fn clamp_coord(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}

impl From<Rectangle> for Rect {
    fn from(rect: Rectangle) -> Self {
        let Some(bottom_right) = rect.bottom_right() else {
            return Self::EMPTY;
        };
        let top_left: Point = rect.top_left;
        if bottom_right.x < 0 || bottom_right.y < 0 {
            return Self::EMPTY;
        }
        Self::new(
            clamp_coord(top_left.x),
            clamp_coord(bottom_right.x),
            clamp_coord(top_left.y),
            clamp_coord(bottom_right.y),
        )
    }
}
