//! Geometry primitives shared across the dockpeek workspace.
//!
//! Two coordinate conventions are in play:
//! - *capture space*: origin at the primary display's top-left corner, y grows
//!   downward. Global pointer events and Accessibility frames use it.
//! - *local space*: origin at the bottom-left, y grows upward. This is what the
//!   presenter uses to place UI.
//!
//! [`display`] maps points between the two for any display in the current set.

pub mod display;
pub mod dock;

pub use display::{
    DisplayDescriptor, Offsets, display_containing, offsets, primary, screen_bottom_offset,
    to_capture_space, to_local_space,
};
pub use dock::DockPosition;

/// A point in either coordinate space. Which one is determined by context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Construct a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle stored as origin plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Origin x.
    pub x: f64,
    /// Origin y.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from origin and extent.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle from an origin point and a size.
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: size.width,
            h: size.height,
        }
    }

    /// Left edge.
    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }
    /// Right edge (exclusive for containment).
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.w
    }
    /// Minimum y edge.
    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y
    }
    /// Maximum y edge (exclusive for containment).
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.h
    }

    /// Origin as a point.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Extent as a size.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Half-open containment test: the min edges are inside, the max edges
    /// are not, so rectangles sharing an edge never both contain a point.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    /// Translate `self` so that it lies within `outer` where possible.
    ///
    /// When `self` is larger than `outer` on an axis, it is aligned to the
    /// minimum edge of `outer` on that axis.
    pub fn clamp_within(&self, outer: &Self) -> Self {
        let x = self.x.min(outer.max_x() - self.w).max(outer.min_x());
        let y = self.y.min(outer.max_y() - self.h).max(outer.min_y());
        Self::new(x, y, self.w, self.h)
    }
}

/// Compare two floats within `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
