//! Display descriptors and capture/local coordinate mapping.
//!
//! Display frames are stored the way the window server reports screens: in a
//! single bottom-left-origin space anchored at the primary display, y growing
//! upward. Capture-space positions are derived from them through the
//! per-display offsets computed by [`offsets`].
//!
//! Displays can be added, removed, or rearranged at any moment, so none of the
//! functions here hold on to a display set. Callers pass the freshly queried
//! set on every computation.

use crate::{Point, Rect};

/// One attached display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayDescriptor {
    /// Full frame in bottom-left-origin global space.
    pub frame: Rect,
    /// Frame minus menu bar and dock, same space as `frame`.
    pub visible_frame: Rect,
    /// Exactly one display in a set is primary; its origin is the reference origin.
    pub is_primary: bool,
}

impl DisplayDescriptor {
    /// Build a descriptor from capture-space bounds (top-left origin, y down).
    ///
    /// `primary_height` is the height of the primary display, which anchors the
    /// flip between the two conventions.
    pub fn from_capture_bounds(
        bounds: Rect,
        visible: Rect,
        primary_height: f64,
        is_primary: bool,
    ) -> Self {
        let flip = |r: Rect| Rect::new(r.x, primary_height - (r.y + r.h), r.w, r.h);
        Self {
            frame: flip(bounds),
            visible_frame: flip(visible),
            is_primary,
        }
    }

    /// Position of a local-space point relative to this display's own
    /// bottom-left corner.
    pub fn relative(&self, local: Point) -> Point {
        Point::new(local.x - self.frame.x, local.y - self.frame.y)
    }
}

/// Offsets of a display's top-left corner from the capture-space origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offsets {
    /// Horizontal distance from the primary's left edge.
    pub left: f64,
    /// Vertical distance from the primary's top edge, growing downward.
    pub top: f64,
}

/// The primary display of `displays`.
///
/// Falls back to the first entry when no descriptor carries the primary flag.
pub fn primary(displays: &[DisplayDescriptor]) -> Option<&DisplayDescriptor> {
    displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
}

/// Capture-space offsets for `display`. The primary display is its own
/// reference frame, so both offsets are zero for it.
pub fn offsets(display: &DisplayDescriptor, primary: &DisplayDescriptor) -> Offsets {
    if display == primary {
        return Offsets::default();
    }
    Offsets {
        left: display.frame.x,
        top: primary.frame.h - (display.frame.y + display.frame.h),
    }
}

/// Distance between the primary's bottom edge and `display`'s bottom edge.
pub fn screen_bottom_offset(display: &DisplayDescriptor, primary: &DisplayDescriptor) -> f64 {
    let off = offsets(display, primary);
    primary.frame.h - (display.frame.h + off.top)
}

/// Find the display whose capture-space frame contains `p`.
///
/// Captured events can land fractionally outside every frame, so this falls
/// back to the primary display. Returns `None` only for an empty set.
pub fn display_containing(displays: &[DisplayDescriptor], p: Point) -> Option<DisplayDescriptor> {
    let primary = primary(displays)?;
    let hit = displays.iter().find(|d| {
        let off = offsets(d, primary);
        p.x >= off.left
            && p.x <= off.left + d.frame.w
            && p.y >= off.top
            && p.y <= off.top + d.frame.h
    });
    Some(*hit.unwrap_or(primary))
}

/// Map a capture-space point into local space for `display`.
///
/// With no displays at all the point is returned unchanged.
pub fn to_local_space(displays: &[DisplayDescriptor], p: Point, display: &DisplayDescriptor) -> Point {
    let Some(primary) = primary(displays) else {
        return p;
    };
    let y = if display == primary {
        display.frame.h - p.y
    } else {
        let off = offsets(display, primary);
        let bottom = screen_bottom_offset(display, primary);
        display.frame.h + bottom - (p.y - off.top)
    };
    Point::new(p.x, y)
}

/// Map a local-space point back into capture space for `display`.
pub fn to_capture_space(
    displays: &[DisplayDescriptor],
    p: Point,
    display: &DisplayDescriptor,
) -> Point {
    let Some(primary) = primary(displays) else {
        return p;
    };
    let off = offsets(display, primary);
    Point::new(p.x, display.frame.max_y() - p.y + off.top)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::approx_eq;

    const PRIMARY_H: f64 = 1080.0;

    fn primary_display() -> DisplayDescriptor {
        let r = Rect::new(0.0, 0.0, 1920.0, PRIMARY_H);
        DisplayDescriptor::from_capture_bounds(r, r, PRIMARY_H, true)
    }

    fn secondary(bounds: Rect) -> DisplayDescriptor {
        DisplayDescriptor::from_capture_bounds(bounds, bounds, PRIMARY_H, false)
    }

    #[test]
    fn primary_offsets_are_zero() {
        let p = primary_display();
        assert_eq!(offsets(&p, &p), Offsets::default());
    }

    #[test]
    fn primary_local_y_flips_height() {
        let p = primary_display();
        let set = [p];
        let local = to_local_space(&set, Point::new(100.0, 200.0), &p);
        assert_eq!(local, Point::new(100.0, 880.0));
    }

    #[test]
    fn taller_secondary_to_the_right() {
        let p = primary_display();
        let s = secondary(Rect::new(1920.0, 0.0, 1080.0, 1920.0));
        let set = [p, s];
        let pt = Point::new(2000.0, 200.0);

        let d = display_containing(&set, pt).unwrap();
        assert_eq!(d, s);
        let off = offsets(&s, &p);
        assert_eq!(off.left, 1920.0);
        assert_eq!(off.top, 0.0);

        let local = to_local_space(&set, pt, &s);
        assert_eq!(local.y, 880.0);
        assert_eq!(s.relative(local).y, 1920.0 - 200.0);
        assert_eq!(local.x, 2000.0);
    }

    #[test]
    fn shorter_secondary_uses_bottom_offset() {
        let p = primary_display();
        let s = secondary(Rect::new(1920.0, 0.0, 1280.0, 720.0));
        let set = [p, s];
        assert_eq!(screen_bottom_offset(&s, &p), 360.0);

        let pt = Point::new(2000.0, 200.0);
        let local = to_local_space(&set, pt, &s);
        assert_eq!(local.y, 720.0 + 360.0 - 200.0);
        assert_eq!(s.relative(local).y, 720.0 - 200.0);
    }

    #[test]
    fn display_below_primary() {
        let p = primary_display();
        let s = secondary(Rect::new(0.0, 1080.0, 1920.0, 1080.0));
        let set = [p, s];
        let pt = Point::new(50.0, 1500.0);
        let d = display_containing(&set, pt).unwrap();
        assert_eq!(d, s);
        assert_eq!(offsets(&s, &p).top, 1080.0);
        let local = to_local_space(&set, pt, &s);
        assert_eq!(s.relative(local).y, 1080.0 - 420.0);
    }

    #[test]
    fn outside_every_frame_falls_back_to_primary() {
        let p = primary_display();
        let s = secondary(Rect::new(1920.0, 0.0, 1080.0, 1920.0));
        let set = [s, p];
        let d = display_containing(&set, Point::new(-3000.0, -10.0)).unwrap();
        assert!(d.is_primary);
    }

    #[test]
    fn empty_set_has_no_display() {
        assert!(display_containing(&[], Point::new(1.0, 1.0)).is_none());
        let p = primary_display();
        let pt = Point::new(3.0, 4.0);
        assert_eq!(to_local_space(&[], pt, &p), pt);
        assert_eq!(to_capture_space(&[], pt, &p), pt);
    }

    #[test]
    fn missing_primary_flag_uses_first() {
        let mut p = primary_display();
        p.is_primary = false;
        let s = secondary(Rect::new(1920.0, 0.0, 800.0, 600.0));
        let set = [p, s];
        assert_eq!(primary(&set), Some(&p));
    }

    fn arrangement() -> impl Strategy<Value = (Rect, Point)> {
        (
            -4000.0f64..4000.0,
            -3000.0f64..3000.0,
            200.0f64..4000.0,
            200.0f64..3000.0,
        )
            .prop_flat_map(|(x, y, w, h)| {
                let r = Rect::new(x, y, w, h);
                let px = (x - 20.0)..(x + w + 20.0);
                let py = (y - 20.0)..(y + h + 20.0);
                (Just(r), (px, py).prop_map(|(a, b)| Point::new(a, b)))
            })
    }

    proptest! {
        #[test]
        fn round_trip_secondary((bounds, pt) in arrangement()) {
            let p = primary_display();
            let s = secondary(bounds);
            let set = [p, s];
            let back = to_capture_space(&set, to_local_space(&set, pt, &s), &s);
            prop_assert!(approx_eq(back.x, pt.x, 1e-6));
            prop_assert!(approx_eq(back.y, pt.y, 1e-6));
        }

        #[test]
        fn round_trip_primary(x in -20.0f64..1940.0, y in -20.0f64..1100.0) {
            let p = primary_display();
            let set = [p];
            let pt = Point::new(x, y);
            let back = to_capture_space(&set, to_local_space(&set, pt, &p), &p);
            prop_assert!(approx_eq(back.x, pt.x, 1e-6));
            prop_assert!(approx_eq(back.y, pt.y, 1e-6));
        }
    }
}
