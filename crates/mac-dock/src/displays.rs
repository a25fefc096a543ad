//! Current display set.
//!
//! On the main thread the set comes from `NSScreen`, whose frames are already
//! in the bottom-left-origin space used by [`DisplayDescriptor`] and which knows
//! each screen's visible frame (minus menu bar and dock). Elsewhere AppKit is
//! off limits, so CoreGraphics bounds are flipped instead and the visible frame
//! falls back to the full frame.

use core_graphics::display::CGDisplay;
use dockpeek_geom::{DisplayDescriptor, Rect};
use objc2_app_kit::NSScreen;
use objc2_foundation::{MainThreadMarker, NSRect};
use tracing::{debug, trace, warn};

fn rect(r: NSRect) -> Rect {
    Rect::new(r.origin.x, r.origin.y, r.size.width, r.size.height)
}

/// Enumerate active displays.
pub fn active_displays() -> Vec<DisplayDescriptor> {
    let out = match MainThreadMarker::new() {
        Some(mtm) => screens(mtm),
        None => {
            debug!("active_displays_off_main_thread");
            cg_displays()
        }
    };
    trace!(count = out.len(), "active_displays");
    out
}

/// Displays from `NSScreen`. The first screen is the primary one.
fn screens(mtm: MainThreadMarker) -> Vec<DisplayDescriptor> {
    NSScreen::screens(mtm)
        .iter()
        .enumerate()
        .map(|(i, s)| DisplayDescriptor {
            frame: rect(s.frame()),
            visible_frame: rect(s.visibleFrame()),
            is_primary: i == 0,
        })
        .collect()
}

/// Displays from CoreGraphics, flipped around the main display's height.
fn cg_displays() -> Vec<DisplayDescriptor> {
    let ids = match CGDisplay::active_displays() {
        Ok(ids) => ids,
        Err(code) => {
            warn!(code, "active_displays_failed");
            return Vec::new();
        }
    };
    let main = CGDisplay::main();
    let primary_h = main.bounds().size.height;
    ids.into_iter()
        .map(|id| {
            let b = CGDisplay::new(id).bounds();
            let r = Rect::new(b.origin.x, b.origin.y, b.size.width, b.size.height);
            DisplayDescriptor::from_capture_bounds(r, r, primary_h, id == main.id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_are_consistent() {
        let set = active_displays();
        if set.is_empty() {
            return;
        }
        assert_eq!(set.iter().filter(|d| d.is_primary).count(), 1);
        for d in &set {
            let (f, v) = (d.frame, d.visible_frame);
            assert!(v.min_x() >= f.min_x() && v.max_x() <= f.max_x());
            assert!(v.min_y() >= f.min_y() && v.max_y() <= f.max_y());
        }
    }
}
