//! A presenter that places a notional preview surface and logs it.
//!
//! The surface is anchored next to the pointer on the side facing away from
//! the dock and kept inside the pointer's display, so stickiness checks in the
//! engine behave as they would with a real window.

use std::sync::Arc;

use config::PreviewSize;
use dockpeek_engine::{DockPrefs, Presenter, ShowRequest};
use dockpeek_geom::{DisplayDescriptor, DockPosition, Point, Rect};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Where the surface goes for a pointer at `point` (local space).
pub fn surface_for(
    position: DockPosition,
    point: Point,
    display: &DisplayDescriptor,
    size: &PreviewSize,
) -> Rect {
    let (w, h, gap) = (size.width, size.height, size.gap);
    let raw = match position {
        DockPosition::Left => Rect::new(point.x + gap, point.y - h / 2.0, w, h),
        DockPosition::Right => Rect::new(point.x - gap - w, point.y - h / 2.0, w, h),
        DockPosition::Bottom | DockPosition::Unknown => {
            Rect::new(point.x - w / 2.0, point.y + gap, w, h)
        }
    };
    raw.clamp_within(&display.frame)
}

/// The preview currently on screen.
struct Shown {
    app: String,
    bounds: Rect,
}

/// Logs show/hide decisions and remembers the surface bounds.
pub struct LogPresenter {
    prefs: Arc<dyn DockPrefs>,
    size: PreviewSize,
    shown: Mutex<Option<Shown>>,
}

impl LogPresenter {
    /// Presenter sized by `size`, reading dock placement from `prefs`.
    pub fn new(prefs: Arc<dyn DockPrefs>, size: PreviewSize) -> Self {
        Self {
            prefs,
            size,
            shown: Mutex::new(None),
        }
    }
}

impl Presenter for LogPresenter {
    fn show(&self, req: ShowRequest) {
        let position = self.prefs.position();
        let bounds = surface_for(position, req.point, &req.display, &self.size);
        info!(
            app = %req.app,
            windows = req.windows.len(),
            dock = %position,
            autohide = self.prefs.autohide(),
            x = bounds.x,
            y = bounds.y,
            w = bounds.w,
            h = bounds.h,
            "preview_shown"
        );
        for w in &req.windows {
            debug!(id = w.id, pid = w.pid, title = %w.title, "preview_window");
        }
        *self.shown.lock() = Some(Shown {
            app: req.app,
            bounds,
        });
    }

    fn hide(&self) {
        if let Some(prev) = self.shown.lock().take() {
            info!(app = %prev.app, "preview_hidden");
        }
    }

    fn bounds(&self) -> Option<Rect> {
        self.shown.lock().as_ref().map(|s| s.bounds)
    }
}
