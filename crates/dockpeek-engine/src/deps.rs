//! Collaborator interfaces consumed by the engine, plus the macOS-backed
//! implementations.
//!
//! Everything platform-specific reaches the engine through these traits, so the
//! state machine and debouncer can be exercised with the mocks in
//! [`crate::test_support`].

use async_trait::async_trait;
use dockpeek_geom::{DisplayDescriptor, DockPosition, Point, Rect};

use crate::{Result, debounce::Submitter, session::DismissHandle};

/// Process lookup by bundle identifier.
pub trait ProcessLookup: Send + Sync {
    /// PID of a running process with `bundle_id`, if any.
    fn pid_for_bundle(&self, bundle_id: &str) -> Option<i32>;
}

/// Read-only access to an Accessibility element tree.
///
/// Every call reads live state owned by another process; nodes are only valid
/// for the duration of one query.
pub trait AxTree: Send + Sync {
    /// Handle to one element.
    type Node;

    /// Root element for process `pid`.
    fn application(&self, pid: i32) -> Result<Self::Node>;
    /// Children in tree order.
    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>>;
    /// `AXRole`.
    fn role(&self, node: &Self::Node) -> Result<String>;
    /// `AXPosition` plus `AXSize`, in capture space.
    fn frame(&self, node: &Self::Node) -> Result<Rect>;
    /// `AXTitle`.
    fn title(&self, node: &Self::Node) -> Result<String>;
    /// `AXIsApplicationRunning`.
    fn is_running(&self, node: &Self::Node) -> Result<bool>;
}

/// Source of the current display set. Queried fresh for every computation.
pub trait DisplaySource: Send + Sync {
    /// Displays attached right now.
    fn displays(&self) -> Vec<DisplayDescriptor>;
}

/// One window of the hovered application.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowHandle {
    /// Platform window number.
    pub id: u32,
    /// Owning process.
    pub pid: i32,
    /// Window title (may be empty).
    pub title: String,
    /// Frame in capture space.
    pub bounds: Rect,
}

/// Asynchronous window enumeration for an application.
#[async_trait]
pub trait WindowEnumerator: Send + Sync {
    /// Windows currently open for `app`, front to back.
    async fn active_windows(&self, app: &str) -> Vec<WindowHandle>;
}

/// Everything the presenter needs to show a preview.
#[derive(Debug, Clone)]
pub struct ShowRequest {
    /// Application identifier (dock icon title).
    pub app: String,
    /// Non-empty window list.
    pub windows: Vec<WindowHandle>,
    /// Pointer location in local space.
    pub point: Point,
    /// Display the pointer is on.
    pub display: DisplayDescriptor,
    /// Invoke on explicit user dismissal.
    pub dismiss: DismissHandle,
}

/// The surface that renders previews. Only ever called from the engine task.
pub trait Presenter: Send + Sync {
    /// Show (or replace) the preview.
    fn show(&self, req: ShowRequest);
    /// Hide the preview. Must tolerate being called while hidden.
    fn hide(&self);
    /// Current surface bounds in local space, `None` while hidden.
    fn bounds(&self) -> Option<Rect>;
}

/// Dock appearance preferences.
pub trait DockPrefs: Send + Sync {
    /// Screen edge the dock is attached to.
    fn position(&self) -> DockPosition;
    /// Whether the dock auto-hides.
    fn autohide(&self) -> bool;
}

/// Platform hook delivering global pointer movement.
pub trait PointerTap: Send {
    /// Install the hook; every movement is handed to `sink`.
    fn install(&mut self, sink: Submitter) -> Result<()>;
    /// Remove the hook and release platform resources.
    fn remove(&mut self);
}

#[cfg(target_os = "macos")]
pub use self::mac::{
    CgPointerTap, RealAxTree, RealDisplays, RealDockPrefs, RealProcessLookup, RealWindows,
};

#[cfg(target_os = "macos")]
mod mac {
    use async_trait::async_trait;
    use dockpeek_geom::{DisplayDescriptor, DockPosition, Rect};
    use mac_dock::{ax, displays, prefs, process, tap::MouseTap, windows};
    use tracing::warn;

    use super::{
        AxTree, DisplaySource, DockPrefs, PointerTap, ProcessLookup, WindowEnumerator,
        WindowHandle,
    };
    use crate::{Error, Result, debounce::{PointerSample, Submitter}};

    /// Process lookup through `NSRunningApplication`.
    pub struct RealProcessLookup;

    impl ProcessLookup for RealProcessLookup {
        fn pid_for_bundle(&self, bundle_id: &str) -> Option<i32> {
            process::pid_for_bundle(bundle_id)
        }
    }

    /// Accessibility tree reads through the AX C API.
    pub struct RealAxTree;

    impl AxTree for RealAxTree {
        type Node = ax::AxElem;

        fn application(&self, pid: i32) -> Result<Self::Node> {
            ax::AxElem::application(pid).ok_or(Error::Structure("application element"))
        }
        fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>> {
            Ok(ax::children(node)?)
        }
        fn role(&self, node: &Self::Node) -> Result<String> {
            Ok(ax::string(node, ax::AX_ROLE)?)
        }
        fn frame(&self, node: &Self::Node) -> Result<Rect> {
            let origin = ax::position(node)?;
            let size = ax::size(node)?;
            Ok(Rect::from_origin_size(origin, size))
        }
        fn title(&self, node: &Self::Node) -> Result<String> {
            Ok(ax::string(node, ax::AX_TITLE)?)
        }
        fn is_running(&self, node: &Self::Node) -> Result<bool> {
            Ok(ax::boolean(node, ax::AX_IS_APPLICATION_RUNNING)?)
        }
    }

    /// Displays from CoreGraphics.
    pub struct RealDisplays;

    impl DisplaySource for RealDisplays {
        fn displays(&self) -> Vec<DisplayDescriptor> {
            displays::active_displays()
        }
    }

    /// On-screen windows from the CoreGraphics window list.
    pub struct RealWindows;

    #[async_trait]
    impl WindowEnumerator for RealWindows {
        async fn active_windows(&self, app: &str) -> Vec<WindowHandle> {
            let app = app.to_string();
            let listed = tokio::task::spawn_blocking(move || windows::windows_for_app(&app)).await;
            match listed {
                Ok(list) => list
                    .into_iter()
                    .map(|w| WindowHandle {
                        id: w.id,
                        pid: w.pid,
                        title: w.title,
                        bounds: w.bounds,
                    })
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "window_list_task_failed");
                    Vec::new()
                }
            }
        }
    }

    /// Dock preferences from the `com.apple.dock` domain.
    pub struct RealDockPrefs;

    impl DockPrefs for RealDockPrefs {
        fn position(&self) -> DockPosition {
            prefs::position()
        }
        fn autohide(&self) -> bool {
            prefs::autohide()
        }
    }

    /// Mouse-moved CoreGraphics event tap.
    #[derive(Default)]
    pub struct CgPointerTap {
        tap: Option<MouseTap>,
    }

    impl PointerTap for CgPointerTap {
        fn install(&mut self, sink: Submitter) -> Result<()> {
            let tap = MouseTap::start(move |p| sink.submit(PointerSample::new(p)))?;
            self.tap = Some(tap);
            Ok(())
        }

        fn remove(&mut self) {
            if let Some(mut tap) = self.tap.take() {
                tap.stop();
            }
        }
    }
}
