//! Test support utilities for dockpeek-engine unit and integration tests.
//! These mocks are public so the `tests/` directory can use them; they never
//! touch the OS.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dockpeek_geom::{DisplayDescriptor, Point, Rect};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::{
    Error, Result,
    debounce::{PointerSample, Submitter},
    deps::{
        AxTree, DisplaySource, PointerTap, Presenter, ProcessLookup, ShowRequest,
        WindowEnumerator, WindowHandle,
    },
    hit_test::{DockIconRecord, IconLocator, LIST_ROLE},
    session::DismissHandle,
};

/// Let spawned tasks and the engine loop run until they block.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// A primary display of the given size, anchored at the origin.
pub fn primary_display(w: f64, h: f64) -> DisplayDescriptor {
    let frame = Rect::new(0.0, 0.0, w, h);
    DisplayDescriptor {
        frame,
        visible_frame: frame,
        is_primary: true,
    }
}

/// A window handle with an arbitrary frame.
pub fn window(id: u32, pid: i32, title: &str) -> WindowHandle {
    WindowHandle {
        id,
        pid,
        title: title.to_string(),
        bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
    }
}

/// Node handle in a [`MockTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockNode {
    /// Application element.
    Root,
    /// Unrelated sibling of the icon list.
    Decoy,
    /// The icon list.
    List,
    /// Icon at the given index.
    Icon(usize),
}

#[derive(Debug)]
struct TreeState {
    icons: Vec<DockIconRecord>,
    list_role: String,
    root_error: Option<Error>,
    frame_failures: Vec<String>,
}

/// Mutable in-memory dock tree: `Root -> [Decoy, List -> [Icon..]]`.
#[derive(Debug, Clone)]
pub struct MockTree {
    state: Arc<Mutex<TreeState>>,
}

impl MockTree {
    /// Tree holding `icons` in order.
    pub fn with_icons(icons: Vec<DockIconRecord>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TreeState {
                icons,
                list_role: LIST_ROLE.to_string(),
                root_error: None,
                frame_failures: Vec::new(),
            })),
        }
    }

    /// Replace the icon list, as the dock does when apps launch or quit.
    pub fn set_icons(&self, icons: Vec<DockIconRecord>) {
        self.state.lock().icons = icons;
    }

    /// Give the list element a different role.
    pub fn set_list_role(&self, role: &str) {
        self.state.lock().list_role = role.to_string();
    }

    /// Make `application()` fail.
    pub fn fail_root(&self, err: Error) {
        self.state.lock().root_error = Some(err);
    }

    /// Make frame reads fail for the icon titled `title`.
    pub fn fail_frame(&self, title: &str) {
        self.state.lock().frame_failures.push(title.to_string());
    }

    fn icon(&self, node: &MockNode) -> Result<DockIconRecord> {
        let MockNode::Icon(i) = node else {
            return Err(Error::Unsupported);
        };
        self.state
            .lock()
            .icons
            .get(*i)
            .cloned()
            .ok_or(Error::ElementGone)
    }
}

impl AxTree for MockTree {
    type Node = MockNode;

    fn application(&self, _pid: i32) -> Result<MockNode> {
        match &self.state.lock().root_error {
            Some(e) => Err(e.clone()),
            None => Ok(MockNode::Root),
        }
    }

    fn children(&self, node: &MockNode) -> Result<Vec<MockNode>> {
        Ok(match node {
            MockNode::Root => vec![MockNode::Decoy, MockNode::List],
            MockNode::List => (0..self.state.lock().icons.len())
                .map(MockNode::Icon)
                .collect(),
            _ => Vec::new(),
        })
    }

    fn role(&self, node: &MockNode) -> Result<String> {
        Ok(match node {
            MockNode::Root => "AXApplication".to_string(),
            MockNode::Decoy => "AXGroup".to_string(),
            MockNode::List => self.state.lock().list_role.clone(),
            MockNode::Icon(_) => "AXDockItem".to_string(),
        })
    }

    fn frame(&self, node: &MockNode) -> Result<Rect> {
        let icon = self.icon(node)?;
        if self.state.lock().frame_failures.contains(&icon.title) {
            return Err(Error::AxCode(-25212));
        }
        Ok(icon.frame)
    }

    fn title(&self, node: &MockNode) -> Result<String> {
        Ok(self.icon(node)?.title)
    }

    fn is_running(&self, node: &MockNode) -> Result<bool> {
        Ok(self.icon(node)?.is_running)
    }
}

/// Process lookup returning a fixed dock pid, or nothing.
#[derive(Debug, Default)]
pub struct MockProcesses {
    pid: Option<i32>,
}

impl MockProcesses {
    /// Lookup that finds the dock at `pid`.
    pub fn dock(pid: i32) -> Self {
        Self { pid: Some(pid) }
    }
}

impl ProcessLookup for MockProcesses {
    fn pid_for_bundle(&self, _bundle_id: &str) -> Option<i32> {
        self.pid
    }
}

/// Display source with a replaceable display set.
#[derive(Debug, Default)]
pub struct StaticDisplays {
    displays: Mutex<Vec<DisplayDescriptor>>,
}

impl StaticDisplays {
    /// Source reporting `displays`.
    pub fn new(displays: Vec<DisplayDescriptor>) -> Self {
        Self {
            displays: Mutex::new(displays),
        }
    }

    /// Simulate a display reconfiguration.
    pub fn set(&self, displays: Vec<DisplayDescriptor>) {
        *self.displays.lock() = displays;
    }
}

impl DisplaySource for StaticDisplays {
    fn displays(&self) -> Vec<DisplayDescriptor> {
        self.displays.lock().clone()
    }
}

/// Window enumerator with per-app results and optional gates.
#[derive(Debug, Default)]
pub struct MockWindows {
    results: Mutex<HashMap<String, Vec<WindowHandle>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl MockWindows {
    /// Set the windows returned for `app`.
    pub fn set(&self, app: &str, windows: Vec<WindowHandle>) {
        self.results.lock().insert(app.to_string(), windows);
    }

    /// Make fetches for `app` wait until [`MockWindows::release`].
    pub fn hold(&self, app: &str) {
        self.gates
            .lock()
            .insert(app.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held fetch for `app` complete.
    pub fn release(&self, app: &str) {
        if let Some(gate) = self.gates.lock().get(app) {
            gate.add_permits(1);
        }
    }

    /// Apps fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WindowEnumerator for MockWindows {
    async fn active_windows(&self, app: &str) -> Vec<WindowHandle> {
        self.calls.lock().push(app.to_string());
        let gate = self.gates.lock().get(app).cloned();
        if let Some(gate) = gate
            && let Ok(permit) = gate.acquire().await
        {
            permit.forget();
        }
        self.results.lock().get(app).cloned().unwrap_or_default()
    }
}

/// A presenter call as recorded by [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    /// `show` with the app, the window count and the local point.
    Show {
        /// App identifier.
        app: String,
        /// Number of windows.
        windows: usize,
        /// Local-space pointer location.
        point: Point,
        /// Target display.
        display: DisplayDescriptor,
    },
    /// `hide`.
    Hide,
}

/// Presenter that records calls and reports a fixed surface while shown.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    surface: Option<Rect>,
    bounds: Mutex<Option<Rect>>,
    calls: Mutex<Vec<PresenterCall>>,
    dismiss: Mutex<Option<DismissHandle>>,
}

impl RecordingPresenter {
    /// Presenter whose surface occupies `surface` (local space) while shown.
    pub fn with_surface(surface: Rect) -> Self {
        Self {
            surface: Some(surface),
            ..Self::default()
        }
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().clone()
    }

    /// Number of `show` calls.
    pub fn shows(&self) -> usize {
        self.count(|c| matches!(c, PresenterCall::Show { .. }))
    }

    /// Number of `hide` calls.
    pub fn hides(&self) -> usize {
        self.count(|c| matches!(c, PresenterCall::Hide))
    }

    /// Dismiss handle from the latest `show`.
    pub fn last_dismiss(&self) -> Option<DismissHandle> {
        self.dismiss.lock().clone()
    }

    fn count(&self, f: impl Fn(&PresenterCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| f(c)).count()
    }
}

impl Presenter for RecordingPresenter {
    fn show(&self, req: ShowRequest) {
        self.calls.lock().push(PresenterCall::Show {
            app: req.app,
            windows: req.windows.len(),
            point: req.point,
            display: req.display,
        });
        *self.dismiss.lock() = Some(req.dismiss);
        *self.bounds.lock() = self.surface;
    }

    fn hide(&self) {
        self.calls.lock().push(PresenterCall::Hide);
        *self.bounds.lock() = None;
    }

    fn bounds(&self) -> Option<Rect> {
        *self.bounds.lock()
    }
}

type PassHook = Box<dyn Fn(Point) + Send + Sync>;

/// Locator mapping capture-space regions to app titles; records every query.
#[derive(Default)]
pub struct ScriptedLocator {
    regions: Mutex<Vec<(Rect, String)>>,
    calls: Mutex<Vec<Point>>,
    hook: Mutex<Option<PassHook>>,
}

impl ScriptedLocator {
    /// Report `app` for points inside `region`. Earlier regions win.
    pub fn add(&self, region: Rect, app: &str) {
        self.regions.lock().push((region, app.to_string()));
    }

    /// Run `f` inside every query, i.e. while a pass is executing.
    pub fn during_pass(&self, f: impl Fn(Point) + Send + Sync + 'static) {
        *self.hook.lock() = Some(Box::new(f));
    }

    /// Points queried so far.
    pub fn calls(&self) -> Vec<Point> {
        self.calls.lock().clone()
    }
}

impl IconLocator for ScriptedLocator {
    fn icon_at(&self, point: Point) -> Option<String> {
        self.calls.lock().push(point);
        if let Some(hook) = self.hook.lock().as_ref() {
            hook(point);
        }
        self.regions
            .lock()
            .iter()
            .find(|(r, _)| r.contains(point))
            .map(|(_, app)| app.clone())
    }
}

#[derive(Debug, Default)]
struct TapState {
    installs: usize,
    removes: usize,
    sink: Option<Submitter>,
    fail: Option<Error>,
}

/// Pointer tap that hands out samples on demand.
#[derive(Debug, Clone, Default)]
pub struct MockTap {
    state: Arc<Mutex<TapState>>,
}

impl MockTap {
    /// Tap whose install always fails with `err`.
    pub fn failing(err: Error) -> Self {
        let tap = Self::default();
        tap.state.lock().fail = Some(err);
        tap
    }

    /// Deliver a pointer-moved event.
    pub fn emit(&self, p: Point) {
        if let Some(sink) = &self.state.lock().sink {
            sink.submit(PointerSample::new(p));
        }
    }

    /// Successful installs so far.
    pub fn installs(&self) -> usize {
        self.state.lock().installs
    }

    /// Removals so far.
    pub fn removes(&self) -> usize {
        self.state.lock().removes
    }
}

impl PointerTap for MockTap {
    fn install(&mut self, sink: Submitter) -> Result<()> {
        let mut st = self.state.lock();
        if let Some(e) = &st.fail {
            return Err(e.clone());
        }
        st.installs += 1;
        st.sink = Some(sink);
        Ok(())
    }

    fn remove(&mut self) {
        let mut st = self.state.lock();
        st.removes += 1;
        st.sink = None;
    }
}
