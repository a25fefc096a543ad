//! Hover session state machine.
//!
//! The controller lives on the engine task and is the only code that touches
//! [`HoverSession`]. Window fetches run on their own tasks and report back
//! through a channel; each carries the generation it was issued under, and a
//! result whose generation no longer matches the pending one is discarded.

use std::{fmt, sync::Arc};

use dockpeek_geom::{Point, display_containing, to_local_space};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    Services,
    debounce::PointerSample,
    deps::{ShowRequest, WindowEnumerator, WindowHandle},
};

/// Controller phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing is considered hovered.
    #[default]
    Idle,
    /// An app was identified; its window list is being fetched.
    Resolving,
    /// A non-empty window list has been handed to the presenter.
    Presenting,
    /// The pointer left both the icon and the surface; hiding.
    Dismissing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Presenting => "presenting",
            Self::Dismissing => "dismissing",
        };
        f.write_str(s)
    }
}

/// Messages delivered to the engine task from outside the sample stream.
#[derive(Debug)]
pub(crate) enum Command {
    /// The presenter reported an explicit user dismissal.
    Dismiss,
}

/// Handed to the presenter with every `show`; invoking it dismisses the preview.
#[derive(Debug, Clone)]
pub struct DismissHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DismissHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Clear the session and return to idle. A no-op once the engine has stopped.
    pub fn dismiss(&self) {
        if self.tx.send(Command::Dismiss).is_err() {
            trace!("dismiss_after_shutdown");
        }
    }
}

/// Completed window fetch, on its way back to the engine task.
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    generation: u64,
    app: String,
    point: Point,
    windows: Vec<WindowHandle>,
}

/// An outstanding window fetch.
#[derive(Debug)]
struct PendingFetch {
    generation: u64,
    cancel: CancellationToken,
}

/// The process-wide hover record.
#[derive(Debug, Default)]
struct HoverSession {
    /// Hovered app, if any.
    active_app: Option<String>,
    /// Outstanding fetch, if any.
    pending: Option<PendingFetch>,
}

impl HoverSession {
    fn cancel_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            trace!(generation = p.generation, "window_fetch_superseded");
            p.cancel.cancel();
        }
    }
}

/// Drives [`HoverSession`] from accepted samples, fetch results and dismissals.
pub(crate) struct Controller {
    services: Services,
    session: HoverSession,
    generation: u64,
    phase: watch::Sender<Phase>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl Controller {
    pub(crate) fn new(
        services: Services,
        phase: watch::Sender<Phase>,
        fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
        cmd_tx: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            services,
            session: HoverSession::default(),
            generation: 0,
            phase,
            fetch_tx,
            cmd_tx,
        }
    }

    fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    fn set_phase(&self, next: Phase) {
        let prev = self.phase.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "phase");
        }
    }

    /// Process one accepted sample.
    pub(crate) fn on_sample(&mut self, sample: PointerSample) {
        match self.services.locator.icon_at(sample.location) {
            Some(app) => self.on_hit(app, sample.location),
            None => self.on_miss(sample.location),
        }
    }

    fn on_hit(&mut self, app: String, point: Point) {
        if self.session.active_app.as_deref() == Some(app.as_str()) {
            return;
        }
        debug!(app = %app, "hover_hit");
        self.session.cancel_pending();
        self.session.active_app = Some(app.clone());
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.session.pending = Some(PendingFetch {
            generation: self.generation,
            cancel: cancel.clone(),
        });
        self.set_phase(Phase::Resolving);
        spawn_fetch(
            self.services.windows.clone(),
            self.fetch_tx.clone(),
            cancel,
            self.generation,
            app,
            point,
        );
    }

    fn on_miss(&mut self, point: Point) {
        if self.phase() == Phase::Idle && self.session.active_app.is_none() {
            return;
        }
        if let Some(bounds) = self.services.presenter.bounds() {
            let displays = self.services.displays.displays();
            let local = match display_containing(&displays, point) {
                Some(d) => to_local_space(&displays, point, &d),
                None => point,
            };
            if bounds.contains(local) {
                trace!(x = local.x, y = local.y, "over_preview");
                return;
            }
        }
        debug!("hover_left");
        self.leave();
    }

    /// Apply a completed fetch, unless it was superseded.
    pub(crate) fn on_fetch(&mut self, outcome: FetchOutcome) {
        let current = self.session.pending.as_ref().map(|p| p.generation);
        if current != Some(outcome.generation) {
            trace!(
                generation = outcome.generation,
                app = %outcome.app,
                "stale_fetch_discarded"
            );
            return;
        }
        self.session.pending = None;
        if outcome.windows.is_empty() {
            debug!(app = %outcome.app, "no_windows");
            self.session.active_app = None;
            self.services.presenter.hide();
            self.set_phase(Phase::Idle);
            return;
        }
        let displays = self.services.displays.displays();
        let Some(display) = display_containing(&displays, outcome.point) else {
            warn!("no_displays");
            self.leave();
            return;
        };
        let local = to_local_space(&displays, outcome.point, &display);
        debug!(
            app = %outcome.app,
            windows = outcome.windows.len(),
            x = local.x,
            y = local.y,
            "show_preview"
        );
        self.services.presenter.show(ShowRequest {
            app: outcome.app,
            windows: outcome.windows,
            point: local,
            display,
            dismiss: DismissHandle::new(self.cmd_tx.clone()),
        });
        self.set_phase(Phase::Presenting);
    }

    /// Handle a command from outside the sample stream.
    pub(crate) fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Dismiss => {
                debug!("dismissed");
                self.leave();
            }
        }
    }

    /// Cancel outstanding work and hide anything shown.
    pub(crate) fn shutdown(&mut self) {
        if self.phase() != Phase::Idle || self.session.active_app.is_some() {
            self.leave();
        }
    }

    /// Clear the session, hide, and settle in idle.
    fn leave(&mut self) {
        self.session.cancel_pending();
        self.session.active_app = None;
        if self.phase() == Phase::Idle {
            return;
        }
        self.set_phase(Phase::Dismissing);
        self.services.presenter.hide();
        self.set_phase(Phase::Idle);
    }
}

fn spawn_fetch(
    windows: Arc<dyn WindowEnumerator>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    cancel: CancellationToken,
    generation: u64,
    app: String,
    point: Point,
) {
    tokio::spawn(async move {
        let listed = tokio::select! {
            _ = cancel.cancelled() => None,
            list = windows.active_windows(&app) => Some(list),
        };
        let Some(windows) = listed else {
            trace!(generation, app = %app, "window_fetch_cancelled");
            return;
        };
        let outcome = FetchOutcome {
            generation,
            app,
            point,
            windows,
        };
        if tx.send(outcome).is_err() {
            trace!(generation, "fetch_after_shutdown");
        }
    });
}
