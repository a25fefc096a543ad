//! dockpeek engine
//!
//! Turns a stream of global pointer samples into show/hide decisions for a
//! dock window preview:
//! - [`debounce`]: jitter suppression and latest-only coalescing
//! - [`hit_test`]: which running dock icon, if any, is under the pointer
//! - [`session`]: the hover state machine and asynchronous window fetches
//! - [`source`]: lifecycle of the platform pointer hook
//!
//! All decisions are made on one tokio task started by [`Engine::spawn`].
//! Platform access goes through the traits in [`deps`].

use std::sync::Arc;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub mod debounce;
pub mod deps;
mod error;
pub mod hit_test;
pub mod session;
pub mod source;
pub mod test_support;

pub use debounce::{PointerSample, Submitter};
pub use deps::{
    AxTree, DisplaySource, DockPrefs, PointerTap, Presenter, ProcessLookup, ShowRequest,
    WindowEnumerator, WindowHandle,
};
pub use error::{Error, Result};
pub use hit_test::{DockHitTester, DockIconRecord, IconLocator};
pub use session::{DismissHandle, Phase};
pub use source::EventSource;

use session::Controller;

/// Collaborators the engine consults on every pass.
#[derive(Clone)]
pub struct Services {
    /// Dock hit testing.
    pub locator: Arc<dyn IconLocator>,
    /// Current display set.
    pub displays: Arc<dyn DisplaySource>,
    /// Window list source.
    pub windows: Arc<dyn WindowEnumerator>,
    /// Preview surface.
    pub presenter: Arc<dyn Presenter>,
}

/// Entry point: starts the cooperative engine task.
pub struct Engine;

impl Engine {
    /// Spawn the engine task on the current tokio runtime.
    pub fn spawn(services: Services, cfg: &config::Config) -> EngineHandle {
        let (submitter, mut debouncer) = debounce::channel(cfg.jitter_threshold, cfg.overlap);
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);
        let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let mut controller = Controller::new(services, phase_tx, fetch_tx, cmd_tx.clone());
        let stop = shutdown.clone();
        debug!(policy = ?debouncer.policy(), threshold = cfg.jitter_threshold, "engine_start");
        let join = tokio::spawn(async move {
            let mut samples_open = true;
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    Some(cmd) = cmd_rx.recv() => controller.on_command(cmd),
                    Some(outcome) = fetch_rx.recv() => controller.on_fetch(outcome),
                    next = debouncer.next(), if samples_open => match next {
                        Some(sample) => {
                            if debouncer.accept(&sample) {
                                controller.on_sample(sample);
                            }
                            debouncer.finish_pass();
                        }
                        None => {
                            trace!("sample_stream_closed");
                            samples_open = false;
                        }
                    },
                }
            }
            controller.shutdown();
            debug!("engine_stop");
        });

        EngineHandle {
            submitter,
            cmd_tx,
            phase: phase_rx,
            shutdown,
            join: Some(join),
        }
    }
}

/// Owner handle for a running engine. Dropping it stops the engine task.
pub struct EngineHandle {
    /// Sample entry point.
    submitter: Submitter,
    /// Out-of-band commands (dismissal).
    cmd_tx: mpsc::UnboundedSender<session::Command>,
    /// Published controller phase.
    phase: watch::Receiver<Phase>,
    /// Stops the engine loop.
    shutdown: CancellationToken,
    /// Engine task, taken by `shutdown`.
    join: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Clonable sample entry point for event producers.
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Schedule a sample.
    pub fn submit(&self, sample: PointerSample) {
        self.submitter.submit(sample);
    }

    /// Current controller phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Watch phase changes.
    pub fn phase_watch(&self) -> watch::Receiver<Phase> {
        self.phase.clone()
    }

    /// Dismiss handle equivalent to the one passed to the presenter.
    pub fn dismiss_handle(&self) -> DismissHandle {
        DismissHandle::new(self.cmd_tx.clone())
    }

    /// Stop the engine task, cancelling any pending fetch and hiding the preview.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        match self.join.take() {
            Some(join) => join.await.map_err(|_| Error::ChannelClosed),
            None => Ok(()),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
