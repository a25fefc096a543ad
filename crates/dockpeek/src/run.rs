use std::error::Error as StdError;

use config::Config;

/// Result type for top-level commands.
pub type AppResult = Result<(), Box<dyn StdError>>;

#[cfg(target_os = "macos")]
pub use self::mac::{icons, run};

#[cfg(not(target_os = "macos"))]
/// Run the hover pipeline until Ctrl-C.
pub fn run(_cfg: &Config) -> AppResult {
    Err(dockpeek_engine::Error::Unsupported.into())
}

#[cfg(not(target_os = "macos"))]
/// Print the dock's icons.
pub fn icons(_cfg: &Config) -> AppResult {
    Err(dockpeek_engine::Error::Unsupported.into())
}

#[cfg(target_os = "macos")]
mod mac {
    use std::sync::Arc;

    use dockpeek_engine::{
        DockHitTester, DockPrefs, Engine, EventSource, Services,
        deps::{
            CgPointerTap, RealAxTree, RealDisplays, RealDockPrefs, RealProcessLookup,
            RealWindows,
        },
    };
    use tokio::{runtime::Builder, signal};
    use tracing::info;

    use super::{AppResult, Config};
    use crate::presenter::LogPresenter;

    /// Run the hover pipeline until Ctrl-C.
    ///
    /// The engine runs on a current-thread runtime driven from the main thread,
    /// so display reads can use AppKit.
    pub fn run(cfg: &Config) -> AppResult {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(serve(cfg))
    }

    /// Wire the engine to the platform and wait for Ctrl-C.
    async fn serve(cfg: &Config) -> AppResult {
        let locator = DockHitTester::new(
            RealAxTree,
            Arc::new(RealProcessLookup),
            cfg.dock_bundle_id.clone(),
        );
        let services = Services {
            locator: Arc::new(locator),
            displays: Arc::new(RealDisplays),
            windows: Arc::new(RealWindows),
            presenter: Arc::new(LogPresenter::new(Arc::new(RealDockPrefs), cfg.preview)),
        };
        let engine = Engine::spawn(services, cfg);
        let mut source = EventSource::new(CgPointerTap::default());
        if let Err(e) = source.start(engine.submitter()) {
            engine.shutdown().await?;
            return Err(e.into());
        }
        info!(bundle = %cfg.dock_bundle_id, "dockpeek_running");
        signal::ctrl_c().await?;
        info!("dockpeek_stopping");
        source.stop();
        engine.shutdown().await?;
        Ok(())
    }

    /// Print the dock's icons with their frames and running state.
    pub fn icons(cfg: &Config) -> AppResult {
        let prefs = RealDockPrefs;
        println!(
            "dock: position={} autohide={}",
            prefs.position(),
            prefs.autohide()
        );
        let tester = DockHitTester::new(
            RealAxTree,
            Arc::new(RealProcessLookup),
            cfg.dock_bundle_id.clone(),
        );
        for icon in tester.icons()? {
            let f = icon.frame;
            println!(
                "{:<32} {:>8.1} {:>8.1} {:>6.1} {:>6.1} {}",
                icon.title,
                f.x,
                f.y,
                f.w,
                f.h,
                if icon.is_running { "running" } else { "-" }
            );
        }
        Ok(())
    }
}
