//! Event source lifecycle around a [`PointerTap`].

use tracing::{debug, info, warn};

use crate::{Error, Result, debounce::Submitter, deps::PointerTap};

/// Installs and removes the global pointer hook.
///
/// A failed permission probe is reported as [`Error::PermissionDenied`] and
/// never retried here; callers invoke [`EventSource::start`] again once the
/// grant is in place.
pub struct EventSource<T: PointerTap> {
    tap: T,
    probe: fn() -> bool,
    running: bool,
}

impl<T: PointerTap> EventSource<T> {
    /// Source gated on the Accessibility permission.
    pub fn new(tap: T) -> Self {
        Self::with_probe(tap, permissions::accessibility_ok)
    }

    /// Source gated on a custom permission probe.
    pub fn with_probe(tap: T, probe: fn() -> bool) -> Self {
        Self {
            tap,
            probe,
            running: false,
        }
    }

    /// Install the hook and start forwarding samples to `sink`.
    pub fn start(&mut self, sink: Submitter) -> Result<()> {
        if self.running {
            return Err(Error::AlreadyStarted);
        }
        if !(self.probe)() {
            warn!("accessibility_permission_missing");
            return Err(Error::PermissionDenied("Accessibility"));
        }
        self.tap.install(sink)?;
        self.running = true;
        info!("event_source_started");
        Ok(())
    }

    /// Remove the hook. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.tap.remove();
        self.running = false;
        debug!("event_source_stopped");
    }

    /// Whether the hook is installed.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl<T: PointerTap> Drop for EventSource<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use config::OverlapPolicy;

    use super::*;
    use crate::{debounce, test_support::MockTap};

    fn denied() -> bool {
        false
    }

    fn granted() -> bool {
        true
    }

    #[test]
    fn start_and_stop() {
        let tap = MockTap::default();
        let mut src = EventSource::with_probe(tap.clone(), granted);
        let (tx, _rx) = debounce::channel(5.0, OverlapPolicy::Drop);
        src.start(tx).unwrap();
        assert!(src.is_running());
        assert_eq!(tap.installs(), 1);
        src.stop();
        src.stop();
        assert!(!src.is_running());
        assert_eq!(tap.removes(), 1);
    }

    #[test]
    fn permission_denied_is_explicit() {
        let tap = MockTap::default();
        let mut src = EventSource::with_probe(tap.clone(), denied);
        let (tx, _rx) = debounce::channel(5.0, OverlapPolicy::Drop);
        assert_eq!(
            src.start(tx),
            Err(Error::PermissionDenied("Accessibility"))
        );
        assert_eq!(tap.installs(), 0);
        assert!(!src.is_running());
    }

    #[test]
    fn second_start_is_rejected() {
        let tap = MockTap::default();
        let mut src = EventSource::with_probe(tap.clone(), granted);
        let (tx, _rx) = debounce::channel(5.0, OverlapPolicy::Drop);
        src.start(tx.clone()).unwrap();
        assert_eq!(src.start(tx), Err(Error::AlreadyStarted));
        assert_eq!(tap.installs(), 1);
    }

    #[test]
    fn install_failure_leaves_source_stopped() {
        let tap = MockTap::failing(Error::EventTapStart);
        let mut src = EventSource::with_probe(tap.clone(), granted);
        let (tx, _rx) = debounce::channel(5.0, OverlapPolicy::Drop);
        assert_eq!(src.start(tx), Err(Error::EventTapStart));
        assert!(!src.is_running());
        src.stop();
        assert_eq!(tap.removes(), 0);
    }

    #[test]
    fn drop_removes_hook() {
        let tap = MockTap::default();
        {
            let mut src = EventSource::with_probe(tap.clone(), granted);
            let (tx, _rx) = debounce::channel(5.0, OverlapPolicy::Drop);
            src.start(tx).unwrap();
        }
        assert_eq!(tap.removes(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn tap_samples_reach_the_debouncer() {
        let tap = MockTap::default();
        let mut src = EventSource::with_probe(tap.clone(), granted);
        let (tx, mut rx) = debounce::channel(5.0, OverlapPolicy::Drop);
        src.start(tx).unwrap();
        tap.emit(dockpeek_geom::Point::new(3.0, 4.0));
        let got = rx.next().await.unwrap();
        assert_eq!(got.location, dockpeek_geom::Point::new(3.0, 4.0));
    }
}
