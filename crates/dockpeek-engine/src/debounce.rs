//! Pointer sample coalescing and jitter suppression.
//!
//! Raw samples arrive from the event tap thread at event rate. They are written
//! into a single-slot [`watch`] channel, so a newer sample always replaces a
//! scheduled one that has not been picked up yet. The engine task drains the
//! slot, runs one pass at a time, and decides via [`OverlapPolicy`] what to do
//! with a sample that landed while that pass was running.

use std::{fmt, sync::Arc};

use config::OverlapPolicy;
use dockpeek_geom::Point;
use tokio::sync::watch;
use tracing::trace;

/// One raw pointer-moved event, in capture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Pointer location in capture space.
    pub location: Point,
}

impl PointerSample {
    /// Wrap a capture-space location.
    pub const fn new(location: Point) -> Self {
        Self { location }
    }
}

/// Outcome of comparing a sample against the last recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing was recorded yet; the sample was recorded and goes no further.
    Bootstrap,
    /// Both axes moved less than the threshold.
    Jitter,
    /// Far enough to process; the sample is now the recorded location.
    Accept,
}

/// Per-axis jitter filter.
#[derive(Debug, Clone)]
pub struct JitterFilter {
    /// Last recorded location.
    last: Option<Point>,
    /// Minimum per-axis displacement for a sample to be accepted.
    threshold: f64,
}

impl JitterFilter {
    /// New filter with nothing recorded.
    pub fn new(threshold: f64) -> Self {
        Self {
            last: None,
            threshold,
        }
    }

    /// Classify `p` and update the recorded location when appropriate.
    pub fn check(&mut self, p: Point) -> Verdict {
        let Some(last) = self.last else {
            self.last = Some(p);
            return Verdict::Bootstrap;
        };
        let dx = (p.x - last.x).abs();
        let dy = (p.y - last.y).abs();
        if dx < self.threshold && dy < self.threshold {
            return Verdict::Jitter;
        }
        self.last = Some(p);
        Verdict::Accept
    }

    /// Last recorded location, if any.
    pub fn last(&self) -> Option<Point> {
        self.last
    }
}

/// Clonable entry point used by event producers. Never blocks.
#[derive(Clone)]
pub struct Submitter {
    tx: Arc<watch::Sender<Option<PointerSample>>>,
}

impl fmt::Debug for Submitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitter")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl Submitter {
    /// Schedule `sample`, replacing any sample that has not started processing.
    pub fn submit(&self, sample: PointerSample) {
        self.tx.send_replace(Some(sample));
    }
}

/// Consumer half, owned by the engine task.
pub struct Debouncer {
    rx: watch::Receiver<Option<PointerSample>>,
    filter: JitterFilter,
    policy: OverlapPolicy,
}

/// Create a connected submitter/debouncer pair.
pub fn channel(threshold: f64, policy: OverlapPolicy) -> (Submitter, Debouncer) {
    let (tx, rx) = watch::channel(None);
    (
        Submitter { tx: Arc::new(tx) },
        Debouncer {
            rx,
            filter: JitterFilter::new(threshold),
            policy,
        },
    )
}

impl Debouncer {
    /// Wait for the next scheduled sample. `None` once every submitter is gone.
    ///
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<PointerSample> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(sample) = *self.rx.borrow_and_update() {
                return Some(sample);
            }
        }
    }

    /// Run the jitter filter. `true` means the sample should be processed.
    pub fn accept(&mut self, sample: &PointerSample) -> bool {
        match self.filter.check(sample.location) {
            Verdict::Bootstrap => {
                trace!(x = sample.location.x, y = sample.location.y, "pointer_bootstrap");
                false
            }
            Verdict::Jitter => false,
            Verdict::Accept => true,
        }
    }

    /// Called after every pass. Under [`OverlapPolicy::Drop`] a sample that
    /// arrived during the pass is discarded.
    pub fn finish_pass(&mut self) {
        if self.policy != OverlapPolicy::Drop {
            return;
        }
        if self.rx.has_changed().unwrap_or(false)
            && let Some(dropped) = *self.rx.borrow_and_update()
        {
            trace!(
                x = dropped.location.x,
                y = dropped.location.y,
                "pointer_dropped_during_pass"
            );
        }
    }

    /// The overlap policy in effect.
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn first_sample_bootstraps() {
        let mut f = JitterFilter::new(5.0);
        assert_eq!(f.check(pt(10.0, 10.0)), Verdict::Bootstrap);
        assert_eq!(f.last(), Some(pt(10.0, 10.0)));
    }

    #[test]
    fn sub_threshold_on_both_axes_is_jitter() {
        let mut f = JitterFilter::new(5.0);
        f.check(pt(10.0, 10.0));
        assert_eq!(f.check(pt(14.9, 5.1)), Verdict::Jitter);
        // Jitter does not move the reference point.
        assert_eq!(f.last(), Some(pt(10.0, 10.0)));
    }

    #[test]
    fn threshold_on_one_axis_is_accepted() {
        let mut f = JitterFilter::new(5.0);
        f.check(pt(10.0, 10.0));
        assert_eq!(f.check(pt(15.0, 10.0)), Verdict::Accept);
        assert_eq!(f.check(pt(15.0, 4.0)), Verdict::Accept);
        assert_eq!(f.last(), Some(pt(15.0, 4.0)));
    }

    #[test]
    fn per_axis_not_euclidean() {
        // (4, 4) is ~5.66 away but both axes are below 5.
        let mut f = JitterFilter::new(5.0);
        f.check(pt(0.0, 0.0));
        assert_eq!(f.check(pt(4.0, 4.0)), Verdict::Jitter);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn latest_sample_replaces_unprocessed_ones() {
        let (tx, mut rx) = channel(5.0, OverlapPolicy::Drop);
        for i in 0..10 {
            tx.submit(PointerSample::new(pt(f64::from(i) * 10.0, 0.0)));
        }
        let got = rx.next().await.unwrap();
        assert_eq!(got.location, pt(90.0, 0.0));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn drop_policy_discards_sample_from_running_pass() {
        let (tx, mut rx) = channel(5.0, OverlapPolicy::Drop);
        tx.submit(PointerSample::new(pt(0.0, 0.0)));
        rx.next().await.unwrap();
        tx.submit(PointerSample::new(pt(50.0, 0.0)));
        rx.finish_pass();
        let waited = tokio::time::timeout(Duration::from_millis(20), rx.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn queue_latest_keeps_sample_from_running_pass() {
        let (tx, mut rx) = channel(5.0, OverlapPolicy::QueueLatest);
        tx.submit(PointerSample::new(pt(0.0, 0.0)));
        rx.next().await.unwrap();
        tx.submit(PointerSample::new(pt(50.0, 0.0)));
        tx.submit(PointerSample::new(pt(60.0, 0.0)));
        rx.finish_pass();
        assert_eq!(rx.next().await.unwrap().location, pt(60.0, 0.0));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn next_ends_when_submitters_are_gone() {
        let (tx, mut rx) = channel(5.0, OverlapPolicy::Drop);
        drop(tx);
        assert!(rx.next().await.is_none());
    }
}
