//! Listen-only CoreGraphics event tap for global mouse movement.
//!
//! The tap runs on a dedicated thread with its own CFRunLoop. Each
//! `MouseMoved` event is handed to the caller's sink with its location in
//! capture space. The tap never alters or swallows events.

use std::{
    ffi::c_void,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicPtr, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use core_foundation::{
    base::TCFType,
    mach_port::CFMachPortRef,
    runloop::{CFRunLoop, kCFRunLoopCommonModes, kCFRunLoopDefaultMode},
};
use core_graphics::event::{self as cge, CallbackResult};
use crossbeam_channel::{Sender, bounded};
use dockpeek_geom::Point;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// How long one run loop slice lasts before the stop flag is rechecked.
const RUN_SLICE: Duration = Duration::from_millis(250);

/// Shared control handle to stop the tap's run loop from other threads.
struct TapControl {
    rl: Mutex<Option<CFRunLoop>>,
    stopped: AtomicBool,
}

impl TapControl {
    fn new() -> Self {
        Self {
            rl: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn set_rl(&self, rl: CFRunLoop) {
        *self.rl.lock() = Some(rl);
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(rl) = self.rl.lock().take() {
            rl.stop();
        }
    }
}

/// A running mouse-movement tap. Dropping it stops the tap.
pub struct MouseTap {
    ctrl: Arc<TapControl>,
    handle: Option<JoinHandle<()>>,
}

impl MouseTap {
    /// Install the tap and start forwarding pointer locations to `sink`.
    ///
    /// Blocks until the tap thread reports that the tap is live or that it
    /// could not be created.
    pub fn start<F>(sink: F) -> Result<Self>
    where
        F: Fn(Point) + Send + 'static,
    {
        let ctrl = Arc::new(TapControl::new());
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let ctrl_thread = ctrl.clone();
        let handle = thread::Builder::new()
            .name("dockpeek-mouse-tap".into())
            .spawn(move || {
                if let Err(e) = run_tap(sink, &ready_tx, &ctrl_thread) {
                    warn!(error = %e, "mouse_tap_thread_failed");
                }
            })
            .map_err(|e| {
                warn!(error = %e, "mouse_tap_spawn_failed");
                Error::EventTapStart
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                ctrl,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(Error::EventTapStart)
            }
        }
    }

    /// Stop the run loop and join the tap thread. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.ctrl.stop();
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                warn!("mouse_tap_thread_panicked");
            }
            debug!("mouse_tap_stopped");
        }
    }
}

impl Drop for MouseTap {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tap<F>(sink: F, ready: &Sender<Result<()>>, ctrl: &TapControl) -> Result<()>
where
    F: Fn(Point) + Send + 'static,
{
    // Capture for re-enabling the tap from inside the closure.
    let tap_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));

    debug!("creating_mouse_tap");
    let tap_port_ptr_cb = tap_port_ptr.clone();
    let tap = match cge::CGEventTap::new(
        cge::CGEventTapLocation::HID,
        cge::CGEventTapPlacement::HeadInsertEventTap,
        cge::CGEventTapOptions::ListenOnly,
        vec![cge::CGEventType::MouseMoved],
        move |_proxy, etype, event| {
            match etype {
                cge::CGEventType::MouseMoved => {
                    let loc = event.location();
                    trace!(x = loc.x, y = loc.y, "tap_mouse_moved");
                    sink(Point::new(loc.x, loc.y));
                }
                cge::CGEventType::TapDisabledByTimeout
                | cge::CGEventType::TapDisabledByUserInput => {
                    let p = tap_port_ptr_cb.load(Ordering::SeqCst) as CFMachPortRef;
                    if !p.is_null() {
                        warn!("tap_disabled_by_os_reenabling");
                        unsafe { CGEventTapEnable(p, true) };
                    }
                }
                _ => {}
            }
            CallbackResult::Keep
        },
    ) {
        Ok(t) => t,
        Err(_) => {
            warn!("mouse_tap_create_failed");
            let _ = ready.send(Err(Error::EventTapStart));
            return Err(Error::EventTapStart);
        }
    };

    tap_port_ptr.store(
        tap.mach_port().as_concrete_TypeRef() as *mut c_void,
        Ordering::SeqCst,
    );

    let source = match tap.mach_port().create_runloop_source(0) {
        Ok(s) => s,
        Err(_) => {
            warn!("run_loop_source_create_failed");
            let _ = ready.send(Err(Error::EventTapStart));
            return Err(Error::EventTapStart);
        }
    };

    let rl = CFRunLoop::get_current();
    ctrl.set_rl(rl.clone());
    let mode = unsafe { kCFRunLoopCommonModes };
    rl.add_source(&source, mode);

    tap.enable();

    let _ = ready.send(Ok(()));
    debug!("mouse_tap_started_run_loop");

    // A stop that lands before the loop starts running is caught by the flag.
    while !ctrl.is_stopped() {
        CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, RUN_SLICE, false);
    }

    debug!("mouse_tap_exited");
    Ok(())
}
