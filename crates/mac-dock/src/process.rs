//! Process lookup.

use objc2_app_kit::NSRunningApplication;
use objc2_foundation::NSString;
use tracing::trace;

/// PID of the first running application with `bundle_id`, if any.
pub fn pid_for_bundle(bundle_id: &str) -> Option<i32> {
    let id = NSString::from_str(bundle_id);
    #[allow(unused_unsafe)]
    let apps = unsafe { NSRunningApplication::runningApplicationsWithBundleIdentifier(&id) };
    let pid = apps.iter().next().map(|app| {
        #[allow(unused_unsafe)]
        let pid = unsafe { app.processIdentifier() };
        pid as i32
    });
    trace!(bundle_id, ?pid, "pid_for_bundle");
    pid
}
