//! Permission preflight checks for dockpeek.
//!
//! Observing global pointer movement and reading the dock's Accessibility
//! tree both require the Accessibility grant. Window titles in the on-screen
//! window list additionally need Screen Recording. These calls only report
//! state; guiding the user to System Settings is the host's job.
//!
//! On targets other than macOS there is nothing to gate and every check
//! reports `true`.

#[cfg(target_os = "macos")]
mod sys {
    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        pub fn AXIsProcessTrusted() -> bool;
        pub fn CGPreflightListenEventAccess() -> bool;
        pub fn CGPreflightScreenCaptureAccess() -> bool;
    }
}

/// Check the global Accessibility permission.
#[cfg(target_os = "macos")]
pub fn accessibility_ok() -> bool {
    unsafe { sys::AXIsProcessTrusted() }
}

/// Check the "Input Monitoring" permission (listening to global events).
#[cfg(target_os = "macos")]
pub fn input_monitoring_ok() -> bool {
    unsafe { sys::CGPreflightListenEventAccess() }
}

/// Check the "Screen Recording" permission.
///
/// Without it `CGWindowListCopyWindowInfo` omits window titles.
#[cfg(target_os = "macos")]
pub fn screen_recording_ok() -> bool {
    unsafe { sys::CGPreflightScreenCaptureAccess() }
}

/// Check the global Accessibility permission.
#[cfg(not(target_os = "macos"))]
pub fn accessibility_ok() -> bool {
    true
}

/// Check the "Input Monitoring" permission (listening to global events).
#[cfg(not(target_os = "macos"))]
pub fn input_monitoring_ok() -> bool {
    true
}

/// Check the "Screen Recording" permission.
#[cfg(not(target_os = "macos"))]
pub fn screen_recording_ok() -> bool {
    true
}

/// Current permission status for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionsStatus {
    /// Accessibility (AX) permission; `true` if granted.
    pub accessibility_ok: bool,
    /// Input Monitoring permission; `true` if granted.
    pub input_ok: bool,
    /// Screen Recording permission; `true` if granted.
    pub screen_recording_ok: bool,
}

impl PermissionsStatus {
    /// Whether hover detection can run at all.
    pub fn can_observe(&self) -> bool {
        self.accessibility_ok
    }

    /// Missing permissions that prevent hover detection from starting.
    pub fn blocking(&self) -> Vec<&'static str> {
        if self.accessibility_ok {
            Vec::new()
        } else {
            vec!["Accessibility"]
        }
    }

    /// Names of the missing permissions, in a stable order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.accessibility_ok {
            out.push("Accessibility");
        }
        if !self.input_ok {
            out.push("Input Monitoring");
        }
        if !self.screen_recording_ok {
            out.push("Screen Recording");
        }
        out
    }
}

/// Query all permissions at once. Performs no prompting.
pub fn check_permissions() -> PermissionsStatus {
    PermissionsStatus {
        accessibility_ok: accessibility_ok(),
        input_ok: input_monitoring_ok(),
        screen_recording_ok: screen_recording_ok(),
    }
}
