//! Dock preference reads (`com.apple.dock` domain).

use core_foundation::{
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};
use dockpeek_geom::DockPosition;

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFPreferencesCopyAppValue(key: CFStringRef, applicationID: CFStringRef) -> CFTypeRef;
    fn CFGetTypeID(cf: CFTypeRef) -> u64;
    fn CFBooleanGetTypeID() -> u64;
    fn CFBooleanGetValue(b: CFTypeRef) -> bool;
    fn CFStringGetTypeID() -> u64;
}

const DOCK_DOMAIN: &str = "com.apple.dock";

/// Copy a preference value. The returned reference follows the create rule.
fn copy_value(key: &str) -> Option<CFTypeRef> {
    let k = CFString::new(key);
    let domain = CFString::new(DOCK_DOMAIN);
    let v = unsafe {
        CFPreferencesCopyAppValue(k.as_concrete_TypeRef(), domain.as_concrete_TypeRef())
    };
    if v.is_null() { None } else { Some(v) }
}

/// Raw `orientation` value, if set.
pub fn orientation() -> Option<String> {
    let v = copy_value("orientation")?;
    if unsafe { CFGetTypeID(v) != CFStringGetTypeID() } {
        unsafe { CFRelease(v) };
        return None;
    }
    let s = unsafe { CFString::wrap_under_create_rule(v as CFStringRef) };
    Some(s.to_string())
}

/// Edge the dock is attached to.
pub fn position() -> DockPosition {
    DockPosition::from_orientation(orientation().as_deref())
}

/// Whether the dock auto-hides. Absent means `false`.
pub fn autohide() -> bool {
    let Some(v) = copy_value("autohide") else {
        return false;
    };
    let out = unsafe { CFGetTypeID(v) == CFBooleanGetTypeID() && CFBooleanGetValue(v) };
    unsafe { CFRelease(v) };
    out
}
