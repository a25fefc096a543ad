//! On-screen window listing via `CGWindowListCopyWindowInfo`.

use std::ffi::c_void;

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFTypeRef, TCFType},
    dictionary::{CFDictionaryGetValue, CFDictionaryRef},
    number::CFNumber,
    string::{CFString, CFStringRef},
};
use core_graphics::window as cgw;
use dockpeek_geom::Rect;
use tracing::{trace, warn};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowListCopyWindowInfo(option: u32, relativeToWindow: u32) -> CFTypeRef; // CFArrayRef
    fn CGRectMakeWithDictionaryRepresentation(dict: CFDictionaryRef, rect: *mut RawRect) -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFGetTypeID(cf: CFTypeRef) -> u64;
    fn CFDictionaryGetTypeID() -> u64;
}

const K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY: u32 = 1 << 0;
const K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS: u32 = 1 << 4;

/// Mirrors CoreGraphics `CGRect`.
#[repr(C)]
#[derive(Default)]
struct RawRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// One on-screen window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Owning application's name.
    pub app: String,
    /// Window title; empty without Screen Recording permission.
    pub title: String,
    /// Owning process.
    pub pid: i32,
    /// CoreGraphics window number.
    pub id: u32,
    /// Frame in capture space.
    pub bounds: Rect,
}

fn dict_value(dict: CFDictionaryRef, key: CFStringRef) -> Option<*const c_void> {
    let v = unsafe { CFDictionaryGetValue(dict, key as *const c_void) };
    if v.is_null() { None } else { Some(v) }
}

fn dict_string(dict: CFDictionaryRef, key: CFStringRef) -> Option<String> {
    let v = dict_value(dict, key)?;
    let s = unsafe { CFString::wrap_under_get_rule(v as CFStringRef) };
    Some(s.to_string())
}

fn dict_i64(dict: CFDictionaryRef, key: CFStringRef) -> Option<i64> {
    let v = dict_value(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(v as _) };
    n.to_i64()
}

fn dict_rect(dict: CFDictionaryRef, key: CFStringRef) -> Option<Rect> {
    let v = dict_value(dict, key)?;
    let mut r = RawRect::default();
    let ok = unsafe { CGRectMakeWithDictionaryRepresentation(v as CFDictionaryRef, &mut r) };
    ok.then(|| Rect::new(r.x, r.y, r.w, r.h))
}

/// Normal-layer, on-screen windows whose owner name equals `app`, front to back.
pub fn windows_for_app(app: &str) -> Vec<WindowInfo> {
    let mut out = Vec::new();
    unsafe {
        let arr_ref = CGWindowListCopyWindowInfo(
            K_CG_WINDOW_LIST_OPTION_ON_SCREEN_ONLY
                | K_CG_WINDOW_LIST_OPTION_EXCLUDE_DESKTOP_ELEMENTS,
            0,
        );
        if arr_ref.is_null() {
            warn!("windows_for_app: CGWindowListCopyWindowInfo returned null");
            return out;
        }
        let arr: CFArray<*const c_void> = CFArray::wrap_under_create_rule(arr_ref as _);
        for i in 0..CFArrayGetCount(arr.as_concrete_TypeRef()) {
            let item = CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) as CFTypeRef;
            if item.is_null() || CFGetTypeID(item) != CFDictionaryGetTypeID() {
                continue;
            }
            let d = item as CFDictionaryRef;
            if dict_string(d, cgw::kCGWindowOwnerName).as_deref() != Some(app) {
                continue;
            }
            // Layer 0 holds regular app windows; menus and panels sit above it.
            if dict_i64(d, cgw::kCGWindowLayer) != Some(0) {
                continue;
            }
            let (Some(pid), Some(id)) = (
                dict_i64(d, cgw::kCGWindowOwnerPID),
                dict_i64(d, cgw::kCGWindowNumber),
            ) else {
                continue;
            };
            let Some(bounds) = dict_rect(d, cgw::kCGWindowBounds) else {
                continue;
            };
            if bounds.w <= 1.0 || bounds.h <= 1.0 {
                continue;
            }
            out.push(WindowInfo {
                app: app.to_string(),
                title: dict_string(d, cgw::kCGWindowName).unwrap_or_default(),
                pid: pid as i32,
                id: id as u32,
                bounds,
            });
        }
    }
    trace!(app, count = out.len(), "windows_for_app");
    out
}
