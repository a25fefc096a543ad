//! Accessibility (AX) element reads.

use std::{cell::RefCell, collections::HashMap, ffi::c_void, ptr, thread_local};

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};
use dockpeek_geom::{Point, Size};

use crate::error::{Error, Result};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXValueGetValue(theValue: CFTypeRef, theType: i32, valuePtr: *mut c_void) -> bool;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFRetain(cf: CFTypeRef) -> CFTypeRef;
    fn CFGetTypeID(cf: CFTypeRef) -> u64;
    fn CFBooleanGetTypeID() -> u64;
    fn CFBooleanGetValue(b: CFTypeRef) -> bool;
    fn CFStringGetTypeID() -> u64;
}

// AXValue type constants (per Apple docs)
const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
// AX error for invalid UI element (element removed / stale reference)
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;

/// Child elements, in tree order.
pub const AX_CHILDREN: &str = "AXChildren";
/// Element role, e.g. `AXList` or `AXDockItem`.
pub const AX_ROLE: &str = "AXRole";
/// Top-left corner in capture space.
pub const AX_POSITION: &str = "AXPosition";
/// Extent in points.
pub const AX_SIZE: &str = "AXSize";
/// Display title; for dock items, the application name.
pub const AX_TITLE: &str = "AXTitle";
/// Whether the application behind a dock item is running.
pub const AX_IS_APPLICATION_RUNNING: &str = "AXIsApplicationRunning";

/// Mirrors CoreGraphics `CGPoint` for AXValue extraction.
#[repr(C)]
#[derive(Default)]
struct RawPoint {
    x: f64,
    y: f64,
}

/// Mirrors CoreGraphics `CGSize` for AXValue extraction.
#[repr(C)]
#[derive(Default)]
struct RawSize {
    width: f64,
    height: f64,
}

thread_local! {
    static ATTR_STRINGS: RefCell<HashMap<&'static str, CFString>> = RefCell::new(HashMap::new());
}

/// Stable `CFStringRef` for a known attribute name, cached per thread.
pub fn cfstr(name: &'static str) -> CFStringRef {
    ATTR_STRINGS.with(|cell| {
        let mut m = cell.borrow_mut();
        let s = m.entry(name).or_insert_with(|| CFString::new(name));
        s.as_concrete_TypeRef()
    })
}

/// Owned (+1 retained) reference to an `AXUIElementRef`.
pub struct AxElem(*mut c_void);

impl AxElem {
    /// Application element for `pid`.
    pub fn application(pid: i32) -> Option<Self> {
        let p = unsafe { AXUIElementCreateApplication(pid) };
        if p.is_null() { None } else { Some(Self(p)) }
    }

    /// Retain an element borrowed from a container we do not own.
    fn retain_from_borrowed(p: *mut c_void) -> Option<Self> {
        if p.is_null() {
            return None;
        }
        unsafe { CFRetain(p as CFTypeRef) };
        Some(Self(p))
    }

    /// Borrowed raw `AXUIElementRef`, valid while `self` is alive.
    #[inline]
    pub fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Clone for AxElem {
    fn clone(&self) -> Self {
        unsafe { CFRetain(self.0 as CFTypeRef) };
        Self(self.0)
    }
}

impl Drop for AxElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

/// Copy an attribute value. The returned reference follows the create rule.
fn copy_attr(el: &AxElem, attr: &'static str) -> Result<CFTypeRef> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(el.as_ptr(), cfstr(attr), &mut v) };
    if err != 0 {
        if err == K_AX_ERROR_INVALID_UI_ELEMENT {
            return Err(Error::ElementGone);
        }
        return Err(Error::AxCode(err));
    }
    if v.is_null() {
        return Err(Error::Unsupported(attr));
    }
    Ok(v)
}

/// Child elements in tree order.
pub fn children(el: &AxElem) -> Result<Vec<AxElem>> {
    let v = copy_attr(el, AX_CHILDREN)?;
    let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(v as _) };
    let n = unsafe { CFArrayGetCount(arr.as_concrete_TypeRef()) };
    let mut out = Vec::with_capacity(n.max(0) as usize);
    for i in 0..n {
        let p = unsafe { CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) } as *mut c_void;
        if let Some(child) = AxElem::retain_from_borrowed(p) {
            out.push(child);
        }
    }
    Ok(out)
}

/// String-valued attribute.
pub fn string(el: &AxElem, attr: &'static str) -> Result<String> {
    let v = copy_attr(el, attr)?;
    if unsafe { CFGetTypeID(v) != CFStringGetTypeID() } {
        unsafe { CFRelease(v) };
        return Err(Error::Unsupported(attr));
    }
    let s = unsafe { CFString::wrap_under_create_rule(v as CFStringRef) };
    Ok(s.to_string())
}

/// Boolean-valued attribute.
pub fn boolean(el: &AxElem, attr: &'static str) -> Result<bool> {
    let v = copy_attr(el, attr)?;
    let out = unsafe {
        if CFGetTypeID(v) == CFBooleanGetTypeID() {
            Ok(CFBooleanGetValue(v))
        } else {
            Err(Error::Unsupported(attr))
        }
    };
    unsafe { CFRelease(v) };
    out
}

/// `AXPosition` of an element, in capture space.
pub fn position(el: &AxElem) -> Result<Point> {
    let v = copy_attr(el, AX_POSITION)?;
    let mut p = RawPoint::default();
    let ok =
        unsafe { AXValueGetValue(v, K_AX_VALUE_CGPOINT_TYPE, &mut p as *mut _ as *mut c_void) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(Error::Unsupported(AX_POSITION));
    }
    Ok(Point::new(p.x, p.y))
}

/// `AXSize` of an element.
pub fn size(el: &AxElem) -> Result<Size> {
    let v = copy_attr(el, AX_SIZE)?;
    let mut s = RawSize::default();
    let ok = unsafe { AXValueGetValue(v, K_AX_VALUE_CGSIZE_TYPE, &mut s as *mut _ as *mut c_void) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(Error::Unsupported(AX_SIZE));
    }
    Ok(Size::new(s.width, s.height))
}
