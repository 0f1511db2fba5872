//! C-ABI invocable objects.
//!
//! Layout contract shared with `include/rtcc/invocable.h`:
//!
//! ```text
//! RawInvocable { vtable ──▶ InvocableVTable { setup, update, teardown, destroy } }
//! ```
//!
//! The object is allocated by compiled code and released only through its
//! own `destroy` entry.

use std::ffi::c_void;
use std::ptr::NonNull;

use crate::{HostContext, Invocable, Status};

/// Function table every C-ABI invocable object points to.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InvocableVTable {
    pub setup: unsafe extern "C" fn(
        this: *mut RawInvocable,
        host: *mut c_void,
        outputs: *mut f64,
        output_count: usize,
        inputs: *const f64,
        input_count: usize,
    ) -> i32,
    pub update: unsafe extern "C" fn(
        this: *mut RawInvocable,
        host: *mut c_void,
        outputs: *mut f64,
        output_count: usize,
        inputs: *const f64,
        input_count: usize,
    ) -> i32,
    pub teardown: unsafe extern "C" fn(this: *mut RawInvocable, host: *mut c_void) -> i32,
    pub destroy: unsafe extern "C" fn(this: *mut RawInvocable),
}

/// Header of a C-ABI invocable object.
#[repr(C)]
#[derive(Debug)]
pub struct RawInvocable {
    pub vtable: *const InvocableVTable,
}

/// Signature of a factory symbol: no arguments, returns an owned object.
pub type InvocableFactory = unsafe extern "C" fn() -> *mut RawInvocable;

/// Owning handle to a C-ABI invocable object.
#[derive(Debug)]
pub struct NativeInvocable {
    ptr: NonNull<RawInvocable>,
}

// SAFETY: the handle owns the object exclusively.
unsafe impl Send for NativeInvocable {}

impl NativeInvocable {
    /// Take ownership of an object. Returns `None` for null pointers and
    /// objects without a vtable.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live object whose vtable entries
    /// match [`InvocableVTable`], and nothing else may own it.
    pub unsafe fn from_raw(ptr: *mut RawInvocable) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        if ptr.as_ref().vtable.is_null() {
            return None;
        }
        Some(Self { ptr })
    }

    /// Call a factory and take ownership of the object it returns.
    ///
    /// # Safety
    ///
    /// `factory` must have the [`InvocableFactory`] signature and return an
    /// object satisfying [`from_raw`](Self::from_raw).
    pub unsafe fn from_factory(factory: InvocableFactory) -> Option<Self> {
        Self::from_raw(factory())
    }

    pub fn as_ptr(&self) -> *mut RawInvocable {
        self.ptr.as_ptr()
    }

    fn vtable(&self) -> &InvocableVTable {
        // SAFETY: checked non-null in `from_raw`; the object outlives `self`.
        unsafe { &*self.ptr.as_ref().vtable }
    }
}

impl Invocable for NativeInvocable {
    fn setup(&mut self, host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
        let setup = self.vtable().setup;
        unsafe {
            setup(
                self.as_ptr(),
                host.as_ptr(),
                outputs.as_mut_ptr(),
                outputs.len(),
                inputs.as_ptr(),
                inputs.len(),
            )
        }
    }

    fn update(&mut self, host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
        let update = self.vtable().update;
        unsafe {
            update(
                self.as_ptr(),
                host.as_ptr(),
                outputs.as_mut_ptr(),
                outputs.len(),
                inputs.as_ptr(),
                inputs.len(),
            )
        }
    }

    fn teardown(&mut self, host: HostContext) -> Status {
        let teardown = self.vtable().teardown;
        unsafe { teardown(self.as_ptr(), host.as_ptr()) }
    }
}

impl Drop for NativeInvocable {
    fn drop(&mut self) {
        let destroy = self.vtable().destroy;
        unsafe { destroy(self.as_ptr()) };
    }
}

#[cfg(test)]
mod tests;
