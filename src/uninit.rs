//! Construction and destruction of element ranges in uninitialized slots.
//!
//! Every constructor here either fills the whole range or, if an element
//! panics, drops what it already built before the panic leaves the function.

use std::ptr;

/// Helper to initialize consecutive slots one by one.
///
/// Dropping it drops the values written so far. Call `finish` once all of
/// them are in place to hand their ownership to the caller.
pub(crate) struct Initializer<T> {
    start: *mut T,
    initialized_len: usize,
}

impl<T> Initializer<T> {
    /// # Safety
    /// `start` must point to enough writable, uninitialized slots for everything pushed.
    #[inline(always)]
    pub unsafe fn new(start: *mut T) -> Initializer<T> {
        Initializer {
            start,
            initialized_len: 0,
        }
    }

    #[inline(always)]
    pub unsafe fn push(&mut self, value: T) {
        self.start.add(self.initialized_len).write(value);
        self.initialized_len += 1;
    }

    /// Returns the number of initialized slots, and stops owning them.
    #[inline(always)]
    pub fn finish(self) -> usize {
        let len = self.initialized_len;
        std::mem::forget(self);
        len
    }
}

impl<T> Drop for Initializer<T> {
    fn drop(&mut self) {
        trace!("unwinding: drop {} partially constructed items", self.initialized_len);
        unsafe { destroy_n(self.start, self.initialized_len) };
    }
}

/// Drops `count` live values starting at `start`.
///
/// If one of the drops panics the rest are still dropped.
#[inline]
pub(crate) unsafe fn destroy_n<T>(start: *mut T, count: usize) {
    ptr::drop_in_place(ptr::slice_from_raw_parts_mut(start, count));
}

/// Constructs `count` values produced by `f` into `dst`.
pub(crate) unsafe fn construct_with_n<T>(dst: *mut T, count: usize, mut f: impl FnMut() -> T) {
    let mut init = Initializer::new(dst);
    for _ in 0..count {
        init.push(f());
    }
    init.finish();
}

/// Default-constructs `count` values into `dst`.
#[inline]
pub(crate) unsafe fn value_construct_n<T: Default>(dst: *mut T, count: usize) {
    construct_with_n(dst, count, T::default)
}

/// Clones `count` values from `src` into `dst`. The source is only read.
pub(crate) unsafe fn clone_construct_n<T: Clone>(src: *const T, dst: *mut T, count: usize) {
    let mut init = Initializer::new(dst);
    for i in 0..count {
        init.push((*src.add(i)).clone());
    }
    init.finish();
}

/// Bitwise relocation of `count` values. The source slots are logically uninitialized afterwards.
#[inline(always)]
pub(crate) unsafe fn move_n<T>(src: *const T, dst: *mut T, count: usize) {
    ptr::copy_nonoverlapping(src, dst, count);
}
