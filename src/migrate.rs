use crate::uninit::{clone_construct_n, destroy_n, move_n};

/// How a `Vector` carries its elements over to new storage when it reallocates.
///
/// The policy is part of the vector's type, so the choice is made once per
/// element type at compile time.
///
/// Reallocating operations call `migrate` for every run of old elements while
/// the old storage is still intact, commit the new storage, and only then call
/// `retire` on the old runs. A policy whose `migrate` can panic therefore never
/// costs the vector its contents: the old elements stay where they were.
///
/// # Safety
///
/// After `migrate` returns, `dst[..count]` must hold `count` live values that
/// are equal stand-ins for `src[..count]`. If `migrate` panics, `dst` must hold
/// no live values and `src` must be unchanged. `retire` must end exactly the
/// lifetimes `migrate` left behind in `src`, and nothing else.
pub unsafe trait Migration<T> {
    /// `migrate` never panics.
    const INFALLIBLE: bool;

    unsafe fn migrate(src: *const T, dst: *mut T, count: usize);

    unsafe fn retire(src: *mut T, count: usize);
}

/// Relocates elements with a bitwise move.
///
/// Moves in Rust cannot fail, so this works for every type, including the
/// ones that cannot be cloned. This is the default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByMove;

/// Clones elements into the new storage, then drops the originals.
///
/// For element types whose relocation must not be trusted to complete: if any
/// clone panics, the clones made so far are dropped and the original storage
/// is left exactly as it was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByClone;

unsafe impl<T> Migration<T> for ByMove {
    const INFALLIBLE: bool = true;

    #[inline(always)]
    unsafe fn migrate(src: *const T, dst: *mut T, count: usize) {
        move_n(src, dst, count);
    }

    #[inline(always)]
    unsafe fn retire(_src: *mut T, _count: usize) {
        // moved out, nothing is left to drop
    }
}

unsafe impl<T: Clone> Migration<T> for ByClone {
    const INFALLIBLE: bool = false;

    #[inline]
    unsafe fn migrate(src: *const T, dst: *mut T, count: usize) {
        clone_construct_n(src, dst, count);
    }

    #[inline]
    unsafe fn retire(src: *mut T, count: usize) {
        destroy_n(src, count);
    }
}

/// Builds the contents of `dst` from `len` old elements at `src`, leaving slot
/// `gap` empty, and writes `value()` into it. `gap == len` appends.
///
/// The new value is constructed first. On panic, everything built in `dst` is
/// dropped and `src` is untouched. Returns the slot address of the new value.
pub(crate) unsafe fn migrate_around<T, M: Migration<T>, F: FnOnce() -> T>(
    src: *const T,
    dst: *mut T,
    len: usize,
    gap: usize,
    value: F,
) -> *mut T {
    debug_assert!(gap <= len, "gap {} past length {}", gap, len);

    let place = dst.add(gap);
    place.write(value());
    if M::INFALLIBLE {
        M::migrate(src, dst, gap);
        M::migrate(src.add(gap), place.add(1), len - gap);
        return place;
    }

    let placed = Placed(place);
    M::migrate(src, dst, gap);
    let prefix = Placed(std::ptr::slice_from_raw_parts_mut(dst, gap));
    M::migrate(src.add(gap), place.add(1), len - gap);
    std::mem::forget(prefix);
    std::mem::forget(placed);
    place
}

/// Drops its target unless forgotten.
struct Placed<P: ?Sized>(*mut P);

impl<P: ?Sized> Drop for Placed<P> {
    fn drop(&mut self) {
        unsafe { std::ptr::drop_in_place(self.0) };
    }
}
