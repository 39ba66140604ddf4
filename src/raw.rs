/*!

Raw storage for a fixed number of elements.

`RawMemory` owns the block, and nothing else. It never constructs or drops
anything that lives in it: whoever writes values into the slots must drop them
before the `RawMemory` itself goes away, otherwise they leak.

*/

use crate::ReserveError;
use std::alloc::{alloc, dealloc, Layout};
use std::marker::PhantomData;
use std::ptr::NonNull;

pub struct RawMemory<T> {
    buffer: NonNull<T>,
    capacity: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawMemory<T> {}
unsafe impl<T: Sync> Sync for RawMemory<T> {}

impl<T> RawMemory<T> {
    /// Storage with no capacity. Does not allocate.
    pub const fn new() -> RawMemory<T> {
        RawMemory {
            buffer: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates uninitialized storage for exactly `capacity` elements.
    ///
    /// Zero capacity, or a zero-sized `T`, does not touch the allocator.
    pub fn try_with_capacity(capacity: usize) -> Result<RawMemory<T>, ReserveError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| ReserveError::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(RawMemory {
                buffer: NonNull::dangling(),
                capacity,
                _marker: PhantomData,
            });
        }

        let ptr = unsafe { alloc(layout) } as *mut T;
        match NonNull::new(ptr) {
            Some(buffer) => {
                trace!("alloc {} slots of {} bytes at {:?}", capacity, std::mem::size_of::<T>(), buffer);
                Ok(RawMemory { buffer, capacity, _marker: PhantomData })
            },
            None => Err(ReserveError::AllocFailed { layout }),
        }
    }

    /// Same as `try_with_capacity`, but panics on overflow and aborts through
    /// `handle_alloc_error` when the allocator fails.
    pub fn with_capacity(capacity: usize) -> RawMemory<T> {
        match RawMemory::try_with_capacity(capacity) {
            Ok(memory) => memory,
            Err(e) => e.raise(),
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_ptr()
    }

    /// Address of slot `offset`. The one-past-the-end address (`offset == capacity`) is allowed.
    ///
    /// Only debug builds check the bounds. Whether the slot holds a live value is up to the caller.
    ///
    /// # Safety
    /// `offset` must not exceed `capacity`.
    #[inline(always)]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.capacity, "slot offset {} out of capacity {}", offset, self.capacity);
        self.buffer.as_ptr().add(offset)
    }

    /// Exchanges blocks with `other`.
    #[inline(always)]
    pub fn swap(&mut self, other: &mut RawMemory<T>) {
        std::mem::swap(&mut self.buffer, &mut other.buffer);
        std::mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Moves the block out, leaving this storage empty.
    pub fn take(&mut self) -> RawMemory<T> {
        let mut taken = RawMemory::new();
        taken.swap(self);
        taken
    }

    fn layout(&self) -> Option<Layout> {
        let layout = Layout::array::<T>(self.capacity).ok()?;
        if layout.size() == 0 {
            None
        } else {
            Some(layout)
        }
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        RawMemory::new()
    }
}

impl<T> Drop for RawMemory<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout() {
            trace!("dealloc {} slots at {:?}", self.capacity, self.buffer);
            unsafe { dealloc(self.buffer.as_ptr() as *mut u8, layout) };
        }
    }
}
