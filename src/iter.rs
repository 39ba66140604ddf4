use crate::RawMemory;
use crate::uninit::destroy_n;
use std::iter::FusedIterator;

/// Owning iterator over the elements of a `Vector`.
///
/// Holds on to the vector's storage; elements not yet yielded are dropped
/// together with the iterator.
pub struct IntoIter<T> {
    data: RawMemory<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// # Safety
    /// Slots `[0, len)` of `data` must hold live values, which the iterator now owns.
    pub(crate) unsafe fn new(data: RawMemory<T>, len: usize) -> IntoIter<T> {
        IntoIter {
            data,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        let item = unsafe { self.data.slot(self.start).read() };
        self.start += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { self.data.slot(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        self.end = self.start;
        unsafe { destroy_n(self.data.slot(self.start), remaining) };
    }
}

impl<T> std::fmt::Debug for IntoIter<T> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
