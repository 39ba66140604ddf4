use crate::{ByMove, Migration, RawMemory, ReserveError};
use crate::migrate::migrate_around;
use crate::uninit::{clone_construct_n, construct_with_n, destroy_n, value_construct_n};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr;

/// A contiguous growable array that manages its own storage.
///
/// Elements `[0, len)` live in a `RawMemory` block of `capacity` slots, the
/// rest of the block is uninitialized. Appending doubles the capacity when it
/// runs out (starting from 1). Indexing, slicing and iteration go through
/// `Deref<Target = [T]>`.
///
/// The `M` parameter picks how elements are carried over when the storage is
/// reallocated, see `Migration`. The default, `ByMove`, relocates them bitwise.
/// `ByClone` clones them and drops the originals only after every clone
/// succeeded.
///
/// Every operation that reallocates (`reserve`, `push`, `emplace_back`,
/// `insert`, `emplace`, growing `resize`, `clone`, `with_len`) either completes
/// or, if an allocation or an element panics, leaves the vector as it was.
/// `clone_from` into a vector that already has enough capacity reuses the
/// storage, and on panic leaves a valid vector with partially reassigned contents.
pub struct Vector<T, M = ByMove> {
    data: RawMemory<T>,
    len: usize,
    _migration: PhantomData<M>,
}

impl<T> Vector<T> {
    /// An empty vector. Does not allocate.
    pub const fn new() -> Vector<T> {
        Vector {
            data: RawMemory::new(),
            len: 0,
            _migration: PhantomData,
        }
    }

    /// An empty vector with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Vector<T> {
        Vector::with_capacity_and_migration(capacity, ByMove)
    }

    /// `len` default values, in storage of exactly `len` slots.
    pub fn with_len(len: usize) -> Vector<T> where T: Default {
        Vector::with_len_and_migration(len, ByMove)
    }
}

impl<T, M> Vector<T, M> {
    /// An empty vector using the `M` migration policy.
    pub fn with_migration(_migration: M) -> Vector<T, M> {
        Vector {
            data: RawMemory::new(),
            len: 0,
            _migration: PhantomData,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_mut_ptr(), self.len) }
    }

    /// Moves storage and contents into a new vector; this one is left empty, without storage.
    pub fn take(&mut self) -> Vector<T, M> {
        Vector {
            data: self.data.take(),
            len: std::mem::replace(&mut self.len, 0),
            _migration: PhantomData,
        }
    }

    /// Exchanges storage and contents with `other`. Never touches the elements.
    pub fn swap(&mut self, other: &mut Vector<T, M>) {
        self.data.swap(&mut other.data);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Drops the elements past `len`. Does nothing if there are not that many.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        unsafe { destroy_n(self.data.slot(len), tail) };
    }

    pub fn clear(&mut self) {
        self.truncate(0)
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(unsafe { self.data.slot(self.len).read() })
        }
    }

    /// Removes the element at `pos`, shifting the ones after it to the left.
    ///
    /// # Panics
    /// If `pos >= len`.
    pub fn remove(&mut self, pos: usize) -> T {
        assert!(pos < self.len, "removal index (is {}) should be < len (is {})", pos, self.len);
        unsafe {
            let place = self.data.slot(pos);
            let value = place.read();
            ptr::copy(place.add(1), place, self.len - pos - 1);
            self.len -= 1;
            value
        }
    }

    /// Drops the element at `pos`, closing the gap. Returns `pos`, which now
    /// holds the element that followed the erased one (or is `len`).
    ///
    /// # Panics
    /// If `pos >= len`.
    pub fn erase(&mut self, pos: usize) -> usize {
        std::mem::drop(self.remove(pos));
        pos
    }
}

impl<T, M: Migration<T>> Vector<T, M> {
    /// An empty vector with room for exactly `capacity` elements, using the `M` policy.
    pub fn with_capacity_and_migration(capacity: usize, _migration: M) -> Vector<T, M> {
        Vector {
            data: RawMemory::with_capacity(capacity),
            len: 0,
            _migration: PhantomData,
        }
    }

    /// `len` default values in storage of exactly `len` slots, using the `M` policy.
    ///
    /// If a `Default::default` call panics, the values built so far are dropped
    /// and the storage is released before the panic continues.
    pub fn with_len_and_migration(len: usize, _migration: M) -> Vector<T, M> where T: Default {
        let mut data = RawMemory::with_capacity(len);
        unsafe { value_construct_n(data.as_mut_ptr(), len) };
        Vector {
            data,
            len,
            _migration: PhantomData,
        }
    }

    /// Makes sure there is room for `new_capacity` elements in total.
    ///
    /// Does nothing if the capacity is already large enough. Otherwise the
    /// storage is replaced by one of exactly `new_capacity` slots.
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(e) = self.try_reserve(new_capacity) {
            e.raise()
        }
    }

    /// Like `reserve`, but reports allocation failure instead of aborting.
    /// On error the vector is unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), ReserveError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        debug!("reserve {} slots, had {}", new_capacity, self.capacity());
        let mut new_data = RawMemory::try_with_capacity(new_capacity)?;
        unsafe { M::migrate(self.data.as_ptr(), new_data.as_mut_ptr(), self.len) };
        self.commit(new_data, self.len);
        Ok(())
    }

    pub fn push(&mut self, value: T) {
        self.emplace_back(move || value);
    }

    /// Like `push`, but hands the value back together with the error if the
    /// storage could not be grown.
    pub fn try_push(&mut self, value: T) -> Result<(), (T, ReserveError)> {
        match self.storage_for_one_more() {
            Err(e) => Err((value, e)),
            Ok(grown) => {
                unsafe { self.emplace_at(self.len, grown, move || value) };
                Ok(())
            },
        }
    }

    /// Appends the value built by `f` and returns a reference to it.
    ///
    /// When the vector is full, the value is built directly in the new storage.
    /// If `f` panics the vector is unchanged.
    pub fn emplace_back(&mut self, f: impl FnOnce() -> T) -> &mut T {
        let grown = self.storage_for_one_more().unwrap_or_else(|e| e.raise());
        unsafe { &mut *self.emplace_at(self.len, grown, f) }
    }

    /// Inserts `value` at `pos`, shifting the elements after it to the right.
    /// Returns `pos`.
    ///
    /// # Panics
    /// If `pos > len`.
    pub fn insert(&mut self, pos: usize, value: T) -> usize {
        self.emplace(pos, move || value)
    }

    /// Inserts the value built by `f` at `pos`. Returns `pos`.
    ///
    /// The value is built before any element is touched, so if `f` panics the
    /// vector is unchanged.
    ///
    /// # Panics
    /// If `pos > len`.
    pub fn emplace(&mut self, pos: usize, f: impl FnOnce() -> T) -> usize {
        assert!(pos <= self.len, "insertion index (is {}) should be <= len (is {})", pos, self.len);
        let grown = self.storage_for_one_more().unwrap_or_else(|e| e.raise());
        unsafe { self.emplace_at(pos, grown, f) };
        pos
    }

    /// Shrinks by dropping the trailing elements, or grows with values from `f`.
    ///
    /// Growing past the capacity reserves exactly `new_len` slots first.
    pub fn resize_with(&mut self, new_len: usize, f: impl FnMut() -> T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        unsafe { construct_with_n(self.data.slot(self.len), new_len - self.len, f) };
        self.len = new_len;
    }

    pub fn resize(&mut self, new_len: usize) where T: Default {
        self.resize_with(new_len, T::default)
    }

    /// Appends clones of all elements in `other`.
    pub fn extend_from_slice(&mut self, other: &[T]) where T: Clone {
        self.reserve_additional(other.len());
        unsafe { clone_construct_n(other.as_ptr(), self.data.slot(self.len), other.len()) };
        self.len += other.len();
    }

    /// Room for `additional` more elements, growing to at least twice the
    /// current capacity so that repeated bulk appends stay amortized.
    fn reserve_additional(&mut self, additional: usize) {
        let needed = self.len.checked_add(additional).unwrap_or_else(|| ReserveError::CapacityOverflow.raise());
        if needed > self.capacity() {
            self.reserve(needed.max(self.capacity().saturating_mul(2)));
        }
    }

    /// Fresh storage when the vector is full: `max(1, 2 * len)` slots.
    fn storage_for_one_more(&self) -> Result<Option<RawMemory<T>>, ReserveError> {
        if self.len < self.capacity() {
            return Ok(None);
        }
        let new_capacity = if self.len == 0 {
            1
        } else {
            self.len.checked_mul(2).ok_or(ReserveError::CapacityOverflow)?
        };
        trace!("grow from {} to {} slots, infallible migration: {}", self.capacity(), new_capacity, M::INFALLIBLE);
        RawMemory::try_with_capacity(new_capacity).map(Some)
    }

    /// Puts `f()` at `pos`, either into `grown` around the migrated elements,
    /// or in place by shifting `[pos, len)` one slot to the right.
    ///
    /// # Safety
    /// `pos <= len`, and `grown` is `None` only when `len < capacity`.
    unsafe fn emplace_at(&mut self, pos: usize, grown: Option<RawMemory<T>>, f: impl FnOnce() -> T) -> *mut T {
        match grown {
            Some(new_data) => {
                let place = migrate_around::<T, M, _>(self.data.as_ptr(), new_data.slot(0), self.len, pos, f);
                self.commit(new_data, self.len + 1);
                place
            },
            None => {
                let value = f();
                let place = self.data.slot(pos);
                ptr::copy(place, place.add(1), self.len - pos);
                place.write(value);
                self.len += 1;
                place
            },
        }
    }

    /// Adopts `new_data`, which already holds `new_len` live elements, then
    /// retires the elements left in the old storage.
    fn commit(&mut self, mut new_data: RawMemory<T>, new_len: usize) {
        self.data.swap(&mut new_data);
        let old_len = std::mem::replace(&mut self.len, new_len);
        unsafe { M::retire(new_data.as_mut_ptr(), old_len) };
    }
}

impl<T, M> Drop for Vector<T, M> {
    fn drop(&mut self) {
        unsafe { destroy_n(self.data.as_mut_ptr(), self.len) };
    }
}

impl<T: Clone, M> Clone for Vector<T, M> {
    /// Clones every element into storage of exactly `len` slots.
    fn clone(&self) -> Self {
        let mut data = RawMemory::with_capacity(self.len);
        unsafe { clone_construct_n(self.data.as_ptr(), data.as_mut_ptr(), self.len) };
        Vector {
            data,
            len: self.len,
            _migration: PhantomData,
        }
    }

    /// Rebuilds and swaps when `source` does not fit into the current capacity;
    /// otherwise reassigns the common prefix in place, then clones the extra
    /// elements or drops the surplus ones.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut rebuilt = source.clone();
            self.swap(&mut rebuilt);
            return;
        }

        let common = self.len.min(source.len);
        self.as_mut_slice()[..common].clone_from_slice(&source.as_slice()[..common]);
        if self.len < source.len {
            unsafe { clone_construct_n(source.data.slot(self.len), self.data.slot(self.len), source.len - self.len) };
            self.len = source.len;
        } else {
            self.truncate(source.len);
        }
    }
}

impl<T, M> Default for Vector<T, M> {
    fn default() -> Self {
        Vector {
            data: RawMemory::new(),
            len: 0,
            _migration: PhantomData,
        }
    }
}

impl<T, M> Deref for Vector<T, M> {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, M> DerefMut for Vector<T, M> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, M> AsRef<[T]> for Vector<T, M> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, M> AsMut<[T]> for Vector<T, M> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, M> std::borrow::Borrow<[T]> for Vector<T, M> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, M> std::fmt::Debug for Vector<T, M> where T: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for i in self.iter() {
            list.entry(i);
        }
        list.finish()
    }
}

impl<T, U, M, N> PartialEq<Vector<U, N>> for Vector<T, M> where T: PartialEq<U> {
    fn eq(&self, other: &Vector<U, N>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, M> Eq for Vector<T, M> {}

impl<T, U, M> PartialEq<[U]> for Vector<T, M> where T: PartialEq<U> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, M, const N: usize> PartialEq<[U; N]> for Vector<T, M> where T: PartialEq<U> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T: std::hash::Hash, M> std::hash::Hash for Vector<T, M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self.as_slice(), state)
    }
}

impl<T, M: Migration<T>> Extend<T> for Vector<T, M> {
    fn extend<I: IntoIterator<Item=T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_additional(lower);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone + 'a, M: Migration<T>> Extend<&'a T> for Vector<T, M> {
    fn extend<I: IntoIterator<Item=&'a T>>(&mut self, iter: I) {
        <Self as Extend<T>>::extend(self, iter.into_iter().cloned())
    }
}

impl<T, M: Migration<T> + Default> std::iter::FromIterator<T> for Vector<T, M> {
    fn from_iter<I: IntoIterator<Item=T>>(iter: I) -> Self {
        let mut vector = Vector::with_migration(M::default());
        vector.extend(iter);
        vector
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        let mut vector = Vector::with_capacity(items.len());
        vector.extend_from_slice(items);
        vector
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(items: [T; N]) -> Self {
        let mut vector = Vector::with_capacity(N);
        vector.extend(IntoIterator::into_iter(items));
        vector
    }
}

impl<'a, T, M> IntoIterator for &'a Vector<T, M> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, M> IntoIterator for &'a mut Vector<T, M> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, M> IntoIterator for Vector<T, M> {
    type Item = T;
    type IntoIter = crate::IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = std::mem::replace(&mut self.len, 0);
        unsafe { crate::IntoIter::new(self.data.take(), len) }
    }
}
