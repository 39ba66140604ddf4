use std::alloc::Layout;
use std::fmt::{Display, Debug};

/// Failure to obtain storage for a requested number of elements.
#[derive(Clone, PartialEq, Eq)]
pub enum ReserveError {
    /// The requested capacity does not fit in `isize::MAX` bytes, or computing it overflowed.
    CapacityOverflow,
    /// The global allocator returned null for this layout.
    AllocFailed { layout: Layout },
}

impl ReserveError {
    /// Diverges the way the infallible operations report this error.
    pub(crate) fn raise(self) -> ! {
        match self {
            ReserveError::CapacityOverflow => panic!("capacity overflow"),
            ReserveError::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl Debug for ReserveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReserveError::CapacityOverflow => f.write_str("CapacityOverflow"),
            ReserveError::AllocFailed { layout } => f.debug_struct("AllocFailed")
                .field("size", &layout.size())
                .field("align", &layout.align())
                .finish(),
        }
    }
}

impl Display for ReserveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReserveError::CapacityOverflow => Display::fmt("Requested capacity exceeds the maximum allocation size", f),
            ReserveError::AllocFailed { layout } => write!(f, "Memory allocation of {} bytes (align {}) failed", layout.size(), layout.align()),
        }
    }
}

impl std::error::Error for ReserveError {}
