mod logging;
mod error;
mod raw;
mod uninit;
mod migrate;
mod vector;
mod iter;

pub use error::ReserveError;
pub use raw::RawMemory;
pub use migrate::{Migration, ByMove, ByClone};
pub use vector::Vector;
pub use iter::IntoIter;

#[cfg(test)]
pub mod dropflag;
