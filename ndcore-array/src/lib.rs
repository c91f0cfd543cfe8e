//! Strided N-dimensional arrays over raw element bytes.
//!
//! An [`NdArray`] owns a byte buffer and interprets it through a shared
//! [`Descr`](ndcore_dtype::Descr), per-dimension lengths and byte strides.
//! Element values cross the API as [`Scalar`](ndcore_dtype::Scalar)s or as
//! `&[u8]` element slices.
//!
//! # Core Types
//!
//! - [`NdArray`]: owned strided array with layout flags
//! - [`Cursor`]: layout-only row-major stepping state
//! - [`ArrayIter`]: element iterator borrowing one array
//! - [`MultiIter`]: lockstep iterator over arrays broadcast together
//!
//! # Example
//!
//! ```rust
//! use ndcore_array::{MultiIter, NdArray};
//!
//! let col = NdArray::from_slice(&[1i32, 2, 3], &[3, 1]).unwrap();
//! let row = NdArray::from_slice(&[10i32, 20], &[1, 2]).unwrap();
//! let multi = MultiIter::new(&[&col, &row]).unwrap();
//! assert_eq!(multi.dims(), &[3, 2]);
//! assert_eq!(multi.count(), 6);
//! ```

mod array;
mod iter;
mod multi_iter;

pub use array::{c_strides, f_strides, ArrayFlags, MemoryOrder, NdArray};
pub use iter::{ArrayIter, Cursor};
pub use multi_iter::{broadcast_shapes, MultiIter};

// ============================================================================
// Error types
// ============================================================================
pub use ndcore_dtype::{ErrorKind, NdError, Result, MAXDIMS};
