//! Reductions over [`NdArray`](ndcore_array::NdArray)s.
//!
//! Every operation takes an axis selector `Option<usize>`: `Some(axis)`
//! collapses (or, for cumulative operations, runs along) that axis, `None`
//! treats the array as flattened in row-major order.
//!
//! Each operation has an `_into` variant writing into a caller-provided
//! array. Axis, types, output shape and writability are all checked before
//! the output is touched, so a failing call leaves it unchanged.
//!
//! # Operations
//!
//! - [`sum`], [`prod`]: accumulate with identity 0 and 1
//! - [`cumsum`], [`cumprod`]: running accumulations keeping the input shape
//! - [`max`], [`min`]: extremes through the descriptor's comparison
//! - [`any`], [`all`]: truth tests producing `bool`
//! - [`argmax`]: `int64` index of the first maximal element
//! - [`conjugate`]: element-wise complex conjugate
//!
//! # Example
//!
//! ```rust
//! use ndcore_array::NdArray;
//! use ndcore_reduce::{argmax, cumsum, sum};
//!
//! let a = NdArray::from_slice(&[1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
//! assert_eq!(sum(&a, Some(0), None).unwrap().to_vec::<i64>().unwrap(), vec![5, 7, 9]);
//! assert_eq!(cumsum(&a, None, None).unwrap().to_vec::<i64>().unwrap(), vec![1, 3, 6, 10, 15, 21]);
//! assert_eq!(argmax(&a, Some(1)).unwrap().to_vec::<i64>().unwrap(), vec![2, 2]);
//! ```

mod arith;
mod conj;
mod extrema;
mod logical;
mod plan;

pub use arith::{
    cumprod, cumprod_into, cumsum, cumsum_into, default_accumulator, prod, prod_into, sum,
    sum_into,
};
pub use conj::{conjugate, conjugate_into};
pub use extrema::{argmax, argmax_into, max, max_into, min, min_into};
pub use logical::{all, all_into, any, any_into};

pub use ndcore_dtype::{NdError, Result};
