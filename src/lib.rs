//! Strided N-dimensional byte arrays with a pluggable element-type registry.
//!
//! This crate re-exports the ndcore workspace:
//!
//! - [`ndcore_dtype`]: element descriptors, built-in types, casting and the
//!   user-defined [`TypeRegistry`]
//! - [`ndcore_array`]: [`NdArray`] allocation plus [`ArrayIter`] and
//!   broadcast [`MultiIter`] iteration
//! - [`ndcore_reduce`]: sums, products, extremes, truth tests, argmax and
//!   conjugation along an axis or over the flattened array
//!
//! # Example
//!
//! ```rust
//! use ndcore::{builtin_descr, sum, BuiltinType, MemoryOrder, NdArray, Scalar};
//!
//! let mut a = NdArray::allocate(builtin_descr(BuiltinType::Float64), &[2, 3], MemoryOrder::C).unwrap();
//! a.fill(&Scalar::Float(0.5)).unwrap();
//! let s = sum(&a, Some(1), None).unwrap();
//! assert_eq!(s.to_vec::<f64>().unwrap(), vec![1.5, 1.5]);
//! ```
//!
//! # User-defined types
//!
//! A type is described by an [`ArrFuncs`] implementation wrapped in a
//! [`Descr`]. Registering it assigns a [`TypeNum`] at or above
//! [`TypeNum::USERDEF`]; cast functions and safe-cast rules can then be
//! attached with [`register_cast_func`] and [`register_can_cast`].
//!
//! Set `NDCORE_TRACE=1` to print registry and reduction path decisions to
//! stderr.

// ============================================================================
// Element types and registry
// ============================================================================
pub use ndcore_dtype::{
    builtin_descr, can_cast_safely, can_cast_scalar_kind, cast_buffer, descr_from_type_num,
    native_type_info, register_can_cast, register_cast_func, register_data_type,
    type_num_from_name, ArrFuncs, BuiltinType, ByteOrder, CastFn, Descr, Field, NativeElement,
    NativeTypeInfo, Scalar, ScalarCategory, ScalarKind, SortKind, TypeKind, TypeNum,
    TypeRegistry,
};

// ============================================================================
// Arrays and iteration
// ============================================================================
pub use ndcore_array::{
    broadcast_shapes, c_strides, f_strides, ArrayFlags, ArrayIter, Cursor, MemoryOrder, MultiIter,
    NdArray,
};

// ============================================================================
// Reductions
// ============================================================================
pub use ndcore_reduce::{
    all, all_into, any, any_into, argmax, argmax_into, conjugate, conjugate_into, cumprod,
    cumprod_into, cumsum, cumsum_into, default_accumulator, max, max_into, min, min_into, prod,
    prod_into, sum, sum_into,
};

// ============================================================================
// Error types
// ============================================================================
pub use ndcore_dtype::{ErrorKind, NdError, Result, MAXDIMS};

pub use ndcore_array;
pub use ndcore_dtype;
pub use ndcore_reduce;
