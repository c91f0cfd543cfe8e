//! Element descriptors and the user-defined type registry.
//!
//! This crate describes *what* lives inside an ndcore array buffer. Every
//! element type, built-in or user-registered, is described by a [`Descr`]:
//! its size, alignment, byte order, type number and a shared [`ArrFuncs`]
//! implementation that generic array code dispatches through.
//!
//! # Core Types
//!
//! - [`TypeNum`]: stable integer identity of an element type
//! - [`Scalar`]: interchange value produced by `getitem` and consumed by `setitem`
//! - [`ArrFuncs`]: per-kind element behavior (copy/byteswap, compare, argmax, sort, ...)
//! - [`Descr`]: metadata plus behavior for one element type
//! - [`TypeRegistry`]: registration of user types and their casting rules
//!
//! # Example
//!
//! ```rust
//! use ndcore_dtype::{builtin_descr, BuiltinType, Scalar};
//!
//! let f64_descr = builtin_descr(BuiltinType::Float64);
//! let mut buf = [0u8; 8];
//! f64_descr.setitem(&Scalar::Float(2.5), &mut buf).unwrap();
//! assert_eq!(f64_descr.getitem(&buf), Scalar::Float(2.5));
//! ```

mod builtin;
pub mod cast;
mod descr;
mod funcs;
pub mod registry;
mod scalar;
mod types;

pub use builtin::{builtin_descr, native_type_info, NativeElement, NativeTypeInfo};
pub use cast::{can_cast_safely, can_cast_scalar_kind, cast_buffer, CastFn};
pub use descr::{Descr, Field};
pub use funcs::ArrFuncs;
pub use registry::{
    descr_from_type_num, register_can_cast, register_cast_func, register_data_type,
    type_num_from_name, TypeRegistry,
};
pub use scalar::{Scalar, ScalarCategory};
pub use types::{BuiltinType, ByteOrder, ScalarKind, SortKind, TypeKind, TypeNum};

// ============================================================================
// Error types
// ============================================================================

/// Broad category of an [`NdError`], matching the failure classes callers
/// are expected to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed descriptor rejected at registration.
    Validation,
    /// Incompatible or unknown type for the requested operation.
    Type,
    /// Incompatible shapes (broadcasting or output shape).
    Shape,
    /// Absolute position out of range.
    Index,
    /// Buffer or registry storage could not be allocated.
    Memory,
    /// Axis selector or dimensionality out of range.
    Axis,
}

/// Errors that can occur in ndcore operations.
#[derive(Debug, thiserror::Error)]
pub enum NdError {
    /// Zero-size types cannot be registered.
    #[error("cannot register a flexible data-type: {name:?} has element size 0")]
    FlexibleType { name: String },

    /// Descriptor has no type identity (empty name).
    #[error("descriptor is missing its type identity")]
    MissingTypeName,

    /// Descriptor is already bound to a different type number.
    #[error("descriptor {name:?} is already bound to type number {type_num}")]
    AlreadyBound { name: String, type_num: u32 },

    /// Type number is neither built-in nor registered.
    #[error("invalid type number {0}")]
    InvalidTypeNum(u32),

    /// Values of one type cannot be (safely) converted to another.
    #[error("cannot cast from {from} to {to}")]
    IncompatibleType { from: String, to: String },

    /// The element type does not provide the requested behavior.
    #[error("{op} is not supported for type {type_name}")]
    Unsupported {
        op: &'static str,
        type_name: String,
    },

    /// A scalar value cannot be stored in or parsed as the element type.
    #[error("invalid value {value:?} for type {type_name}")]
    InvalidValue { value: String, type_name: String },

    /// Array is not writeable.
    #[error("array is not writeable")]
    ReadOnly,

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Reduction without identity over an empty axis.
    #[error("zero-size reduction without identity along axis of length 0")]
    EmptyReduction,

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Accessed byte range escapes the data buffer.
    #[error("strided layout exceeds buffer of {len} bytes")]
    OutOfBuffer { len: usize },

    /// Element count of a shape does not fit in `usize`.
    #[error("element count of shape {dims:?} overflows")]
    SizeOverflow { dims: Vec<usize> },

    /// Absolute position out of range.
    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: isize, size: usize },

    /// Wrong number of coordinates for the array rank.
    #[error("expected {expected} coordinates, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Invalid axis index for the given array rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Requested dimensionality exceeds [`MAXDIMS`].
    #[error("maximum supported dimension for an array is {max}, found {ndim}")]
    TooManyDims { ndim: usize, max: usize },

    /// Allocation failed or its byte size overflowed.
    #[error("unable to allocate {bytes} bytes")]
    AllocationFailed { bytes: usize },
}

impl NdError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NdError::FlexibleType { .. }
            | NdError::MissingTypeName
            | NdError::AlreadyBound { .. } => ErrorKind::Validation,
            NdError::InvalidTypeNum(_)
            | NdError::IncompatibleType { .. }
            | NdError::Unsupported { .. }
            | NdError::InvalidValue { .. }
            | NdError::ReadOnly => ErrorKind::Type,
            NdError::ShapeMismatch(..)
            | NdError::EmptyReduction
            | NdError::StrideLengthMismatch
            | NdError::OutOfBuffer { .. }
            | NdError::SizeOverflow { .. }
            | NdError::WrongNumberOfIndices { .. } => ErrorKind::Shape,
            NdError::IndexOutOfBounds { .. } => ErrorKind::Index,
            NdError::InvalidAxis { .. } | NdError::TooManyDims { .. } => ErrorKind::Axis,
            NdError::AllocationFailed { .. } => ErrorKind::Memory,
        }
    }
}

/// Result type for ndcore operations.
pub type Result<T> = std::result::Result<T, NdError>;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of dimensions an array may have.
pub const MAXDIMS: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            NdError::FlexibleType { name: "x".into() }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(NdError::InvalidTypeNum(300).kind(), ErrorKind::Type);
        assert_eq!(
            NdError::ShapeMismatch(vec![3, 2], vec![4, 2]).kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            NdError::SizeOverflow { dims: vec![1 << 40, 1 << 40] }.kind(),
            ErrorKind::Shape
        );
        assert_eq!(
            NdError::IndexOutOfBounds { index: 7, size: 3 }.kind(),
            ErrorKind::Index
        );
        assert_eq!(
            NdError::AllocationFailed { bytes: usize::MAX }.kind(),
            ErrorKind::Memory
        );
    }

    #[test]
    fn test_error_display() {
        let err = NdError::InvalidAxis { axis: 3, rank: 2 };
        assert_eq!(err.to_string(), "invalid axis 3 for rank 2");
    }
}
