//! Element-wise complex conjugation.

use smallvec::{smallvec, SmallVec};

use ndcore_array::{MemoryOrder, NdArray};
use ndcore_dtype::{Result, TypeKind};

use crate::plan::{check_cast, check_out, store, Scatter};

fn conjugate_impl(a: &NdArray, out: &mut NdArray) -> Result<()> {
    let descr = a.descr();
    if descr.kind() != TypeKind::Complex {
        return store(out, descr, &a.to_contiguous_bytes(), Scatter::RowMajor);
    }
    let mut packed = Vec::with_capacity(a.nbytes());
    let mut slot: SmallVec<[u8; 16]> = smallvec![0; descr.elsize()];
    for elem in a.iter() {
        descr.setitem(&descr.getitem(elem).conj(), &mut slot)?;
        packed.extend_from_slice(&slot);
    }
    store(out, descr, &packed, Scatter::RowMajor)
}

/// Complex conjugate of every element, with the input's shape and type.
/// Non-complex elements are copied unchanged.
pub fn conjugate(a: &NdArray) -> Result<NdArray> {
    let mut out = NdArray::allocate(a.descr().clone(), a.dims(), MemoryOrder::C)?;
    conjugate_impl(a, &mut out)?;
    Ok(out)
}

/// [`conjugate`] into `out`, which must have the input's shape.
pub fn conjugate_into(a: &NdArray, out: &mut NdArray) -> Result<()> {
    check_cast(a.descr(), out.descr())?;
    check_out(out, a.dims())?;
    conjugate_impl(a, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndcore_dtype::{builtin_descr, BuiltinType, ErrorKind, NdError};
    use num_complex::{Complex32, Complex64};

    #[test]
    fn test_conjugate_complex() {
        let a = NdArray::from_slice(
            &[Complex64::new(1.0, 2.0), Complex64::new(-3.0, -0.5)],
            &[2, 1],
        )
        .unwrap();
        let c = conjugate(&a).unwrap();
        assert_eq!(c.dims(), &[2, 1]);
        assert_eq!(
            c.to_vec::<Complex64>().unwrap(),
            vec![Complex64::new(1.0, -2.0), Complex64::new(-3.0, 0.5)]
        );
    }

    #[test]
    fn test_conjugate_single_precision() {
        let a = NdArray::from_slice(&[Complex32::new(0.5, 4.0)], &[1]).unwrap();
        let c = conjugate(&a).unwrap();
        assert_eq!(c.descr().name(), "complex64");
        assert_eq!(c.to_vec::<Complex32>().unwrap(), vec![Complex32::new(0.5, -4.0)]);
    }

    #[test]
    fn test_conjugate_real_copies() {
        let a = NdArray::from_slice(&[1i32, -2, 3], &[3]).unwrap();
        assert_eq!(conjugate(&a).unwrap().to_vec::<i32>().unwrap(), vec![1, -2, 3]);
    }

    #[test]
    fn test_conjugate_into() {
        let a = NdArray::from_slice(&[Complex32::new(1.0, 1.0), Complex32::new(2.0, -2.0)], &[2])
            .unwrap();
        let mut out = NdArray::allocate(builtin_descr(BuiltinType::Complex128), &[2], MemoryOrder::C)
            .unwrap();
        conjugate_into(&a, &mut out).unwrap();
        assert_eq!(
            out.to_vec::<Complex64>().unwrap(),
            vec![Complex64::new(1.0, -1.0), Complex64::new(2.0, 2.0)]
        );

        let mut real = NdArray::allocate(builtin_descr(BuiltinType::Float64), &[2], MemoryOrder::C)
            .unwrap();
        assert_eq!(conjugate_into(&a, &mut real).unwrap_err().kind(), ErrorKind::Type);

        let mut short = NdArray::allocate(builtin_descr(BuiltinType::Complex64), &[1], MemoryOrder::C)
            .unwrap();
        assert!(matches!(conjugate_into(&a, &mut short), Err(NdError::ShapeMismatch(..))));
    }
}
