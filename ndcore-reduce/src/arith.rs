//! Sums and products, plain and cumulative.

use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use ndcore_array::{MemoryOrder, NdArray};
use ndcore_dtype::{
    builtin_descr, descr_from_type_num, BuiltinType, Descr, NdError, Result, Scalar,
    ScalarCategory, TypeKind, TypeNum,
};

use crate::plan::{check_axis, check_cast, check_out, for_each_lane, result_dims, store, Scatter};

#[derive(Debug, Clone, Copy)]
enum Accum {
    Add,
    Mul,
}

impl Accum {
    fn identity(self, cat: ScalarCategory) -> Scalar {
        match self {
            Accum::Add => Scalar::zero(cat),
            Accum::Mul => Scalar::one(cat),
        }
    }

    fn apply(self, acc: Scalar, x: Scalar) -> Scalar {
        match self {
            Accum::Add => acc.add(x),
            Accum::Mul => acc.mul(x),
        }
    }
}

/// Accumulator type used when no result type is requested.
///
/// Booleans and signed integers narrower than 64 bits accumulate as
/// `int64`, narrower unsigned integers as `uint64`; every other type
/// accumulates as itself.
pub fn default_accumulator(descr: &Arc<Descr>) -> Arc<Descr> {
    let narrow = descr.elsize() < 8;
    match descr.kind() {
        TypeKind::Bool => builtin_descr(BuiltinType::Int64),
        TypeKind::SignedInt if narrow => builtin_descr(BuiltinType::Int64),
        TypeKind::UnsignedInt if narrow => builtin_descr(BuiltinType::UInt64),
        _ => descr.clone(),
    }
}

fn resolve_rtype(a: &NdArray, rtype: Option<TypeNum>) -> Result<Arc<Descr>> {
    match rtype {
        None => Ok(default_accumulator(a.descr())),
        Some(t) => descr_from_type_num(t).ok_or(NdError::InvalidTypeNum(t.0)),
    }
}

fn accumulate(
    a: &NdArray,
    axis: Option<usize>,
    out: &mut NdArray,
    op: Accum,
    cumulative: bool,
) -> Result<()> {
    let src = a.descr();
    let acc_descr = out.descr().clone();
    let cat = ScalarCategory::of_kind(acc_descr.kind());
    let elsize = acc_descr.elsize();
    let mut slot: SmallVec<[u8; 16]> = smallvec![0; elsize];
    let mut packed = Vec::with_capacity(out.size() * elsize);

    for_each_lane(a, axis, |lane| {
        let mut acc = op.identity(cat);
        for elem in lane {
            acc = op.apply(acc, src.getitem(elem).coerce(cat));
            if cumulative {
                acc_descr.setitem(&acc, &mut slot)?;
                packed.extend_from_slice(&slot);
            }
        }
        if !cumulative {
            acc_descr.setitem(&acc, &mut slot)?;
            packed.extend_from_slice(&slot);
        }
        Ok(())
    })?;

    let order = if cumulative {
        Scatter::Lanes(axis.unwrap_or(0))
    } else {
        Scatter::RowMajor
    };
    store(out, &acc_descr, &packed, order)
}

fn accumulate_new(
    a: &NdArray,
    axis: Option<usize>,
    rtype: Option<TypeNum>,
    op: Accum,
    cumulative: bool,
) -> Result<NdArray> {
    check_axis(a, axis)?;
    let acc_descr = resolve_rtype(a, rtype)?;
    check_cast(a.descr(), &acc_descr)?;
    let dims = result_dims(a, axis, cumulative);
    let mut out = NdArray::allocate(acc_descr, &dims, MemoryOrder::C)?;
    accumulate(a, axis, &mut out, op, cumulative)?;
    Ok(out)
}

fn accumulate_into(
    a: &NdArray,
    axis: Option<usize>,
    out: &mut NdArray,
    op: Accum,
    cumulative: bool,
) -> Result<()> {
    check_axis(a, axis)?;
    check_cast(a.descr(), out.descr())?;
    check_out(out, &result_dims(a, axis, cumulative))?;
    accumulate(a, axis, out, op, cumulative)
}

/// Sum along `axis`, or over all elements when `axis` is `None`.
///
/// `rtype` selects the accumulator and result type; by default it is
/// [`default_accumulator`] of the input type. Sums over an empty axis are 0.
///
/// # Errors
/// - `InvalidAxis` if `axis >= a.ndim()`
/// - `InvalidTypeNum` if `rtype` names no known type
/// - `IncompatibleType` if the input does not cast safely to `rtype`
pub fn sum(a: &NdArray, axis: Option<usize>, rtype: Option<TypeNum>) -> Result<NdArray> {
    accumulate_new(a, axis, rtype, Accum::Add, false)
}

/// [`sum`] written into `out`, whose type is the accumulator type.
///
/// `out` must have the reduced shape; nothing is written on error.
pub fn sum_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    accumulate_into(a, axis, out, Accum::Add, false)
}

/// Product along `axis`; products over an empty axis are 1.
pub fn prod(a: &NdArray, axis: Option<usize>, rtype: Option<TypeNum>) -> Result<NdArray> {
    accumulate_new(a, axis, rtype, Accum::Mul, false)
}

pub fn prod_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    accumulate_into(a, axis, out, Accum::Mul, false)
}

/// Running sum along `axis`. The result keeps the input shape, or is 1-d
/// over the flattened input when `axis` is `None`.
pub fn cumsum(a: &NdArray, axis: Option<usize>, rtype: Option<TypeNum>) -> Result<NdArray> {
    accumulate_new(a, axis, rtype, Accum::Add, true)
}

pub fn cumsum_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    accumulate_into(a, axis, out, Accum::Add, true)
}

/// Running product along `axis`; see [`cumsum`] for the result shape.
pub fn cumprod(a: &NdArray, axis: Option<usize>, rtype: Option<TypeNum>) -> Result<NdArray> {
    accumulate_new(a, axis, rtype, Accum::Mul, true)
}

pub fn cumprod_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    accumulate_into(a, axis, out, Accum::Mul, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndcore_dtype::ErrorKind;
    use num_complex::Complex64;

    #[test]
    fn test_sum_of_zeros() {
        for dims in [vec![4usize], vec![2, 3], vec![2, 1, 3]] {
            let a = NdArray::allocate(builtin_descr(BuiltinType::Float64), &dims, MemoryOrder::C)
                .unwrap();
            for axis in 0..dims.len() {
                let s = sum(&a, Some(axis), None).unwrap();
                assert!(s.to_vec::<f64>().unwrap().iter().all(|&v| v == 0.0));
                let p = prod(&a, Some(axis), None).unwrap();
                assert!(p.to_vec::<f64>().unwrap().iter().all(|&v| v == 0.0));
            }
            assert_eq!(sum(&a, None, None).unwrap().to_vec::<f64>().unwrap(), vec![0.0]);
        }
    }

    #[test]
    fn test_cumsum_1d() {
        let a = NdArray::from_slice(&[1i32, 2, 3], &[3]).unwrap();
        let c = cumsum(&a, Some(0), None).unwrap();
        assert_eq!(c.descr().name(), "int64");
        assert_eq!(c.to_vec::<i64>().unwrap(), vec![1, 3, 6]);
    }

    #[test]
    fn test_sum_axes() {
        let a = NdArray::from_slice(&[1i64, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let s0 = sum(&a, Some(0), None).unwrap();
        assert_eq!(s0.dims(), &[3]);
        assert_eq!(s0.to_vec::<i64>().unwrap(), vec![5, 7, 9]);
        let s1 = sum(&a, Some(1), None).unwrap();
        assert_eq!(s1.to_vec::<i64>().unwrap(), vec![6, 15]);
        let all = sum(&a, None, None).unwrap();
        assert_eq!(all.ndim(), 0);
        assert_eq!(all.to_vec::<i64>().unwrap(), vec![21]);
    }

    #[test]
    fn test_cumulative_axes() {
        let a = NdArray::from_slice(&[1i64, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
        let c0 = cumsum(&a, Some(0), None).unwrap();
        assert_eq!(c0.to_vec::<i64>().unwrap(), vec![1, 2, 3, 5, 7, 9]);
        let c1 = cumprod(&a, Some(1), None).unwrap();
        assert_eq!(c1.to_vec::<i64>().unwrap(), vec![1, 2, 6, 4, 20, 120]);
        let flat = cumsum(&a, None, None).unwrap();
        assert_eq!(flat.dims(), &[6]);
        assert_eq!(flat.to_vec::<i64>().unwrap(), vec![1, 3, 6, 10, 15, 21]);
    }

    #[test]
    fn test_default_accumulators() {
        let b = NdArray::from_slice(&[1u8, 255], &[2]).unwrap();
        let s = sum(&b, None, None).unwrap();
        assert_eq!(s.descr().name(), "uint64");
        assert_eq!(s.to_vec::<u64>().unwrap(), vec![256]);

        let bools = NdArray::from_bytes(builtin_descr(BuiltinType::Bool), vec![1, 0, 1], &[3], &[1], 0)
            .unwrap();
        assert_eq!(sum(&bools, None, None).unwrap().to_vec::<i64>().unwrap(), vec![2]);

        let f = NdArray::from_slice(&[0.5f32, 0.25], &[2]).unwrap();
        assert_eq!(sum(&f, None, None).unwrap().descr().name(), "float32");
    }

    #[test]
    fn test_rtype() {
        let a = NdArray::from_slice(&[1.5f32, 2.25], &[2]).unwrap();
        let s = sum(&a, None, Some(TypeNum::FLOAT64)).unwrap();
        assert_relative_eq!(s.to_vec::<f64>().unwrap()[0], 3.75);

        let err = sum(&a, None, Some(TypeNum::INT32)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        let err = sum(&a, None, Some(TypeNum(4000))).unwrap_err();
        assert!(matches!(err, NdError::InvalidTypeNum(4000)));
    }

    #[test]
    fn test_complex_prod() {
        let a = NdArray::from_slice(
            &[Complex64::new(0.0, 1.0), Complex64::new(0.0, 1.0), Complex64::new(2.0, 0.0)],
            &[3],
        )
        .unwrap();
        let p = prod(&a, None, None).unwrap().to_vec::<Complex64>().unwrap();
        assert_relative_eq!(p[0].re, -2.0);
        assert_relative_eq!(p[0].im, 0.0);
    }

    #[test]
    fn test_empty_axis_identities() {
        let a = NdArray::allocate(builtin_descr(BuiltinType::Int32), &[2, 0], MemoryOrder::C)
            .unwrap();
        assert_eq!(sum(&a, Some(1), None).unwrap().to_vec::<i64>().unwrap(), vec![0, 0]);
        assert_eq!(prod(&a, Some(1), None).unwrap().to_vec::<i64>().unwrap(), vec![1, 1]);
        assert!(sum(&a, Some(0), None).unwrap().to_vec::<i64>().unwrap().is_empty());
    }

    #[test]
    fn test_into_shape_mismatch_leaves_out() {
        let a = NdArray::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let mut out = NdArray::from_slice(&[9.0f64, 9.0, 9.0], &[3]).unwrap();
        for result in [
            sum_into(&a, Some(0), &mut out),
            prod_into(&a, Some(1), &mut out),
            cumsum_into(&a, Some(0), &mut out),
            cumprod_into(&a, None, &mut out),
        ] {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Shape);
        }
        assert_eq!(out.to_vec::<f64>().unwrap(), vec![9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_into_checks() {
        let a = NdArray::from_slice(&[1i32, 2, 3, 4], &[2, 2]).unwrap();
        let mut out = NdArray::allocate(builtin_descr(BuiltinType::Float64), &[2], MemoryOrder::C)
            .unwrap();
        sum_into(&a, Some(1), &mut out).unwrap();
        assert_eq!(out.to_vec::<f64>().unwrap(), vec![3.0, 7.0]);

        let err = sum_into(&a, Some(2), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Axis);

        let mut narrow = NdArray::allocate(builtin_descr(BuiltinType::Int8), &[2], MemoryOrder::C)
            .unwrap();
        let err = sum_into(&a, Some(1), &mut narrow).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        out.set_writeable(false);
        assert!(matches!(sum_into(&a, Some(1), &mut out), Err(NdError::ReadOnly)));
    }

    #[test]
    fn test_strided_input() {
        let mut a = NdArray::allocate(builtin_descr(BuiltinType::Int64), &[2, 3], MemoryOrder::Fortran)
            .unwrap();
        a.copy_from(&NdArray::from_slice(&[1i64, 2, 3, 4, 5, 6], &[2, 3]).unwrap())
            .unwrap();
        assert_eq!(sum(&a, Some(1), None).unwrap().to_vec::<i64>().unwrap(), vec![6, 15]);
        assert_eq!(cumsum(&a, None, None).unwrap().to_vec::<i64>().unwrap(), vec![1, 3, 6, 10, 15, 21]);
    }
}
