//! Any and all truth reductions.

use std::sync::Arc;

use ndcore_array::{MemoryOrder, NdArray};
use ndcore_dtype::{builtin_descr, BuiltinType, Descr, Result};

use crate::plan::{check_axis, check_cast, check_out, for_each_lane, result_dims, store, Scatter};

fn truth(a: &NdArray, axis: Option<usize>, out: &mut NdArray, want_all: bool) -> Result<()> {
    let descr = a.descr();
    let bool_descr: Arc<Descr> = builtin_descr(BuiltinType::Bool);
    let mut packed = Vec::with_capacity(out.size());
    for_each_lane(a, axis, |mut lane| {
        let hit = if want_all {
            lane.all(|e| descr.nonzero(e))
        } else {
            lane.any(|e| descr.nonzero(e))
        };
        packed.push(u8::from(hit));
        Ok(())
    })?;
    store(out, &bool_descr, &packed, Scatter::RowMajor)
}

fn truth_new(a: &NdArray, axis: Option<usize>, want_all: bool) -> Result<NdArray> {
    check_axis(a, axis)?;
    let dims = result_dims(a, axis, false);
    let mut out = NdArray::allocate(builtin_descr(BuiltinType::Bool), &dims, MemoryOrder::C)?;
    truth(a, axis, &mut out, want_all)?;
    Ok(out)
}

fn truth_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray, want_all: bool) -> Result<()> {
    check_axis(a, axis)?;
    check_cast(&builtin_descr(BuiltinType::Bool), out.descr())?;
    check_out(out, &result_dims(a, axis, false))?;
    truth(a, axis, out, want_all)
}

/// Whether any element along `axis` is nonzero. Empty lanes give `false`.
pub fn any(a: &NdArray, axis: Option<usize>) -> Result<NdArray> {
    truth_new(a, axis, false)
}

pub fn any_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    truth_into(a, axis, out, false)
}

/// Whether every element along `axis` is nonzero. Empty lanes give `true`.
pub fn all(a: &NdArray, axis: Option<usize>) -> Result<NdArray> {
    truth_new(a, axis, true)
}

pub fn all_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    truth_into(a, axis, out, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndcore_dtype::{ErrorKind, NdError};

    fn bools(a: &NdArray) -> Vec<bool> {
        a.iter().map(|e| e[0] != 0).collect()
    }

    #[test]
    fn test_any_all_axes() {
        let a = NdArray::from_slice(&[0.0f64, 1.0, 0.0, 2.0, 3.0, 0.0], &[2, 3]).unwrap();
        assert_eq!(bools(&any(&a, Some(0)).unwrap()), vec![true, true, false]);
        assert_eq!(bools(&all(&a, Some(0)).unwrap()), vec![false, true, false]);
        assert_eq!(bools(&any(&a, Some(1)).unwrap()), vec![true, true]);
        assert_eq!(bools(&all(&a, Some(1)).unwrap()), vec![false, false]);
        assert_eq!(bools(&any(&a, None).unwrap()), vec![true]);
        assert_eq!(bools(&all(&a, None).unwrap()), vec![false]);
    }

    #[test]
    fn test_empty_identities() {
        let a = NdArray::allocate(builtin_descr(BuiltinType::Int32), &[0], MemoryOrder::C).unwrap();
        assert_eq!(bools(&any(&a, None).unwrap()), vec![false]);
        assert_eq!(bools(&all(&a, Some(0)).unwrap()), vec![true]);
    }

    #[test]
    fn test_negative_zero_is_false() {
        let a = NdArray::from_slice(&[-0.0f64], &[1]).unwrap();
        assert_eq!(bools(&any(&a, None).unwrap()), vec![false]);
    }

    #[test]
    fn test_into_wider_output() {
        let a = NdArray::from_slice(&[1u8, 0, 4, 5], &[2, 2]).unwrap();
        let mut out = NdArray::allocate(builtin_descr(BuiltinType::Int32), &[2], MemoryOrder::C)
            .unwrap();
        all_into(&a, Some(1), &mut out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![0, 1]);
        any_into(&a, Some(0), &mut out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![1, 1]);

        let err = any_into(&a, Some(3), &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Axis);
        let mut wrong = NdArray::allocate(builtin_descr(BuiltinType::Bool), &[4], MemoryOrder::C)
            .unwrap();
        assert!(matches!(all_into(&a, None, &mut wrong), Err(NdError::ShapeMismatch(..))));
    }
}
