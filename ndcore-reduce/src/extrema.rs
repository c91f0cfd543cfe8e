//! Max, min and argmax through the descriptor's comparison functions.

use std::cmp::Ordering;
use std::sync::Arc;

use ndcore_array::{MemoryOrder, NdArray};
use ndcore_dtype::{builtin_descr, BuiltinType, Descr, NdError, Result};

use crate::plan::{check_axis, check_cast, check_out, for_each_lane, result_dims, store, Scatter};

/// Element of `lane` preferred under `wanted`. An element unordered with
/// itself (NaN-like) is returned as soon as it is seen.
fn pick<'a, I>(descr: &Descr, lane: I, wanted: Ordering) -> Option<&'a [u8]>
where
    I: Iterator<Item = &'a [u8]>,
{
    let mut best: Option<&'a [u8]> = None;
    for elem in lane {
        if descr.compare(elem, elem).is_none() {
            return Some(elem);
        }
        match best {
            Some(b) if descr.compare(elem, b) != Some(wanted) => {}
            _ => best = Some(elem),
        }
    }
    best
}

fn extreme(a: &NdArray, axis: Option<usize>, out: &mut NdArray, wanted: Ordering) -> Result<()> {
    let descr = a.descr();
    let mut packed = Vec::with_capacity(out.size() * descr.elsize());
    for_each_lane(a, axis, |lane| {
        let elem = pick(descr, lane, wanted).ok_or(NdError::EmptyReduction)?;
        packed.extend_from_slice(elem);
        Ok(())
    })?;
    store(out, descr, &packed, Scatter::RowMajor)
}

fn extreme_new(a: &NdArray, axis: Option<usize>, wanted: Ordering) -> Result<NdArray> {
    check_axis(a, axis)?;
    let dims = result_dims(a, axis, false);
    let mut out = NdArray::allocate(a.descr().clone(), &dims, MemoryOrder::C)?;
    extreme(a, axis, &mut out, wanted)?;
    Ok(out)
}

fn extreme_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray, wanted: Ordering) -> Result<()> {
    check_axis(a, axis)?;
    check_cast(a.descr(), out.descr())?;
    check_out(out, &result_dims(a, axis, false))?;
    extreme(a, axis, out, wanted)
}

/// Largest element along `axis`, with the input's type.
///
/// NaN-like elements propagate: the first one found in a lane is the result.
///
/// # Errors
/// - `InvalidAxis` if `axis >= a.ndim()`
/// - `EmptyReduction` if any reduced lane has no elements
pub fn max(a: &NdArray, axis: Option<usize>) -> Result<NdArray> {
    extreme_new(a, axis, Ordering::Greater)
}

pub fn max_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    extreme_into(a, axis, out, Ordering::Greater)
}

/// Smallest element along `axis`; see [`max`].
pub fn min(a: &NdArray, axis: Option<usize>) -> Result<NdArray> {
    extreme_new(a, axis, Ordering::Less)
}

pub fn min_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    extreme_into(a, axis, out, Ordering::Less)
}

// ============================================================================
// ArgMax
// ============================================================================

fn argmax_impl(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    let descr = a.descr();
    let elsize = descr.elsize();
    if elsize == 0 {
        return Err(NdError::Unsupported {
            op: "argmax",
            type_name: descr.name().to_string(),
        });
    }
    let index_descr: Arc<Descr> = builtin_descr(BuiltinType::Int64);
    let mut packed = Vec::with_capacity(out.size() * 8);
    for_each_lane(a, axis, |lane| {
        let native = lane.gather_native(descr);
        let best = descr
            .funcs()
            .argmax(&native, elsize)
            .ok_or(NdError::EmptyReduction)?;
        packed.extend_from_slice(&(best as i64).to_ne_bytes());
        Ok(())
    })?;
    store(out, &index_descr, &packed, Scatter::RowMajor)
}

/// Index of the largest element along `axis`, as `int64`.
///
/// With `axis == None` the index is into the row-major flattened array.
/// Ties resolve to the first occurrence and NaN-like elements win.
///
/// # Errors
/// - `InvalidAxis` if `axis >= a.ndim()`
/// - `EmptyReduction` if any reduced lane has no elements
pub fn argmax(a: &NdArray, axis: Option<usize>) -> Result<NdArray> {
    check_axis(a, axis)?;
    let dims = result_dims(a, axis, false);
    let mut out = NdArray::allocate(builtin_descr(BuiltinType::Int64), &dims, MemoryOrder::C)?;
    argmax_impl(a, axis, &mut out)?;
    Ok(out)
}

/// [`argmax`] into `out`, whose type must hold `int64` indices safely.
pub fn argmax_into(a: &NdArray, axis: Option<usize>, out: &mut NdArray) -> Result<()> {
    check_axis(a, axis)?;
    check_cast(&builtin_descr(BuiltinType::Int64), out.descr())?;
    check_out(out, &result_dims(a, axis, false))?;
    argmax_impl(a, axis, out)
}
