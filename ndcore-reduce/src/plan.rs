//! Shared machinery: validation, lane iteration and result storage.

use std::sync::Arc;

use ndcore_array::{ArrayIter, Cursor, NdArray};
use ndcore_dtype::{can_cast_safely, cast_buffer, Descr, NdError, Result};

#[inline]
fn trace_enabled() -> bool {
    matches!(std::env::var("NDCORE_TRACE"), Ok(ref v) if v == "1")
}

// ============================================================================
// Validation
// ============================================================================

pub(crate) fn check_axis(a: &NdArray, axis: Option<usize>) -> Result<()> {
    match axis {
        Some(ax) if ax >= a.ndim() => Err(NdError::InvalidAxis {
            axis: ax,
            rank: a.ndim(),
        }),
        _ => Ok(()),
    }
}

/// Shape of the result of reducing `a` along `axis`.
///
/// `None` flattens: a 0-d result, or a 1-d one for cumulative reductions.
pub(crate) fn result_dims(a: &NdArray, axis: Option<usize>, cumulative: bool) -> Vec<usize> {
    match (axis, cumulative) {
        (Some(_), true) => a.dims().to_vec(),
        (None, true) => vec![a.size()],
        (Some(ax), false) => a
            .dims()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != ax)
            .map(|(_, &d)| d)
            .collect(),
        (None, false) => Vec::new(),
    }
}

pub(crate) fn check_cast(from: &Descr, to: &Descr) -> Result<()> {
    if can_cast_safely(from, to) {
        Ok(())
    } else {
        Err(NdError::IncompatibleType {
            from: from.name().to_string(),
            to: to.name().to_string(),
        })
    }
}

/// Shape first, then writability.
pub(crate) fn check_out(out: &NdArray, expected: &[usize]) -> Result<()> {
    if out.dims() != expected {
        return Err(NdError::ShapeMismatch(out.dims().to_vec(), expected.to_vec()));
    }
    if !out.is_writeable() {
        return Err(NdError::ReadOnly);
    }
    Ok(())
}

// ============================================================================
// Lanes
// ============================================================================

enum LaneKind<'a> {
    Strided {
        pos: usize,
        stride: isize,
        left: usize,
    },
    Flat(ArrayIter<'a>),
}

/// The elements folded into one result position.
pub(crate) struct Lane<'a> {
    array: &'a NdArray,
    kind: LaneKind<'a>,
}

impl<'a> Lane<'a> {
    fn strided(array: &'a NdArray, pos: usize, stride: isize, len: usize) -> Self {
        Lane {
            array,
            kind: LaneKind::Strided {
                pos,
                stride,
                left: len,
            },
        }
    }

    /// Copy the remaining elements into a contiguous native-order buffer.
    pub(crate) fn gather_native(self, descr: &Descr) -> Vec<u8> {
        let elsize = descr.elsize();
        let n = self.len();
        let mut out = vec![0u8; n * elsize];
        if let LaneKind::Strided { pos, stride, left } = self.kind {
            if stride >= 0 && left > 0 {
                descr.funcs().copyswapn(
                    &mut out,
                    elsize,
                    &self.array.buffer()[pos..],
                    stride as usize,
                    left,
                    elsize,
                    !descr.is_native(),
                );
                return out;
            }
        }
        for (k, elem) in self.enumerate() {
            descr.copy_to_native(&mut out[k * elsize..(k + 1) * elsize], elem);
        }
        out
    }
}

impl<'a> Iterator for Lane<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let array = self.array;
        match &mut self.kind {
            LaneKind::Strided { pos, stride, left } => {
                if *left == 0 {
                    return None;
                }
                let current = *pos;
                *left -= 1;
                if *left > 0 {
                    *pos = pos.wrapping_add_signed(*stride);
                }
                Some(array.element_at(current))
            }
            LaneKind::Flat(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match &self.kind {
            LaneKind::Strided { left, .. } => *left,
            LaneKind::Flat(it) => it.len(),
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Lane<'_> {}

/// Call `f` once per result position of a non-cumulative reduction, in
/// row-major order of the result, with the lane of elements it folds.
pub(crate) fn for_each_lane<'a, F>(a: &'a NdArray, axis: Option<usize>, mut f: F) -> Result<()>
where
    F: FnMut(Lane<'a>) -> Result<()>,
{
    match axis {
        Some(ax) => {
            let mut starts = Cursor::all_but_axis(a, ax)?;
            let len = a.dims()[ax];
            let stride = a.strides()[ax];
            if trace_enabled() {
                eprintln!(
                    "reduce: axis={} lanes={} lane_len={} lane_stride={}",
                    ax,
                    starts.size(),
                    len,
                    stride
                );
            }
            while let Some(pos) = starts.next_offset() {
                f(Lane::strided(a, pos, stride, len))?;
            }
            Ok(())
        }
        None if a.is_c_contiguous() => {
            if trace_enabled() {
                eprintln!("reduce: flat contiguous path len={}", a.size());
            }
            f(Lane::strided(a, a.offset(), a.itemsize() as isize, a.size()))
        }
        None => {
            if trace_enabled() {
                eprintln!(
                    "reduce: flat strided path dims={:?} strides={:?}",
                    a.dims(),
                    a.strides()
                );
            }
            f(Lane {
                array: a,
                kind: LaneKind::Flat(a.iter()),
            })
        }
    }
}

// ============================================================================
// Storing results
// ============================================================================

/// Order of packed results relative to the output array.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scatter {
    /// Row-major over the output shape.
    RowMajor,
    /// Lane after lane along the given output axis.
    Lanes(usize),
}

/// Convert `packed` (contiguous elements laid out as `from`) to the output
/// type and write it into `out`.
///
/// Conversion happens before the first write, so a failing conversion
/// leaves `out` untouched.
pub(crate) fn store(out: &mut NdArray, from: &Arc<Descr>, packed: &[u8], order: Scatter) -> Result<()> {
    let n = out.size();
    let elsize = out.itemsize();
    let converted;
    let bytes: &[u8] = if Arc::ptr_eq(from, out.descr()) || from.is_equivalent(out.descr()) {
        packed
    } else {
        let mut buf = vec![0u8; n * elsize];
        cast_buffer(from, out.descr(), packed, &mut buf, n)?;
        converted = buf;
        &converted
    };
    if elsize == 0 || n == 0 {
        return Ok(());
    }

    match order {
        Scatter::RowMajor => {
            let mut cursor = Cursor::new(out);
            let data = out.buffer_mut()?;
            for chunk in bytes.chunks_exact(elsize).take(n) {
                let Some(pos) = cursor.next_offset() else {
                    break;
                };
                data[pos..pos + elsize].copy_from_slice(chunk);
            }
        }
        Scatter::Lanes(axis) => {
            let mut starts = Cursor::all_but_axis(out, axis)?;
            let len = out.dims()[axis];
            let stride = out.strides()[axis];
            let data = out.buffer_mut()?;
            let mut chunks = bytes.chunks_exact(elsize);
            while let Some(start) = starts.next_offset() {
                let mut pos = start;
                for k in 0..len {
                    let Some(chunk) = chunks.next() else {
                        return Ok(());
                    };
                    if k > 0 {
                        pos = pos.wrapping_add_signed(stride);
                    }
                    data[pos..pos + elsize].copy_from_slice(chunk);
                }
            }
        }
    }
    Ok(())
}
