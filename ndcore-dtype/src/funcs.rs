//! Per-kind element behavior dispatched by generic array code.
//!
//! [`ArrFuncs`] is the capability interface every element type implements.
//! Four methods are required (`copyswap`, `getitem`, `setitem`, `compare`);
//! everything else has a generic default built on top of them, so a user
//! type only overrides what it can do faster or differently:
//!
//! ```ignore
//! impl ArrFuncs for MyFixedPoint {
//!     fn copyswap(&self, dst: &mut [u8], src: &[u8], swap: bool) { ... }
//!     fn getitem(&self, src: &[u8]) -> Scalar { ... }
//!     fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()> { ... }
//!     fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering> { ... }
//! }
//! ```
//!
//! All element slices handed to these methods are in native byte order and
//! exactly one element long; buffers of several elements are contiguous with
//! `elsize` bytes per element.

use std::cmp::Ordering;

use crate::scalar::Scalar;
use crate::types::SortKind;
use crate::{NdError, Result};

/// Element behavior table for one element type.
pub trait ArrFuncs: Send + Sync {
    /// Copy one element from `src` to `dst`, reversing its byte order when
    /// `swap` is set.
    fn copyswap(&self, dst: &mut [u8], src: &[u8], swap: bool);

    /// Read one element.
    fn getitem(&self, src: &[u8]) -> Scalar;

    /// Store `value` into one element.
    fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()>;

    /// Order two elements. `None` means unordered (NaN-like).
    fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering>;

    /// Copy `n` elements between strided byte buffers.
    ///
    /// Element `i` lives at byte `i * stride` of each buffer.
    #[allow(clippy::too_many_arguments)]
    fn copyswapn(
        &self,
        dst: &mut [u8],
        dstride: usize,
        src: &[u8],
        sstride: usize,
        n: usize,
        elsize: usize,
        swap: bool,
    ) {
        for i in 0..n {
            let d = i * dstride;
            let s = i * sstride;
            self.copyswap(&mut dst[d..d + elsize], &src[s..s + elsize], swap);
        }
    }

    /// True iff any byte of the element is nonzero.
    fn nonzero(&self, src: &[u8]) -> bool {
        src.iter().any(|&b| b != 0)
    }

    /// Index of the first maximal element of a contiguous buffer.
    ///
    /// An element that is unordered with itself wins immediately. Returns
    /// `None` for an empty buffer.
    fn argmax(&self, data: &[u8], elsize: usize) -> Option<usize> {
        let n = data.len().checked_div(elsize).unwrap_or(0);
        if n == 0 {
            return None;
        }
        let mut best = 0;
        for i in 0..n {
            let cur = &data[i * elsize..(i + 1) * elsize];
            if self.compare(cur, cur).is_none() {
                return Some(i);
            }
            let best_elem = &data[best * elsize..(best + 1) * elsize];
            if self.compare(cur, best_elem) == Some(Ordering::Greater) {
                best = i;
            }
        }
        Some(best)
    }

    /// Continue the arithmetic progression set by the first two elements.
    fn fill(&self, data: &mut [u8], elsize: usize) -> Result<()> {
        let n = data.len().checked_div(elsize).unwrap_or(0);
        if n < 2 {
            return Ok(());
        }
        let start = self.getitem(&data[..elsize]);
        let delta = self.getitem(&data[elsize..2 * elsize]).sub(start);
        for i in 2..n {
            let value = start.add(delta.mul(Scalar::Int(i as i64)));
            self.setitem(&value, &mut data[i * elsize..(i + 1) * elsize])?;
        }
        Ok(())
    }

    /// Write `value` into every element of a contiguous buffer.
    fn fill_with_scalar(&self, data: &mut [u8], elsize: usize, value: &Scalar) -> Result<()> {
        if elsize == 0 || data.len() < elsize {
            return Ok(());
        }
        self.setitem(value, &mut data[..elsize])?;
        let (first, rest) = data.split_at_mut(elsize);
        for chunk in rest.chunks_exact_mut(elsize) {
            chunk.copy_from_slice(first);
        }
        Ok(())
    }

    /// Parse one element from text.
    fn from_str(&self, text: &str, dst: &mut [u8]) -> Result<()> {
        let trimmed = text.trim();
        let value = match trimmed {
            "true" | "True" => Scalar::Bool(true),
            "false" | "False" => Scalar::Bool(false),
            _ => {
                if let Ok(v) = trimmed.parse::<i64>() {
                    Scalar::Int(v)
                } else if let Ok(v) = trimmed.parse::<u64>() {
                    Scalar::UInt(v)
                } else if let Ok(v) = trimmed.parse::<f64>() {
                    Scalar::Float(v)
                } else {
                    return Err(NdError::InvalidValue {
                        value: text.to_string(),
                        type_name: std::any::type_name::<Self>().to_string(),
                    });
                }
            }
        };
        self.setitem(&value, dst)
    }

    /// Permutation that sorts a contiguous buffer. Unordered elements sort
    /// last; `MergeSort` is stable.
    fn argsort(&self, kind: SortKind, data: &[u8], elsize: usize) -> Result<Vec<usize>> {
        // Zero-sized elements carry no order.
        let n = data.len().checked_div(elsize).unwrap_or(0);
        let elem = |i: usize| &data[i * elsize..(i + 1) * elsize];
        let order = |a: &usize, b: &usize| {
            let (x, y) = (elem(*a), elem(*b));
            match self.compare(x, y) {
                Some(ord) => ord,
                None => {
                    let x_nan = self.compare(x, x).is_none();
                    let y_nan = self.compare(y, y).is_none();
                    x_nan.cmp(&y_nan)
                }
            }
        };
        let mut perm: Vec<usize> = (0..n).collect();
        match kind {
            SortKind::MergeSort => perm.sort_by(order),
            SortKind::QuickSort | SortKind::HeapSort => perm.sort_unstable_by(order),
        }
        Ok(perm)
    }

    /// Sort a contiguous buffer in place.
    fn sort(&self, kind: SortKind, data: &mut [u8], elsize: usize) -> Result<()> {
        let perm = self.argsort(kind, data, elsize)?;
        let src = data.to_vec();
        for (i, &p) in perm.iter().enumerate() {
            data[i * elsize..(i + 1) * elsize].copy_from_slice(&src[p * elsize..(p + 1) * elsize]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-byte big-endian counter implementing only the required methods.
    struct Be16;

    impl ArrFuncs for Be16 {
        fn copyswap(&self, dst: &mut [u8], src: &[u8], swap: bool) {
            dst.copy_from_slice(src);
            if swap {
                dst.reverse();
            }
        }

        fn getitem(&self, src: &[u8]) -> Scalar {
            Scalar::Int(u16::from_be_bytes([src[0], src[1]]) as i64)
        }

        fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()> {
            dst.copy_from_slice(&(value.as_i64() as u16).to_be_bytes());
            Ok(())
        }

        fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering> {
            Some(a.cmp(b))
        }
    }

    fn encode(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn test_default_nonzero() {
        assert!(!Be16.nonzero(&[0, 0]));
        assert!(Be16.nonzero(&[0, 1]));
    }

    #[test]
    fn test_default_copyswapn() {
        let src = encode(&[1, 2, 3]);
        let mut dst = vec![0u8; 12];
        Be16.copyswapn(&mut dst, 4, &src, 2, 3, 2, false);
        assert_eq!(dst, vec![0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0]);

        let mut swapped = vec![0u8; 6];
        Be16.copyswapn(&mut swapped, 2, &src, 2, 3, 2, true);
        assert_eq!(swapped, vec![1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_default_argmax_first_occurrence() {
        assert_eq!(Be16.argmax(&encode(&[3, 1, 4, 1, 5]), 2), Some(4));
        assert_eq!(Be16.argmax(&encode(&[2, 2, 1]), 2), Some(0));
        assert_eq!(Be16.argmax(&[], 2), None);
    }

    #[test]
    fn test_default_fill() {
        let mut data = encode(&[3, 5, 0, 0]);
        Be16.fill(&mut data, 2).unwrap();
        assert_eq!(data, encode(&[3, 5, 7, 9]));
    }

    #[test]
    fn test_default_fill_with_scalar() {
        let mut data = vec![0u8; 6];
        Be16.fill_with_scalar(&mut data, 2, &Scalar::Int(258)).unwrap();
        assert_eq!(data, encode(&[258, 258, 258]));
    }

    #[test]
    fn test_default_from_str() {
        let mut dst = [0u8; 2];
        Be16.from_str(" 42 ", &mut dst).unwrap();
        assert_eq!(dst, [0, 42]);
        assert!(Be16.from_str("forty-two", &mut dst).is_err());
    }

    #[test]
    fn test_default_sort() {
        let mut data = encode(&[5, 1, 4, 1]);
        assert_eq!(
            Be16.argsort(SortKind::MergeSort, &data, 2).unwrap(),
            vec![1, 3, 2, 0]
        );
        Be16.sort(SortKind::QuickSort, &mut data, 2).unwrap();
        assert_eq!(data, encode(&[1, 1, 4, 5]));
    }

    #[test]
    fn test_defaults_with_zero_elsize() {
        let mut data = vec![7u8; 4];
        assert_eq!(Be16.argmax(&data, 0), None);
        Be16.fill(&mut data, 0).unwrap();
        Be16.fill_with_scalar(&mut data, 0, &Scalar::Int(1)).unwrap();
        assert!(Be16.argsort(SortKind::HeapSort, &data, 0).unwrap().is_empty());
        Be16.sort(SortKind::MergeSort, &mut data, 0).unwrap();
        assert_eq!(data, vec![7u8; 4]);
    }
}
