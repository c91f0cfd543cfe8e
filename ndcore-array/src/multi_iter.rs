//! Lockstep iteration over several arrays broadcast to a common shape.

use ndcore_dtype::{NdError, Result, MAXDIMS};

use crate::array::{checked_size, NdArray};
use crate::iter::ArrayIter;

/// Broadcast shape of several shapes.
///
/// Shapes are right-aligned; along each axis every length other than 1 must
/// agree.
///
/// # Errors
/// - `ShapeMismatch` naming the first conflicting shape and the shape
///   accumulated so far
/// - `SizeOverflow` if the broadcast element count does not fit in `usize`
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let nd = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    if nd > MAXDIMS {
        return Err(NdError::TooManyDims {
            ndim: nd,
            max: MAXDIMS,
        });
    }
    let mut out = vec![1usize; nd];
    for shape in shapes {
        let lead = nd - shape.len();
        for (k, &d) in shape.iter().enumerate() {
            let slot = &mut out[lead + k];
            if d == 1 || d == *slot {
                continue;
            }
            if *slot == 1 {
                *slot = d;
            } else {
                return Err(NdError::ShapeMismatch(shape.to_vec(), out.clone()));
            }
        }
    }
    if checked_size(&out).is_none() {
        return Err(NdError::SizeOverflow { dims: out });
    }
    Ok(out)
}

/// Broadcast iterator advancing one [`ArrayIter`] per array in lockstep.
#[derive(Debug, Clone)]
pub struct MultiIter<'a> {
    iters: Vec<ArrayIter<'a>>,
    dims: Vec<usize>,
    size: usize,
    index: usize,
}

impl<'a> MultiIter<'a> {
    /// Broadcast `arrays` together.
    ///
    /// # Errors
    /// `ShapeMismatch` if the shapes do not broadcast.
    pub fn new(arrays: &[&'a NdArray]) -> Result<Self> {
        let shapes: Vec<&[usize]> = arrays.iter().map(|a| a.dims()).collect();
        let dims = broadcast_shapes(&shapes)?;
        let iters = arrays
            .iter()
            .map(|&a| ArrayIter::broadcast(a, &dims))
            .collect::<Result<Vec<_>>>()?;
        let size = iters.first().map_or(1, ArrayIter::size);
        Ok(MultiIter {
            iters,
            size,
            dims,
            index: 0,
        })
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.iters.iter_mut().for_each(ArrayIter::reset);
    }

    /// Move every component to broadcast position `index`; same range rule
    /// as [`ArrayIter::goto_linear_index`].
    pub fn goto_linear_index(&mut self, index: isize) -> Result<()> {
        let size = self.size as isize;
        let i = if index < 0 { index + size } else { index };
        if i < 0 || i >= size {
            return Err(NdError::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        for it in &mut self.iters {
            it.goto_linear_index(i)?;
        }
        self.index = i as usize;
        Ok(())
    }

    /// Number of component iterators.
    pub fn numiter(&self) -> usize {
        self.iters.len()
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Broadcast shape.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Component iterator `i`.
    pub fn iter(&self, i: usize) -> Option<&ArrayIter<'a>> {
        self.iters.get(i)
    }

    /// Current elements without advancing, `None` when exhausted.
    pub fn current(&self) -> Option<Vec<&'a [u8]>> {
        if self.index >= self.size {
            return None;
        }
        self.iters.iter().map(ArrayIter::current).collect()
    }
}

impl<'a> Iterator for MultiIter<'a> {
    type Item = Vec<&'a [u8]>;

    fn next(&mut self) -> Option<Vec<&'a [u8]>> {
        if self.index >= self.size {
            return None;
        }
        self.index += 1;
        self.iters.iter_mut().map(Iterator::next).collect()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.size - self.index;
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndcore_dtype::{builtin_descr, BuiltinType, ErrorKind};

    fn arange(dims: &[usize]) -> NdArray {
        let n: usize = dims.iter().product();
        let v: Vec<i32> = (0..n as i32).collect();
        NdArray::from_slice(&v, dims).unwrap()
    }

    fn read(elem: &[u8]) -> i32 {
        i32::from_ne_bytes(elem.try_into().unwrap())
    }

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(broadcast_shapes(&[&[3, 1], &[1, 4]]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shapes(&[&[5, 1, 2], &[4, 1]]).unwrap(), vec![5, 4, 2]);
        assert_eq!(broadcast_shapes(&[&[], &[2]]).unwrap(), vec![2]);
        assert_eq!(broadcast_shapes(&[&[0], &[1]]).unwrap(), vec![0]);
        let err = broadcast_shapes(&[&[3, 2], &[4, 2]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_multi_iter_broadcast() {
        let a = arange(&[3, 1]);
        let b = arange(&[1, 4]);
        let multi = MultiIter::new(&[&a, &b]).unwrap();
        assert_eq!(multi.dims(), &[3, 4]);
        assert_eq!(multi.size(), 12);
        assert_eq!(multi.numiter(), 2);
        assert_eq!(multi.ndim(), 2);

        let pairs: Vec<(i32, i32)> = multi.map(|e| (read(e[0]), read(e[1]))).collect();
        assert_eq!(pairs.len(), 12);
        for (k, &(x, y)) in pairs.iter().enumerate() {
            assert_eq!(x, (k / 4) as i32);
            assert_eq!(y, (k % 4) as i32);
        }
    }

    #[test]
    fn test_multi_iter_shape_error() {
        let a = arange(&[3, 2]);
        let b = arange(&[4, 2]);
        let err = MultiIter::new(&[&a, &b]).unwrap_err();
        assert!(matches!(err, NdError::ShapeMismatch(..)));
    }

    #[test]
    fn test_broadcast_size_overflow() {
        let descr = builtin_descr(BuiltinType::Int8);
        let tall =
            NdArray::from_bytes(descr.clone(), vec![0], &[1 << 40, 1], &[0, 0], 0).unwrap();
        let wide = NdArray::from_bytes(descr, vec![0], &[1, 1 << 40], &[0, 0], 0).unwrap();
        let err = MultiIter::new(&[&tall, &wide]).unwrap_err();
        assert!(matches!(err, NdError::SizeOverflow { .. }));
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(broadcast_shapes(&[&[1 << 40, 1], &[1, 1 << 40]]).is_err());
        assert_eq!(broadcast_shapes(&[&[1 << 40, 0], &[1, 1]]).unwrap(), vec![1 << 40, 0]);
    }

    #[test]
    fn test_multi_iter_exhaustion_and_reset() {
        let a = arange(&[2]);
        let b = arange(&[3, 2]);
        let mut multi = MultiIter::new(&[&a, &b]).unwrap();
        assert_eq!(multi.by_ref().count(), 6);
        assert!(multi.next().is_none());
        assert_eq!(multi.index(), 6);
        for i in 0..multi.numiter() {
            let it = multi.iter(i).unwrap();
            assert_eq!(it.index(), it.size());
        }
        multi.reset();
        let first = multi.next().unwrap();
        assert_eq!((read(first[0]), read(first[1])), (0, 0));
    }

    #[test]
    fn test_multi_iter_goto() {
        let a = arange(&[3, 1]);
        let b = arange(&[1, 4]);
        let mut multi = MultiIter::new(&[&a, &b]).unwrap();
        multi.goto_linear_index(-1).unwrap();
        let last = multi.current().unwrap();
        assert_eq!((read(last[0]), read(last[1])), (2, 3));
        assert!(multi.goto_linear_index(12).is_err());
        assert_eq!(multi.index(), 11);
    }
}
