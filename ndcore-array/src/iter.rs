//! Element iteration over strided arrays.
//!
//! [`Cursor`] holds only layout state (byte position, per-dimension strides
//! and coordinates), so it can drive writes into an array that is mutably
//! borrowed elsewhere. [`ArrayIter`] pairs a cursor with a shared borrow of
//! its array and yields element byte slices.
//!
//! Iteration order is always row-major over the iterated shape.

use smallvec::{smallvec, SmallVec};

use ndcore_dtype::{NdError, Result};

use crate::array::{checked_size, is_c_contiguous, NdArray};

type DimVec<T> = SmallVec<[T; 8]>;

#[inline]
fn shift(pos: usize, delta: isize) -> usize {
    pos.wrapping_add_signed(delta)
}

/// Row-major stepping state over one strided layout.
#[derive(Debug, Clone)]
pub struct Cursor {
    index: usize,
    size: usize,
    start: usize,
    pos: usize,
    elsize: usize,
    dims_m1: DimVec<usize>,
    strides: DimVec<isize>,
    backstrides: DimVec<isize>,
    factors: DimVec<usize>,
    coords: DimVec<usize>,
    contiguous: bool,
}

impl Cursor {
    /// Cursor over an explicit layout starting at byte `start`.
    ///
    /// # Errors
    /// `SizeOverflow` if the element count of `dims` does not fit in `usize`.
    pub fn from_layout(
        start: usize,
        dims: &[usize],
        strides: &[isize],
        elsize: usize,
    ) -> Result<Self> {
        let size = checked_size(dims).ok_or_else(|| NdError::SizeOverflow {
            dims: dims.to_vec(),
        })?;
        Ok(Self::with_size(start, dims, strides, elsize, size))
    }

    // Factors and backstrides saturate only for empty layouts, which never
    // step or seek.
    fn with_size(
        start: usize,
        dims: &[usize],
        strides: &[isize],
        elsize: usize,
        size: usize,
    ) -> Self {
        let nd = dims.len();
        let mut factors: DimVec<usize> = smallvec![1; nd];
        for d in (0..nd.saturating_sub(1)).rev() {
            factors[d] = factors[d + 1].saturating_mul(dims[d + 1]);
        }
        Cursor {
            index: 0,
            size,
            start,
            pos: start,
            elsize,
            dims_m1: dims.iter().map(|&d| d.saturating_sub(1)).collect(),
            strides: strides.iter().copied().collect(),
            backstrides: dims
                .iter()
                .zip(strides)
                .map(|(&d, &s)| s.saturating_mul(d.saturating_sub(1) as isize))
                .collect(),
            factors,
            coords: smallvec![0; nd],
            contiguous: is_c_contiguous(dims, strides, elsize),
        }
    }

    /// Cursor over every element of `array`.
    pub fn new(array: &NdArray) -> Self {
        Self::with_size(
            array.offset(),
            array.dims(),
            array.strides(),
            array.itemsize(),
            array.size(),
        )
    }

    /// Cursor presenting `array` with shape `target`.
    ///
    /// Shapes are right-aligned; missing leading axes and length-1 axes
    /// repeat with stride 0.
    pub fn broadcast(array: &NdArray, target: &[usize]) -> Result<Self> {
        let dims = array.dims();
        let mismatch = || NdError::ShapeMismatch(dims.to_vec(), target.to_vec());
        if dims.len() > target.len() {
            return Err(mismatch());
        }
        let lead = target.len() - dims.len();
        let mut strides = vec![0isize; target.len()];
        for (i, (&d, &s)) in dims.iter().zip(array.strides()).enumerate() {
            let t = target[lead + i];
            if d == t {
                strides[lead + i] = s;
            } else if d != 1 {
                return Err(mismatch());
            }
        }
        Self::from_layout(array.offset(), target, &strides, array.itemsize())
    }

    /// Cursor over the first element of every lane along `axis`.
    ///
    /// The axis is held at coordinate 0, so the cursor visits
    /// `size / dims[axis]` positions (one per lane, also when the axis is
    /// empty).
    pub fn all_but_axis(array: &NdArray, axis: usize) -> Result<Self> {
        if axis >= array.ndim() {
            return Err(NdError::InvalidAxis {
                axis,
                rank: array.ndim(),
            });
        }
        let mut dims = array.dims().to_vec();
        let mut strides = array.strides().to_vec();
        dims[axis] = 1;
        strides[axis] = 0;
        Self::from_layout(array.offset(), &dims, &strides, array.itemsize())
    }

    /// Byte position of the current element, then advance. `None` once all
    /// `size` positions were returned; the cursor does not move further.
    pub fn next_offset(&mut self) -> Option<usize> {
        if self.index >= self.size {
            return None;
        }
        let current = self.pos;
        self.index += 1;
        if self.contiguous {
            self.pos += self.elsize;
        } else {
            for d in (0..self.coords.len()).rev() {
                if self.coords[d] < self.dims_m1[d] {
                    self.coords[d] += 1;
                    self.pos = shift(self.pos, self.strides[d]);
                    break;
                }
                self.coords[d] = 0;
                self.pos = shift(self.pos, -self.backstrides[d]);
            }
        }
        Some(current)
    }

    /// Byte position of the current element, `None` when exhausted.
    #[inline]
    pub fn position(&self) -> Option<usize> {
        (self.index < self.size).then_some(self.pos)
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.pos = self.start;
        self.coords.iter_mut().for_each(|c| *c = 0);
    }

    fn coords_of(&self, index: usize) -> DimVec<usize> {
        let mut rem = index;
        self.factors
            .iter()
            .map(|&f| {
                if f == 0 {
                    0
                } else {
                    let c = rem / f;
                    rem %= f;
                    c
                }
            })
            .collect()
    }

    fn seek(&mut self, index: usize, coords: DimVec<usize>) -> usize {
        let delta: isize = coords
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c as isize * s)
            .sum();
        self.index = index;
        self.pos = shift(self.start, delta);
        self.coords = coords;
        self.pos
    }

    /// Move to row-major position `index` and return its byte position.
    ///
    /// Accepts `-size <= index < size`; negative indices count from the end.
    ///
    /// # Errors
    /// `IndexOutOfBounds` otherwise; the cursor is left where it was.
    pub fn goto_linear_index(&mut self, index: isize) -> Result<usize> {
        let size = self.size as isize;
        let i = if index < 0 { index + size } else { index };
        if i < 0 || i >= size {
            return Err(NdError::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        let coords = self.coords_of(i as usize);
        Ok(self.seek(i as usize, coords))
    }

    /// Move to the element at `coords` and return its byte position.
    pub fn goto_coords(&mut self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.coords.len() {
            return Err(NdError::WrongNumberOfIndices {
                expected: self.coords.len(),
                actual: coords.len(),
            });
        }
        let mut index = 0;
        for (d, &c) in coords.iter().enumerate() {
            if c > self.dims_m1[d] || self.size == 0 {
                return Err(NdError::IndexOutOfBounds {
                    index: c as isize,
                    size: self.dims_m1[d] + 1,
                });
            }
            index += c * self.factors[d];
        }
        Ok(self.seek(index, coords.iter().copied().collect()))
    }

    /// Coordinates of the current position.
    ///
    /// Contiguous layouts derive them from the linear index through the
    /// factor table; other layouts track them while stepping.
    pub fn coordinates(&self) -> Vec<usize> {
        if self.contiguous {
            self.coords_of(self.index).into_vec()
        } else {
            self.coords.to_vec()
        }
    }

    /// Per-dimension factors: the product of all faster-varying lengths.
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }
}

/// Iterator over the element byte slices of one array.
#[derive(Debug, Clone)]
pub struct ArrayIter<'a> {
    array: &'a NdArray,
    cursor: Cursor,
}

impl<'a> ArrayIter<'a> {
    pub fn new(array: &'a NdArray) -> Self {
        ArrayIter {
            array,
            cursor: Cursor::new(array),
        }
    }

    /// Iterate `array` as if it had shape `target`.
    pub fn broadcast(array: &'a NdArray, target: &[usize]) -> Result<Self> {
        Ok(ArrayIter {
            array,
            cursor: Cursor::broadcast(array, target)?,
        })
    }

    /// Iterate the first element of every lane along `axis`.
    pub fn all_but_axis(array: &'a NdArray, axis: usize) -> Result<Self> {
        Ok(ArrayIter {
            array,
            cursor: Cursor::all_but_axis(array, axis)?,
        })
    }

    /// The iterated array.
    pub fn array(&self) -> &'a NdArray {
        self.array
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Current element without advancing, `None` when exhausted.
    pub fn current(&self) -> Option<&'a [u8]> {
        let array = self.array;
        self.cursor.position().map(|pos| array.element_at(pos))
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Jump to a row-major position; see [`Cursor::goto_linear_index`].
    pub fn goto_linear_index(&mut self, index: isize) -> Result<&'a [u8]> {
        let pos = self.cursor.goto_linear_index(index)?;
        Ok(self.array.element_at(pos))
    }

    pub fn goto_coords(&mut self, coords: &[usize]) -> Result<&'a [u8]> {
        let pos = self.cursor.goto_coords(coords)?;
        Ok(self.array.element_at(pos))
    }

    pub fn coordinates(&self) -> Vec<usize> {
        self.cursor.coordinates()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cursor.size()
    }
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let array = self.array;
        self.cursor.next_offset().map(|pos| array.element_at(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.cursor.size() - self.cursor.index();
        (left, Some(left))
    }
}

impl ExactSizeIterator for ArrayIter<'_> {}
