//! Owned strided N-dimensional byte arrays bound to a descriptor.

use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use ndcore_dtype::{cast_buffer, Descr, NativeElement, NdError, Result, Scalar, MAXDIMS};

use crate::iter::{ArrayIter, Cursor};

// ============================================================================
// Layout helpers
// ============================================================================

/// Memory order of a freshly allocated array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryOrder {
    /// Row-major: last index varies fastest.
    #[default]
    C,
    /// Column-major: first index varies fastest.
    Fortran,
}

fn stride_overflow() -> NdError {
    NdError::AllocationFailed { bytes: usize::MAX }
}

fn to_stride(n: usize) -> Result<isize> {
    isize::try_from(n).map_err(|_| stride_overflow())
}

/// Row-major byte strides for `dims` with `elsize`-byte elements.
///
/// # Errors
/// `AllocationFailed` if a stride does not fit in `isize`.
pub fn c_strides(dims: &[usize], elsize: usize) -> Result<Vec<isize>> {
    let rank = dims.len();
    let mut strides = vec![to_stride(elsize)?; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1]
            .checked_mul(to_stride(dims[i + 1].max(1))?)
            .ok_or_else(stride_overflow)?;
    }
    Ok(strides)
}

/// Column-major byte strides for `dims` with `elsize`-byte elements.
pub fn f_strides(dims: &[usize], elsize: usize) -> Result<Vec<isize>> {
    let rank = dims.len();
    let mut strides = vec![to_stride(elsize)?; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1]
            .checked_mul(to_stride(dims[i - 1].max(1))?)
            .ok_or_else(stride_overflow)?;
    }
    Ok(strides)
}

/// Number of elements of `dims`, `None` on overflow. Any zero length makes
/// the count 0 regardless of the other lengths.
pub(crate) fn checked_size(dims: &[usize]) -> Option<usize> {
    if dims.contains(&0) {
        return Some(0);
    }
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Whether the layout is row-major contiguous. Length-1 axes may carry any
/// stride and empty layouts count as contiguous.
pub(crate) fn is_c_contiguous(dims: &[usize], strides: &[isize], elsize: usize) -> bool {
    if dims.iter().any(|&d| d == 0) {
        return true;
    }
    let mut expected = elsize as isize;
    for (&d, &s) in dims.iter().zip(strides).rev() {
        if d != 1 {
            if s != expected {
                return false;
            }
            let Some(next) = isize::try_from(d).ok().and_then(|d| expected.checked_mul(d)) else {
                return false;
            };
            expected = next;
        }
    }
    true
}

pub(crate) fn is_f_contiguous(dims: &[usize], strides: &[isize], elsize: usize) -> bool {
    if dims.iter().any(|&d| d == 0) {
        return true;
    }
    let mut expected = elsize as isize;
    for (&d, &s) in dims.iter().zip(strides) {
        if d != 1 {
            if s != expected {
                return false;
            }
            let Some(next) = isize::try_from(d).ok().and_then(|d| expected.checked_mul(d)) else {
                return false;
            };
            expected = next;
        }
    }
    true
}

/// Validate that every element of the layout lies inside a `len`-byte
/// buffer.
fn validate_bounds(
    len: usize,
    dims: &[usize],
    strides: &[isize],
    offset: usize,
    elsize: usize,
) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(NdError::StrideLengthMismatch);
    }
    if dims.iter().any(|&d| d == 0) {
        return if offset <= len {
            Ok(())
        } else {
            Err(NdError::OutOfBuffer { len })
        };
    }
    let overflow = || NdError::OutOfBuffer { len };
    let mut min_offset = isize::try_from(offset).map_err(|_| overflow())?;
    let mut max_offset = min_offset;
    for (&dim, &stride) in dims.iter().zip(strides) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or_else(overflow)?;
            if end >= 0 {
                max_offset = max_offset.checked_add(end).ok_or_else(overflow)?;
            } else {
                min_offset = min_offset.checked_add(end).ok_or_else(overflow)?;
            }
        }
    }
    let last = (max_offset as usize).checked_add(elsize).ok_or_else(overflow)?;
    if min_offset < 0 || last > len {
        return Err(overflow());
    }
    Ok(())
}

fn checked_nbytes(dims: &[usize], elsize: usize) -> Result<usize> {
    checked_size(dims)
        .and_then(|n| n.checked_mul(elsize))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or(NdError::AllocationFailed { bytes: usize::MAX })
}

// ============================================================================
// Flags
// ============================================================================

/// Layout and access flags of an [`NdArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ArrayFlags(u32);

impl ArrayFlags {
    pub const C_CONTIGUOUS: ArrayFlags = ArrayFlags(0x0001);
    pub const F_CONTIGUOUS: ArrayFlags = ArrayFlags(0x0002);
    /// The buffer was allocated by the array itself.
    pub const OWNDATA: ArrayFlags = ArrayFlags(0x0004);
    pub const ALIGNED: ArrayFlags = ArrayFlags(0x0100);
    /// Elements are stored in native byte order.
    pub const NOTSWAPPED: ArrayFlags = ArrayFlags(0x0200);
    pub const WRITEABLE: ArrayFlags = ArrayFlags(0x0400);

    pub const fn empty() -> Self {
        ArrayFlags(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True iff every flag in `other` is set.
    pub const fn contains(self, other: ArrayFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, flag: ArrayFlags, on: bool) {
        if on {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

impl BitOr for ArrayFlags {
    type Output = ArrayFlags;

    fn bitor(self, rhs: ArrayFlags) -> ArrayFlags {
        ArrayFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ArrayFlags {
    fn bitor_assign(&mut self, rhs: ArrayFlags) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// NdArray
// ============================================================================

/// Strided N-dimensional array of elements described by a shared [`Descr`].
///
/// Strides are in bytes and may be negative or zero. The element at
/// coordinates `c` starts at byte `offset + sum(c[d] * strides[d])` of the
/// buffer.
#[derive(Debug)]
pub struct NdArray {
    data: Vec<u8>,
    offset: usize,
    descr: Arc<Descr>,
    dims: Vec<usize>,
    strides: Vec<isize>,
    flags: ArrayFlags,
}

impl Clone for NdArray {
    fn clone(&self) -> Self {
        let mut out = NdArray {
            data: self.data.clone(),
            offset: self.offset,
            descr: self.descr.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            flags: self.flags,
        };
        // the copy lives at a new address
        out.update_flags();
        out
    }
}

impl NdArray {
    /// Allocate a zero-filled array.
    ///
    /// # Errors
    /// - `TooManyDims` if `dims.len() > MAXDIMS`
    /// - `AllocationFailed` if the byte size overflows or cannot be allocated
    pub fn allocate(descr: Arc<Descr>, dims: &[usize], order: MemoryOrder) -> Result<Self> {
        if dims.len() > MAXDIMS {
            return Err(NdError::TooManyDims {
                ndim: dims.len(),
                max: MAXDIMS,
            });
        }
        let elsize = descr.elsize();
        let nbytes = checked_nbytes(dims, elsize)?;
        let mut data = Vec::new();
        data.try_reserve_exact(nbytes)
            .map_err(|_| NdError::AllocationFailed { bytes: nbytes })?;
        data.resize(nbytes, 0);

        let strides = match order {
            MemoryOrder::C => c_strides(dims, elsize)?,
            MemoryOrder::Fortran => f_strides(dims, elsize)?,
        };
        let mut array = NdArray {
            data,
            offset: 0,
            descr,
            dims: dims.to_vec(),
            strides,
            flags: ArrayFlags::OWNDATA | ArrayFlags::WRITEABLE,
        };
        array.update_flags();
        Ok(array)
    }

    /// Wrap an existing buffer with an explicit layout.
    ///
    /// `strides` and `offset` are in bytes. Every addressable element must
    /// lie inside `data`.
    ///
    /// # Errors
    /// - `SizeOverflow` if the element count does not fit in `usize`
    /// - `OutOfBuffer` / `StrideLengthMismatch` for an invalid layout
    pub fn from_bytes(
        descr: Arc<Descr>,
        data: Vec<u8>,
        dims: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self> {
        if dims.len() > MAXDIMS {
            return Err(NdError::TooManyDims {
                ndim: dims.len(),
                max: MAXDIMS,
            });
        }
        if checked_size(dims).is_none() {
            return Err(NdError::SizeOverflow {
                dims: dims.to_vec(),
            });
        }
        validate_bounds(data.len(), dims, strides, offset, descr.elsize())?;
        let mut array = NdArray {
            data,
            offset,
            descr,
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            flags: ArrayFlags::WRITEABLE,
        };
        array.update_flags();
        Ok(array)
    }

    /// Row-major array holding a copy of `values`.
    pub fn from_slice<T: NativeElement>(values: &[T], dims: &[usize]) -> Result<Self> {
        let expected: usize = dims.iter().product();
        if expected != values.len() {
            return Err(NdError::ShapeMismatch(vec![values.len()], dims.to_vec()));
        }
        let mut array = Self::allocate(Descr::of::<T>(), dims, MemoryOrder::C)?;
        array.data.copy_from_slice(bytemuck::cast_slice(values));
        Ok(array)
    }

    /// Elements in row-major order.
    ///
    /// # Errors
    /// `IncompatibleType` unless the array holds `T` elements.
    pub fn to_vec<T: NativeElement>(&self) -> Result<Vec<T>> {
        if self.descr.type_num() != Some(T::TYPE.type_num()) {
            return Err(NdError::IncompatibleType {
                from: self.descr.name().to_string(),
                to: T::TYPE.name().to_string(),
            });
        }
        Ok(self
            .iter()
            .map(|elem| T::from_scalar(&self.descr.getitem(elem)))
            .collect())
    }

    fn update_flags(&mut self) {
        let elsize = self.descr.elsize();
        let c = is_c_contiguous(&self.dims, &self.strides, elsize);
        let f = is_f_contiguous(&self.dims, &self.strides, elsize);
        let align = self.descr.alignment().max(1);
        let base = self.data.as_ptr() as usize + self.offset;
        let aligned =
            base % align == 0 && self.strides.iter().all(|&s| s.unsigned_abs() % align == 0);
        self.flags.set(ArrayFlags::C_CONTIGUOUS, c);
        self.flags.set(ArrayFlags::F_CONTIGUOUS, f);
        self.flags.set(ArrayFlags::ALIGNED, aligned);
        self.flags.set(ArrayFlags::NOTSWAPPED, self.descr.is_native());
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    pub fn descr(&self) -> &Arc<Descr> {
        &self.descr
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Byte strides.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    pub fn stride(&self, axis: usize) -> Option<isize> {
        self.strides.get(axis).copied()
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        // Constructors reject shapes whose count overflows.
        checked_size(&self.dims).unwrap_or(0)
    }

    /// Bytes spanned by the elements: `size() * itemsize()`.
    pub fn nbytes(&self) -> usize {
        self.size() * self.itemsize()
    }

    #[inline]
    pub fn itemsize(&self) -> usize {
        self.descr.elsize()
    }

    /// Byte offset of the first element inside the buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn flags(&self) -> ArrayFlags {
        self.flags
    }

    pub fn is_c_contiguous(&self) -> bool {
        self.flags.contains(ArrayFlags::C_CONTIGUOUS)
    }

    pub fn is_f_contiguous(&self) -> bool {
        self.flags.contains(ArrayFlags::F_CONTIGUOUS)
    }

    pub fn is_writeable(&self) -> bool {
        self.flags.contains(ArrayFlags::WRITEABLE)
    }

    pub fn set_writeable(&mut self, writeable: bool) {
        self.flags.set(ArrayFlags::WRITEABLE, writeable);
    }

    /// The whole underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.data
    }

    /// The whole underlying buffer, for writing.
    ///
    /// # Errors
    /// `ReadOnly` if the array is not writeable.
    pub fn buffer_mut(&mut self) -> Result<&mut [u8]> {
        self.ensure_writeable()?;
        Ok(&mut self.data)
    }

    pub(crate) fn ensure_writeable(&self) -> Result<()> {
        if self.is_writeable() {
            Ok(())
        } else {
            Err(NdError::ReadOnly)
        }
    }

    /// The element starting at byte `pos` of the buffer.
    #[inline]
    pub fn element_at(&self, pos: usize) -> &[u8] {
        &self.data[pos..pos + self.descr.elsize()]
    }

    /// Iterate over elements in row-major order.
    pub fn iter(&self) -> ArrayIter<'_> {
        ArrayIter::new(self)
    }

    // ------------------------------------------------------------------------
    // Descriptor swap
    // ------------------------------------------------------------------------

    /// Replace the descriptor and return the previous one.
    ///
    /// # Errors
    /// `IncompatibleType` if the element sizes differ; the array is left
    /// unchanged.
    pub fn set_descr(&mut self, descr: Arc<Descr>) -> Result<Arc<Descr>> {
        if descr.elsize() != self.descr.elsize() {
            return Err(NdError::IncompatibleType {
                from: self.descr.name().to_string(),
                to: descr.name().to_string(),
            });
        }
        let old = std::mem::replace(&mut self.descr, descr);
        self.update_flags();
        Ok(old)
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// Byte position of the element at `coords`.
    pub fn element_offset(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.ndim() {
            return Err(NdError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: coords.len(),
            });
        }
        let mut pos = self.offset as isize;
        for ((&c, &d), &s) in coords.iter().zip(&self.dims).zip(&self.strides) {
            if c >= d {
                return Err(NdError::IndexOutOfBounds {
                    index: c as isize,
                    size: d,
                });
            }
            pos += c as isize * s;
        }
        Ok(pos as usize)
    }

    pub fn get_item(&self, coords: &[usize]) -> Result<Scalar> {
        let pos = self.element_offset(coords)?;
        Ok(self.descr.getitem(self.element_at(pos)))
    }

    pub fn set_item(&mut self, coords: &[usize], value: &Scalar) -> Result<()> {
        self.ensure_writeable()?;
        let pos = self.element_offset(coords)?;
        let elsize = self.descr.elsize();
        self.descr.setitem(value, &mut self.data[pos..pos + elsize])
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: &Scalar) -> Result<()> {
        self.ensure_writeable()?;
        let elsize = self.descr.elsize();
        let mut encoded = vec![0u8; elsize];
        self.descr.setitem(value, &mut encoded)?;
        let mut cursor = Cursor::new(self);
        while let Some(pos) = cursor.next_offset() {
            self.data[pos..pos + elsize].copy_from_slice(&encoded);
        }
        Ok(())
    }

    /// Elements in row-major order, packed into one contiguous buffer in
    /// this array's byte order.
    pub fn to_contiguous_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nbytes());
        for elem in self.iter() {
            out.extend_from_slice(elem);
        }
        out
    }

    // ------------------------------------------------------------------------
    // Casting and assignment
    // ------------------------------------------------------------------------

    /// New row-major array holding this array's values converted to `to`.
    pub fn cast(&self, to: Arc<Descr>) -> Result<NdArray> {
        let src = self.to_contiguous_bytes();
        let mut out = NdArray::allocate(to, &self.dims, MemoryOrder::C)?;
        let n = self.size();
        cast_buffer(&self.descr, &out.descr, &src, &mut out.data, n)?;
        Ok(out)
    }

    /// Assign `src` into this array, broadcasting its shape to ours and
    /// converting element types.
    ///
    /// Nothing is written unless the shapes broadcast and the types convert.
    pub fn copy_from(&mut self, src: &NdArray) -> Result<()> {
        self.ensure_writeable()?;
        let mut src_cursor = Cursor::broadcast(src, &self.dims)?;
        let src_elsize = src.itemsize();
        let n = self.size();
        let mut packed = Vec::with_capacity(n * src_elsize);
        while let Some(pos) = src_cursor.next_offset() {
            packed.extend_from_slice(src.element_at(pos));
        }

        let elsize = self.itemsize();
        let mut converted = vec![0u8; n * elsize];
        cast_buffer(&src.descr, &self.descr, &packed, &mut converted, n)?;

        let mut cursor = Cursor::new(self);
        for chunk in converted.chunks_exact(elsize.max(1)).take(n) {
            let Some(pos) = cursor.next_offset() else {
                break;
            };
            self.data[pos..pos + elsize].copy_from_slice(&chunk[..elsize]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndcore_dtype::{builtin_descr, BuiltinType, ByteOrder, ErrorKind};
    use num_complex::Complex64;

    fn f64_descr() -> Arc<Descr> {
        builtin_descr(BuiltinType::Float64)
    }

    #[test]
    fn test_byte_strides() {
        assert_eq!(c_strides(&[2, 3, 4], 8).unwrap(), vec![96, 32, 8]);
        assert_eq!(f_strides(&[2, 3, 4], 8).unwrap(), vec![8, 16, 48]);
        assert!(c_strides(&[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_allocate_layout() {
        for (dims, order) in [
            (vec![2usize, 3, 4], MemoryOrder::C),
            (vec![5], MemoryOrder::Fortran),
            (vec![], MemoryOrder::C),
            (vec![3, 0, 2], MemoryOrder::C),
        ] {
            let a = NdArray::allocate(f64_descr(), &dims, order).unwrap();
            assert_eq!(a.dims().len(), a.ndim());
            assert_eq!(a.strides().len(), a.ndim());
            assert_eq!(a.nbytes(), dims.iter().product::<usize>() * 8);
            assert_eq!(a.buffer().len(), a.nbytes());
            assert!(a.flags().contains(ArrayFlags::OWNDATA | ArrayFlags::WRITEABLE));
        }
    }

    #[test]
    fn test_allocate_order_flags() {
        let c = NdArray::allocate(f64_descr(), &[2, 3], MemoryOrder::C).unwrap();
        assert!(c.is_c_contiguous());
        assert!(!c.is_f_contiguous());
        let f = NdArray::allocate(f64_descr(), &[2, 3], MemoryOrder::Fortran).unwrap();
        assert_eq!(f.strides(), &[8, 16]);
        assert!(f.is_f_contiguous());
        assert!(!f.is_c_contiguous());
    }

    #[test]
    fn test_allocate_too_many_dims() {
        let dims = vec![1usize; MAXDIMS + 1];
        let err = NdArray::allocate(f64_descr(), &dims, MemoryOrder::C).unwrap_err();
        assert!(matches!(err, NdError::TooManyDims { .. }));
    }

    #[test]
    fn test_allocate_overflow_is_memory_error() {
        let err =
            NdArray::allocate(f64_descr(), &[usize::MAX / 2, 4], MemoryOrder::C).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Memory);
    }

    #[test]
    fn test_allocate_empty_with_huge_strides() {
        let int8 = builtin_descr(BuiltinType::Int8);
        let err = NdArray::allocate(int8.clone(), &[0, 1 << 40, 1 << 40], MemoryOrder::C)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Memory);
        let err = NdArray::allocate(int8.clone(), &[1 << 40, 1 << 40, 0], MemoryOrder::Fortran)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Memory);

        let ok = NdArray::allocate(int8, &[1 << 40, 0], MemoryOrder::C).unwrap();
        assert_eq!(ok.size(), 0);
        assert_eq!(ok.strides(), &[1, 1]);
    }

    #[test]
    fn test_from_bytes_rejects_size_overflow() {
        let err = NdArray::from_bytes(
            builtin_descr(BuiltinType::Int8),
            vec![0],
            &[1 << 40, 1 << 40],
            &[0, 0],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, NdError::SizeOverflow { .. }));
    }

    #[test]
    fn test_from_bytes_bounds() {
        let data = vec![0u8; 24];
        assert!(NdArray::from_bytes(f64_descr(), data.clone(), &[3], &[8], 0).is_ok());
        assert!(NdArray::from_bytes(f64_descr(), data.clone(), &[3], &[-8], 16).is_ok());
        let err = NdArray::from_bytes(f64_descr(), data.clone(), &[3], &[8], 8).unwrap_err();
        assert!(matches!(err, NdError::OutOfBuffer { len: 24 }));
        let err = NdArray::from_bytes(f64_descr(), data, &[3], &[8, 8], 0).unwrap_err();
        assert!(matches!(err, NdError::StrideLengthMismatch));
    }

    #[test]
    fn test_get_set_item() {
        let mut a = NdArray::from_slice(&[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(a.get_item(&[1, 2]).unwrap(), Scalar::Float(6.0));
        a.set_item(&[0, 1], &Scalar::Int(-7)).unwrap();
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![1.0, -7.0, 3.0, 4.0, 5.0, 6.0]);

        let err = a.get_item(&[2, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
        let err = a.get_item(&[0]).unwrap_err();
        assert!(matches!(err, NdError::WrongNumberOfIndices { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut a = NdArray::from_slice(&[1i32, 2], &[2]).unwrap();
        a.set_writeable(false);
        assert!(matches!(a.fill(&Scalar::Int(0)), Err(NdError::ReadOnly)));
        assert!(matches!(a.set_item(&[0], &Scalar::Int(9)), Err(NdError::ReadOnly)));
        assert!(a.buffer_mut().is_err());
        assert_eq!(a.to_vec::<i32>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_set_descr() {
        let mut a = NdArray::from_slice(&[1.5f32, -2.0], &[2]).unwrap();
        let old = a
            .set_descr(builtin_descr(BuiltinType::UInt32))
            .unwrap();
        assert_eq!(old.name(), "float32");
        assert_eq!(a.to_vec::<u32>().unwrap(), vec![1.5f32.to_bits(), (-2.0f32).to_bits()]);

        let err = a.set_descr(f64_descr()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(a.descr().name(), "uint32");
    }

    #[test]
    fn test_swapped_descriptor_clears_notswapped() {
        let mut a = NdArray::from_slice(&[1u16], &[1]).unwrap();
        assert!(a.flags().contains(ArrayFlags::NOTSWAPPED));
        let foreign_order = if cfg!(target_endian = "little") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        a.set_descr(Arc::new(builtin_descr(BuiltinType::UInt16).with_byteorder(foreign_order)))
            .unwrap();
        assert!(!a.flags().contains(ArrayFlags::NOTSWAPPED));
        assert_eq!(a.get_item(&[0]).unwrap(), Scalar::UInt(0x0100));
    }

    #[test]
    fn test_fill_strided() {
        let mut a = NdArray::allocate(f64_descr(), &[2, 2], MemoryOrder::Fortran).unwrap();
        a.fill(&Scalar::Float(2.5)).unwrap();
        assert_eq!(a.to_vec::<f64>().unwrap(), vec![2.5; 4]);
    }

    #[test]
    fn test_cast() {
        let a = NdArray::from_slice(&[1i16, -2, 3], &[3]).unwrap();
        let b = a.cast(builtin_descr(BuiltinType::Complex128)).unwrap();
        assert_eq!(
            b.to_vec::<Complex64>().unwrap(),
            vec![
                Complex64::new(1.0, 0.0),
                Complex64::new(-2.0, 0.0),
                Complex64::new(3.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_copy_from_broadcasts() {
        let row = NdArray::from_slice(&[1i32, 2, 3], &[3]).unwrap();
        let mut dst = NdArray::allocate(f64_descr(), &[2, 3], MemoryOrder::Fortran).unwrap();
        dst.copy_from(&row).unwrap();
        assert_eq!(dst.to_vec::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);

        let bad = NdArray::from_slice(&[1i32, 2], &[2]).unwrap();
        let err = dst.copy_from(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(dst.to_vec::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_to_vec_type_check() {
        let a = NdArray::from_slice(&[1u8, 2], &[2]).unwrap();
        assert!(a.to_vec::<i8>().is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let a = NdArray::from_slice(&[1i64, 2], &[2]).unwrap();
        let mut b = a.clone();
        b.set_item(&[0], &Scalar::Int(10)).unwrap();
        assert_eq!(a.to_vec::<i64>().unwrap(), vec![1, 2]);
        assert_eq!(b.to_vec::<i64>().unwrap(), vec![10, 2]);
    }
}
