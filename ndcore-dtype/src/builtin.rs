//! Built-in element types and their function tables.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use bytemuck::Pod;
use num_complex::{Complex, Complex64};

use crate::descr::Descr;
use crate::funcs::ArrFuncs;
use crate::scalar::Scalar;
use crate::types::{BuiltinType, ByteOrder};
use crate::Result;

/// Rust types stored directly as built-in elements.
///
/// `bool` is not a native element: it is stored as one byte and handled by
/// its own function table.
pub trait NativeElement: Pod + Send + Sync + 'static {
    const TYPE: BuiltinType;

    /// Width of the unit whose bytes are reversed by a byte swap. Complex
    /// numbers swap each component separately.
    const SWAP_UNIT: usize = std::mem::size_of::<Self>();

    fn to_scalar(self) -> Scalar;

    fn from_scalar(value: &Scalar) -> Self;

    fn compare(a: &Self, b: &Self) -> Option<Ordering>;
}

macro_rules! impl_native_int {
    ($($t:ty => $bt:ident, $variant:ident, $conv:ident, $wide:ty);* $(;)?) => {
        $(
            impl NativeElement for $t {
                const TYPE: BuiltinType = BuiltinType::$bt;

                #[inline]
                fn to_scalar(self) -> Scalar {
                    Scalar::$variant(self as $wide)
                }

                #[inline]
                fn from_scalar(value: &Scalar) -> Self {
                    value.$conv() as $t
                }

                #[inline]
                fn compare(a: &Self, b: &Self) -> Option<Ordering> {
                    Some(a.cmp(b))
                }
            }
        )*
    };
}

impl_native_int!(
    i8 => Int8, Int, as_i64, i64;
    u8 => UInt8, UInt, as_u64, u64;
    i16 => Int16, Int, as_i64, i64;
    u16 => UInt16, UInt, as_u64, u64;
    i32 => Int32, Int, as_i64, i64;
    u32 => UInt32, UInt, as_u64, u64;
    i64 => Int64, Int, as_i64, i64;
    u64 => UInt64, UInt, as_u64, u64;
);

macro_rules! impl_native_float {
    ($($t:ty => $bt:ident),*) => {
        $(
            impl NativeElement for $t {
                const TYPE: BuiltinType = BuiltinType::$bt;

                #[inline]
                fn to_scalar(self) -> Scalar {
                    Scalar::Float(self as f64)
                }

                #[inline]
                fn from_scalar(value: &Scalar) -> Self {
                    value.as_f64() as $t
                }

                #[inline]
                fn compare(a: &Self, b: &Self) -> Option<Ordering> {
                    a.partial_cmp(b)
                }
            }
        )*
    };
}

impl_native_float!(f32 => Float32, f64 => Float64);

macro_rules! impl_native_complex {
    ($($t:ty => $bt:ident),*) => {
        $(
            impl NativeElement for Complex<$t> {
                const TYPE: BuiltinType = BuiltinType::$bt;
                const SWAP_UNIT: usize = std::mem::size_of::<$t>();

                #[inline]
                fn to_scalar(self) -> Scalar {
                    Scalar::Complex(Complex64::new(self.re as f64, self.im as f64))
                }

                #[inline]
                fn from_scalar(value: &Scalar) -> Self {
                    let c = value.as_complex();
                    Complex::new(c.re as $t, c.im as $t)
                }

                /// Lexicographic on (re, im).
                #[inline]
                fn compare(a: &Self, b: &Self) -> Option<Ordering> {
                    match a.re.partial_cmp(&b.re)? {
                        Ordering::Equal => a.im.partial_cmp(&b.im),
                        ord => {
                            // NaN in either imaginary part still poisons the order
                            if a.im.is_nan() || b.im.is_nan() {
                                None
                            } else {
                                Some(ord)
                            }
                        }
                    }
                }
            }
        )*
    };
}

impl_native_complex!(f32 => Complex64, f64 => Complex128);

// ============================================================================
// Function tables
// ============================================================================

/// Function table shared by all numeric built-ins.
pub(crate) struct NumericFuncs<T>(PhantomData<fn() -> T>);

impl<T> NumericFuncs<T> {
    pub(crate) fn new() -> Self {
        NumericFuncs(PhantomData)
    }
}

impl<T: NativeElement> NumericFuncs<T> {
    #[inline]
    fn read(src: &[u8]) -> T {
        bytemuck::pod_read_unaligned(src)
    }
}

impl<T: NativeElement> ArrFuncs for NumericFuncs<T> {
    fn copyswap(&self, dst: &mut [u8], src: &[u8], swap: bool) {
        dst.copy_from_slice(src);
        if swap {
            for unit in dst.chunks_exact_mut(T::SWAP_UNIT) {
                unit.reverse();
            }
        }
    }

    fn getitem(&self, src: &[u8]) -> Scalar {
        Self::read(src).to_scalar()
    }

    fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()> {
        let v = T::from_scalar(value);
        dst.copy_from_slice(bytemuck::bytes_of(&v));
        Ok(())
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering> {
        T::compare(&Self::read(a), &Self::read(b))
    }

    /// Value test, so negative zero counts as zero.
    fn nonzero(&self, src: &[u8]) -> bool {
        self.getitem(src).is_nonzero()
    }
}

/// One-byte booleans; any nonzero byte reads as true.
pub(crate) struct BoolFuncs;

impl ArrFuncs for BoolFuncs {
    fn copyswap(&self, dst: &mut [u8], src: &[u8], _swap: bool) {
        dst.copy_from_slice(src);
    }

    fn getitem(&self, src: &[u8]) -> Scalar {
        Scalar::Bool(src[0] != 0)
    }

    fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()> {
        dst[0] = value.as_bool() as u8;
        Ok(())
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering> {
        Some((a[0] != 0).cmp(&(b[0] != 0)))
    }
}

fn builtin_funcs(t: BuiltinType) -> Arc<dyn ArrFuncs> {
    match t {
        BuiltinType::Bool => Arc::new(BoolFuncs),
        BuiltinType::Int8 => Arc::new(NumericFuncs::<i8>::new()),
        BuiltinType::UInt8 => Arc::new(NumericFuncs::<u8>::new()),
        BuiltinType::Int16 => Arc::new(NumericFuncs::<i16>::new()),
        BuiltinType::UInt16 => Arc::new(NumericFuncs::<u16>::new()),
        BuiltinType::Int32 => Arc::new(NumericFuncs::<i32>::new()),
        BuiltinType::UInt32 => Arc::new(NumericFuncs::<u32>::new()),
        BuiltinType::Int64 => Arc::new(NumericFuncs::<i64>::new()),
        BuiltinType::UInt64 => Arc::new(NumericFuncs::<u64>::new()),
        BuiltinType::Float32 => Arc::new(NumericFuncs::<f32>::new()),
        BuiltinType::Float64 => Arc::new(NumericFuncs::<f64>::new()),
        BuiltinType::Complex64 => Arc::new(NumericFuncs::<Complex<f32>>::new()),
        BuiltinType::Complex128 => Arc::new(NumericFuncs::<Complex<f64>>::new()),
    }
}

static BUILTINS: OnceLock<Vec<Arc<Descr>>> = OnceLock::new();

/// Process-wide native-order descriptor of a built-in type.
pub fn builtin_descr(t: BuiltinType) -> Arc<Descr> {
    let table = BUILTINS.get_or_init(|| {
        BuiltinType::ALL
            .iter()
            .map(|&t| Arc::new(Descr::builtin(t, builtin_funcs(t))))
            .collect()
    });
    table[t as usize].clone()
}

impl Descr {
    /// Native-order descriptor of a native element type.
    pub fn of<T: NativeElement>() -> Arc<Descr> {
        builtin_descr(T::TYPE)
    }
}

/// Byte order and C integer widths of the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTypeInfo {
    pub byteorder: ByteOrder,
    pub int_size: usize,
    pub long_size: usize,
    pub longlong_size: usize,
}

pub fn native_type_info() -> NativeTypeInfo {
    NativeTypeInfo {
        byteorder: if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        },
        int_size: std::mem::size_of::<std::os::raw::c_int>(),
        long_size: std::mem::size_of::<std::os::raw::c_long>(),
        longlong_size: std::mem::size_of::<std::os::raw::c_longlong>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeKind, TypeNum};

    #[test]
    fn test_builtin_table() {
        for t in BuiltinType::ALL {
            let d = builtin_descr(t);
            assert_eq!(d.type_num(), Some(t.type_num()));
            assert_eq!(d.elsize(), t.elsize());
            assert_eq!(d.name(), t.name());
        }
        assert!(Arc::ptr_eq(&Descr::of::<f64>(), &builtin_descr(BuiltinType::Float64)));
    }

    #[test]
    fn test_numeric_get_set() {
        let d = Descr::of::<i16>();
        let mut buf = [0u8; 2];
        d.setitem(&Scalar::Int(-300), &mut buf).unwrap();
        assert_eq!(i16::from_ne_bytes(buf), -300);
        assert_eq!(d.getitem(&buf), Scalar::Int(-300));
    }

    #[test]
    fn test_copyswap_complex_swaps_components() {
        let funcs = NumericFuncs::<Complex<f32>>::new();
        let src = bytemuck::bytes_of(&Complex::new(1.0f32, 2.0f32)).to_vec();
        let mut dst = vec![0u8; 8];
        funcs.copyswap(&mut dst, &src, true);
        let mut expected = src.clone();
        expected[..4].reverse();
        expected[4..].reverse();
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_float_nonzero_is_by_value() {
        let d = Descr::of::<f64>();
        assert!(!d.nonzero(&(-0.0f64).to_ne_bytes()));
        assert!(d.nonzero(&0.5f64.to_ne_bytes()));
    }

    #[test]
    fn test_float_argmax_nan_wins() {
        let d = Descr::of::<f64>();
        let data: Vec<u8> = [1.0f64, f64::NAN, 3.0]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        assert_eq!(d.funcs().argmax(&data, 8), Some(1));
    }

    #[test]
    fn test_bool_funcs() {
        let d = builtin_descr(BuiltinType::Bool);
        assert_eq!(d.kind(), TypeKind::Bool);
        assert_eq!(d.type_num(), Some(TypeNum::BOOL));
        assert_eq!(d.getitem(&[7]), Scalar::Bool(true));
        let mut b = [0u8];
        d.setitem(&Scalar::Float(0.25), &mut b).unwrap();
        assert_eq!(b, [1]);
    }

    #[test]
    fn test_complex_compare_lexicographic() {
        let a = Complex::new(1.0f64, 5.0);
        let b = Complex::new(1.0f64, 6.0);
        assert_eq!(
            <Complex<f64> as NativeElement>::compare(&a, &b),
            Some(Ordering::Less)
        );
        let c = Complex::new(2.0f64, f64::NAN);
        assert_eq!(<Complex<f64> as NativeElement>::compare(&a, &c), None);
    }

    #[test]
    fn test_native_type_info() {
        let info = native_type_info();
        assert!(info.byteorder == ByteOrder::Little || info.byteorder == ByteOrder::Big);
        assert_eq!(info.int_size, 4);
        assert!(info.longlong_size >= info.long_size);
    }
}
