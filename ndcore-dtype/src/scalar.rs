//! Scalar interchange values.
//!
//! `getitem` turns the bytes of one element into a [`Scalar`] and `setitem`
//! stores a [`Scalar`] back, so generic code (reductions, casting, fills) can
//! do arithmetic without knowing the concrete element type.

use num_complex::Complex64;
use num_traits::{One, Zero};

use crate::types::TypeKind;

/// One element value, widened to the largest representation of its family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex64),
}

/// Arithmetic family of a [`Scalar`], ordered by promotion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarCategory {
    Bool,
    Int,
    UInt,
    Float,
    Complex,
}

impl ScalarCategory {
    /// Category used to accumulate values stored in a type of this kind.
    ///
    /// User-defined kinds accumulate as floats.
    pub fn of_kind(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Bool => ScalarCategory::Bool,
            TypeKind::SignedInt => ScalarCategory::Int,
            TypeKind::UnsignedInt => ScalarCategory::UInt,
            TypeKind::Float | TypeKind::UserDefined => ScalarCategory::Float,
            TypeKind::Complex => ScalarCategory::Complex,
        }
    }

    /// Common category of two operands. Mixed signed/unsigned integers
    /// promote to signed.
    pub fn promote(self, other: Self) -> Self {
        match (self, other) {
            (ScalarCategory::Int, ScalarCategory::UInt)
            | (ScalarCategory::UInt, ScalarCategory::Int) => ScalarCategory::Int,
            (a, b) => a.max(b),
        }
    }
}

impl Scalar {
    /// Additive identity of a category.
    pub fn zero(cat: ScalarCategory) -> Self {
        match cat {
            ScalarCategory::Bool => Scalar::Bool(false),
            ScalarCategory::Int => Scalar::Int(0),
            ScalarCategory::UInt => Scalar::UInt(0),
            ScalarCategory::Float => Scalar::Float(0.0),
            ScalarCategory::Complex => Scalar::Complex(Complex64::zero()),
        }
    }

    /// Multiplicative identity of a category.
    pub fn one(cat: ScalarCategory) -> Self {
        match cat {
            ScalarCategory::Bool => Scalar::Bool(true),
            ScalarCategory::Int => Scalar::Int(1),
            ScalarCategory::UInt => Scalar::UInt(1),
            ScalarCategory::Float => Scalar::Float(1.0),
            ScalarCategory::Complex => Scalar::Complex(Complex64::one()),
        }
    }

    pub fn category(&self) -> ScalarCategory {
        match self {
            Scalar::Bool(_) => ScalarCategory::Bool,
            Scalar::Int(_) => ScalarCategory::Int,
            Scalar::UInt(_) => ScalarCategory::UInt,
            Scalar::Float(_) => ScalarCategory::Float,
            Scalar::Complex(_) => ScalarCategory::Complex,
        }
    }

    /// Truthiness: nonzero numbers are true.
    pub fn is_nonzero(&self) -> bool {
        match *self {
            Scalar::Bool(b) => b,
            Scalar::Int(v) => v != 0,
            Scalar::UInt(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
            Scalar::Complex(c) => !c.is_zero(),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.is_nonzero()
    }

    /// Signed integer value; floats truncate, complex values drop the
    /// imaginary part, unsigned values wrap.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Scalar::Bool(b) => b as i64,
            Scalar::Int(v) => v,
            Scalar::UInt(v) => v as i64,
            Scalar::Float(v) => v as i64,
            Scalar::Complex(c) => c.re as i64,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match *self {
            Scalar::Bool(b) => b as u64,
            Scalar::Int(v) => v as u64,
            Scalar::UInt(v) => v,
            Scalar::Float(v) => v as u64,
            Scalar::Complex(c) => c.re as u64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Complex(c) => c.re,
        }
    }

    pub fn as_complex(&self) -> Complex64 {
        match *self {
            Scalar::Complex(c) => c,
            other => Complex64::new(other.as_f64(), 0.0),
        }
    }

    /// Convert to the given category.
    pub fn coerce(self, cat: ScalarCategory) -> Scalar {
        match cat {
            ScalarCategory::Bool => Scalar::Bool(self.as_bool()),
            ScalarCategory::Int => Scalar::Int(self.as_i64()),
            ScalarCategory::UInt => Scalar::UInt(self.as_u64()),
            ScalarCategory::Float => Scalar::Float(self.as_f64()),
            ScalarCategory::Complex => Scalar::Complex(self.as_complex()),
        }
    }

    /// Sum in the promoted category. Booleans combine with logical or,
    /// integers wrap.
    pub fn add(self, rhs: Scalar) -> Scalar {
        let cat = self.category().promote(rhs.category());
        match (self.coerce(cat), rhs.coerce(cat)) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Scalar::Bool(a || b),
            (Scalar::Int(a), Scalar::Int(b)) => Scalar::Int(a.wrapping_add(b)),
            (Scalar::UInt(a), Scalar::UInt(b)) => Scalar::UInt(a.wrapping_add(b)),
            (Scalar::Float(a), Scalar::Float(b)) => Scalar::Float(a + b),
            (a, b) => Scalar::Complex(a.as_complex() + b.as_complex()),
        }
    }

    /// Difference in the promoted category. Booleans combine with xor.
    pub fn sub(self, rhs: Scalar) -> Scalar {
        let cat = self.category().promote(rhs.category());
        match (self.coerce(cat), rhs.coerce(cat)) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Scalar::Bool(a ^ b),
            (Scalar::Int(a), Scalar::Int(b)) => Scalar::Int(a.wrapping_sub(b)),
            (Scalar::UInt(a), Scalar::UInt(b)) => Scalar::UInt(a.wrapping_sub(b)),
            (Scalar::Float(a), Scalar::Float(b)) => Scalar::Float(a - b),
            (a, b) => Scalar::Complex(a.as_complex() - b.as_complex()),
        }
    }

    /// Product in the promoted category. Booleans combine with logical and.
    pub fn mul(self, rhs: Scalar) -> Scalar {
        let cat = self.category().promote(rhs.category());
        match (self.coerce(cat), rhs.coerce(cat)) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Scalar::Bool(a && b),
            (Scalar::Int(a), Scalar::Int(b)) => Scalar::Int(a.wrapping_mul(b)),
            (Scalar::UInt(a), Scalar::UInt(b)) => Scalar::UInt(a.wrapping_mul(b)),
            (Scalar::Float(a), Scalar::Float(b)) => Scalar::Float(a * b),
            (a, b) => Scalar::Complex(a.as_complex() * b.as_complex()),
        }
    }

    /// Complex conjugate; identity for real values.
    pub fn conj(self) -> Scalar {
        match self {
            Scalar::Complex(c) => Scalar::Complex(c.conj()),
            other => other,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<Complex64> for Scalar {
    fn from(v: Complex64) -> Self {
        Scalar::Complex(v)
    }
}
