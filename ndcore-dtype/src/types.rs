//! Type numbers, type kinds and the small enums shared by descriptors.

use std::fmt;

/// Stable integer identity of an element type.
///
/// Built-in types are numbered densely from 0 (see [`BuiltinType`]); user
/// types are numbered from [`TypeNum::USERDEF`] in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeNum(pub u32);

impl TypeNum {
    pub const BOOL: TypeNum = TypeNum(0);
    pub const INT8: TypeNum = TypeNum(1);
    pub const UINT8: TypeNum = TypeNum(2);
    pub const INT16: TypeNum = TypeNum(3);
    pub const UINT16: TypeNum = TypeNum(4);
    pub const INT32: TypeNum = TypeNum(5);
    pub const UINT32: TypeNum = TypeNum(6);
    pub const INT64: TypeNum = TypeNum(7);
    pub const UINT64: TypeNum = TypeNum(8);
    pub const FLOAT32: TypeNum = TypeNum(9);
    pub const FLOAT64: TypeNum = TypeNum(10);
    pub const COMPLEX64: TypeNum = TypeNum(11);
    pub const COMPLEX128: TypeNum = TypeNum(12);

    /// Number of built-in types.
    pub const NTYPES: u32 = 13;

    /// First type number handed out to user-registered types.
    pub const USERDEF: TypeNum = TypeNum(256);

    #[inline]
    pub fn is_builtin(self) -> bool {
        self.0 < Self::NTYPES
    }

    #[inline]
    pub fn is_user_defined(self) -> bool {
        self.0 >= Self::USERDEF.0
    }

    /// The built-in type with this number, if any.
    pub fn builtin(self) -> Option<BuiltinType> {
        BuiltinType::ALL.get(self.0 as usize).copied()
    }
}

impl fmt::Display for TypeNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The built-in element types, in type-number order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; TypeNum::NTYPES as usize] = [
        BuiltinType::Bool,
        BuiltinType::Int8,
        BuiltinType::UInt8,
        BuiltinType::Int16,
        BuiltinType::UInt16,
        BuiltinType::Int32,
        BuiltinType::UInt32,
        BuiltinType::Int64,
        BuiltinType::UInt64,
        BuiltinType::Float32,
        BuiltinType::Float64,
        BuiltinType::Complex64,
        BuiltinType::Complex128,
    ];

    #[inline]
    pub fn type_num(self) -> TypeNum {
        TypeNum(self as u32)
    }

    pub fn kind(self) -> TypeKind {
        match self {
            BuiltinType::Bool => TypeKind::Bool,
            BuiltinType::Int8 | BuiltinType::Int16 | BuiltinType::Int32 | BuiltinType::Int64 => {
                TypeKind::SignedInt
            }
            BuiltinType::UInt8
            | BuiltinType::UInt16
            | BuiltinType::UInt32
            | BuiltinType::UInt64 => TypeKind::UnsignedInt,
            BuiltinType::Float32 | BuiltinType::Float64 => TypeKind::Float,
            BuiltinType::Complex64 | BuiltinType::Complex128 => TypeKind::Complex,
        }
    }

    pub fn elsize(self) -> usize {
        match self {
            BuiltinType::Bool | BuiltinType::Int8 | BuiltinType::UInt8 => 1,
            BuiltinType::Int16 | BuiltinType::UInt16 => 2,
            BuiltinType::Int32 | BuiltinType::UInt32 | BuiltinType::Float32 => 4,
            BuiltinType::Int64
            | BuiltinType::UInt64
            | BuiltinType::Float64
            | BuiltinType::Complex64 => 8,
            BuiltinType::Complex128 => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Bool => "bool",
            BuiltinType::Int8 => "int8",
            BuiltinType::UInt8 => "uint8",
            BuiltinType::Int16 => "int16",
            BuiltinType::UInt16 => "uint16",
            BuiltinType::Int32 => "int32",
            BuiltinType::UInt32 => "uint32",
            BuiltinType::Int64 => "int64",
            BuiltinType::UInt64 => "uint64",
            BuiltinType::Float32 => "float32",
            BuiltinType::Float64 => "float64",
            BuiltinType::Complex64 => "complex64",
            BuiltinType::Complex128 => "complex128",
        }
    }

    /// Single-character type code.
    pub fn type_char(self) -> char {
        match self {
            BuiltinType::Bool => '?',
            BuiltinType::Int8 => 'b',
            BuiltinType::UInt8 => 'B',
            BuiltinType::Int16 => 'h',
            BuiltinType::UInt16 => 'H',
            BuiltinType::Int32 => 'i',
            BuiltinType::UInt32 => 'I',
            BuiltinType::Int64 => 'q',
            BuiltinType::UInt64 => 'Q',
            BuiltinType::Float32 => 'f',
            BuiltinType::Float64 => 'd',
            BuiltinType::Complex64 => 'F',
            BuiltinType::Complex128 => 'D',
        }
    }
}

/// Broad family of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Complex,
    UserDefined,
}

impl TypeKind {
    /// Single-character kind code.
    pub fn code(self) -> char {
        match self {
            TypeKind::Bool => 'b',
            TypeKind::SignedInt => 'i',
            TypeKind::UnsignedInt => 'u',
            TypeKind::Float => 'f',
            TypeKind::Complex => 'c',
            TypeKind::UserDefined => 'V',
        }
    }
}

/// Byte order of the elements described by a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Host byte order.
    Native,
    Little,
    Big,
    /// Single-byte types, where byte order has no meaning.
    NotApplicable,
}

impl ByteOrder {
    /// Whether elements in this order can be read without swapping.
    #[inline]
    pub fn is_native(self) -> bool {
        match self {
            ByteOrder::Native | ByteOrder::NotApplicable => true,
            ByteOrder::Little => cfg!(target_endian = "little"),
            ByteOrder::Big => cfg!(target_endian = "big"),
        }
    }

    pub fn code(self) -> char {
        match self {
            ByteOrder::Native => '=',
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
            ByteOrder::NotApplicable => '|',
        }
    }
}

/// Kind of a scalar operand, used for scalar-to-array casting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    IntPos,
    IntNeg,
    Float,
    Complex,
    Object,
}

impl ScalarKind {
    pub const COUNT: usize = 6;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Sorting algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKind {
    #[default]
    QuickSort,
    HeapSort,
    /// Stable.
    MergeSort,
}

impl SortKind {
    pub const COUNT: usize = 3;
}
