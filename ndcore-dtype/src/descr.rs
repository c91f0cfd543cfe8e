//! Element type descriptors.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use smallvec::{smallvec, SmallVec};

use crate::cast::{CastFn, CastTable};
use crate::funcs::ArrFuncs;
use crate::scalar::Scalar;
use crate::types::{BuiltinType, ByteOrder, ScalarKind, TypeKind, TypeNum};
use crate::Result;

/// Temporary element storage for byte-swapped access.
type ElemBuf = SmallVec<[u8; 32]>;

/// A named field of a record descriptor.
#[derive(Debug, Clone)]
pub struct Field {
    pub descr: Arc<Descr>,
    /// Byte offset of the field inside the record.
    pub offset: usize,
}

/// Metadata and behavior of one element type.
///
/// Descriptors are shared through `Arc`; arrays hold one reference each.
/// A user descriptor receives its type number once, when it is registered.
pub struct Descr {
    name: String,
    kind: TypeKind,
    type_char: char,
    byteorder: ByteOrder,
    elsize: usize,
    alignment: usize,
    type_num: OnceLock<TypeNum>,
    names: Vec<String>,
    fields: HashMap<String, Field>,
    funcs: Arc<dyn ArrFuncs>,
    casts: Arc<RwLock<CastTable>>,
}

impl fmt::Debug for Descr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descr")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("byteorder", &self.byteorder)
            .field("elsize", &self.elsize)
            .field("type_num", &self.type_num.get())
            .field("names", &self.names)
            .finish()
    }
}

impl fmt::Display for Descr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Descr {
    pub(crate) fn builtin(t: BuiltinType, funcs: Arc<dyn ArrFuncs>) -> Self {
        let elsize = t.elsize();
        let alignment = match t {
            BuiltinType::Complex64 | BuiltinType::Complex128 => elsize / 2,
            _ => elsize,
        };
        Self {
            name: t.name().to_string(),
            kind: t.kind(),
            type_char: t.type_char(),
            byteorder: if elsize == 1 {
                ByteOrder::NotApplicable
            } else {
                ByteOrder::Native
            },
            elsize,
            alignment,
            type_num: OnceLock::from(t.type_num()),
            names: Vec::new(),
            fields: HashMap::new(),
            funcs,
            casts: Arc::default(),
        }
    }

    /// Create an unregistered user-defined descriptor.
    ///
    /// `name` is the type identity looked up by
    /// [`type_num_from_name`](crate::type_num_from_name); registration
    /// rejects an empty name and a zero `elsize`.
    pub fn new_user(
        name: impl Into<String>,
        elsize: usize,
        alignment: usize,
        funcs: Arc<dyn ArrFuncs>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::UserDefined,
            type_char: 'V',
            byteorder: ByteOrder::Native,
            elsize,
            alignment: alignment.max(1),
            type_num: OnceLock::new(),
            names: Vec::new(),
            fields: HashMap::new(),
            funcs,
            casts: Arc::default(),
        }
    }

    /// Attach record fields `(name, descriptor, byte offset)`, in order.
    pub fn with_fields(mut self, fields: Vec<(String, Arc<Descr>, usize)>) -> Self {
        self.names.clear();
        self.fields.clear();
        for (name, descr, offset) in fields {
            self.names.push(name.clone());
            self.fields.insert(name, Field { descr, offset });
        }
        self
    }

    /// Copy of this descriptor with a different byte order.
    ///
    /// The copy shares the function table, cast table and type number.
    /// Single-byte types keep [`ByteOrder::NotApplicable`].
    pub fn with_byteorder(&self, byteorder: ByteOrder) -> Descr {
        Descr {
            name: self.name.clone(),
            kind: self.kind,
            type_char: self.type_char,
            byteorder: if self.elsize == 1 {
                ByteOrder::NotApplicable
            } else {
                byteorder
            },
            elsize: self.elsize,
            alignment: self.alignment,
            type_num: self.type_num.clone(),
            names: self.names.clone(),
            fields: self.fields.clone(),
            funcs: self.funcs.clone(),
            casts: self.casts.clone(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn type_char(&self) -> char {
        self.type_char
    }

    #[inline]
    pub fn byteorder(&self) -> ByteOrder {
        self.byteorder
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.byteorder.is_native()
    }

    #[inline]
    pub fn elsize(&self) -> usize {
        self.elsize
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Type number, or `None` for a user descriptor not yet registered.
    #[inline]
    pub fn type_num(&self) -> Option<TypeNum> {
        self.type_num.get().copied()
    }

    #[inline]
    pub fn funcs(&self) -> &Arc<dyn ArrFuncs> {
        &self.funcs
    }

    /// Field names in declaration order; empty for non-record types.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sub-descriptor and byte offset of a named field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Same type number and byte order.
    pub fn is_equivalent(&self, other: &Descr) -> bool {
        self.type_num() == other.type_num()
            && self.type_num().is_some()
            && self.elsize == other.elsize
            && self.is_native() == other.is_native()
    }

    pub(crate) fn bind_type_num(&self, type_num: TypeNum) -> bool {
        self.type_num.set(type_num).is_ok()
    }

    pub(crate) fn casts(&self) -> RwLockReadGuard<'_, CastTable> {
        self.casts.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn casts_mut(&self) -> RwLockWriteGuard<'_, CastTable> {
        self.casts.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registered cast function to `to`, if any.
    pub fn cast_func(&self, to: TypeNum) -> Option<CastFn> {
        self.casts().funcs.get(&to).cloned()
    }

    /// Types this descriptor was declared safely castable to, in
    /// registration order (duplicates kept).
    pub fn can_cast_to(&self) -> Vec<TypeNum> {
        self.casts().cancastto.clone()
    }

    /// Types a scalar of `kind` with this descriptor may be cast to.
    pub fn can_cast_scalar_kind_to(&self, kind: ScalarKind) -> Vec<TypeNum> {
        self.casts().cancastscalarkindto[kind.index()].clone()
    }

    // ------------------------------------------------------------------------
    // Byte-order aware element access
    // ------------------------------------------------------------------------

    fn swapped(&self, src: &[u8]) -> ElemBuf {
        let mut tmp: ElemBuf = smallvec![0; self.elsize];
        self.funcs.copyswap(&mut tmp, src, true);
        tmp
    }

    /// Read one element stored in this descriptor's byte order.
    pub fn getitem(&self, src: &[u8]) -> Scalar {
        if self.is_native() {
            self.funcs.getitem(src)
        } else {
            self.funcs.getitem(&self.swapped(src))
        }
    }

    /// Store one element in this descriptor's byte order.
    pub fn setitem(&self, value: &Scalar, dst: &mut [u8]) -> Result<()> {
        if self.is_native() {
            return self.funcs.setitem(value, dst);
        }
        let mut tmp: ElemBuf = smallvec![0; self.elsize];
        self.funcs.setitem(value, &mut tmp)?;
        self.copy_from_native(dst, &tmp);
        Ok(())
    }

    pub fn nonzero(&self, src: &[u8]) -> bool {
        if self.is_native() {
            self.funcs.nonzero(src)
        } else {
            self.funcs.nonzero(&self.swapped(src))
        }
    }

    pub fn compare(&self, a: &[u8], b: &[u8]) -> Option<Ordering> {
        if self.is_native() {
            self.funcs.compare(a, b)
        } else {
            self.funcs.compare(&self.swapped(a), &self.swapped(b))
        }
    }

    /// Copy one element into `dst` in native byte order.
    pub fn copy_to_native(&self, dst: &mut [u8], src: &[u8]) {
        self.funcs.copyswap(dst, src, !self.is_native());
    }

    /// Copy one native-order element into `dst` in this descriptor's order.
    pub fn copy_from_native(&self, dst: &mut [u8], src: &[u8]) {
        self.funcs.copyswap(dst, src, !self.is_native());
    }

    /// Parse one element from text.
    pub fn from_str(&self, text: &str, dst: &mut [u8]) -> Result<()> {
        if self.is_native() {
            return self.funcs.from_str(text, dst);
        }
        let mut tmp: ElemBuf = smallvec![0; self.elsize];
        self.funcs.from_str(text, &mut tmp)?;
        self.copy_from_native(dst, &tmp);
        Ok(())
    }
}
