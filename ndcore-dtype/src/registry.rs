//! Registry of user-defined element types.
//!
//! User descriptors are numbered densely from [`TypeNum::USERDEF`] in
//! registration order. Registration is a setup-time operation; hot loops
//! never consult the registry and go through the descriptor directly.
//!
//! A [`TypeRegistry`] is a plain value, so independent registries can be
//! built (tests do this). The process-wide registry used by the free
//! functions of this module lives behind a [`RwLock`] and is created on
//! first use.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::builtin::builtin_descr;
use crate::cast::CastFn;
use crate::descr::Descr;
use crate::types::{ScalarKind, TypeNum};
use crate::{NdError, Result};

#[inline]
fn trace_enabled() -> bool {
    matches!(std::env::var("NDCORE_TRACE"), Ok(ref v) if v == "1")
}

/// Ordered list of registered user descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    user: Vec<Arc<Descr>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered user types.
    pub fn len(&self) -> usize {
        self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }

    /// Registered descriptors in type-number order.
    pub fn user_descrs(&self) -> &[Arc<Descr>] {
        &self.user
    }

    fn user_type_num(pos: usize) -> TypeNum {
        TypeNum(TypeNum::USERDEF.0 + pos as u32)
    }

    /// Register a user descriptor and return its type number.
    ///
    /// Registering the same `Arc` again returns the existing number without
    /// growing the registry. Nothing is recorded when validation fails.
    ///
    /// # Errors
    /// - `FlexibleType` if the element size is 0
    /// - `MissingTypeName` if the descriptor has an empty name
    /// - `AlreadyBound` if the descriptor already carries a type number
    ///   (built-ins, or descriptors registered elsewhere)
    /// - `AllocationFailed` if the registry cannot grow
    pub fn register_data_type(&mut self, descr: &Arc<Descr>) -> Result<TypeNum> {
        if let Some(pos) = self.user.iter().position(|d| Arc::ptr_eq(d, descr)) {
            return Ok(Self::user_type_num(pos));
        }
        if descr.elsize() == 0 {
            return Err(NdError::FlexibleType {
                name: descr.name().to_string(),
            });
        }
        if descr.name().is_empty() {
            return Err(NdError::MissingTypeName);
        }
        if let Some(bound) = descr.type_num() {
            return Err(NdError::AlreadyBound {
                name: descr.name().to_string(),
                type_num: bound.0,
            });
        }
        self.user
            .try_reserve(1)
            .map_err(|_| NdError::AllocationFailed {
                bytes: (self.user.len() + 1) * std::mem::size_of::<Arc<Descr>>(),
            })?;

        let type_num = Self::user_type_num(self.user.len());
        if !descr.bind_type_num(type_num) {
            // bound through another registry after the check above
            return Err(NdError::AlreadyBound {
                name: descr.name().to_string(),
                type_num: descr.type_num().map_or(type_num.0, |t| t.0),
            });
        }
        self.user.push(descr.clone());
        if trace_enabled() {
            eprintln!(
                "register_data_type: {:?} -> {} (elsize={}, {} user types)",
                descr.name(),
                type_num,
                descr.elsize(),
                self.user.len()
            );
        }
        Ok(type_num)
    }

    /// Descriptor for a built-in or registered type number.
    pub fn descr(&self, type_num: TypeNum) -> Option<Arc<Descr>> {
        if let Some(t) = type_num.builtin() {
            return Some(builtin_descr(t));
        }
        let pos = type_num.0.checked_sub(TypeNum::USERDEF.0)? as usize;
        self.user.get(pos).cloned()
    }

    fn is_known(&self, type_num: TypeNum) -> bool {
        type_num.is_builtin() || self.descr(type_num).is_some()
    }

    /// Install `cast` as the conversion from `descr` to `totype`, replacing
    /// any previous function for that destination.
    ///
    /// # Errors
    /// `InvalidTypeNum` if `totype` is neither built-in nor registered here.
    pub fn register_cast_func(&self, descr: &Descr, totype: TypeNum, cast: CastFn) -> Result<()> {
        if !self.is_known(totype) {
            return Err(NdError::InvalidTypeNum(totype.0));
        }
        descr.casts_mut().funcs.insert(totype, cast);
        if trace_enabled() {
            eprintln!("register_cast_func: {} -> {}", descr.name(), totype);
        }
        Ok(())
    }

    /// Declare that `descr` casts safely to `totype`: unconditionally when
    /// `scalar` is `None`, otherwise only for scalars of that kind.
    ///
    /// Repeated declarations append repeated entries.
    pub fn register_can_cast(
        &self,
        descr: &Descr,
        totype: TypeNum,
        scalar: Option<ScalarKind>,
    ) -> Result<()> {
        let mut casts = descr.casts_mut();
        let list = match scalar {
            None => &mut casts.cancastto,
            Some(kind) => &mut casts.cancastscalarkindto[kind.index()],
        };
        list.try_reserve(1).map_err(|_| NdError::AllocationFailed {
            bytes: (list.len() + 1) * std::mem::size_of::<TypeNum>(),
        })?;
        list.push(totype);
        Ok(())
    }

    /// Type number of the registered user type called `name`.
    pub fn type_num_from_name(&self, name: &str) -> Option<TypeNum> {
        self.user
            .iter()
            .position(|d| d.name() == name)
            .map(Self::user_type_num)
    }
}

// ============================================================================
// Process-wide registry
// ============================================================================

static REGISTRY: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<TypeRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(TypeRegistry::new()))
}

/// Register a user descriptor with the process-wide registry.
pub fn register_data_type(descr: &Arc<Descr>) -> Result<TypeNum> {
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_data_type(descr)
}

/// See [`TypeRegistry::register_cast_func`].
pub fn register_cast_func(descr: &Descr, totype: TypeNum, cast: CastFn) -> Result<()> {
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_cast_func(descr, totype, cast)
}

/// See [`TypeRegistry::register_can_cast`].
pub fn register_can_cast(descr: &Descr, totype: TypeNum, scalar: Option<ScalarKind>) -> Result<()> {
    global()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register_can_cast(descr, totype, scalar)
}

pub fn type_num_from_name(name: &str) -> Option<TypeNum> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .type_num_from_name(name)
}

/// Descriptor of a built-in or globally registered type number.
pub fn descr_from_type_num(type_num: TypeNum) -> Option<Arc<Descr>> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .descr(type_num)
}
