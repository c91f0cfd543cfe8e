//! Cast tables and the safe-casting rules between element types.

use std::collections::HashMap;
use std::sync::Arc;

use crate::descr::Descr;
use crate::types::{BuiltinType, ScalarKind, TypeKind, TypeNum};
use crate::{NdError, Result};

/// Converts `n` contiguous native-order elements of one type into `n`
/// contiguous native-order elements of another.
pub type CastFn = Arc<dyn Fn(&[u8], &mut [u8], usize) + Send + Sync>;

/// Per-descriptor casting state, keyed by destination type number.
#[derive(Default)]
pub(crate) struct CastTable {
    pub(crate) funcs: HashMap<TypeNum, CastFn>,
    pub(crate) cancastto: Vec<TypeNum>,
    pub(crate) cancastscalarkindto: [Vec<TypeNum>; ScalarKind::COUNT],
}

fn builtin_safe(from: BuiltinType, to: BuiltinType) -> bool {
    use TypeKind::*;
    let (fs, ts) = (from.elsize(), to.elsize());
    match (from.kind(), to.kind()) {
        _ if from == to => true,
        (Bool, _) => true,
        (_, Bool) => false,
        (a, b) if a == b => ts >= fs,
        (UnsignedInt, SignedInt) => ts > fs,
        (SignedInt, UnsignedInt) => false,
        (SignedInt | UnsignedInt, Float) => ts > fs || to == BuiltinType::Float64,
        (SignedInt | UnsignedInt, Complex) => ts / 2 > fs || to == BuiltinType::Complex128,
        (Float, Complex) => ts >= 2 * fs,
        _ => false,
    }
}

/// Whether every value of `from` is representable in `to`.
///
/// Built-in pairs follow the widening lattice; any pair involving a user
/// type needs an explicit [`register_can_cast`](crate::register_can_cast).
pub fn can_cast_safely(from: &Descr, to: &Descr) -> bool {
    let (Some(f), Some(t)) = (from.type_num(), to.type_num()) else {
        return false;
    };
    if f == t {
        return true;
    }
    if let (Some(fb), Some(tb)) = (f.builtin(), t.builtin()) {
        return builtin_safe(fb, tb);
    }
    from.casts().cancastto.contains(&t)
}

/// Whether a scalar of `kind` stored as `from` may be cast to `to`.
pub fn can_cast_scalar_kind(from: &Descr, kind: ScalarKind, to: &Descr) -> bool {
    if can_cast_safely(from, to) {
        return true;
    }
    match to.type_num() {
        Some(t) => from.casts().cancastscalarkindto[kind.index()].contains(&t),
        None => false,
    }
}

fn incompatible(from: &Descr, to: &Descr) -> NdError {
    NdError::IncompatibleType {
        from: from.name().to_string(),
        to: to.name().to_string(),
    }
}

/// Convert `n` contiguous elements of `src` (laid out as `from`) into `dst`
/// (laid out as `to`).
///
/// Lookup order: same type (copy, fixing byte order), a registered cast
/// function, then the scalar path when both types are built-in.
pub fn cast_buffer(from: &Descr, to: &Descr, src: &[u8], dst: &mut [u8], n: usize) -> Result<()> {
    let (fe, te) = (from.elsize(), to.elsize());
    if src.len() < n * fe {
        return Err(NdError::OutOfBuffer { len: src.len() });
    }
    if dst.len() < n * te {
        return Err(NdError::OutOfBuffer { len: dst.len() });
    }
    let (Some(f), Some(t)) = (from.type_num(), to.type_num()) else {
        return Err(incompatible(from, to));
    };

    if f == t && fe == te {
        let swap = from.is_native() != to.is_native();
        from.funcs().copyswapn(dst, te, src, fe, n, fe, swap);
        return Ok(());
    }

    if let Some(cast) = from.cast_func(t) {
        if from.is_native() && to.is_native() {
            cast(&src[..n * fe], &mut dst[..n * te], n);
        } else {
            let mut native_src = vec![0u8; n * fe];
            from.funcs()
                .copyswapn(&mut native_src, fe, src, fe, n, fe, !from.is_native());
            let mut native_dst = vec![0u8; n * te];
            cast(&native_src, &mut native_dst, n);
            to.funcs()
                .copyswapn(dst, te, &native_dst, te, n, te, !to.is_native());
        }
        return Ok(());
    }

    if f.is_builtin() && t.is_builtin() {
        for i in 0..n {
            let value = from.getitem(&src[i * fe..(i + 1) * fe]);
            to.setitem(&value, &mut dst[i * te..(i + 1) * te])?;
        }
        return Ok(());
    }

    Err(incompatible(from, to))
}
