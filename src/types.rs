//! Type Lowering (§4.1)
//!
//! Maps source (C) types to canonical, interned IR types. This is the
//! smallest of the five components: a single recursive match with no
//! control-flow or symbol-table concerns of its own.

use crate::error::{LowerError, LowerResult};
use crate::interner::{Interner, IrTypeRef};
use crate::target::Target;

/// The canonical IR type lattice (§3). Array/vector element types are
/// themselves interned references, so structurally identical compound
/// types collapse to the same `IrTypeRef` as their leaves do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    /// The result type of every comparison.
    I1,
    Int(u16),
    Float(u16),
    Ptr,
    Func,
    Array(IrTypeRef, u64),
    Vector(IrTypeRef, u64),
}

impl IrType {
    pub fn is_integer(&self) -> bool {
        matches!(self, IrType::Int(_) | IrType::I1)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, IrType::Float(_))
    }

    /// Bit width for the types `zext`/`sext`/`trunc` care about.
    pub fn bit_width(&self) -> Option<u16> {
        match self {
            IrType::I1 => Some(1),
            IrType::Int(n) => Some(*n),
            IrType::Float(n) => Some(*n),
            _ => None,
        }
    }
}

/// A source (C) type, already resolved by the (external) semantic
/// analyzer — no inference happens here, only structural lowering.
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    Bool,
    Char { signed: bool },
    Short { signed: bool },
    Int { signed: bool },
    Long { signed: bool },
    LongLong { signed: bool },
    Float,
    Double,
    Pointer(Box<CType>),
    Function { params: Vec<CType>, variadic: bool, ret: Box<CType> },
    Array { elem: Box<CType>, len: u64 },
    Vector { elem: Box<CType>, len: u64 },
    /// `_Complex float` / `_Complex double` — a declared gap (§7, §9).
    Complex(Box<CType>),
}

impl CType {
    pub fn is_signed(&self) -> bool {
        match self {
            CType::Char { signed } | CType::Short { signed } | CType::Int { signed }
            | CType::Long { signed } | CType::LongLong { signed } => *signed,
            _ => false,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, CType::Pointer(_))
    }

    pub fn element_type(&self) -> Option<&CType> {
        match self {
            CType::Pointer(elem) | CType::Array { elem, .. } | CType::Vector { elem, .. } => {
                Some(elem)
            }
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<u64> {
        match self {
            CType::Array { len, .. } | CType::Vector { len, .. } => Some(*len),
            _ => None,
        }
    }

    /// Bit size under the given target, for everything but aggregates.
    pub fn bit_size(&self, target: &Target) -> u64 {
        match self {
            CType::Void => 0,
            CType::Bool => 8,
            CType::Char { .. } => target.char_bits as u64,
            CType::Short { .. } => target.short_bits as u64,
            CType::Int { .. } => target.int_bits as u64,
            CType::Long { .. } => target.long_bits as u64,
            CType::LongLong { .. } => target.long_long_bits as u64,
            CType::Float => target.float_bits as u64,
            CType::Double => target.double_bits as u64,
            CType::Pointer(_) | CType::Function { .. } => target.pointer_bits as u64,
            CType::Array { elem, len } => elem.bit_size(target) * len,
            CType::Vector { elem, len } => elem.bit_size(target) * len,
            CType::Complex(inner) => inner.bit_size(target) * 2,
        }
    }

    pub fn byte_size(&self, target: &Target) -> u64 {
        (self.bit_size(target) + 7) / 8
    }

    /// Natural alignment: self-aligned scalars, element alignment for
    /// arrays/vectors.
    pub fn align(&self, target: &Target) -> u64 {
        match self {
            CType::Array { elem, .. } | CType::Vector { elem, .. } => elem.align(target),
            _ => self.byte_size(target).max(1),
        }
    }
}

/// Lower a source type to its canonical, interned IR type (§4.1).
pub fn lower_type(ty: &CType, target: &Target, interner: &mut Interner) -> LowerResult<IrTypeRef> {
    let ir_ty = match ty {
        CType::Void => IrType::Void,
        CType::Bool => IrType::I1,
        CType::Char { .. } => IrType::Int(target.char_bits as u16),
        CType::Short { .. } => IrType::Int(target.short_bits as u16),
        CType::Int { .. } => IrType::Int(target.int_bits as u16),
        CType::Long { .. } => IrType::Int(target.long_bits as u16),
        CType::LongLong { .. } => IrType::Int(target.long_long_bits as u16),
        CType::Float => IrType::Float(target.float_bits as u16),
        CType::Double => IrType::Float(target.double_bits as u16),
        CType::Pointer(_) => IrType::Ptr,
        CType::Function { .. } => IrType::Func,
        CType::Array { elem, len } => {
            let elem_ref = lower_type(elem, target, interner)?;
            IrType::Array(elem_ref, *len)
        }
        CType::Vector { elem, len } => {
            let elem_ref = lower_type(elem, target, interner)?;
            IrType::Vector(elem_ref, *len)
        }
        CType::Complex(_) => {
            return Err(LowerError::unsupported("complex arithmetic is not yet lowered"));
        }
    };
    Ok(interner.intern_type(ir_ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_long_share_a_width_on_lp64() {
        let target = Target::from_triple(&"x86_64-unknown-linux-gnu".parse().unwrap());
        let mut interner = Interner::new();
        let int_ref = lower_type(&CType::Int { signed: true }, &target, &mut interner).unwrap();
        assert_eq!(interner.resolve_type(int_ref), &IrType::Int(32));
        let long_ref = lower_type(&CType::Long { signed: true }, &target, &mut interner).unwrap();
        assert_eq!(interner.resolve_type(long_ref), &IrType::Int(64));
    }

    #[test]
    fn bool_lowers_to_i1() {
        let target = Target::default();
        let mut interner = Interner::new();
        let r = lower_type(&CType::Bool, &target, &mut interner).unwrap();
        assert_eq!(interner.resolve_type(r), &IrType::I1);
    }

    #[test]
    fn array_of_int_dedupes_its_element() {
        let target = Target::default();
        let mut interner = Interner::new();
        let arr = CType::Array { elem: Box::new(CType::Int { signed: true }), len: 4 };
        let r1 = lower_type(&arr, &target, &mut interner).unwrap();
        let plain_int = lower_type(&CType::Int { signed: true }, &target, &mut interner).unwrap();
        match interner.resolve_type(r1) {
            IrType::Array(elem, len) => {
                assert_eq!(*elem, plain_int);
                assert_eq!(*len, 4);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn complex_is_a_fatal_unsupported_construct() {
        let target = Target::default();
        let mut interner = Interner::new();
        let ty = CType::Complex(Box::new(CType::Double));
        assert!(lower_type(&ty, &target, &mut interner).is_err());
    }
}
