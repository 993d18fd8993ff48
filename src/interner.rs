//! The value/type interner: the one piece of state shared across every
//! function lowered out of a translation unit.
//!
//! Two independent tables live here: identifier text (→ `Symbol`) and
//! canonical IR types (→ `IrTypeRef`, see `crate::types`). Both are
//! content-addressable — interning the same key twice returns the same
//! handle — so downstream code can compare handles instead of deep
//! structural equality.

use std::collections::HashMap;

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::types::IrType;

/// An interned identifier (a declaration name, a struct field, a string
/// literal's synthesized symbol name, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);
entity_impl!(Symbol, "sym");

/// Canonicalizes identifier text and IR types for one translation unit.
///
/// Owned by the compilation driver and passed by reference into lowering;
/// never a thread-local or other implicit global (§5, §9).
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    string_ids: HashMap<Box<str>, Symbol>,
    types: PrimaryMap<IrTypeRef, IrType>,
    type_ids: HashMap<IrType, IrTypeRef>,
    anon_counter: u32,
}

/// A dense, interned reference to a canonical `IrType`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IrTypeRef(u32);
entity_impl!(IrTypeRef, "ty");

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a piece of identifier text, returning the same `Symbol` for
    /// repeated calls with equal text.
    pub fn intern_str(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.string_ids.get(text) {
            return sym;
        }
        let sym = Symbol::new(self.strings.len());
        self.strings.push(text.into());
        self.string_ids.insert(text.into(), sym);
        sym
    }

    pub fn resolve_str(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }

    /// Intern an IR type, deduplicating structurally identical
    /// descriptions into a single reference (§3, §4.1).
    pub fn intern_type(&mut self, ty: IrType) -> IrTypeRef {
        if let Some(&r) = self.type_ids.get(&ty) {
            return r;
        }
        let r = self.types.push(ty.clone());
        self.type_ids.insert(ty, r);
        r
    }

    pub fn resolve_type(&self, r: IrTypeRef) -> &IrType {
        &self.types[r]
    }

    /// Synthesize a unique, printable name for an anonymous global, as
    /// string-literal lvalue lowering needs (§4.5). Escapes non-graphic
    /// bytes so the label stays printable; a trailing counter keeps
    /// distinct literals with identical text from colliding.
    pub fn fresh_anon_string_name(&mut self, bytes: &[u8]) -> Symbol {
        self.anon_counter += 1;
        let mut escaped = String::new();
        for &b in bytes.iter().take(16) {
            escaped.push(if b.is_ascii_graphic() { b as char } else { '_' });
        }
        let name = format!(".Lstr.{}.{escaped}", self.anon_counter);
        self.intern_str(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_string_twice_returns_the_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern_str("counter");
        let b = interner.intern_str("counter");
        assert_eq!(a, b);
        assert_eq!(interner.resolve_str(a), "counter");
    }

    #[test]
    fn interning_structurally_identical_types_shares_a_reference() {
        let mut interner = Interner::new();
        let a = interner.intern_type(IrType::Int(32));
        let b = interner.intern_type(IrType::Int(32));
        let c = interner.intern_type(IrType::Int(64));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
