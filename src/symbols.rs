//! Per-function Symbol Table (§4.6): a stack of
//! `(interned-name, ir-reference)` pairs with lexical-scope discipline.
//! Scope entry records the stack depth; scope exit truncates back to it.
//! Lookup walks from the top so inner declarations shadow outer ones.

use crate::interner::Symbol;
use crate::ir::IrRef;

#[derive(Default)]
pub struct SymbolTable {
    stack: Vec<(Symbol, IrRef)>,
}

/// A saved stack depth from [`SymbolTable::enter_scope`]; pass it back to
/// [`SymbolTable::exit_scope`] to truncate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark(usize);

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&self) -> ScopeMark {
        ScopeMark(self.stack.len())
    }

    /// Truncate the stack back to a previously recorded depth, dropping
    /// every declaration made since. No instructions are emitted for
    /// scope entry/exit themselves (§4.4).
    pub fn exit_scope(&mut self, mark: ScopeMark) {
        self.stack.truncate(mark.0);
    }

    pub fn declare(&mut self, name: Symbol, storage: IrRef) {
        self.stack.push((name, storage));
    }

    /// Look up `name`, innermost scope first.
    pub fn lookup(&self, name: Symbol) -> Option<IrRef> {
        self.stack.iter().rev().find(|(n, _)| *n == name).map(|(_, r)| *r)
    }
}
