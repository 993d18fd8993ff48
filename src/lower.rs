//! `FunctionLowering`: the per-function transient state shared by
//! statement lowering (§4.4), expression lowering (§4.5), and boolean
//! lowering (§4.3). Exclusively owned by one function's lowering and
//! reset on function boundaries (§5) — nothing here survives into the
//! next function.

use crate::builder::Builder;
use crate::interner::{Interner, IrTypeRef, Symbol};
use crate::ir::{IrRef, SwitchCase};
use crate::symbols::SymbolTable;
use crate::target::Target;
use crate::types::{lower_type, CType};

/// The case list and default label being accumulated for the innermost
/// enclosing `switch` (§3, §4.4).
#[derive(Debug, Default)]
pub struct SwitchContext {
    pub cases: Vec<SwitchCase>,
    pub default: Option<IrRef>,
}

/// A save point for the scoped `break`/`continue` stack (§5, §9): every
/// site that installs a new pair must restore exactly this on every exit
/// path, including error paths.
#[derive(Debug, Clone, Copy)]
pub struct LoopMark {
    continue_label: Option<IrRef>,
    break_label: Option<IrRef>,
}

pub struct FunctionLowering<'a> {
    pub builder: Builder,
    pub interner: &'a mut Interner,
    pub target: &'a Target,
    pub symbols: SymbolTable,

    pub void_ty: IrTypeRef,
    pub i1_ty: IrTypeRef,

    /// Set once at function entry; every `return` jumps here (§3).
    pub return_label: IrRef,
    pub return_type: IrTypeRef,

    pub break_label: Option<IrRef>,
    pub continue_label: Option<IrRef>,
    pub switch_context: Option<SwitchContext>,
    /// Published result of a GNU `a ?: c` condition, consumed by
    /// `cond_dummy_expr` nodes in the then-arm (§4.5).
    pub cond_dummy_ref: Option<IrRef>,

    label_counter: u32,
}

impl<'a> FunctionLowering<'a> {
    pub fn new(name: Symbol, return_ctype: &CType, interner: &'a mut Interner, target: &'a Target) -> Self {
        let void_ty = lower_type(&CType::Void, target, interner).expect("void always lowers");
        let i1_ty = lower_type(&CType::Bool, target, interner).expect("bool always lowers");
        let return_type = lower_type(return_ctype, target, interner).expect("return type must lower");

        let mut builder = Builder::new(name);
        let return_label = builder.add_label("return", void_ty);

        FunctionLowering {
            builder,
            interner,
            target,
            symbols: SymbolTable::new(),
            void_ty,
            i1_ty,
            return_label,
            return_type,
            break_label: None,
            continue_label: None,
            switch_context: None,
            cond_dummy_ref: None,
            label_counter: 0,
        }
    }

    /// Allocate a fresh label with a debug hint; binding is a separate,
    /// explicit step (§4.2).
    pub fn new_label(&mut self, hint: &'static str) -> IrRef {
        self.label_counter += 1;
        self.builder.add_label(hint, self.void_ty)
    }

    pub fn bind(&mut self, label: IrRef) {
        self.builder.bind_label(label);
    }

    pub fn lower_ctype(&mut self, ty: &CType) -> crate::error::LowerResult<IrTypeRef> {
        lower_type(ty, self.target, self.interner)
    }

    /// Install a fresh `(continue, break)` pair, returning a mark to
    /// restore on every exit path (§5, §9).
    pub fn enter_loop(&mut self, continue_label: IrRef, break_label: IrRef) -> LoopMark {
        let mark = LoopMark { continue_label: self.continue_label, break_label: self.break_label };
        self.continue_label = Some(continue_label);
        self.break_label = Some(break_label);
        mark
    }

    pub fn exit_loop(&mut self, mark: LoopMark) {
        self.continue_label = mark.continue_label;
        self.break_label = mark.break_label;
    }

    /// `switch` only ever installs a fresh `break_label`; `continue`
    /// passes through to whatever loop (if any) encloses the switch
    /// (§4.4).
    pub fn enter_switch(&mut self, break_label: IrRef) -> (Option<IrRef>, Option<SwitchContext>) {
        let saved_break = self.break_label;
        let saved_switch = self.switch_context.take();
        self.break_label = Some(break_label);
        self.switch_context = Some(SwitchContext::default());
        (saved_break, saved_switch)
    }

    pub fn exit_switch(&mut self, saved: (Option<IrRef>, Option<SwitchContext>)) -> SwitchContext {
        let current = self.switch_context.take().unwrap_or_default();
        self.break_label = saved.0;
        self.switch_context = saved.1;
        current
    }
}
