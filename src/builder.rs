//! The Instruction Builder (§4.2): the only thing allowed to push into a
//! function's instruction buffer and body sequence, and the owner of the
//! branch-context protocol (§4.3) that boolean lowering consumes.

use std::collections::HashMap;

use crate::ast::ConstValue;
use crate::error::{LowerError, LowerResult};
use crate::interner::{IrTypeRef, Symbol};
use crate::ir::{FunctionIr, Inst, IrRef, Opcode, Payload, SwitchCase};

/// The `(true_label, false_label)` pair boolean lowering branches to
/// (§4.3). Set and cleared by callers around each `lower_bool` call;
/// every overwrite site must restore the previous value on every exit
/// path, including error paths (§5, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchContext {
    pub true_label: IrRef,
    pub false_label: IrRef,
}

pub struct Builder {
    pub func: FunctionIr,
    /// Debug-only label names (`for.cond`, `bool_and.true`, ...). Not
    /// load-bearing for any invariant; purely so tests and the
    /// demonstration binary can tell labels apart.
    pub label_hints: HashMap<IrRef, &'static str>,
    branch_context: Option<BranchContext>,
}

impl Builder {
    pub fn new(name: Symbol) -> Self {
        Builder { func: FunctionIr::new(name), label_hints: HashMap::new(), branch_context: None }
    }

    /// Emit a constant-value instruction (§4.2).
    pub fn add_constant(&mut self, value: ConstValue, ty: IrTypeRef) -> IrRef {
        self.func.buffer.push(Inst { op: Opcode::Constant, payload: Payload::Const(value), ty })
    }

    /// Emit a `symbol` reference of the given type.
    pub fn add_symbol(&mut self, name: Symbol, ty: IrTypeRef) -> IrRef {
        self.func.buffer.push(Inst { op: Opcode::Symbol, payload: Payload::Name(name), ty })
    }

    /// Emit an `arg` parameter slot.
    pub fn add_arg(&mut self, index: u32, ty: IrTypeRef) -> IrRef {
        self.func.buffer.push(Inst { op: Opcode::Arg, payload: Payload::ArgIndex(index), ty })
    }

    /// Allocate a label reference. Binding happens only when the label
    /// is later appended to the body sequence via [`Builder::bind_label`]
    /// (§4.2): allocating a label does not, by itself, place it
    /// anywhere. Labels carry no value; `void_ty` is recorded only so
    /// every buffer entry has a type like any other instruction.
    pub fn add_label(&mut self, hint: &'static str, void_ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst { op: Opcode::Label, payload: Payload::None, ty: void_ty });
        self.label_hints.insert(r, hint);
        r
    }

    /// Bind a previously allocated label at the current point in the
    /// body sequence.
    pub fn bind_label(&mut self, label: IrRef) {
        debug_assert_eq!(self.func.inst(label).op, Opcode::Label, "bind_label given a non-label ref");
        self.func.body.push(label);
    }

    /// Emit a stack-slot `alloc`; the result is always `ptr`.
    pub fn add_alloc(&mut self, size: u64, align: u64, ptr_ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst {
            op: Opcode::Alloc,
            payload: Payload::Alloc { size, align },
            ty: ptr_ty,
        });
        self.func.body.push(r);
        r
    }

    pub fn add_load(&mut self, addr: IrRef, ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst { op: Opcode::Load, payload: Payload::Unary(addr), ty });
        self.func.body.push(r);
        r
    }

    /// Emit a store; no result is used downstream.
    pub fn add_store(&mut self, addr: IrRef, value: IrRef, void_ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst {
            op: Opcode::Store,
            payload: Payload::Store { addr, value },
            ty: void_ty,
        });
        self.func.body.push(r);
        r
    }

    /// Append a `jump`, terminating the current block.
    pub fn add_jump(&mut self, target: IrRef, void_ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst {
            op: Opcode::Jump,
            payload: Payload::Jump { target },
            ty: void_ty,
        });
        self.func.body.push(r);
        r
    }

    /// Read the current branch context and emit a conditional branch.
    /// Fails if no context is set (§4.2).
    pub fn add_branch(&mut self, cond: IrRef, void_ty: IrTypeRef) -> LowerResult<IrRef> {
        let ctx = self
            .branch_context
            .ok_or_else(|| LowerError::unsupported("add_branch called with no branch context set"))?;
        let r = self.func.buffer.push(Inst {
            op: Opcode::Branch,
            payload: Payload::Branch { cond, true_label: ctx.true_label, false_label: ctx.false_label },
            ty: void_ty,
        });
        self.func.body.push(r);
        Ok(r)
    }

    /// Reserve an empty `switch` instruction slot to be patched once the
    /// body has been lowered and the case list is known (§4.4).
    pub fn reserve_switch(&mut self, scrutinee: IrRef, void_ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst {
            op: Opcode::Switch,
            payload: Payload::Switch { scrutinee, cases: Vec::new(), default: scrutinee },
            ty: void_ty,
        });
        self.func.body.push(r);
        r
    }

    /// Patch a reserved `switch` with its collected cases and default.
    pub fn patch_switch(&mut self, switch_ref: IrRef, cases: Vec<SwitchCase>, default: IrRef) {
        if let Payload::Switch { cases: slot_cases, default: slot_default, .. } =
            &mut self.func.buffer[switch_ref].payload
        {
            *slot_cases = cases;
            *slot_default = default;
        } else {
            debug_assert!(false, "patch_switch given a non-switch ref");
        }
    }

    /// Generic emit for opcodes without a dedicated primitive above
    /// (arithmetic, bitwise, comparison, conversion, call, select, ret).
    pub fn add_inst(&mut self, op: Opcode, payload: Payload, ty: IrTypeRef) -> IrRef {
        let r = self.func.buffer.push(Inst { op, payload, ty });
        self.func.body.push(r);
        r
    }

    pub fn branch_context(&self) -> Option<BranchContext> {
        self.branch_context
    }

    /// Install a new branch context, returning the previous one so the
    /// caller can restore it on every exit path (§5, §9).
    pub fn set_branch_context(&mut self, ctx: BranchContext) -> Option<BranchContext> {
        std::mem::replace(&mut self.branch_context, Some(ctx))
    }

    pub fn restore_branch_context(&mut self, previous: Option<BranchContext>) {
        self.branch_context = previous;
    }
}

