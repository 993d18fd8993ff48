//! The IR data model (§3): a dense, append-only instruction buffer plus
//! the linear body sequence that gives it execution order.
//!
//! References are modeled the way the reference compiler's own Cranelift
//! dependency family models `Block`/`Value`/`Inst` — a newtype over a
//! `u32` index via `cranelift_entity::entity_impl!` rather than a
//! pointer. A single reference kind, `IrRef`, stands for both
//! instruction results and labels, since the spec treats a label as just
//! another buffer entry with no meaningful return value.

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::ast::ConstValue;
use crate::interner::{IrTypeRef, Symbol};

/// A dense reference to an instruction result or a label (§3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IrRef(u32);
entity_impl!(IrRef, "v");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // Values
    Constant,
    Symbol,
    Arg,
    // Memory
    Alloc,
    Load,
    Store,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,
    // Comparison (result type is always i1)
    CmpEq,
    CmpNe,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    // Conversions
    Zext,
    Sext,
    Trunc,
    // Control
    Label,
    Jump,
    Branch,
    Switch,
    Ret,
    RetValue,
    Call,
    Select,
}

/// One `(value, target label)` pair inside a lowered `switch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: i128,
    pub target: IrRef,
}

/// The operand payload carried by an instruction. Which variant applies
/// is determined entirely by the instruction's `Opcode`; this is the
/// "arena for auxiliary payloads" of §4.2 realized as ordinary owned
/// `Vec`s rather than a hand-rolled bump allocator — Rust's ownership
/// already gives per-function, drop-on-boundary semantics for free.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Const(ConstValue),
    /// `symbol` operand: an interned, possibly-external name.
    Name(Symbol),
    /// `arg` operand: the parameter's index.
    ArgIndex(u32),
    Unary(IrRef),
    Binary(IrRef, IrRef),
    Alloc { size: u64, align: u64 },
    Store { addr: IrRef, value: IrRef },
    Jump { target: IrRef },
    Branch { cond: IrRef, true_label: IrRef, false_label: IrRef },
    Switch { scrutinee: IrRef, cases: Vec<SwitchCase>, default: IrRef },
    Call { callee: IrRef, args: Vec<IrRef>, direct: bool },
    Select { cond: IrRef, if_true: IrRef, if_false: IrRef },
    Ret { value: Option<IrRef> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub op: Opcode,
    pub payload: Payload,
    pub ty: IrTypeRef,
}

/// The finished IR for one function (§6's "Output"): the interned pool
/// reference is the shared `Interner` passed in by the caller, not
/// stored here.
#[derive(Debug, Clone)]
pub struct FunctionIr {
    pub name: Symbol,
    pub params: Vec<IrTypeRef>,
    pub buffer: PrimaryMap<IrRef, Inst>,
    pub body: Vec<IrRef>,
}

impl FunctionIr {
    pub fn new(name: Symbol) -> Self {
        FunctionIr { name, params: Vec::new(), buffer: PrimaryMap::new(), body: Vec::new() }
    }

    pub fn inst(&self, r: IrRef) -> &Inst {
        &self.buffer[r]
    }

    /// True if `label` appears bound (present) in the body sequence.
    pub fn is_bound(&self, label: IrRef) -> bool {
        self.body.contains(&label)
    }
}
