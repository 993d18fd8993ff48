//! The minimal, already-typed input AST (§3a).
//!
//! This is *not* a parser or a semantic analyzer — both are external
//! collaborators out of scope for this crate (§1, §6). It is the
//! smallest surface that satisfies the contract those collaborators
//! would otherwise hand lowering: every node exposes a kind, a type, and
//! an optional pre-computed constant. Whether an expression denotes an
//! lvalue is structural on its `ExprKind`, not a separate field to keep
//! in sync. Callers — tests and the demonstration binary — build trees
//! directly with the constructors below rather than parsing source text.

use crate::interner::Symbol;
use crate::types::CType;

/// A source location. Lowering never interprets this beyond attaching it
/// to diagnostics (§6); it does not even require the two offsets to be
/// ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

/// A constant value folded by the (external) constant evaluator and
/// attached to a node. Lowering only ever consults this; it never folds
/// constants itself (§1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i128),
    Float(f64),
}

impl ConstValue {
    pub fn as_i128(&self) -> i128 {
        match self {
            ConstValue::Int(v) => *v,
            ConstValue::Float(v) => *v as i128,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            ConstValue::Int(v) => *v == 0,
            ConstValue::Float(v) => *v == 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    LogAnd,
    LogOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Neg,
    Not,
    BitNot,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

/// Cast kinds the (external) semantic analyzer tags explicit and implicit
/// conversions with (§4.5). Kinds not listed here are a declared gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    NoOp,
    LvalueToRvalue,
    FunctionToPointer,
    ArrayToPointer,
    IntCast,
    BoolToInt,
    ToBool,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Always carries a `const_value`; reaching rvalue lowering without
    /// one is an invariant violation (§7).
    Literal,
    /// A string literal. Its interned bytes are escaped into an
    /// anonymous symbol name during lvalue lowering (§4.5). Reaching
    /// rvalue lowering directly (rather than through an
    /// `ArrayToPointer` cast) is an invariant violation.
    StringLiteral(Vec<u8>),
    /// A reference to a variable or function by its already-resolved
    /// name.
    DeclRef(Symbol),
    Paren(Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    CompoundAssign(BinOp, Box<Expr>, Box<Expr>),
    Comma(Box<Expr>, Box<Expr>),
    Cast(CastKind, Box<Expr>),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Conditional { cond: Box<Expr>, then: Box<Expr>, else_branch: Box<Expr> },
    /// Stands in for the omitted middle operand of GNU `a ?: c`; the
    /// `then` arm of a `Conditional` built from that syntax is this node
    /// (possibly nested inside further structure).
    CondDummyExpr,
    /// A node kind this core declares a fatal gap for (§7, §9): complex
    /// arithmetic, member access, non-constant `sizeof`, compound
    /// literals, generic selections, stmt-expressions, ...
    Unsupported(&'static str),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: CType,
    pub span: Span,
    pub const_value: Option<ConstValue>,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: CType, span: Span) -> Self {
        Expr { kind, ty, span, const_value: None }
    }

    pub fn with_const(mut self, value: ConstValue) -> Self {
        self.const_value = Some(value);
        self
    }

    pub fn int_lit(value: i128, ty: CType, span: Span) -> Self {
        Expr::new(ExprKind::Literal, ty, span).with_const(ConstValue::Int(value))
    }

    pub fn float_lit(value: f64, ty: CType, span: Span) -> Self {
        Expr::new(ExprKind::Literal, ty, span).with_const(ConstValue::Float(value))
    }

    pub fn decl_ref(name: Symbol, ty: CType, span: Span) -> Self {
        Expr::new(ExprKind::DeclRef(name), ty, span)
    }

    pub fn string_lit(bytes: Vec<u8>, ty: CType, span: Span) -> Self {
        Expr::new(ExprKind::StringLiteral(bytes), ty, span)
    }
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Expr(Expr),
    Decls(Vec<(Symbol, CType, Option<Expr>)>),
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Decl { name: Symbol, ty: CType, init: Option<Expr> },
    Labeled { label: Symbol, stmt: Box<Stmt> },
    /// A `goto` to a named label — a declared gap (§9); always fatal.
    Goto(Symbol),
    Compound(Vec<Stmt>),
    If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { init: Option<ForInit>, cond: Option<Expr>, incr: Option<Expr>, body: Box<Stmt> },
    Switch { cond: Expr, body: Box<Stmt> },
    Case { value: Expr, stmt: Box<Stmt> },
    Default { stmt: Box<Stmt> },
    Continue,
    Break,
    Return(Option<Expr>),
    Expr(Expr),
    /// Null statement, typedef, record/enum decl, function prototype,
    /// extern var, `static_assert` — no runtime effect (§4.4).
    Declarative,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: CType,
}

#[derive(Debug, Clone)]
pub enum Item {
    FunctionDef {
        name: Symbol,
        params: Vec<Param>,
        ret_type: CType,
        body: Stmt,
        /// Set when falling off the end of the function must return a
        /// zero of the return type (§4.4's "implicit return").
        implicit_return_zero: bool,
        span: Span,
    },
    /// A prototype with no body — registered by name only, no emission.
    FunctionProto { name: Symbol, params: Vec<CType>, ret_type: CType },
    GlobalVar { name: Symbol, ty: CType, init: Option<Expr> },
    /// typedef, record/enum declaration, `static_assert`, ...
    Declarative,
}

#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
}
