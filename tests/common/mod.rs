//! Shared AST-building helpers for the integration tests. Not a parser —
//! just enough constructor glue to hand-assemble the small translation
//! units each scenario needs.

use c2ir::ast::{BinOp, CastKind, ConstValue, Expr, ExprKind, ForInit, Item, Param, Span, Stmt, StmtKind, TranslationUnit, UnOp};
use c2ir::interner::{Interner, Symbol};
use c2ir::target::Target;
use c2ir::types::CType;
use c2ir::{lower_translation_unit, ModuleIr};

pub fn int_ty() -> CType {
    CType::Int { signed: true }
}

pub fn int_lit(v: i128) -> Expr {
    Expr::int_lit(v, int_ty(), Span::default())
}

/// A variable use in value position: `DeclRef` wrapped in the implicit
/// lvalue-to-rvalue conversion a real semantic analyzer would attach.
pub fn load(name: Symbol) -> Expr {
    let r = Expr::decl_ref(name, int_ty(), Span::default());
    Expr::new(ExprKind::Cast(CastKind::LvalueToRvalue, Box::new(r)), int_ty(), Span::default())
}

pub fn addr(name: Symbol) -> Expr {
    Expr::decl_ref(name, int_ty(), Span::default())
}

pub fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), int_ty(), Span::default())
}

pub fn ret(e: Expr) -> Stmt {
    Stmt::new(StmtKind::Return(Some(e)), Span::default())
}

pub fn compound(stmts: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Compound(stmts), Span::default())
}

pub fn function(name: &str, interner: &mut Interner, params: Vec<(&str, CType)>, body: Stmt) -> Item {
    let sym = interner.intern_str(name);
    let params: Vec<Param> = params
        .into_iter()
        .map(|(p_name, ty)| Param { name: interner.intern_str(p_name), ty })
        .collect();
    Item::FunctionDef {
        name: sym,
        params,
        ret_type: int_ty(),
        body,
        implicit_return_zero: false,
        span: Span::default(),
    }
}

/// Lower `items` using the same interner they were built with — names
/// must already be interned to build `Expr`s, so the interner the AST
/// construction helpers used is always the right one to lower with.
pub fn run(interner: &mut Interner, items: Vec<Item>) -> ModuleIr {
    let target = Target::default();
    let tu = TranslationUnit { items };
    lower_translation_unit(&tu, &target, interner).expect("lowering should succeed")
}

pub fn decl(name: Symbol, init: Option<Expr>) -> Stmt {
    Stmt::new(StmtKind::Decl { name, ty: int_ty(), init }, Span::default())
}

pub fn unary(op: UnOp, inner: Expr) -> Expr {
    Expr::new(ExprKind::Unary(op, Box::new(inner)), int_ty(), Span::default())
}

pub fn compound_assign(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::new(ExprKind::CompoundAssign(op, Box::new(lhs), Box::new(rhs)), int_ty(), Span::default())
}

pub fn expr_stmt(e: Expr) -> Stmt {
    Stmt::new(StmtKind::Expr(e), Span::default())
}

pub fn if_stmt(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    Stmt::new(StmtKind::If { cond, then_branch: Box::new(then_branch), else_branch: else_branch.map(Box::new) }, Span::default())
}

pub fn for_stmt(init: Option<ForInit>, cond: Option<Expr>, incr: Option<Expr>, body: Stmt) -> Stmt {
    Stmt::new(StmtKind::For { init, cond, incr, body: Box::new(body) }, Span::default())
}

pub fn switch_stmt(cond: Expr, body: Stmt) -> Stmt {
    Stmt::new(StmtKind::Switch { cond, body: Box::new(body) }, Span::default())
}

pub fn case_stmt(value: i128, stmt: Stmt) -> Stmt {
    let value_expr = int_lit(value);
    Stmt::new(StmtKind::Case { value: value_expr, stmt: Box::new(stmt) }, Span::default())
}

pub fn default_stmt(stmt: Stmt) -> Stmt {
    Stmt::new(StmtKind::Default { stmt: Box::new(stmt) }, Span::default())
}

pub fn const_value(value: i128) -> ConstValue {
    ConstValue::Int(value)
}
