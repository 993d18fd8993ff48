//! Hand-builds a couple of small translation units and runs them through
//! the lowering pipeline, printing the resulting IR. There is no parser
//! wired in — the ASTs below are exactly what a real front-end would
//! have handed this crate.

use c2ir::ast::{BinOp, CastKind, Expr, ExprKind, Item, Param, Span, Stmt, StmtKind, TranslationUnit};
use c2ir::interner::Interner;
use c2ir::target::Target;
use c2ir::types::CType;

fn int_ty() -> CType {
    CType::Int { signed: true }
}

/// `int add(int a, int b) { return a + b; }`
fn add_function(interner: &mut Interner) -> Item {
    let name = interner.intern_str("add");
    let a = interner.intern_str("a");
    let b = interner.intern_str("b");

    let a_ref = Expr::decl_ref(a, int_ty(), Span::default());
    let b_ref = Expr::decl_ref(b, int_ty(), Span::default());
    let a_val = Expr::new(ExprKind::Cast(CastKind::LvalueToRvalue, Box::new(a_ref)), int_ty(), Span::default());
    let b_val = Expr::new(ExprKind::Cast(CastKind::LvalueToRvalue, Box::new(b_ref)), int_ty(), Span::default());
    let sum = Expr::new(ExprKind::Binary(BinOp::Add, Box::new(a_val), Box::new(b_val)), int_ty(), Span::default());

    let body = Stmt::new(StmtKind::Compound(vec![Stmt::new(StmtKind::Return(Some(sum)), Span::default())]), Span::default());

    Item::FunctionDef {
        name,
        params: vec![Param { name: a, ty: int_ty() }, Param { name: b, ty: int_ty() }],
        ret_type: int_ty(),
        body,
        implicit_return_zero: false,
        span: Span::default(),
    }
}

/// `int land(int a, int b) { return a && b; }`
fn land_function(interner: &mut Interner) -> Item {
    let name = interner.intern_str("land");
    let a = interner.intern_str("a");
    let b = interner.intern_str("b");

    let a_ref = Expr::decl_ref(a, int_ty(), Span::default());
    let b_ref = Expr::decl_ref(b, int_ty(), Span::default());
    let a_val = Expr::new(ExprKind::Cast(CastKind::LvalueToRvalue, Box::new(a_ref)), int_ty(), Span::default());
    let b_val = Expr::new(ExprKind::Cast(CastKind::LvalueToRvalue, Box::new(b_ref)), int_ty(), Span::default());
    let conj = Expr::new(ExprKind::Binary(BinOp::LogAnd, Box::new(a_val), Box::new(b_val)), int_ty(), Span::default());

    let body = Stmt::new(StmtKind::Compound(vec![Stmt::new(StmtKind::Return(Some(conj)), Span::default())]), Span::default());

    Item::FunctionDef {
        name,
        params: vec![Param { name: a, ty: int_ty() }, Param { name: b, ty: int_ty() }],
        ret_type: int_ty(),
        body,
        implicit_return_zero: false,
        span: Span::default(),
    }
}

fn main() {
    env_logger::init();

    let mut interner = Interner::new();
    let target = Target::host();

    let tu = TranslationUnit { items: vec![add_function(&mut interner), land_function(&mut interner)] };

    match c2ir::lower_translation_unit(&tu, &target, &mut interner) {
        Ok(module) => {
            for function in &module.functions {
                println!("{:#?}", function);
            }
        }
        Err(err) => {
            eprintln!("lowering failed: {err}");
            std::process::exit(1);
        }
    }
}
