//! Statement Lowering (§4.4): dispatches on statement kind, threading the
//! builder's labels through loops, switches, and early exits.

use crate::ast::{ForInit, Stmt, StmtKind};
use crate::error::LowerResult;
use crate::expr;
use crate::ir::{Opcode, Payload, SwitchCase};
use crate::lower::FunctionLowering;

pub fn lower_stmt(fl: &mut FunctionLowering, stmt: &Stmt) -> LowerResult<()> {
    match &stmt.kind {
        StmtKind::Decl { name, ty, init } => lower_decl(fl, *name, ty, init.as_ref()),
        StmtKind::Labeled { stmt: inner, .. } => {
            // Named-label targets are resolved by the (out-of-scope) `goto`
            // collaborator this core does not implement; the label itself
            // still binds so the substatement lowers normally.
            let label = fl.new_label("user_label");
            fl.bind(label);
            lower_stmt(fl, inner)
        }
        StmtKind::Goto(_) => Err(crate::error::fatal_no_src("goto is not supported")),
        StmtKind::Compound(stmts) => lower_compound(fl, stmts),
        StmtKind::If { cond, then_branch, else_branch } => lower_if(fl, cond, then_branch, else_branch.as_deref()),
        StmtKind::While { cond, body } => lower_while(fl, cond, body),
        StmtKind::DoWhile { body, cond } => lower_do_while(fl, body, cond),
        StmtKind::For { init, cond, incr, body } => lower_for(fl, init.as_ref(), cond.as_ref(), incr.as_ref(), body),
        StmtKind::Switch { cond, body } => lower_switch(fl, cond, body),
        StmtKind::Case { value, stmt: inner } => lower_case(fl, value, inner),
        StmtKind::Default { stmt: inner } => lower_default(fl, inner),
        StmtKind::Continue => {
            let target = fl.continue_label.expect("continue outside a loop");
            fl.builder.add_jump(target, fl.void_ty);
            Ok(())
        }
        StmtKind::Break => {
            let target = fl.break_label.expect("break outside a loop or switch");
            fl.builder.add_jump(target, fl.void_ty);
            Ok(())
        }
        StmtKind::Return(value) => lower_return(fl, value.as_ref()),
        StmtKind::Expr(e) => {
            expr::lower_rvalue(fl, e)?;
            Ok(())
        }
        StmtKind::Declarative => Ok(()),
    }
}

fn lower_decl(fl: &mut FunctionLowering, name: crate::interner::Symbol, ty: &crate::types::CType, init: Option<&crate::ast::Expr>) -> LowerResult<()> {
    let ptr_ty = fl.lower_ctype(&crate::types::CType::Pointer(Box::new(ty.clone())))?;
    let size = ty.byte_size(fl.target);
    let align = ty.align(fl.target);
    let slot = fl.builder.add_alloc(size, align, ptr_ty);
    fl.symbols.declare(name, slot);

    if let Some(init_expr) = init {
        let value = expr::lower_rvalue(fl, init_expr)?;
        fl.builder.add_store(slot, value, fl.void_ty);
    }
    Ok(())
}

fn lower_compound(fl: &mut FunctionLowering, stmts: &[Stmt]) -> LowerResult<()> {
    let mark = fl.symbols.enter_scope();
    for s in stmts {
        lower_stmt(fl, s)?;
    }
    fl.symbols.exit_scope(mark);
    Ok(())
}

fn lower_if(fl: &mut FunctionLowering, cond: &crate::ast::Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> LowerResult<()> {
    let then_label = fl.new_label("if.then");
    let end_label = fl.new_label("if.end");

    if let Some(else_stmt) = else_branch {
        let else_label = fl.new_label("if.else");
        set_condition(fl, cond, then_label, else_label)?;

        fl.bind(then_label);
        lower_stmt(fl, then_branch)?;
        fl.builder.add_jump(end_label, fl.void_ty);

        fl.bind(else_label);
        lower_stmt(fl, else_stmt)?;
        fl.bind(end_label);
    } else {
        set_condition(fl, cond, then_label, end_label)?;
        fl.bind(then_label);
        lower_stmt(fl, then_branch)?;
        fl.bind(end_label);
    }
    Ok(())
}

fn lower_while(fl: &mut FunctionLowering, cond: &crate::ast::Expr, body: &Stmt) -> LowerResult<()> {
    let cond_label = fl.new_label("while.cond");
    let then_label = fl.new_label("while.then");
    let end_label = fl.new_label("while.end");

    fl.bind(cond_label);
    set_condition(fl, cond, then_label, end_label)?;

    fl.bind(then_label);
    let mark = fl.enter_loop(cond_label, end_label);
    let result = lower_stmt(fl, body);
    fl.exit_loop(mark);
    result?;

    fl.builder.add_jump(cond_label, fl.void_ty);
    fl.bind(end_label);
    Ok(())
}

fn lower_do_while(fl: &mut FunctionLowering, body: &Stmt, cond: &crate::ast::Expr) -> LowerResult<()> {
    let then_label = fl.new_label("do.then");
    let cond_label = fl.new_label("do.cond");
    let end_label = fl.new_label("do.end");

    fl.bind(then_label);
    let mark = fl.enter_loop(cond_label, end_label);
    let result = lower_stmt(fl, body);
    fl.exit_loop(mark);
    result?;

    fl.bind(cond_label);
    set_condition(fl, cond, then_label, end_label)?;
    fl.bind(end_label);
    Ok(())
}

fn lower_for(
    fl: &mut FunctionLowering,
    init: Option<&ForInit>,
    cond: Option<&crate::ast::Expr>,
    incr: Option<&crate::ast::Expr>,
    body: &Stmt,
) -> LowerResult<()> {
    let mark = match init {
        Some(ForInit::Expr(e)) => {
            expr::lower_rvalue(fl, e)?;
            None
        }
        Some(ForInit::Decls(decls)) => {
            let scope_mark = fl.symbols.enter_scope();
            for (name, ty, init_expr) in decls {
                lower_decl(fl, *name, ty, init_expr.as_ref())?;
            }
            Some(scope_mark)
        }
        None => None,
    };

    let cond_label = fl.new_label("for.cond");
    let then_label = fl.new_label("for.then");
    let cont_label = fl.new_label("for.cont");
    let end_label = fl.new_label("for.end");

    fl.bind(cond_label);
    match cond {
        Some(c) => set_condition(fl, c, then_label, end_label)?,
        None => {
            fl.builder.add_jump(then_label, fl.void_ty);
        }
    }

    fl.bind(then_label);
    let loop_mark = fl.enter_loop(cont_label, end_label);
    let result = lower_stmt(fl, body);
    fl.exit_loop(loop_mark);
    result?;

    fl.bind(cont_label);
    if let Some(incr_expr) = incr {
        expr::lower_rvalue(fl, incr_expr)?;
    }
    fl.builder.add_jump(cond_label, fl.void_ty);

    fl.bind(end_label);
    if let Some(scope_mark) = mark {
        fl.symbols.exit_scope(scope_mark);
    }
    Ok(())
}

fn lower_switch(fl: &mut FunctionLowering, cond: &crate::ast::Expr, body: &Stmt) -> LowerResult<()> {
    let scrutinee = expr::lower_rvalue(fl, cond)?;
    let switch_ref = fl.builder.reserve_switch(scrutinee, fl.void_ty);
    let end_label = fl.new_label("switch.end");

    let saved = fl.enter_switch(end_label);
    let result = lower_stmt(fl, body);
    let collected = fl.exit_switch(saved);
    result?;

    fl.bind(end_label);

    let default = collected.default.unwrap_or(end_label);
    fl.builder.patch_switch(switch_ref, collected.cases, default);
    Ok(())
}

fn lower_case(fl: &mut FunctionLowering, value: &crate::ast::Expr, inner: &Stmt) -> LowerResult<()> {
    let const_value = value.const_value.expect("case label without a pre-computed constant value");
    let label = fl.new_label("switch.case");
    fl.bind(label);

    let switch_ctx = fl.switch_context.as_mut().expect("case statement outside a switch");
    switch_ctx.cases.push(SwitchCase { value: const_value.as_i128(), target: label });

    lower_stmt(fl, inner)
}

fn lower_default(fl: &mut FunctionLowering, inner: &Stmt) -> LowerResult<()> {
    let label = fl.new_label("switch.default");
    fl.bind(label);

    let switch_ctx = fl.switch_context.as_mut().expect("default statement outside a switch");
    switch_ctx.default = Some(label);

    lower_stmt(fl, inner)
}

fn lower_return(fl: &mut FunctionLowering, value: Option<&crate::ast::Expr>) -> LowerResult<()> {
    if let Some(e) = value {
        let v = expr::lower_rvalue(fl, e)?;
        fl.builder.add_inst(Opcode::RetValue, Payload::Ret { value: Some(v) }, fl.void_ty);
    } else {
        fl.builder.add_inst(Opcode::Ret, Payload::Ret { value: None }, fl.void_ty);
    }
    fl.builder.add_jump(fl.return_label, fl.void_ty);
    Ok(())
}

/// Install a branch context around `lower_bool`, restoring whatever was
/// there before on every exit path (§5, §9).
fn set_condition(fl: &mut FunctionLowering, cond: &crate::ast::Expr, true_label: crate::ir::IrRef, false_label: crate::ir::IrRef) -> LowerResult<()> {
    let saved = fl.builder.set_branch_context(crate::builder::BranchContext { true_label, false_label });
    let result = crate::branch::lower_bool(fl, cond);
    fl.builder.restore_branch_context(saved);
    result
}
