//! Boolean-expression lowering (§4.3): turns a condition into branches
//! instead of a materialized 0/1 value, so `&&`/`||` keep their
//! short-circuit evaluation order for free.
//!
//! Every entry point here assumes the caller has already installed the
//! `(true_label, false_label)` pair a condition should branch to via
//! [`crate::builder::Builder::set_branch_context`]; `lower_bool` never
//! installs the *outer* context itself, only the nested ones `&&`/`||`
//! need for their short-circuited operand.

use crate::ast::{BinOp, CastKind, Expr, ExprKind, UnOp};
use crate::builder::BranchContext;
use crate::error::LowerResult;
use crate::expr;
use crate::lower::FunctionLowering;
use crate::types::CType;

/// Lower `expr` as a condition: branch to the current branch context's
/// `true_label` if it is nonzero/true, `false_label` otherwise.
pub fn lower_bool(fl: &mut FunctionLowering, expr: &Expr) -> LowerResult<()> {
    match &expr.kind {
        ExprKind::Binary(BinOp::LogAnd, lhs, rhs) => lower_and(fl, lhs, rhs),
        ExprKind::Binary(BinOp::LogOr, lhs, rhs) => lower_or(fl, lhs, rhs),
        ExprKind::Unary(UnOp::Not, inner) => lower_not(fl, inner),
        ExprKind::Paren(inner) => lower_bool(fl, inner),
        ExprKind::Binary(op, lhs, rhs) if op.is_comparison() => lower_comparison(fl, *op, lhs, rhs),
        ExprKind::Cast(CastKind::BoolToInt, inner) => {
            // The inner value is already i1; branching on it directly
            // skips a redundant zext-then-compare-against-zero.
            let cond = expr::lower_rvalue(fl, inner)?;
            fl.builder.add_branch(cond, fl.void_ty)?;
            Ok(())
        }
        _ => lower_fallback(fl, expr),
    }
}

/// `a && b`: evaluate `a`; if false, go straight to the outer false
/// label without evaluating `b` at all. Otherwise fall through to a
/// fresh intermediate label and evaluate `b` against the outer context.
///
/// When `a` already carries a pre-computed constant, no branch is emitted
/// for it at all: a constant-false short-circuits directly to the outer
/// false label, and a constant-true defers entirely to lowering `b`.
fn lower_and(fl: &mut FunctionLowering, lhs: &Expr, rhs: &Expr) -> LowerResult<()> {
    let outer = fl.builder.branch_context().expect("lower_bool called with no branch context");

    if let Some(value) = lhs.const_value {
        if value.is_zero() {
            fl.builder.add_jump(outer.false_label, fl.void_ty);
            return Ok(());
        }
        return lower_bool(fl, rhs);
    }

    let mid = fl.new_label("bool_and.true");

    let saved = fl.builder.set_branch_context(BranchContext { true_label: mid, false_label: outer.false_label });
    let result = lower_bool(fl, lhs);
    fl.builder.restore_branch_context(saved);
    result?;

    fl.bind(mid);

    let saved = fl.builder.set_branch_context(outer);
    let result = lower_bool(fl, rhs);
    fl.builder.restore_branch_context(saved);
    result
}

/// `a || b`: evaluate `a`; if true, go straight to the outer true label.
/// Otherwise fall through to a fresh intermediate label and evaluate `b`
/// against the outer context. Symmetric constant short-circuit as
/// [`lower_and`]: a constant-true `a` jumps straight to the outer true
/// label, a constant-false `a` defers entirely to lowering `b`.
fn lower_or(fl: &mut FunctionLowering, lhs: &Expr, rhs: &Expr) -> LowerResult<()> {
    let outer = fl.builder.branch_context().expect("lower_bool called with no branch context");

    if let Some(value) = lhs.const_value {
        if !value.is_zero() {
            fl.builder.add_jump(outer.true_label, fl.void_ty);
            return Ok(());
        }
        return lower_bool(fl, rhs);
    }

    let mid = fl.new_label("bool_or.false");

    let saved = fl.builder.set_branch_context(BranchContext { true_label: outer.true_label, false_label: mid });
    let result = lower_bool(fl, lhs);
    fl.builder.restore_branch_context(saved);
    result?;

    fl.bind(mid);

    let saved = fl.builder.set_branch_context(outer);
    let result = lower_bool(fl, rhs);
    fl.builder.restore_branch_context(saved);
    result
}

/// `!a`: swap the roles of true and false for the operand; no branch is
/// emitted for the `!` itself.
fn lower_not(fl: &mut FunctionLowering, inner: &Expr) -> LowerResult<()> {
    let outer = fl.builder.branch_context().expect("lower_bool called with no branch context");
    let swapped = BranchContext { true_label: outer.false_label, false_label: outer.true_label };
    let saved = fl.builder.set_branch_context(swapped);
    let result = lower_bool(fl, inner);
    fl.builder.restore_branch_context(saved);
    result
}

/// A comparison used directly as a condition: lower both operands, emit
/// the i1-typed compare, and branch on it — one branch, not the
/// compare-then-materialize-then-compare-again round trip a value-context
/// comparison would need.
fn lower_comparison(fl: &mut FunctionLowering, op: BinOp, lhs: &Expr, rhs: &Expr) -> LowerResult<()> {
    let cond = expr::lower_comparison_value(fl, op, lhs, rhs)?;
    fl.builder.add_branch(cond, fl.void_ty)?;
    Ok(())
}

/// Any other expression kind used as a condition: lower it as an
/// integer rvalue, compare against zero, then branch on the result.
fn lower_fallback(fl: &mut FunctionLowering, expr: &Expr) -> LowerResult<()> {
    let value = expr::lower_rvalue(fl, expr)?;
    let zero_ty = fl.builder.func.inst(value).ty;
    let zero = fl.builder.add_constant(crate::ast::ConstValue::Int(0), zero_ty);
    let cond = expr::emit_cmp(fl, crate::ir::Opcode::CmpNe, value, zero);
    fl.builder.add_branch(cond, fl.void_ty)?;
    Ok(())
}

/// Materialize a condition as an i1 value instead of branching control
/// flow out of the enclosing statement — used when `&&`/`||`/`!` appear
/// in ordinary value position (e.g. `return a && b;`) rather than
/// directly controlling an `if`/`while`/`for`. Still goes through the
/// same branch-context protocol internally so short-circuit evaluation
/// order is preserved; the branching is just local to this expression.
pub fn lower_bool_to_i1(fl: &mut FunctionLowering, expr: &Expr) -> LowerResult<crate::ir::IrRef> {
    let true_label = fl.new_label("bool.true");
    let false_label = fl.new_label("bool.end_false");
    let join_label = fl.new_label("bool.join");

    let ptr_ty = fl.lower_ctype(&CType::Pointer(Box::new(CType::Bool)))?;
    let slot = fl.builder.add_alloc(1, 1, ptr_ty);

    let saved = fl.builder.set_branch_context(BranchContext { true_label, false_label });
    let result = lower_bool(fl, expr);
    fl.builder.restore_branch_context(saved);
    result?;

    fl.bind(true_label);
    let one = fl.builder.add_constant(crate::ast::ConstValue::Int(1), fl.i1_ty);
    fl.builder.add_store(slot, one, fl.void_ty);
    fl.builder.add_jump(join_label, fl.void_ty);

    fl.bind(false_label);
    let zero = fl.builder.add_constant(crate::ast::ConstValue::Int(0), fl.i1_ty);
    fl.builder.add_store(slot, zero, fl.void_ty);
    fl.builder.add_jump(join_label, fl.void_ty);

    fl.bind(join_label);
    Ok(fl.builder.add_load(slot, fl.i1_ty))
}
