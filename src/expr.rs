//! Expression Lowering (§4.5): maps every expression node to a (possibly
//! empty) sequence of emitted instructions plus a single result
//! reference. Rvalue and lvalue lowering are distinct entry points —
//! an lvalue is always an address, never the value stored there.

use crate::ast::{BinOp, CastKind, ConstValue, Expr, ExprKind, UnOp};
use crate::branch;
use crate::error::LowerResult;
use crate::interner::Symbol;
use crate::ir::{IrRef, Opcode, Payload};
use crate::lower::FunctionLowering;
use crate::types::CType;

/// Lower `expr` for its value.
pub fn lower_rvalue(fl: &mut FunctionLowering, expr: &Expr) -> LowerResult<IrRef> {
    if let Some(value) = expr.const_value {
        if !matches!(expr.kind, ExprKind::StringLiteral(_)) {
            let ty = fl.lower_ctype(&expr.ty)?;
            return Ok(fl.builder.add_constant(value, ty));
        }
    }

    match &expr.kind {
        ExprKind::Literal => unreachable!("literal reached rvalue lowering without a const_value"),
        ExprKind::StringLiteral(_) => {
            unreachable!("string literal reached rvalue lowering directly; expected an array-to-pointer cast")
        }
        ExprKind::DeclRef(_) => {
            let ty = fl.lower_ctype(&expr.ty)?;
            let addr = lower_lvalue(fl, expr)?;
            Ok(fl.builder.add_load(addr, ty))
        }
        ExprKind::Paren(inner) => lower_rvalue(fl, inner),
        ExprKind::Unary(op, inner) => lower_unary(fl, *op, inner, expr),
        ExprKind::Binary(BinOp::LogAnd, ..) | ExprKind::Binary(BinOp::LogOr, ..) => {
            let i1 = branch::lower_bool_to_i1(fl, expr)?;
            let ty = fl.lower_ctype(&expr.ty)?;
            Ok(fl.builder.add_inst(Opcode::Zext, Payload::Unary(i1), ty))
        }
        ExprKind::Binary(op, lhs, rhs) if op.is_comparison() => {
            let i1 = lower_comparison_value(fl, *op, lhs, rhs)?;
            let ty = fl.lower_ctype(&expr.ty)?;
            Ok(fl.builder.add_inst(Opcode::Zext, Payload::Unary(i1), ty))
        }
        ExprKind::Binary(op, lhs, rhs) => lower_binary_arith(fl, *op, lhs, rhs, expr),
        ExprKind::Assign(lhs, rhs) => {
            let rhs_val = lower_rvalue(fl, rhs)?;
            let addr = lower_lvalue(fl, lhs)?;
            fl.builder.add_store(addr, rhs_val, fl.void_ty);
            Ok(rhs_val)
        }
        ExprKind::CompoundAssign(op, lhs, rhs) => lower_compound_assign(fl, *op, lhs, rhs, expr),
        ExprKind::Comma(lhs, rhs) => {
            lower_rvalue(fl, lhs)?;
            lower_rvalue(fl, rhs)
        }
        ExprKind::Cast(kind, inner) => lower_cast(fl, *kind, inner, expr),
        ExprKind::Call { callee, args } => lower_call(fl, callee, args, expr),
        ExprKind::Conditional { cond, then, else_branch } => lower_conditional(fl, cond, then, else_branch, expr),
        ExprKind::CondDummyExpr => {
            Ok(fl.cond_dummy_ref.expect("cond_dummy_expr reached outside a GNU conditional's then-arm"))
        }
        ExprKind::Unsupported(what) => Err(crate::error::fatal_no_src(format!("{what} is not supported here"))),
    }
}

/// Lower `expr` for its address. Only nodes that actually denote storage
/// reach here; anything else is a fatal, not a panic, since a malformed
/// cast chain from a caller could plausibly route here (§7).
pub fn lower_lvalue(fl: &mut FunctionLowering, expr: &Expr) -> LowerResult<IrRef> {
    match &expr.kind {
        ExprKind::StringLiteral(bytes) => {
            let name = fl.interner.fresh_anon_string_name(bytes);
            let ptr_ty = fl.lower_ctype(&CType::Pointer(Box::new(CType::Char { signed: true })))?;
            Ok(fl.builder.add_symbol(name, ptr_ty))
        }
        ExprKind::DeclRef(name) => {
            if let Some(addr) = fl.symbols.lookup(*name) {
                Ok(addr)
            } else {
                let ptr_ty = fl.lower_ctype(&CType::Pointer(Box::new(expr.ty.clone())))?;
                Ok(fl.builder.add_symbol(*name, ptr_ty))
            }
        }
        ExprKind::Paren(inner) => lower_lvalue(fl, inner),
        ExprKind::Unary(UnOp::Deref, inner) => lower_rvalue(fl, inner),
        _ => Err(crate::error::fatal_no_src("expression does not denote an lvalue")),
    }
}

fn lower_unary(fl: &mut FunctionLowering, op: UnOp, inner: &Expr, node: &Expr) -> LowerResult<IrRef> {
    match op {
        UnOp::Plus => lower_rvalue(fl, inner),
        UnOp::Neg => {
            let v = lower_rvalue(fl, inner)?;
            let ty = fl.lower_ctype(&node.ty)?;
            let zero = fl.builder.add_constant(ConstValue::Int(0), ty);
            Ok(fl.builder.add_inst(Opcode::Sub, Payload::Binary(zero, v), ty))
        }
        UnOp::BitNot => {
            let v = lower_rvalue(fl, inner)?;
            let ty = fl.lower_ctype(&node.ty)?;
            Ok(fl.builder.add_inst(Opcode::BitNot, Payload::Unary(v), ty))
        }
        UnOp::Not => {
            let v = lower_rvalue(fl, inner)?;
            let inner_ty = fl.lower_ctype(&inner.ty)?;
            let zero = fl.builder.add_constant(ConstValue::Int(0), inner_ty);
            let cmp = emit_cmp(fl, Opcode::CmpNe, v, zero);
            let ty = fl.lower_ctype(&node.ty)?;
            Ok(fl.builder.add_inst(Opcode::Zext, Payload::Unary(cmp), ty))
        }
        UnOp::AddrOf => lower_lvalue(fl, inner),
        UnOp::Deref => {
            if matches!(inner.kind, ExprKind::Cast(CastKind::FunctionToPointer, _)) {
                return lower_rvalue(fl, inner);
            }
            let addr = lower_lvalue(fl, inner)?;
            let ty = fl.lower_ctype(&node.ty)?;
            Ok(fl.builder.add_load(addr, ty))
        }
        UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => lower_incdec(fl, op, inner, node),
    }
}

fn lower_incdec(fl: &mut FunctionLowering, op: UnOp, inner: &Expr, node: &Expr) -> LowerResult<IrRef> {
    let addr = lower_lvalue(fl, inner)?;
    let ty = fl.lower_ctype(&node.ty)?;
    let original = fl.builder.add_load(addr, ty);
    let one = fl.builder.add_constant(ConstValue::Int(1), ty);
    let op_code = if matches!(op, UnOp::PreInc | UnOp::PostInc) { Opcode::Add } else { Opcode::Sub };
    let updated = fl.builder.add_inst(op_code, Payload::Binary(original, one), ty);
    fl.builder.add_store(addr, updated, fl.void_ty);
    Ok(if matches!(op, UnOp::PreInc | UnOp::PreDec) { updated } else { original })
}

fn lower_binary_arith(fl: &mut FunctionLowering, op: BinOp, lhs: &Expr, rhs: &Expr, node: &Expr) -> LowerResult<IrRef> {
    if matches!(op, BinOp::Add | BinOp::Sub) {
        if let Some(result) = lower_pointer_arith(fl, op, lhs, rhs, node)? {
            return Ok(result);
        }
    }
    let l = lower_rvalue(fl, lhs)?;
    let r = lower_rvalue(fl, rhs)?;
    let ty = fl.lower_ctype(&node.ty)?;
    Ok(fl.builder.add_inst(to_opcode(op), Payload::Binary(l, r), ty))
}

/// `ptr + n`, `n + ptr`, or `ptr - n`: scale the integer operand by the
/// pointee's element size unless it is byte-sized (§4.5). Returns `None`
/// when neither operand is a pointer, so the caller falls back to plain
/// arithmetic.
fn lower_pointer_arith(
    fl: &mut FunctionLowering,
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    node: &Expr,
) -> LowerResult<Option<IrRef>> {
    let (ptr_expr, offset_expr) = match op {
        BinOp::Add if lhs.ty.is_pointer() => (lhs, rhs),
        BinOp::Add if rhs.ty.is_pointer() => (rhs, lhs),
        BinOp::Sub if lhs.ty.is_pointer() => (lhs, rhs),
        _ => return Ok(None),
    };

    let elem = ptr_expr.ty.element_type().expect("pointer arithmetic operand must have an element type");
    let elem_size = elem.byte_size(fl.target);

    let ptr_val = lower_rvalue(fl, ptr_expr)?;
    let offset_val = lower_rvalue(fl, offset_expr)?;
    let ptr_ty = fl.lower_ctype(&node.ty)?;
    let offset_ty = fl.lower_ctype(&offset_expr.ty)?;

    let scaled = if elem_size <= 1 {
        offset_val
    } else {
        let size_const = fl.builder.add_constant(ConstValue::Int(elem_size as i128), offset_ty);
        fl.builder.add_inst(Opcode::Mul, Payload::Binary(offset_val, size_const), offset_ty)
    };

    let combine = if op == BinOp::Sub { Opcode::Sub } else { Opcode::Add };
    Ok(Some(fl.builder.add_inst(combine, Payload::Binary(ptr_val, scaled), ptr_ty)))
}

fn lower_compound_assign(fl: &mut FunctionLowering, op: BinOp, lhs: &Expr, rhs: &Expr, node: &Expr) -> LowerResult<IrRef> {
    let rhs_val = lower_rvalue(fl, rhs)?;
    let addr = lower_lvalue(fl, lhs)?;
    let lhs_ty = fl.lower_ctype(&lhs.ty)?;
    let loaded = fl.builder.add_load(addr, lhs_ty);
    let ty = fl.lower_ctype(&node.ty)?;
    let result = fl.builder.add_inst(to_opcode(op), Payload::Binary(loaded, rhs_val), ty);
    fl.builder.add_store(addr, result, fl.void_ty);
    Ok(result)
}

fn lower_cast(fl: &mut FunctionLowering, kind: CastKind, inner: &Expr, node: &Expr) -> LowerResult<IrRef> {
    match kind {
        CastKind::NoOp => lower_rvalue(fl, inner),
        CastKind::LvalueToRvalue => {
            let addr = lower_lvalue(fl, inner)?;
            let ty = fl.lower_ctype(&node.ty)?;
            Ok(fl.builder.add_load(addr, ty))
        }
        CastKind::FunctionToPointer | CastKind::ArrayToPointer => lower_lvalue(fl, inner),
        CastKind::IntCast => lower_int_cast(fl, inner, node),
        CastKind::BoolToInt => {
            let v = lower_rvalue(fl, inner)?;
            let ty = fl.lower_ctype(&node.ty)?;
            Ok(fl.builder.add_inst(Opcode::Zext, Payload::Unary(v), ty))
        }
        CastKind::ToBool => {
            let v = lower_rvalue(fl, inner)?;
            let inner_ty = fl.lower_ctype(&inner.ty)?;
            let zero = fl.builder.add_constant(ConstValue::Int(0), inner_ty);
            Ok(emit_cmp(fl, Opcode::CmpNe, v, zero))
        }
    }
}

fn lower_int_cast(fl: &mut FunctionLowering, inner: &Expr, node: &Expr) -> LowerResult<IrRef> {
    let v = lower_rvalue(fl, inner)?;
    let inner_ty = fl.lower_ctype(&inner.ty)?;
    let target_ty = fl.lower_ctype(&node.ty)?;
    let inner_width = fl.interner.resolve_type(inner_ty).bit_width().unwrap_or(0);
    let target_width = fl.interner.resolve_type(target_ty).bit_width().unwrap_or(0);

    if inner_width == target_width {
        return Ok(v);
    }
    if target_width > inner_width {
        let op = if inner.ty.is_signed() { Opcode::Sext } else { Opcode::Zext };
        Ok(fl.builder.add_inst(op, Payload::Unary(v), target_ty))
    } else {
        Ok(fl.builder.add_inst(Opcode::Trunc, Payload::Unary(v), target_ty))
    }
}

fn lower_conditional(fl: &mut FunctionLowering, cond: &Expr, then: &Expr, else_branch: &Expr, node: &Expr) -> LowerResult<IrRef> {
    let cond_val = lower_rvalue(fl, cond)?;

    let saved_dummy = fl.cond_dummy_ref.replace(cond_val);
    let then_result = lower_rvalue(fl, then);
    fl.cond_dummy_ref = saved_dummy;
    let then_val = then_result?;

    let else_val = lower_rvalue(fl, else_branch)?;
    let ty = fl.lower_ctype(&node.ty)?;
    Ok(fl.builder.add_inst(Opcode::Select, Payload::Select { cond: cond_val, if_true: then_val, if_false: else_val }, ty))
}

fn lower_call(fl: &mut FunctionLowering, callee: &Expr, args: &[Expr], node: &Expr) -> LowerResult<IrRef> {
    let ret_ty = fl.lower_ctype(&node.ty)?;

    let (callee_ref, direct) = match resolve_direct_callee(fl, callee) {
        Some(name) => {
            let func_ty = fl.lower_ctype(&callee.ty)?;
            (fl.builder.add_symbol(name, func_ty), true)
        }
        None => (lower_rvalue(fl, callee)?, false),
    };

    let mut arg_vals = Vec::with_capacity(args.len());
    for arg in args {
        arg_vals.push(lower_rvalue(fl, arg)?);
    }

    Ok(fl.builder.add_inst(Opcode::Call, Payload::Call { callee: callee_ref, args: arg_vals, direct }, ret_ty))
}

/// Descend through parens, address-of, dereference, and casts looking
/// for a plain reference to a non-local name, so a direct call can emit
/// a `symbol` callee instead of loading a function pointer (§4.5, §8).
fn resolve_direct_callee(fl: &FunctionLowering, expr: &Expr) -> Option<Symbol> {
    match &expr.kind {
        ExprKind::DeclRef(name) if fl.symbols.lookup(*name).is_none() => Some(*name),
        ExprKind::Paren(inner) => resolve_direct_callee(fl, inner),
        ExprKind::Unary(UnOp::AddrOf, inner) | ExprKind::Unary(UnOp::Deref, inner) => resolve_direct_callee(fl, inner),
        ExprKind::Cast(_, inner) => resolve_direct_callee(fl, inner),
        _ => None,
    }
}

/// Lower both operands and emit a comparison, leaving the result as a
/// bare i1 for the caller to branch on or `zext` (§4.3, §4.5).
pub(crate) fn lower_comparison_value(fl: &mut FunctionLowering, op: BinOp, lhs: &Expr, rhs: &Expr) -> LowerResult<IrRef> {
    let l = lower_rvalue(fl, lhs)?;
    let r = lower_rvalue(fl, rhs)?;
    Ok(emit_cmp(fl, cmp_opcode(op), l, r))
}

pub(crate) fn emit_cmp(fl: &mut FunctionLowering, op: Opcode, lhs: IrRef, rhs: IrRef) -> IrRef {
    fl.builder.add_inst(op, Payload::Binary(lhs, rhs), fl.i1_ty)
}

fn cmp_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Eq => Opcode::CmpEq,
        BinOp::Ne => Opcode::CmpNe,
        BinOp::Lt => Opcode::CmpLt,
        BinOp::Le => Opcode::CmpLe,
        BinOp::Gt => Opcode::CmpGt,
        BinOp::Ge => Opcode::CmpGe,
        _ => unreachable!("cmp_opcode called with a non-comparison operator"),
    }
}

fn to_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::Add,
        BinOp::Sub => Opcode::Sub,
        BinOp::Mul => Opcode::Mul,
        BinOp::Div => Opcode::Div,
        BinOp::Mod => Opcode::Mod,
        BinOp::BitAnd => Opcode::BitAnd,
        BinOp::BitOr => Opcode::BitOr,
        BinOp::BitXor => Opcode::BitXor,
        BinOp::Shl => Opcode::Shl,
        BinOp::Shr => Opcode::Shr,
        BinOp::LogAnd | BinOp::LogOr => unreachable!("logical operators go through the branch-context protocol"),
        _ => unreachable!("comparison operator reached arithmetic lowering"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::interner::Interner;
    use crate::target::Target;

    fn fixture(interner: &mut Interner, target: &Target) -> FunctionLowering<'_> {
        let name = interner.intern_str("f");
        FunctionLowering::new(name, &CType::Int { signed: true }, interner, target)
    }

    #[test]
    fn parenthesized_expression_lowers_identically_to_its_inner() {
        let target = Target::default();

        let mut interner = Interner::new();
        let mut fl = fixture(&mut interner, &target);
        let inner = Expr::int_lit(7, CType::Int { signed: true }, Span::default());
        let direct = lower_rvalue(&mut fl, &inner.clone()).unwrap();
        assert_eq!(fl.builder.func.inst(direct).op, Opcode::Constant);

        let mut interner2 = Interner::new();
        let mut fl2 = fixture(&mut interner2, &target);
        let wrapped = Expr::new(ExprKind::Paren(Box::new(inner)), CType::Int { signed: true }, Span::default());
        let via_paren = lower_rvalue(&mut fl2, &wrapped).unwrap();
        assert_eq!(fl2.builder.func.inst(via_paren).op, Opcode::Constant);
    }

    #[test]
    fn unary_plus_is_transparent() {
        let mut interner = Interner::new();
        let target = Target::default();
        let mut fl = fixture(&mut interner, &target);

        let inner = Expr::int_lit(3, CType::Int { signed: true }, Span::default());
        let plus = Expr::new(ExprKind::Unary(UnOp::Plus, Box::new(inner)), CType::Int { signed: true }, Span::default());
        let r = lower_rvalue(&mut fl, &plus).unwrap();

        assert_eq!(fl.builder.func.inst(r).op, Opcode::Constant);
        assert_eq!(fl.builder.func.buffer.len(), 1);
    }

    #[test]
    fn double_negation_emits_exactly_two_not_equal_comparisons() {
        let mut interner = Interner::new();
        let target = Target::default();
        let mut fl = fixture(&mut interner, &target);

        let x = fl.interner.intern_str("x");
        let decl = Expr::decl_ref(x, CType::Int { signed: true }, Span::default());
        let ptr_ty = fl.lower_ctype(&CType::Pointer(Box::new(CType::Int { signed: true }))).unwrap();
        let slot = fl.builder.add_alloc(4, 4, ptr_ty);
        fl.symbols.declare(x, slot);

        let not_once = Expr::new(ExprKind::Unary(UnOp::Not, Box::new(decl)), CType::Int { signed: true }, Span::default());
        let not_twice = Expr::new(ExprKind::Unary(UnOp::Not, Box::new(not_once)), CType::Int { signed: true }, Span::default());

        lower_rvalue(&mut fl, &not_twice).unwrap();

        let cmp_ne_count = fl.builder.func.buffer.values().filter(|inst| inst.op == Opcode::CmpNe).count();
        assert_eq!(cmp_ne_count, 2);
    }

    #[test]
    fn direct_call_to_a_free_function_emits_a_symbol_not_a_pointer_load() {
        let mut interner = Interner::new();
        let target = Target::default();
        let mut fl = fixture(&mut interner, &target);

        let callee_name = fl.interner.intern_str("helper");
        let func_ty = CType::Function { params: vec![], variadic: false, ret: Box::new(CType::Int { signed: true }) };
        let callee = Expr::decl_ref(callee_name, func_ty, Span::default());
        let call = Expr::new(ExprKind::Call { callee: Box::new(callee), args: vec![] }, CType::Int { signed: true }, Span::default());

        let r = lower_rvalue(&mut fl, &call).unwrap();
        match &fl.builder.func.inst(r).payload {
            Payload::Call { callee, direct, .. } => {
                assert!(*direct);
                assert_eq!(fl.builder.func.inst(*callee).op, Opcode::Symbol);
            }
            other => panic!("expected a call payload, got {other:?}"),
        }
    }
}
