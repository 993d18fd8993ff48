//! End-to-end lowering scenarios: one test per concrete C fragment
//! described alongside the global invariants.

mod common;

use c2ir::ast::BinOp;
use c2ir::ir::Opcode;
use c2ir::interner::Interner;

use common::*;

fn terminal_shape_is_label_then_ret(f: &c2ir::ir::FunctionIr) {
    let len = f.body.len();
    assert!(len >= 2, "function body is too short to hold a return label and a terminator");
    assert_eq!(f.inst(f.body[len - 2]).op, Opcode::Label, "entry before the terminator must be the return label");
    let terminator = f.inst(f.body[len - 1]).op;
    assert!(matches!(terminator, Opcode::Ret | Opcode::RetValue), "body must end in ret or ret_value");
}

#[test]
fn scenario_id_returns_its_parameter() {
    let mut interner = Interner::new();
    let x = interner.intern_str("x");
    let item = function("id", &mut interner, vec![("x", int_ty())], compound(vec![ret(load(x))]));
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::RetValue).count(), 1);
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Load).count(), 1);
    terminal_shape_is_label_then_ret(f);
}

#[test]
fn scenario_add_sums_two_parameters() {
    let mut interner = Interner::new();
    let a = interner.intern_str("a");
    let b = interner.intern_str("b");
    let item = function("add", &mut interner, vec![("a", int_ty()), ("b", int_ty())], compound(vec![ret(bin(BinOp::Add, load(a), load(b)))]));
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Store).count(), 2, "one store per parameter prologue");
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Load).count(), 2);
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Add).count(), 1);
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::RetValue).count(), 1);
    terminal_shape_is_label_then_ret(f);
}

#[test]
fn scenario_pick_branches_to_either_return() {
    let mut interner = Interner::new();
    let c = interner.intern_str("c");
    let item = function(
        "pick",
        &mut interner,
        vec![("c", int_ty())],
        compound(vec![if_stmt(load(c), ret(int_lit(1)), None), ret(int_lit(0))]),
    );
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Branch).count(), 1);
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::RetValue).count(), 2);
    terminal_shape_is_label_then_ret(f);
    assert_every_jump_and_branch_target_is_bound(f);
}

#[test]
fn scenario_sum_loops_with_a_continuation_label() {
    let mut interner = Interner::new();
    let n = interner.intern_str("n");
    let s = interner.intern_str("s");
    let i = interner.intern_str("i");

    let loop_body = expr_stmt(compound_assign(BinOp::Add, addr(s), load(i)));
    let for_loop = for_stmt(
        Some(c2ir::ast::ForInit::Decls(vec![(i, int_ty(), Some(int_lit(0)))])),
        Some(bin(BinOp::Lt, load(i), load(n))),
        Some(unary(c2ir::ast::UnOp::PostInc, addr(i))),
        loop_body,
    );

    let item = function(
        "sum",
        &mut interner,
        vec![("n", int_ty())],
        compound(vec![decl(s, Some(int_lit(0))), for_loop, ret(load(s))]),
    );
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    // s and i each get an alloc, plus one alloc for the n parameter.
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Alloc).count(), 3);
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Jump).count() >= 1, true);
    assert_every_jump_and_branch_target_is_bound(f);
    terminal_shape_is_label_then_ret(f);
}

#[test]
fn scenario_switch_dispatches_case_and_default() {
    let mut interner = Interner::new();
    let x = interner.intern_str("x");
    let body = compound(vec![case_stmt(1, ret(int_lit(10))), default_stmt(ret(int_lit(20)))]);
    let item = function("sw", &mut interner, vec![("x", int_ty())], compound(vec![switch_stmt(load(x), body)]));
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    let switches: Vec<_> = f.buffer.values().filter(|i| i.op == Opcode::Switch).collect();
    assert_eq!(switches.len(), 1);
    match &switches[0].payload {
        c2ir::ir::Payload::Switch { cases, default, .. } => {
            assert_eq!(cases.len(), 1);
            assert_eq!(cases[0].value, 1);
            assert!(f.is_bound(*default));
        }
        other => panic!("expected a switch payload, got {other:?}"),
    }
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::RetValue).count(), 2);
}

#[test]
fn scenario_land_short_circuits_with_one_branch_per_operand() {
    let mut interner = Interner::new();
    let a = interner.intern_str("a");
    let b = interner.intern_str("b");
    let item = function(
        "land",
        &mut interner,
        vec![("a", int_ty()), ("b", int_ty())],
        compound(vec![ret(bin(BinOp::LogAnd, load(a), load(b)))]),
    );
    let module = run(&mut interner, vec![item]);
    let f = &module.functions[0];

    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Branch).count(), 2, "one branch per operand");
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::CmpNe).count(), 2, "one compare-not-equal per operand");
    assert_eq!(f.buffer.values().filter(|i| i.op == Opcode::Zext).count(), 1, "final value is the zext of the joined i1");
}

fn assert_every_jump_and_branch_target_is_bound(f: &c2ir::ir::FunctionIr) {
    for inst in f.buffer.values() {
        match &inst.payload {
            c2ir::ir::Payload::Jump { target } => assert!(f.is_bound(*target)),
            c2ir::ir::Payload::Branch { true_label, false_label, .. } => {
                assert!(f.is_bound(*true_label));
                assert!(f.is_bound(*false_label));
            }
            _ => {}
        }
    }
}
