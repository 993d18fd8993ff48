//! Top-Level Driver (§4.7): walks a translation unit's items, lowering
//! each function definition into a finished [`FunctionIr`] and skipping
//! prototypes and other purely declarative nodes.

use log::{debug, trace};

use crate::ast::{ConstValue, Item, TranslationUnit};
use crate::error::LowerResult;
use crate::interner::{Interner, IrTypeRef, Symbol};
use crate::ir::{FunctionIr, Opcode, Payload};
use crate::lower::FunctionLowering;
use crate::stmt;
use crate::target::Target;
use crate::types::CType;

/// A file-scope variable's IR-level description: a lowered type and, if
/// the semantic analyzer folded one, its initial value. Final data
/// section emission belongs to the out-of-scope downstream emitter
/// (§4.7); this is as far as this core's contract goes.
#[derive(Debug, Clone)]
pub struct GlobalIr {
    pub name: Symbol,
    pub ty: IrTypeRef,
    pub init: Option<ConstValue>,
}

/// The IR produced for one translation unit: one [`FunctionIr`] per
/// function definition, plus one [`GlobalIr`] per file-scope variable,
/// both in source order.
#[derive(Debug, Default)]
pub struct ModuleIr {
    pub functions: Vec<FunctionIr>,
    pub globals: Vec<GlobalIr>,
}

pub fn lower_translation_unit(tu: &TranslationUnit, target: &Target, interner: &mut Interner) -> LowerResult<ModuleIr> {
    let mut module = ModuleIr::default();
    for item in &tu.items {
        match item {
            Item::FunctionDef { name, params, ret_type, body, implicit_return_zero, .. } => {
                trace!("lowering function definition");
                let func = lower_function(*name, params, ret_type, body, *implicit_return_zero, target, interner)?;
                module.functions.push(func);
            }
            Item::FunctionProto { .. } => {
                debug!("skipping function prototype, no emission");
            }
            Item::GlobalVar { name, ty, init } => {
                trace!("lowering global variable declaration");
                let global = lower_global(*name, ty, init.as_ref(), target, interner)?;
                module.globals.push(global);
            }
            Item::Declarative => {
                debug!("skipping purely declarative item");
            }
        }
    }
    Ok(module)
}

fn lower_function(
    name: crate::interner::Symbol,
    params: &[crate::ast::Param],
    ret_type: &CType,
    body: &crate::ast::Stmt,
    implicit_return_zero: bool,
    target: &Target,
    interner: &mut Interner,
) -> LowerResult<FunctionIr> {
    let mut fl = FunctionLowering::new(name, ret_type, interner, target);

    for (index, param) in params.iter().enumerate() {
        let param_ty = fl.lower_ctype(&param.ty)?;
        fl.builder.func.params.push(param_ty);
        let arg_ref = fl.builder.add_arg(index as u32, param_ty);

        let ptr_ty = fl.lower_ctype(&CType::Pointer(Box::new(param.ty.clone())))?;
        let slot = fl.builder.add_alloc(param.ty.byte_size(fl.target), param.ty.align(fl.target), ptr_ty);
        fl.builder.add_store(slot, arg_ref, fl.void_ty);
        fl.symbols.declare(param.name, slot);
    }

    stmt::lower_stmt(&mut fl, body)?;

    if implicit_return_zero {
        let zero = fl.builder.add_constant(ConstValue::Int(0), fl.return_type);
        fl.builder.add_inst(Opcode::RetValue, Payload::Ret { value: Some(zero) }, fl.void_ty);
        fl.builder.add_jump(fl.return_label, fl.void_ty);
    }

    fl.bind(fl.return_label);
    fl.builder.add_inst(Opcode::Ret, Payload::Ret { value: None }, fl.void_ty);

    Ok(fl.builder.func)
}

fn lower_global(
    name: Symbol,
    ty: &CType,
    init: Option<&crate::ast::Expr>,
    target: &Target,
    interner: &mut Interner,
) -> LowerResult<GlobalIr> {
    let ir_ty = crate::types::lower_type(ty, target, interner)?;
    let init = init.and_then(|e| e.const_value);
    Ok(GlobalIr { name, ty: ir_ty, init })
}
