//! AST-to-IR lowering core for a C compiler front-end.
//!
//! Consumes a typed, already-analyzed AST (§3a — this crate's own
//! minimal stand-in for the external lexer/parser/semantic analyzer)
//! and emits a linear, label-and-jump IR (§3) suitable for a downstream
//! optimizer and code generator this crate does not implement.
//!
//! [`driver::lower_translation_unit`] is the entry point; everything
//! else is an internal component reachable through it. The pipeline,
//! leaves first: [`types`] → [`builder`] → [`symbols`] → [`branch`] →
//! [`expr`] / [`stmt`] → [`driver`].

pub mod ast;
pub mod branch;
pub mod builder;
pub mod driver;
pub mod error;
pub mod expr;
pub mod interner;
pub mod ir;
pub mod lower;
pub mod stmt;
pub mod symbols;
pub mod target;
pub mod types;

pub use driver::{lower_translation_unit, GlobalIr, ModuleIr};
pub use error::{LowerError, LowerResult};
pub use target::Target;
