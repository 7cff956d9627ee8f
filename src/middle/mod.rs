//! The AST is lowered to IR here and optimized before code generation.

pub mod ir;
pub mod optimization;
