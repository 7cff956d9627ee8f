//! Compiler backend for the Boa language. An AST from the front end is
//! lowered to a register free IR, optimized to a fixpoint, and turned into
//! x86-64 assembly that the target's assembler and linker finish into an
//! executable.

pub mod backend;
pub mod driver;
pub mod error;
pub mod frontend;
pub mod index;
pub mod middle;
