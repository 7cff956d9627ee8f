//! The backend turns optimized IR into assembly for one target and drives
//! the external assembler and linker. IR temps have no registers; each one
//! gets a stack slot and every operation goes through `rax`.

pub mod assemblers;
pub mod layout;
pub mod targets;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Annotate every statement with its IR form as an assembly comment
    pub emit_debug_info: bool,
}
