//! Function bodies are the same on every x86-64 target up to the assembler
//! dialect and calling convention.

use crate::{
    backend::{
        CodegenOptions,
        assemblers::x86_64::{Assembler, CallingConvention, Dialect},
        layout::FrameLayout,
    },
    middle::ir,
};

pub fn codegen_function(
    function: &ir::Function,
    dialect: Dialect,
    convention: CallingConvention,
    options: &CodegenOptions,
) -> String {
    let layout = FrameLayout::new(function, convention);
    let mut assembler = Assembler::new(function, &layout, dialect, convention);

    assembler.global_label(function.name.value());
    assembler.function_prologue();
    assembler.spill_register_arguments();

    for statement in &function.body {
        if options.emit_debug_info {
            assembler.comment(strip_ansi_escapes::strip_str(statement.to_string()));
        }

        match statement {
            ir::Statement::Return(value) => assembler.function_return(*value),
            ir::Statement::BinaryOperation {
                operator,
                lhs,
                rhs,
                destination,
            } => assembler.binary_operation(*operator, *lhs, *rhs, *destination),
            ir::Statement::Assign { destination, value } => {
                assembler.assign(*destination, *value)
            }
            ir::Statement::Call {
                name,
                arguments,
                destination,
            } => assembler.call(*name, arguments, *destination),
            ir::Statement::Label(label) => assembler.label(*label),
            ir::Statement::JumpIfZero { condition, target } => {
                assembler.jump_if_zero(*condition, *target)
            }
            ir::Statement::Jump(target) => assembler.jump(*target),
            ir::Statement::RawAsm(text) => assembler.raw_asm(text),
        }
    }

    // Falling off the end returns 0
    if !function.body.last().is_some_and(ir::Statement::is_return) {
        assembler.clear_return_value();
    }

    assembler.function_epilogue();
    assembler.into_output()
}
