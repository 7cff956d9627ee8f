use std::{path::Path, process::Command};

use itertools::Itertools;

use crate::{
    backend::{
        CodegenOptions,
        assemblers::x86_64::{CallingConvention, Dialect, string_label},
        targets::{CodeGenerator, x86_64::codegen_function},
    },
    middle::ir,
};

pub struct CodeGeneratorX86_64LinuxNasm;

impl CodeGenerator for CodeGeneratorX86_64LinuxNasm {
    fn translate_to_asm(&self, module: &ir::Module, options: &CodegenOptions) -> String {
        let externs = external_functions(module)
            .map(|name| format!("extern {name}"))
            .join("\n");

        let function_bodies = module
            .functions
            .iter()
            .map(|f| codegen_function(f, Dialect::Nasm, CallingConvention::SystemV, options))
            .join("\n");

        let static_strings = if module.strings.is_empty() {
            String::new()
        } else {
            format!(
                "\nsection .rodata\n{}\n",
                module
                    .strings
                    .iter_enumerated()
                    .map(|(id, string)| format!(
                        "{}: db {}",
                        string_label(id),
                        format_nasm_string(string)
                    ))
                    .join("\n")
            )
        };

        format!(
            indoc::indoc! {"
            global _start

            bits 64
            section .text

            {0}

            ; program entrypoint
            _start:
                call main

                ; exit syscall using code passed in rax
                mov rdi, rax
                mov rax, 60
                syscall

            ; user code
            {1}{2}"
            },
            externs, function_bodies, static_strings
        )
    }

    fn create_assembler_command(&self, input_file: &Path, output_file: &Path) -> Command {
        let mut cmd = Command::new("nasm");

        cmd.args(["-f", "elf64", "-o"])
            .arg(output_file)
            .arg(input_file);

        cmd
    }

    fn create_linker_command(&self, input_file: &Path, output_file: &Path) -> Command {
        let mut cmd = Command::new("ld");

        cmd.arg("-o").arg(output_file).arg(input_file);

        cmd
    }

    fn assembly_extension(&self) -> &'static str {
        "asm"
    }

    fn executable_extension(&self) -> Option<&'static str> {
        None
    }
}

/// Callees the module does not define, in first call order
fn external_functions(module: &ir::Module) -> impl Iterator<Item = &'static str> + '_ {
    module
        .functions
        .iter()
        .flat_map(|f| &f.body)
        .filter_map(|statement| match statement {
            ir::Statement::Call { name, .. } if !module.defines(*name) => Some(*name),
            _ => None,
        })
        .unique()
        .map(|name| name.value())
}

/// Printable runs are quoted, everything else is written as bytes. NUL
/// terminated.
fn format_nasm_string(string: &str) -> String {
    let mut parts = Vec::new();
    let mut run = String::new();

    for byte in string.bytes() {
        if (b' '..=b'~').contains(&byte) && byte != b'"' {
            run.push(byte as char);
            continue;
        }

        if !run.is_empty() {
            parts.push(format!("\"{}\"", std::mem::take(&mut run)));
        }

        parts.push(format!("0x{byte:02X}"));
    }

    if !run.is_empty() {
        parts.push(format!("\"{run}\""));
    }

    parts.push("0".to_owned());
    parts.join(", ")
}
