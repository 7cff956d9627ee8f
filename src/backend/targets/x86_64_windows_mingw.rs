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

/// PE executables built with the mingw-w64 binutils. The program exits
/// through `ExitProcess` from kernel32 instead of a raw system call.
pub struct CodeGeneratorX86_64WindowsMingw;

impl CodeGenerator for CodeGeneratorX86_64WindowsMingw {
    fn translate_to_asm(&self, module: &ir::Module, options: &CodegenOptions) -> String {
        let function_bodies = module
            .functions
            .iter()
            .map(|f| codegen_function(f, Dialect::GasIntel, CallingConvention::Windows, options))
            .join("\n");

        let static_strings = if module.strings.is_empty() {
            String::new()
        } else {
            format!(
                "\n    .section .rdata\n{}\n",
                module
                    .strings
                    .iter_enumerated()
                    .map(|(id, string)| format!(
                        "{}:\n    .byte {}",
                        string_label(id),
                        string.bytes().chain([0]).join(", ")
                    ))
                    .join("\n")
            )
        };

        format!(
            indoc::indoc! {"
                .intel_syntax noprefix
                .globl _start
                .text

            # program entrypoint
            _start:
                # shadow space for the callee, and realigns rsp to 16 bytes
                sub rsp, 40
                call main

                mov rcx, rax
                call ExitProcess

            # user code
            {0}{1}"
            },
            function_bodies, static_strings
        )
    }

    fn create_assembler_command(&self, input_file: &Path, output_file: &Path) -> Command {
        let mut cmd = Command::new("x86_64-w64-mingw32-as");

        cmd.arg("-o").arg(output_file).arg(input_file);

        cmd
    }

    fn create_linker_command(&self, input_file: &Path, output_file: &Path) -> Command {
        let mut cmd = Command::new("x86_64-w64-mingw32-ld");

        cmd.args(["-e", "_start", "-o"])
            .arg(output_file)
            .arg(input_file)
            .arg("-lkernel32");

        cmd
    }

    fn assembly_extension(&self) -> &'static str {
        "s"
    }

    fn executable_extension(&self) -> Option<&'static str> {
        Some("exe")
    }
}
