use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{debug, error, warn};

use crate::{backend::CodegenOptions, error::CompileError, middle::ir};

mod x86_64;
mod x86_64_linux_nasm;
mod x86_64_windows_mingw;

/// Everything target specific between an optimized module and an
/// executable. Paths are derived from one output base: `<base>.asm` (or
/// `.s`), `<base>.o` and the executable itself.
pub trait CodeGenerator {
    fn translate_to_asm(&self, module: &ir::Module, options: &CodegenOptions) -> String;
    fn create_assembler_command(&self, input_file: &Path, output_file: &Path) -> Command;
    fn create_linker_command(&self, input_file: &Path, output_file: &Path) -> Command;

    fn assembly_extension(&self) -> &'static str;
    fn executable_extension(&self) -> Option<&'static str>;

    fn assembly_path(&self, output_base: &Path) -> PathBuf {
        with_suffix(output_base, self.assembly_extension())
    }

    fn object_path(&self, output_base: &Path) -> PathBuf {
        with_suffix(output_base, "o")
    }

    fn executable_path(&self, output_base: &Path) -> PathBuf {
        match self.executable_extension() {
            Some(extension) => with_suffix(output_base, extension),
            None => output_base.to_owned(),
        }
    }

    /// Writes the assembly for `module` next to the output base
    fn generate(
        &self,
        output_base: &Path,
        module: &ir::Module,
        options: &CodegenOptions,
    ) -> Result<PathBuf, CompileError> {
        let path = self.assembly_path(output_base);

        std::fs::write(&path, self.translate_to_asm(module, options)).map_err(|source| {
            CompileError::Io {
                path: path.clone(),
                source,
            }
        })?;

        debug!(path = %path.display(), "wrote assembly");
        Ok(path)
    }

    fn assemble(&self, output_base: &Path) -> Result<(), CompileError> {
        run_tool(self.create_assembler_command(
            &self.assembly_path(output_base),
            &self.object_path(output_base),
        ))
    }

    fn link(&self, output_base: &Path) -> Result<PathBuf, CompileError> {
        let executable = self.executable_path(output_base);

        run_tool(self.create_linker_command(&self.object_path(output_base), &executable))?;

        Ok(executable)
    }

    /// Removes the intermediate assembly and object files. Files that were
    /// never produced are skipped.
    fn cleanup(&self, output_base: &Path) {
        for path in [self.assembly_path(output_base), self.object_path(output_base)] {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed artifact"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), %err, "could not remove artifact"),
            }
        }
    }
}

fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Runs an external tool to completion. Its output goes straight to ours.
fn run_tool(mut command: Command) -> Result<(), CompileError> {
    let tool = command.get_program().to_string_lossy().into_owned();

    debug!(?command, "running external tool");

    let status = command
        .status()
        .map_err(|source| CompileError::ToolInvocation {
            tool: tool.clone(),
            source,
        })?;

    if !status.success() {
        error!(%tool, %status, "external tool failed");
        return Err(CompileError::ExternalTool { tool, status });
    }

    Ok(())
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Target {
    #[default]
    #[strum(serialize = "linux_nasm")]
    x86_64LinuxNasm,
    #[strum(serialize = "windows_mingw")]
    x86_64WindowsMingw,
}

impl Target {
    pub fn get_code_generator(self) -> Box<dyn CodeGenerator> {
        match self {
            Target::x86_64LinuxNasm => Box::new(x86_64_linux_nasm::CodeGeneratorX86_64LinuxNasm),
            Target::x86_64WindowsMingw => {
                Box::new(x86_64_windows_mingw::CodeGeneratorX86_64WindowsMingw)
            }
        }
    }

    /// Every registered target, in registration order
    pub fn all() -> impl Iterator<Item = Target> {
        Target::iter()
    }
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Target::all()
            .find(|target| target.to_string() == name)
            .ok_or_else(|| CompileError::UnknownTarget {
                name: name.to_owned(),
                available: Target::all().join(", "),
            })
    }
}
