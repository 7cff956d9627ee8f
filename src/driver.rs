//! Runs the pipeline for one module: IR construction, optimization, code
//! generation, then the target's assembler and linker.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::{
    backend::{
        CodegenOptions,
        targets::{CodeGenerator, Target},
    },
    error::CompileError,
    frontend::ast,
    middle::{
        ir::{self, builder},
        optimization,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub target: Target,
    /// Artifacts are named after this path: `<base>.asm`, `<base>.o` and the
    /// executable
    pub output_base: PathBuf,
    pub optimize: bool,
    /// Keep the assembly and object files after linking
    pub keep_artifacts: bool,
    pub codegen: CodegenOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::default(),
            output_base: PathBuf::from("a.out"),
            optimize: true,
            keep_artifacts: false,
            codegen: CodegenOptions::default(),
        }
    }
}

impl CompileOptions {
    /// Options whose output sits next to `source_path`, named after it
    /// without its extension
    pub fn for_source_file(source_path: &Path) -> Self {
        Self {
            output_base: source_path.with_extension(""),
            ..Self::default()
        }
    }
}

/// Builds the IR for `module` and optimizes it if enabled
pub fn lower(module: &ast::Module, options: &CompileOptions) -> Result<ir::Module, CompileError> {
    let mut ir_module = builder::build(module)?;

    if options.optimize {
        let report = optimization::optimize(&mut ir_module);
        info!(
            iterations = report.iterations,
            fixpoint = report.reached_fixpoint,
            "optimized module"
        );
    }

    Ok(ir_module)
}

/// Assembly text for the configured target, without touching the file system
pub fn compile_to_asm(module: &ast::Module, options: &CompileOptions) -> Result<String, CompileError> {
    let ir_module = lower(module, options)?;

    Ok(options
        .target
        .get_code_generator()
        .translate_to_asm(&ir_module, &options.codegen))
}

/// Compiles `module` to an executable and returns its path. Intermediate
/// files are removed afterwards, whether or not the build succeeded, unless
/// `keep_artifacts` is set.
pub fn compile(module: &ast::Module, options: &CompileOptions) -> Result<PathBuf, CompileError> {
    let ir_module = lower(module, options)?;
    let generator = options.target.get_code_generator();

    let result = build_executable(generator.as_ref(), &ir_module, options);

    if !options.keep_artifacts {
        generator.cleanup(&options.output_base);
    }

    match &result {
        Ok(executable) => info!(path = %executable.display(), "built executable"),
        Err(err) => error!(%err, "build failed"),
    }

    result
}

fn build_executable(
    generator: &dyn CodeGenerator,
    ir_module: &ir::Module,
    options: &CompileOptions,
) -> Result<PathBuf, CompileError> {
    let base = &options.output_base;

    info!(target = %options.target, base = %base.display(), "generating assembly");
    generator.generate(base, ir_module, &options.codegen)?;

    info!("assembling");
    generator.assemble(base)?;

    info!("linking");
    generator.link(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{SourceFile, ast::testing::*};

    #[test]
    fn output_base_drops_the_source_extension() {
        let options = CompileOptions::for_source_file(Path::new("demo/prog.boa"));

        assert_eq!(options.output_base, Path::new("demo/prog"));
        assert!(options.optimize);
        assert!(!options.keep_artifacts);
        assert_eq!(options.target, Target::x86_64LinuxNasm);
    }

    #[test]
    fn optimization_can_be_disabled() {
        let source = SourceFile::memory("");
        let module = module(&source, vec![function("main", &[], vec![ret(add(int(3), int(4)))])]);

        let unoptimized = lower(
            &module,
            &CompileOptions {
                optimize: false,
                ..CompileOptions::default()
            },
        )
        .unwrap();
        let optimized = lower(&module, &CompileOptions::default()).unwrap();

        assert_eq!(unoptimized.functions[0].body.len(), 2);
        assert_eq!(optimized.functions[0].body.len(), 1);
    }

    #[test]
    fn semantic_errors_stop_before_codegen() {
        let dir = mktemp::Temp::new_dir().unwrap();
        let source = SourceFile::memory("");
        let module = module(&source, vec![function("main", &[], vec![ret(var("nope"))])]);
        let options = CompileOptions {
            output_base: dir.as_path().join("prog"),
            keep_artifacts: true,
            ..CompileOptions::default()
        };

        let error = compile(&module, &options).unwrap_err();

        assert!(matches!(error, CompileError::UnknownIdentifier { .. }));
        assert!(!dir.as_path().join("prog.asm").exists());
    }

    #[test]
    fn artifacts_follow_the_keep_flag() {
        let dir = mktemp::Temp::new_dir().unwrap();
        let source = SourceFile::memory("");
        let module = module(&source, vec![function("main", &[], vec![ret(int(7))])]);

        // Whether or not nasm and ld are installed, the assembly is written
        // before either runs
        let kept = CompileOptions {
            output_base: dir.as_path().join("kept"),
            keep_artifacts: true,
            ..CompileOptions::default()
        };
        let _ = compile(&module, &kept);
        let assembly = std::fs::read_to_string(dir.as_path().join("kept.asm")).unwrap();
        assert!(assembly.contains("global main"));

        let removed = CompileOptions {
            output_base: dir.as_path().join("removed"),
            ..CompileOptions::default()
        };
        let _ = compile(&module, &removed);
        assert!(!dir.as_path().join("removed.asm").exists());
        assert!(!dir.as_path().join("removed.o").exists());
    }
}
