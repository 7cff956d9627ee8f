use std::{io, path::PathBuf, process::ExitStatus};

use colored::Colorize;
use thiserror::Error;

use crate::frontend::{SourceFile, Span};

/// Every failure the pipeline reports to its caller. Broken IR invariants are
/// not represented here: they are compiler bugs and panic where detected.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown identifier `{name}`")]
    UnknownIdentifier { name: String, span: Span },

    #[error("cannot assign to undeclared name `{name}`")]
    UnknownAssignTarget { name: String, span: Span },

    #[error("unknown target `{name}` (available targets: {available})")]
    UnknownTarget { name: String, available: String },

    #[error("{tool} exited unsuccessfully ({status})")]
    ExternalTool { tool: String, status: ExitStatus },

    #[error("failed to run {tool}: {source}")]
    ToolInvocation {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CompileError {
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnknownIdentifier { span, .. } | Self::UnknownAssignTarget { span, .. } => {
                Some(*span)
            }
            _ => None,
        }
    }

    /// Single line report for the user, pointing into `source_file` when the
    /// error has a location.
    pub fn diagnostic(&self, source_file: &SourceFile) -> String {
        match self.span() {
            Some(span) => format!(
                "{}: {} {}",
                "error".red(),
                self,
                format!("(at {})", source_file.format_span_position(span)).white()
            ),
            None => format!("{}: {}", "error".red(), self),
        }
    }
}
