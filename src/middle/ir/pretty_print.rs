use colored::Colorize;
use itertools::Itertools;

use crate::{index::Index, middle::ir};

impl core::fmt::Display for ir::Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, string) in self.strings.iter_enumerated() {
            writeln!(f, "{} {} {:?}", id, "=".white(), string)?;
        }

        if !self.strings.is_empty() {
            writeln!(f)?;
        }

        write!(f, "{}", self.functions.iter().join("\n"))
    }
}

impl core::fmt::Display for ir::Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} {}{}{}{}",
            "def".magenta(),
            self.name.value().blue(),
            "(".white(),
            (0..self.parameter_count)
                .map(|i| ir::Value::Arg(ir::ArgId::new(i)).to_string())
                .join(", "),
            ") {".white()
        )?;

        for statement in &self.body {
            match statement {
                ir::Statement::Label(_) => writeln!(f, "{statement}")?,
                _ => writeln!(f, "    {statement}")?,
            }
        }

        writeln!(f, "{}", "}".white())
    }
}

impl core::fmt::Display for ir::Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ir::Statement::Return(Some(value)) => write!(f, "{} {value}", "ret".cyan()),
            ir::Statement::Return(None) => write!(f, "{}", "ret".cyan()),
            ir::Statement::BinaryOperation {
                operator,
                lhs,
                rhs,
                destination,
            } => write!(
                f,
                "{destination} {} {lhs} {} {rhs}",
                "=".white(),
                operator.to_string().white()
            ),
            ir::Statement::Assign { destination, value } => {
                write!(f, "{destination} {} {value}", "=".white())
            }
            ir::Statement::Call {
                name,
                arguments,
                destination,
            } => {
                if let Some(dest) = destination {
                    write!(f, "{dest} {} ", "=".white())?;
                }

                write!(
                    f,
                    "{} {}({})",
                    "call".cyan(),
                    name.value().blue(),
                    arguments.iter().join(", ")
                )
            }
            ir::Statement::Label(label) => {
                write!(f, "{}", format!("{label}:").bright_red())
            }
            ir::Statement::JumpIfZero { condition, target } => write!(
                f,
                "{} {condition}, {}",
                "jz".cyan(),
                target.to_string().blue()
            ),
            ir::Statement::Jump(target) => {
                write!(f, "{} {}", "jmp".cyan(), target.to_string().blue())
            }
            ir::Statement::RawAsm(text) => write!(f, "{} {:?}", "asm".cyan(), text),
        }
    }
}

impl core::fmt::Display for ir::Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ir::Value::Const(value) => write!(f, "{}", value.to_string().purple()),
            ir::Value::Temp(temp) => write!(f, "{temp}"),
            ir::Value::Arg(arg) => write!(f, "{arg}"),
            ir::Value::StringRef(string) => write!(f, "{string}"),
        }
    }
}

impl core::fmt::Display for ir::TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("%{}", self.index()).yellow())
    }
}

impl core::fmt::Display for ir::ArgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("$arg{}", self.index()).green())
    }
}

impl core::fmt::Display for ir::StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("@str{}", self.index()).green())
    }
}

impl core::fmt::Display for ir::LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".L{}", self.index())
    }
}
