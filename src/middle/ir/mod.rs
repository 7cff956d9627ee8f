//! IR (Intermediate Representation). Structured control flow is flattened to
//! labels and jumps and expression trees to ordered statements which write
//! into function-local temporaries. Temporaries have no machine location
//! until code generation gives each one a stack slot.

use hashbrown::HashMap;

use crate::{
    frontend::{ast::BinaryOperatorKind, intern::InternedSymbol},
    index::{Index, IndexVec, simple_index},
};

pub mod builder;
#[cfg(test)]
pub mod interpret;
pub mod pretty_print;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
    /// String literals in order of first use. Never deduplicated, so the same
    /// text used twice gets two entries.
    pub strings: IndexVec<StringId, String>,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name.value() == name)
    }

    pub fn defines(&self, name: InternedSymbol) -> bool {
        self.functions.iter().any(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: InternedSymbol,
    pub parameter_count: usize,
    pub body: Vec<Statement>,
    /// Lexical scopes, innermost last. Only populated while the builder is
    /// inside the function.
    pub scopes: Vec<Scope>,
    next_temp: TempId,
    next_label: LabelId,
}

pub type Scope = HashMap<InternedSymbol, Value>;

impl Function {
    pub fn new(name: InternedSymbol, parameter_count: usize) -> Self {
        Self {
            name,
            parameter_count,
            body: Vec::new(),
            scopes: Vec::new(),
            next_temp: TempId::new(0),
            next_label: LabelId::new(0),
        }
    }

    /// Number of temporaries ever handed out. Every `TempId` in the body is
    /// below this, even after passes delete the statements defining some.
    pub fn max_temps(&self) -> usize {
        self.next_temp.index()
    }

    pub fn create_temp(&mut self) -> TempId {
        let temp = self.next_temp;
        self.next_temp.increment_by(1);
        temp
    }

    pub fn create_label(&mut self) -> LabelId {
        let label = self.next_label;
        self.next_label.increment_by(1);
        label
    }

    pub fn push_statement(&mut self, statement: Statement) {
        self.body.push(statement);
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    #[track_caller]
    pub fn pop_scope(&mut self) {
        self.scopes
            .pop()
            .expect("scope pops should always be paired with a push");
    }

    /// Binds `name` in the innermost scope, shadowing any outer binding
    #[track_caller]
    pub fn define(&mut self, name: InternedSymbol, value: Value) {
        self.scopes
            .last_mut()
            .expect("names can only be defined inside a scope")
            .insert(name, value);
    }

    pub fn lookup(&self, name: InternedSymbol) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .copied()
    }
}

simple_index! {
    /// A function-local temporary. Never reused once handed out.
    pub struct TempId;
}

simple_index! {
    /// A function-local jump target
    pub struct LabelId;
}

simple_index! {
    /// Index into the module string pool
    pub struct StringId;
}

simple_index! {
    /// Position of an incoming function argument
    pub struct ArgId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Const(u64),
    Temp(TempId),
    Arg(ArgId),
    StringRef(StringId),
}

impl Value {
    pub fn as_temp(self) -> Option<TempId> {
        match self {
            Value::Temp(temp) => Some(temp),
            _ => None,
        }
    }

    pub fn as_const(self) -> Option<u64> {
        match self {
            Value::Const(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Return(Option<Value>),
    BinaryOperation {
        operator: BinaryOperatorKind,
        lhs: Value,
        rhs: Value,
        destination: Value,
    },
    Assign {
        destination: Value,
        value: Value,
    },
    Call {
        name: InternedSymbol,
        arguments: Vec<Value>,
        destination: Option<Value>,
    },
    Label(LabelId),
    JumpIfZero {
        condition: Value,
        target: LabelId,
    },
    Jump(LabelId),
    RawAsm(String),
}

impl Statement {
    /// Values read by this statement, in evaluation order
    pub fn operands(&self) -> impl Iterator<Item = Value> + '_ {
        let operands: Box<dyn Iterator<Item = Value> + '_> = match self {
            Statement::Return(value) => Box::new(value.iter().copied()),
            Statement::BinaryOperation { lhs, rhs, .. } => Box::new([*lhs, *rhs].into_iter()),
            Statement::Assign { value, .. } => Box::new(std::iter::once(*value)),
            Statement::Call { arguments, .. } => Box::new(arguments.iter().copied()),
            Statement::JumpIfZero { condition, .. } => Box::new(std::iter::once(*condition)),
            Statement::Label(_) | Statement::Jump(_) | Statement::RawAsm(_) => {
                Box::new(std::iter::empty())
            }
        };

        operands
    }

    /// Mutable access to every value this statement reads
    pub fn operands_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Statement::Return(value) => value.iter_mut().collect(),
            Statement::BinaryOperation { lhs, rhs, .. } => vec![lhs, rhs],
            Statement::Assign { value, .. } => vec![value],
            Statement::Call { arguments, .. } => arguments.iter_mut().collect(),
            Statement::JumpIfZero { condition, .. } => vec![condition],
            Statement::Label(_) | Statement::Jump(_) | Statement::RawAsm(_) => Vec::new(),
        }
    }

    /// The value written by this statement, if any
    pub fn destination(&self) -> Option<Value> {
        match self {
            Statement::BinaryOperation { destination, .. }
            | Statement::Assign { destination, .. } => Some(*destination),
            Statement::Call { destination, .. } => *destination,
            _ => None,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Statement::Return(_))
    }
}
