//! Reference evaluator for IR modules. Tests run a module before and after a
//! transformation and compare what `main` returns.

use hashbrown::HashMap;

use crate::{
    index::Index,
    middle::ir::{LabelId, Module, Statement, TempId, Value},
};

const STEP_LIMIT: usize = 1_000_000;

pub fn run_main(module: &Module) -> u64 {
    call(module, "main", &[])
}

pub fn call(module: &Module, name: &str, arguments: &[u64]) -> u64 {
    let function = module
        .function(name)
        .unwrap_or_else(|| panic!("call to `{name}`, which the module does not define"));

    let labels: HashMap<LabelId, usize> = function
        .body
        .iter()
        .enumerate()
        .filter_map(|(i, statement)| match statement {
            Statement::Label(label) => Some((*label, i)),
            _ => None,
        })
        .collect();

    let mut frame = Frame {
        temps: HashMap::new(),
        arguments: arguments.to_vec(),
    };
    let mut position = 0;

    for _ in 0..STEP_LIMIT {
        let Some(statement) = function.body.get(position) else {
            return 0;
        };
        position += 1;

        match statement {
            Statement::Return(value) => return value.map_or(0, |value| frame.read(value)),
            Statement::BinaryOperation {
                operator,
                lhs,
                rhs,
                destination,
            } => {
                let result = operator
                    .evaluate(frame.read(*lhs), frame.read(*rhs))
                    .expect("division by zero");
                frame.write(*destination, result);
            }
            Statement::Assign { destination, value } => {
                let value = frame.read(*value);
                frame.write(*destination, value);
            }
            Statement::Call {
                name,
                arguments,
                destination,
            } => {
                let arguments: Vec<u64> = arguments.iter().map(|a| frame.read(*a)).collect();
                let result = call(module, name.value(), &arguments);

                if let Some(destination) = destination {
                    frame.write(*destination, result);
                }
            }
            Statement::Label(_) => {}
            Statement::JumpIfZero { condition, target } => {
                if frame.read(*condition) == 0 {
                    position = labels[target];
                }
            }
            Statement::Jump(target) => position = labels[target],
            Statement::RawAsm(text) => panic!("cannot interpret inline assembly {text:?}"),
        }
    }

    panic!("`{name}` did not return within {STEP_LIMIT} steps");
}

struct Frame {
    temps: HashMap<TempId, u64>,
    arguments: Vec<u64>,
}

impl Frame {
    fn read(&self, value: Value) -> u64 {
        match value {
            Value::Const(value) => value,
            Value::Temp(temp) => self.temps[&temp],
            Value::Arg(arg) => self.arguments[arg.index()],
            Value::StringRef(string) => panic!("{string:?} has no integer value"),
        }
    }

    fn write(&mut self, destination: Value, value: u64) {
        match destination {
            Value::Temp(temp) => {
                self.temps.insert(temp, value);
            }
            Value::Arg(arg) => self.arguments[arg.index()] = value,
            _ => panic!("{destination:?} is not assignable"),
        }
    }
}
