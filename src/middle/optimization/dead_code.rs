use hashbrown::{HashMap, HashSet};

use crate::middle::ir::{Function, LabelId, Statement, TempId, Value};

pub fn eliminate_dead_code(function: &mut Function) -> bool {
    let mut changed = resolve_constant_branches(function);
    changed |= remove_unreachable_statements(function);
    changed |= remove_unused_definitions(function);
    changed
}

/// A branch on a literal either never jumps or always does
fn resolve_constant_branches(function: &mut Function) -> bool {
    let length = function.body.len();

    function.body.retain(|statement| {
        !matches!(
            statement,
            Statement::JumpIfZero {
                condition: Value::Const(condition),
                ..
            } if *condition != 0
        )
    });

    let mut changed = function.body.len() != length;

    for statement in &mut function.body {
        if let Statement::JumpIfZero {
            condition: Value::Const(0),
            target,
        } = *statement
        {
            *statement = Statement::Jump(target);
            changed = true;
        }
    }

    changed
}

/// Drops every statement no path from the function entry reaches
fn remove_unreachable_statements(function: &mut Function) -> bool {
    let reachable = reachable_statements(&function.body);

    if reachable.iter().all(|&r| r) {
        return false;
    }

    let mut reachable = reachable.into_iter();
    function.body.retain(|_| reachable.next().unwrap_or(false));
    true
}

fn reachable_statements(body: &[Statement]) -> Vec<bool> {
    let label_positions: HashMap<LabelId, usize> = body
        .iter()
        .enumerate()
        .filter_map(|(i, statement)| match statement {
            Statement::Label(label) => Some((*label, i)),
            _ => None,
        })
        .collect();

    let position_of = |label: &LabelId| -> usize {
        *label_positions
            .get(label)
            .unwrap_or_else(|| panic!("jump to {label} which is not defined in this function"))
    };

    let mut reachable = vec![false; body.len()];
    let mut worklist = vec![0];

    while let Some(i) = worklist.pop() {
        if i >= body.len() || reachable[i] {
            continue;
        }

        reachable[i] = true;

        match &body[i] {
            Statement::Return(_) => {}
            Statement::Jump(target) => worklist.push(position_of(target)),
            Statement::JumpIfZero { target, .. } => {
                worklist.push(i + 1);
                worklist.push(position_of(target));
            }
            _ => worklist.push(i + 1),
        }
    }

    reachable
}

/// One pass over the body: temps that are never read lose the plain
/// computations writing them. Calls stay, since they may have side effects.
fn remove_unused_definitions(function: &mut Function) -> bool {
    let used: HashSet<TempId> = function
        .body
        .iter()
        .flat_map(Statement::operands)
        .filter_map(Value::as_temp)
        .collect();

    let length = function.body.len();

    function.body.retain(|statement| match statement {
        Statement::BinaryOperation {
            destination: Value::Temp(temp),
            ..
        }
        | Statement::Assign {
            destination: Value::Temp(temp),
            ..
        } => used.contains(temp),
        _ => true,
    });

    function.body.len() != length
}
