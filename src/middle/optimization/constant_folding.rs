use hashbrown::HashMap;

use crate::middle::ir::{Function, Statement, TempId, Value};

/// Forward constant propagation and folding over one function.
///
/// Known values are tracked per temp while scanning. A label may be reached
/// from a jump as well as by fallthrough, so only temps that are defined
/// exactly once in the whole function keep their known value across it.
pub fn fold_constants(function: &mut Function) -> bool {
    let definition_counts = count_definitions(function);
    let mut known: HashMap<TempId, u64> = HashMap::new();
    let mut changed = false;

    for statement in &mut function.body {
        if let Statement::Label(_) = statement {
            known.retain(|temp, _| definition_counts.get(temp) == Some(&1));
            continue;
        }

        for operand in statement.operands_mut() {
            if let Some(value) = operand.as_temp().and_then(|temp| known.get(&temp)) {
                *operand = Value::Const(*value);
                changed = true;
            }
        }

        if let Some(folded) = fold(statement) {
            *statement = folded;
            changed = true;
        }

        match statement {
            Statement::Assign {
                destination: Value::Temp(temp),
                value: Value::Const(value),
            } => {
                known.insert(*temp, *value);
            }
            _ => {
                if let Some(temp) = statement.destination().and_then(Value::as_temp) {
                    known.remove(&temp);
                }
            }
        }
    }

    changed
}

/// Replacement for a binary operation whose operands are both literals.
/// Division by zero is left alone so it still faults at run time.
fn fold(statement: &Statement) -> Option<Statement> {
    match statement {
        Statement::BinaryOperation {
            operator,
            lhs: Value::Const(lhs),
            rhs: Value::Const(rhs),
            destination,
        } => Some(Statement::Assign {
            destination: *destination,
            value: Value::Const(operator.evaluate(*lhs, *rhs)?),
        }),
        _ => None,
    }
}

fn count_definitions(function: &Function) -> HashMap<TempId, usize> {
    let mut counts = HashMap::new();

    for temp in function
        .body
        .iter()
        .filter_map(|statement| statement.destination()?.as_temp())
    {
        *counts.entry(temp).or_insert(0) += 1;
    }

    counts
}
