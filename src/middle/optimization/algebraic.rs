use crate::{
    frontend::ast::BinaryOperatorKind,
    middle::ir::{Function, Statement, Value},
};

/// Rewrites binary operations with an identity or absorbing literal operand
/// into plain assignments. `0 - x`, `x / 1` and `x * 1` are left as they are.
pub fn simplify_algebraic_identities(function: &mut Function) -> bool {
    let mut changed = false;

    for statement in &mut function.body {
        if let Statement::BinaryOperation {
            operator,
            lhs,
            rhs,
            destination,
        } = *statement
        {
            if let Some(value) = simplify(operator, lhs, rhs) {
                *statement = Statement::Assign { destination, value };
                changed = true;
            }
        }
    }

    changed
}

fn simplify(operator: BinaryOperatorKind, lhs: Value, rhs: Value) -> Option<Value> {
    use BinaryOperatorKind::*;

    const ZERO: Value = Value::Const(0);

    match (operator, lhs, rhs) {
        (Add, x, ZERO) | (Add, ZERO, x) | (Subtract, x, ZERO) => Some(x),
        (Multiply, _, ZERO) | (Multiply, ZERO, _) | (Divide, ZERO, _) => Some(ZERO),
        _ => None,
    }
}
