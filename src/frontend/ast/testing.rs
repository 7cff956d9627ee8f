//! Terse constructors for hand written trees in tests. Spans are left empty
//! unless a test asks for one.

use super::*;

pub fn module<'source>(
    source_file: &'source SourceFile,
    function_definitions: Vec<FunctionDefinition>,
) -> Module<'source> {
    Module {
        source_file,
        function_definitions,
    }
}

pub fn function(name: &str, parameters: &[&str], statements: Vec<Statement>) -> FunctionDefinition {
    FunctionDefinition {
        span: Span::default(),
        name: ident(name),
        parameters: parameters.iter().map(|p| ident(p)).collect(),
        body: block(statements),
    }
}

pub fn ident(name: &str) -> Identifier {
    Identifier {
        span: Span::default(),
        symbol: InternedSymbol::new(name),
    }
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block {
        span: Span::default(),
        statements,
    }
}

fn statement(kind: StatementKind) -> Statement {
    Statement {
        span: Span::default(),
        kind,
    }
}

fn expression(kind: ExpressionKind) -> Expression {
    Expression {
        span: Span::default(),
        kind,
    }
}

pub fn int(value: u64) -> Expression {
    expression(ExpressionKind::IntegerLiteral(value))
}

pub fn string(value: &str) -> Expression {
    expression(ExpressionKind::StringLiteral(value.to_owned()))
}

pub fn var(name: &str) -> Expression {
    expression(ExpressionKind::Identifier(ident(name)))
}

pub fn var_at(name: &str, span: Span) -> Expression {
    Expression {
        span,
        kind: ExpressionKind::Identifier(Identifier {
            span,
            symbol: InternedSymbol::new(name),
        }),
    }
}

pub fn binary(lhs: Expression, operator: BinaryOperatorKind, rhs: Expression) -> Expression {
    expression(ExpressionKind::Binary {
        lhs: Box::new(lhs),
        operator,
        rhs: Box::new(rhs),
    })
}

pub fn add(lhs: Expression, rhs: Expression) -> Expression {
    binary(lhs, BinaryOperatorKind::Add, rhs)
}

pub fn sub(lhs: Expression, rhs: Expression) -> Expression {
    binary(lhs, BinaryOperatorKind::Subtract, rhs)
}

pub fn mul(lhs: Expression, rhs: Expression) -> Expression {
    binary(lhs, BinaryOperatorKind::Multiply, rhs)
}

pub fn div(lhs: Expression, rhs: Expression) -> Expression {
    binary(lhs, BinaryOperatorKind::Divide, rhs)
}

pub fn call(name: &str, arguments: Vec<Expression>) -> Expression {
    expression(ExpressionKind::FunctionCall(Box::new(FunctionCall {
        name: ident(name),
        arguments,
    })))
}

pub fn call_stmt(name: &str, arguments: Vec<Expression>) -> Statement {
    statement(StatementKind::FunctionCall(Box::new(FunctionCall {
        name: ident(name),
        arguments,
    })))
}

pub fn ret(value: Expression) -> Statement {
    statement(StatementKind::Return(Some(Box::new(value))))
}

pub fn ret_empty() -> Statement {
    statement(StatementKind::Return(None))
}

pub fn let_(name: &str, initializer: Expression) -> Statement {
    statement(StatementKind::Local {
        name: ident(name),
        initializer: Box::new(initializer),
    })
}

pub fn assign(name: &str, value: Expression) -> Statement {
    statement(StatementKind::Assignment {
        target: ident(name),
        value: Box::new(value),
    })
}

pub fn assign_at(name: &str, span: Span, value: Expression) -> Statement {
    Statement {
        span,
        kind: StatementKind::Assignment {
            target: Identifier {
                span,
                symbol: InternedSymbol::new(name),
            },
            value: Box::new(value),
        },
    }
}

pub fn if_(condition: Expression, statements: Vec<Statement>) -> Statement {
    statement(StatementKind::If {
        condition: Box::new(condition),
        block: Box::new(block(statements)),
    })
}

pub fn while_(condition: Expression, statements: Vec<Statement>) -> Statement {
    statement(StatementKind::While {
        condition: Box::new(condition),
        block: Box::new(block(statements)),
    })
}

pub fn asm(text: &str) -> Statement {
    statement(StatementKind::InlineAssembly(text.to_owned()))
}
