//! The tree produced by the parser. The backend only ever reads it; every
//! node that can be the subject of a diagnostic carries its [`Span`].

use super::{SourceFile, Span, intern::InternedSymbol};

#[cfg(test)]
pub mod testing;

#[derive(Debug)]
pub struct Module<'source> {
    pub source_file: &'source SourceFile,
    pub function_definitions: Vec<FunctionDefinition>,
}

#[derive(Debug)]
pub struct FunctionDefinition {
    pub span: Span,
    pub name: Identifier,
    /// Parameter names in declaration order
    pub parameters: Vec<Identifier>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy)]
pub struct Identifier {
    pub span: Span,
    pub symbol: InternedSymbol,
}

#[derive(Debug)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub struct Statement {
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug)]
pub enum StatementKind {
    Return(Option<Box<Expression>>),
    // let name = initializer;
    Local {
        name: Identifier,
        initializer: Box<Expression>,
    },
    // name = value;
    Assignment {
        target: Identifier,
        value: Box<Expression>,
    },
    /// A call whose result is discarded
    FunctionCall(Box<FunctionCall>),
    If {
        condition: Box<Expression>,
        block: Box<Block>,
    },
    While {
        condition: Box<Expression>,
        block: Box<Block>,
    },
    /// Text between the delimiters of an `asm` statement, untouched
    InlineAssembly(String),
}

#[derive(Debug)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug)]
pub enum ExpressionKind {
    IntegerLiteral(u64),
    /// Already unescaped by the lexer
    StringLiteral(String),
    Identifier(Identifier),
    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperatorKind,
        rhs: Box<Expression>,
    },
    FunctionCall(Box<FunctionCall>),
}

#[derive(Debug)]
pub struct FunctionCall {
    pub name: Identifier,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum BinaryOperatorKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "==")]
    Equals,
    #[strum(serialize = "!=")]
    NotEquals,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqualTo,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqualTo,
}

impl BinaryOperatorKind {
    /// Evaluates the operator on unsigned 64-bit operands with wrapping
    /// arithmetic. Comparisons produce `1` or `0`. Returns `None` for a
    /// division by zero, which is left for the target to fault on.
    pub fn evaluate(self, lhs: u64, rhs: u64) -> Option<u64> {
        Some(match self {
            Self::Add => lhs.wrapping_add(rhs),
            Self::Subtract => lhs.wrapping_sub(rhs),
            Self::Multiply => lhs.wrapping_mul(rhs),
            Self::Divide => lhs.checked_div(rhs)?,
            Self::Equals => (lhs == rhs) as u64,
            Self::NotEquals => (lhs != rhs) as u64,
            Self::LessThan => (lhs < rhs) as u64,
            Self::LessThanOrEqualTo => (lhs <= rhs) as u64,
            Self::GreaterThan => (lhs > rhs) as u64,
            Self::GreaterThanOrEqualTo => (lhs >= rhs) as u64,
        })
    }
}
