//! Lowers the AST into IR. Each function gets its own [`FunctionLoweringContext`]
//! which owns the temp and label counters, so functions never share state
//! beyond the module string pool.

use tracing::debug;

use crate::{
    error::CompileError,
    frontend::ast,
    index::{Index, IndexVec},
    middle::ir::{self, ArgId, StringId, Value},
};

/// Builds the IR module for a whole AST. Stops at the first semantic error.
pub fn build(module: &ast::Module) -> Result<ir::Module, CompileError> {
    let mut strings = IndexVec::new();
    let mut functions = Vec::with_capacity(module.function_definitions.len());

    for definition in &module.function_definitions {
        let context = FunctionLoweringContext::new(definition, &mut strings);
        functions.push(context.lower()?);
    }

    debug!(
        functions = functions.len(),
        strings = strings.len(),
        "built ir module"
    );

    Ok(ir::Module { functions, strings })
}

struct FunctionLoweringContext<'ast, 'm> {
    definition: &'ast ast::FunctionDefinition,
    strings: &'m mut IndexVec<StringId, String>,
    function: ir::Function,
}

impl<'ast, 'm> FunctionLoweringContext<'ast, 'm> {
    fn new(
        definition: &'ast ast::FunctionDefinition,
        strings: &'m mut IndexVec<StringId, String>,
    ) -> Self {
        Self {
            definition,
            strings,
            function: ir::Function::new(definition.name.symbol, definition.parameters.len()),
        }
    }

    fn lower(mut self) -> Result<ir::Function, CompileError> {
        let definition = self.definition;

        // Parameters live in the outermost scope so the body can shadow them
        self.function.push_scope();
        for (i, parameter) in definition.parameters.iter().enumerate() {
            self.function
                .define(parameter.symbol, Value::Arg(ArgId::new(i)));
        }

        self.lower_statements(&definition.body.statements)?;
        self.function.pop_scope();

        debug_assert!(self.function.scopes.is_empty());

        Ok(self.function)
    }

    fn push_statement(&mut self, statement: ir::Statement) {
        self.function.push_statement(statement);
    }

    fn lower_scoped_block(&mut self, block: &ast::Block) -> Result<(), CompileError> {
        self.function.push_scope();
        self.lower_statements(&block.statements)?;
        self.function.pop_scope();

        Ok(())
    }

    fn lower_statements(&mut self, statements: &[ast::Statement]) -> Result<(), CompileError> {
        statements
            .iter()
            .try_for_each(|statement| self.lower_statement(statement))
    }

    fn lower_statement(&mut self, statement: &ast::Statement) -> Result<(), CompileError> {
        match &statement.kind {
            ast::StatementKind::Return(None) => {
                self.push_statement(ir::Statement::Return(None));
            }
            ast::StatementKind::Return(Some(expression)) => {
                let value = self.lower_expression(expression)?;
                self.push_statement(ir::Statement::Return(Some(value)));
            }
            ast::StatementKind::Local { name, initializer } => {
                let value = self.lower_expression(initializer)?;

                // Locals always get their own slot, otherwise a later
                // assignment would write through to whatever the initializer
                // evaluated to (a constant, a parameter, another local).
                let destination = Value::Temp(self.function.create_temp());
                self.push_statement(ir::Statement::Assign { destination, value });
                self.function.define(name.symbol, destination);
            }
            ast::StatementKind::Assignment { target, value } => {
                let Some(destination) = self.function.lookup(target.symbol) else {
                    return Err(CompileError::UnknownAssignTarget {
                        name: target.symbol.value().to_owned(),
                        span: target.span,
                    });
                };

                let value = self.lower_expression(value)?;
                self.push_statement(ir::Statement::Assign { destination, value });
            }
            ast::StatementKind::FunctionCall(call) => {
                self.lower_call(call, false)?;
            }
            ast::StatementKind::If { condition, block } => {
                let condition = self.lower_expression(condition)?;
                let end = self.function.create_label();

                self.push_statement(ir::Statement::JumpIfZero {
                    condition,
                    target: end,
                });
                self.lower_scoped_block(block)?;
                self.push_statement(ir::Statement::Label(end));
            }
            ast::StatementKind::While { condition, block } => {
                let header = self.function.create_label();
                let exit = self.function.create_label();

                self.push_statement(ir::Statement::Label(header));
                let condition = self.lower_expression(condition)?;
                self.push_statement(ir::Statement::JumpIfZero {
                    condition,
                    target: exit,
                });
                self.lower_scoped_block(block)?;
                self.push_statement(ir::Statement::Jump(header));
                self.push_statement(ir::Statement::Label(exit));
            }
            ast::StatementKind::InlineAssembly(text) => {
                self.push_statement(ir::Statement::RawAsm(text.clone()));
            }
        }

        Ok(())
    }

    fn lower_expression(&mut self, expression: &ast::Expression) -> Result<Value, CompileError> {
        match &expression.kind {
            ast::ExpressionKind::IntegerLiteral(value) => Ok(Value::Const(*value)),
            ast::ExpressionKind::StringLiteral(value) => {
                Ok(Value::StringRef(self.strings.push(value.clone())))
            }
            ast::ExpressionKind::Identifier(identifier) => self
                .function
                .lookup(identifier.symbol)
                .ok_or_else(|| CompileError::UnknownIdentifier {
                    name: identifier.symbol.value().to_owned(),
                    span: expression.span,
                }),
            ast::ExpressionKind::Binary { lhs, operator, rhs } => {
                let lhs = self.lower_expression(lhs)?;
                let rhs = self.lower_expression(rhs)?;
                let destination = Value::Temp(self.function.create_temp());

                self.push_statement(ir::Statement::BinaryOperation {
                    operator: *operator,
                    lhs,
                    rhs,
                    destination,
                });

                Ok(destination)
            }
            ast::ExpressionKind::FunctionCall(call) => self
                .lower_call(call, true)
                .map(|destination| destination.expect("value calls always have a destination")),
        }
    }

    fn lower_call(
        &mut self,
        call: &ast::FunctionCall,
        wants_result: bool,
    ) -> Result<Option<Value>, CompileError> {
        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.lower_expression(argument))
            .collect::<Result<Vec<_>, _>>()?;

        let destination = wants_result.then(|| Value::Temp(self.function.create_temp()));

        self.push_statement(ir::Statement::Call {
            name: call.name.symbol,
            arguments,
            destination,
        });

        Ok(destination)
    }
}
