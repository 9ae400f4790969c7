//! Name resolution over a single flat namespace.
//!
//! A name becomes visible the moment its defining construct is visited and
//! stays visible for the rest of the walk. Blocks do not introduce scopes,
//! and re-registering a name silently replaces its kind.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{CompileError, CompileResult, NameRequirement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolKind>,
}

impl SymbolTable {
    /// Insert or overwrite `name`.
    pub fn define(&mut self, name: &str, kind: SymbolKind) {
        trace!(symbol = name, ?kind, "define symbol");
        self.symbols.insert(name.to_string(), kind);
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolKind> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Default)]
pub struct NameChecker {
    table: SymbolTable,
}

impl NameChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the whole program and hand back the populated table.
    pub fn check(mut self, program: &Program) -> CompileResult<SymbolTable> {
        for stmt in &program.body {
            self.check_stmt(stmt)?;
        }
        debug!(symbols = self.table.len(), "name check passed");
        Ok(self.table)
    }

    fn check_block(&mut self, block: &Block) -> CompileResult<()> {
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::FuncDef(def) => {
                self.table.define(&def.name, SymbolKind::Function);
                for param in &def.params {
                    self.table.define(param, SymbolKind::Variable);
                }
                self.check_block(&def.body)
            }
            Stmt::If { cond, then_block, else_block } => {
                self.check_expr(cond)?;
                self.check_block(then_block)?;
                if let Some(else_block) = else_block {
                    self.check_block(else_block)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.check_expr(cond)?;
                self.check_block(body)
            }
            Stmt::Assign { target, value } => {
                // RHS first: `x = x + 1;` is rejected when `x` is new.
                self.check_expr(value)?;
                self.table.define(target, SymbolKind::Variable);
                Ok(())
            }
            Stmt::Print(value) | Stmt::Return(value) => self.check_expr(value),
            Stmt::Call(call) => self.check_call(call),
        }
    }

    fn check_call(&self, call: &Call) -> CompileResult<()> {
        if self.table.lookup(&call.name) != Some(SymbolKind::Function) {
            return Err(CompileError::UndefinedName {
                name: call.name.clone(),
                expected: NameRequirement::Function,
            });
        }
        for arg in &call.args {
            self.check_expr(arg)?;
        }
        Ok(())
    }

    fn check_expr(&self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Ident(name) => {
                if self.table.lookup(name).is_none() {
                    return Err(CompileError::UndefinedName {
                        name: name.clone(),
                        expected: NameRequirement::VariableOrFunction,
                    });
                }
                Ok(())
            }
            Expr::Call(call) => self.check_call(call),
            Expr::BinOp { lhs, rhs, .. } | Expr::RelOp { lhs, rhs, .. } => {
                self.check_expr(lhs)?;
                self.check_expr(rhs)
            }
        }
    }
}

/// Run the name checker over `program`.
pub fn check(program: &Program) -> CompileResult<SymbolTable> {
    NameChecker::new().check(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn run(source: &str) -> CompileResult<SymbolTable> {
        check(&parse(tokenize(source)?)?)
    }

    fn undefined(name: &str, expected: NameRequirement) -> CompileError {
        CompileError::UndefinedName { name: name.into(), expected }
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run("y = z + 1;").unwrap_err(),
            undefined("z", NameRequirement::VariableOrFunction)
        );
    }

    #[test]
    fn test_self_reference_on_first_assignment() {
        assert_eq!(
            run("x = x + 1;").unwrap_err(),
            undefined("x", NameRequirement::VariableOrFunction)
        );
        assert!(run("x = 0; x = x + 1;").is_ok());
    }

    #[test]
    fn test_call_requires_function() {
        assert_eq!(run("y = f(1);").unwrap_err(), undefined("f", NameRequirement::Function));
        assert_eq!(
            run("f = 1; y = f(1);").unwrap_err(),
            undefined("f", NameRequirement::Function)
        );
    }

    #[test]
    fn test_function_and_params_registered() {
        let table = run("def add(a, b) { return a + b; } s = add(1, 2); print s;").unwrap();
        assert_eq!(table.lookup("add"), Some(SymbolKind::Function));
        assert_eq!(table.lookup("a"), Some(SymbolKind::Variable));
        assert_eq!(table.lookup("b"), Some(SymbolKind::Variable));
        assert_eq!(table.lookup("s"), Some(SymbolKind::Variable));
    }

    #[test]
    fn test_call_before_definition_fails() {
        assert_eq!(
            run("x = f(); def f() { return 1; }").unwrap_err(),
            undefined("f", NameRequirement::Function)
        );
    }

    #[test]
    fn test_no_block_scoping() {
        // Names defined inside blocks stay visible afterwards.
        assert!(run("if (1) { inner = 2; } print inner;").is_ok());
        assert!(run("def f(p) { return p; } print p;").is_ok());
    }

    #[test]
    fn test_redefinition_last_write_wins() {
        let table = run("def f() { return 1; } f = 2;").unwrap();
        assert_eq!(table.lookup("f"), Some(SymbolKind::Variable));
        assert_eq!(
            run("def f() { return 1; } f = 2; x = f();").unwrap_err(),
            undefined("f", NameRequirement::Function)
        );
    }

    #[test]
    fn test_function_name_usable_as_value() {
        assert!(run("def f() { return 1; } x = f;").is_ok());
    }
}
