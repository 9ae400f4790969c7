use tracing::debug;

use crate::ast::*;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{Span, Token, TokenKind};

static EOF: Token = Token { kind: TokenKind::Eof, span: Span { start: 0, end: 0 } };

/// Recursive-descent parser with one token of lookahead. A second token is
/// peeked only to tell `name(` calls apart from other uses of `name`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn next(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, expected: &'static str) -> CompileError {
        let tok = self.peek();
        CompileError::Syntax { expected, found: tok.kind.name(), pos: tok.span.start }
    }

    fn expect(&mut self, expected: &TokenKind) -> CompileResult<()> {
        if !self.at(expected) {
            return Err(self.error(expected.name()));
        }
        self.next();
        Ok(())
    }

    fn expect_ident(&mut self) -> CompileResult<String> {
        match &self.peek().kind {
            TokenKind::Ident(id) => {
                let id = id.clone();
                self.next();
                Ok(id)
            }
            _ => Err(self.error("IDENTIFIER")),
        }
    }

    fn call_ahead(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident(_))
            && self.peek_nth(1).kind == TokenKind::LParen
    }

    pub fn parse_program(&mut self) -> CompileResult<Program> {
        let mut body = Vec::new();
        while !self.at(&TokenKind::Eof) {
            let stmt = if self.at(&TokenKind::Def) {
                Stmt::FuncDef(self.parse_func_def()?)
            } else {
                self.parse_statement()?
            };
            body.push(stmt);
        }
        debug!(statements = body.len(), "parsed program");
        Ok(Program { body })
    }

    fn parse_func_def(&mut self) -> CompileResult<FuncDef> {
        self.expect(&TokenKind::Def)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        if matches!(self.peek().kind, TokenKind::Ident(_)) {
            params.push(self.expect_ident()?);
            while self.at(&TokenKind::Comma) {
                self.next();
                params.push(self.expect_ident()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(FuncDef { name, params, body })
    }

    fn parse_block(&mut self) -> CompileResult<Block> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            stmts.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Block { stmts })
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let stmt = match self.peek().kind {
            TokenKind::If => return self.parse_if(),
            TokenKind::While => return self.parse_while(),
            TokenKind::Ident(_) if self.call_ahead() => Stmt::Call(self.parse_call()?),
            TokenKind::Ident(_) => {
                let target = self.expect_ident()?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expr()?;
                Stmt::Assign { target, value }
            }
            TokenKind::Print => {
                self.next();
                Stmt::Print(self.parse_expr()?)
            }
            TokenKind::Return => {
                self.next();
                Stmt::Return(self.parse_expr()?)
            }
            _ => return Err(self.error("statement")),
        };
        self.expect(&TokenKind::Semicolon)?;
        Ok(stmt)
    }

    fn parse_if(&mut self) -> CompileResult<Stmt> {
        self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.at(&TokenKind::Else) {
            self.next();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If { cond, then_block, else_block })
    }

    fn parse_while(&mut self) -> CompileResult<Stmt> {
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_call(&mut self) -> CompileResult<Call> {
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.at(&TokenKind::Comma) {
                self.next();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Call { name, args })
    }

    /// `additive (REL_OP additive)?`. Comparisons do not chain.
    pub fn parse_expr(&mut self) -> CompileResult<Expr> {
        let lhs = self.parse_additive()?;
        if let TokenKind::RelOp(op) = self.peek().kind {
            self.next();
            let rhs = self.parse_additive()?;
            return Ok(Expr::relop(op, lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> CompileResult<Expr> {
        let mut node = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.next();
            node = Expr::binop(op, node, self.parse_term()?);
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let mut node = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Times => BinaryOp::Mul,
                TokenKind::Divide => BinaryOp::Div,
                _ => break,
            };
            self.next();
            node = Expr::binop(op, node, self.parse_factor()?);
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> CompileResult<Expr> {
        match self.peek().kind {
            TokenKind::Number(n) => {
                self.next();
                Ok(Expr::Number(n))
            }
            TokenKind::Ident(_) if self.call_ahead() => Ok(Expr::Call(self.parse_call()?)),
            TokenKind::Ident(_) => Ok(Expr::Ident(self.expect_ident()?)),
            TokenKind::LParen => {
                self.next();
                let node = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(self.error("expression")),
        }
    }
}

/// Parse a full token stream (as produced by the lexer) into a program.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn read(source: &str) -> CompileResult<Program> {
        parse(tokenize(source)?)
    }

    fn expr(source: &str) -> Expr {
        let program = read(&format!("x = {source};")).unwrap();
        match program.body.into_iter().next() {
            Some(Stmt::Assign { value, .. }) => value,
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            expr("2 + 3 * 4").to_string(),
            "binop(+, number(2), binop(*, number(3), number(4)))"
        );
        assert_eq!(
            expr("(2 + 3) * 4").to_string(),
            "binop(*, binop(+, number(2), number(3)), number(4))"
        );
    }

    #[test]
    fn test_left_associative() {
        assert_eq!(
            expr("8 - 4 - 2").to_string(),
            "binop(-, binop(-, number(8), number(4)), number(2))"
        );
        assert_eq!(
            expr("8 / 4 * 2").to_string(),
            "binop(*, binop(/, number(8), number(4)), number(2))"
        );
    }

    #[test]
    fn test_relop_binds_loosest() {
        assert_eq!(
            expr("a + 1 >= b * 2").to_string(),
            "relop(>=, binop(+, identifier(a), number(1)), binop(*, identifier(b), number(2)))"
        );
    }

    #[test]
    fn test_comparisons_do_not_chain() {
        let err = read("x = a < b < c;").unwrap_err();
        assert_eq!(
            err,
            CompileError::Syntax { expected: "SEMICOLON", found: "REL_OP", pos: 10 }
        );
    }

    #[test]
    fn test_call_in_expression() {
        assert_eq!(
            expr("f(a, 2 + b) * g()").to_string(),
            "binop(*, func_call(f, identifier(a), binop(+, number(2), identifier(b))), func_call(g))"
        );
    }

    #[test]
    fn test_func_def_and_statements() {
        let program = read(
            "def max(a, b) { if (a > b) { return a; } else { return b; } }\n\
             m = max(1, 2); print m; show(m); while (m) { m = m - 1; }",
        )
        .unwrap();
        assert_eq!(program.body.len(), 5);
        match &program.body[0] {
            Stmt::FuncDef(def) => {
                assert_eq!(def.name, "max");
                assert_eq!(def.params, vec!["a", "b"]);
                assert_eq!(def.body.stmts.len(), 1);
                assert!(matches!(
                    &def.body.stmts[0],
                    Stmt::If { else_block: Some(_), .. }
                ));
            }
            other => panic!("expected FuncDef, got {other:?}"),
        }
        assert!(matches!(&program.body[2], Stmt::Print(Expr::Ident(name)) if name == "m"));
        assert!(matches!(&program.body[3], Stmt::Call(call) if call.name == "show"));
        assert!(matches!(&program.body[4], Stmt::While { .. }));
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            read("x = 1 y = 2;").unwrap_err(),
            CompileError::Syntax { expected: "SEMICOLON", found: "IDENTIFIER", pos: 6 }
        );
    }

    #[test]
    fn test_invalid_factor() {
        assert_eq!(
            read("x = * 2;").unwrap_err(),
            CompileError::Syntax { expected: "expression", found: "TIMES", pos: 4 }
        );
    }

    #[test]
    fn test_def_only_at_top_level() {
        assert_eq!(
            read("while (1) { def f() { } }").unwrap_err(),
            CompileError::Syntax { expected: "statement", found: "DEF", pos: 12 }
        );
    }

    #[test]
    fn test_unterminated_block() {
        assert_eq!(
            read("if (x) { print x;").unwrap_err(),
            CompileError::Syntax { expected: "statement", found: "EOF", pos: 17 }
        );
    }
}
