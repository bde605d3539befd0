//! Statement and definition parsing.

use crate::ast::{DeclKind, Declaration, Expr, FunctionDef, Module, Stmt};
use crate::parsing::parser::Parser;
use vela_core::Result;
use vela_lexer::TokenKind;

impl Parser<'_> {
    /// Parses a complete module.
    pub fn parse_module(&mut self) -> Result<Module> {
        let mut body = self.parse_block(&[])?;
        if !self.is_at_end() {
            return Err(self.unexpected("statement"));
        }
        let docstring = extract_docstring(&mut body);
        Ok(Module { body, docstring })
    }

    /// Parses statements until one of `stop` (or end of input) is reached.
    pub(crate) fn parse_block(&mut self, stop: &[TokenKind]) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();
        self.skip_separators();
        while !self.is_at_end() && !stop.iter().any(|k| self.check(k)) {
            statements.push(self.parse_statement()?);
            self.end_of_statement(stop)?;
            self.skip_separators();
        }
        Ok(statements)
    }

    /// Requires a statement separator (or an upcoming block terminator).
    fn end_of_statement(&mut self, stop: &[TokenKind]) -> Result<()> {
        if self.is_at_end()
            || self.check(&TokenKind::Newline)
            || self.check(&TokenKind::Semicolon)
            || stop.iter().any(|k| self.check(k))
        {
            Ok(())
        } else {
            Err(self.unexpected("end of statement"))
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Data) => self.parse_data_def(),
            Some(TokenKind::Def) => self.parse_function_def(),
            Some(TokenKind::Let) => self.parse_decl(DeclKind::Let),
            Some(TokenKind::Var) => self.parse_decl(DeclKind::Var),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Del) => self.parse_del(),
            Some(TokenKind::Import) => self.parse_import(),
            Some(TokenKind::From)
                if self.check_ahead(1, &TokenKind::Identifier)
                    && self.check_ahead(2, &TokenKind::Import) =>
            {
                self.parse_import_from()
            }
            Some(TokenKind::Identifier) if self.check_ahead(1, &TokenKind::ColonEqual) => {
                self.parse_walrus_decl()
            }
            _ => self.parse_expr_or_assign(),
        }
    }

    /// `data Name: field: Type, ... end`
    fn parse_data_def(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Data)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        self.skip_newlines();

        let mut body = vec![self.parse_declaration()?];
        while self.match_token(&TokenKind::Comma) {
            self.skip_newlines();
            body.push(self.parse_declaration()?);
        }
        self.skip_newlines();
        self.expect(&TokenKind::End)?;
        Ok(Stmt::DataDef { name, body })
    }

    /// `def name(args) [-> type]: body end`
    fn parse_function_def(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Def)?;
        let name = self.expect_function_name()?;
        self.expect(&TokenKind::LeftParen)?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            args.push(self.parse_declaration()?);
            while self.match_token(&TokenKind::Comma) {
                args.push(self.parse_declaration()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;

        let explicit_rettype = if self.match_token(&TokenKind::Arrow) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Colon)?;

        let mut body = self.parse_block(&[TokenKind::End])?;
        self.expect(&TokenKind::End)?;
        let docstring = extract_docstring(&mut body);

        Ok(Stmt::FunctionDef(FunctionDef {
            name,
            args,
            explicit_rettype,
            body,
            docstring,
        }))
    }

    /// `name [: type] [= value]`
    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration> {
        let name = self.expect_identifier()?;
        let explicit_type = if self.match_token(&TokenKind::Colon) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let value = if self.match_token(&TokenKind::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Declaration {
            name,
            explicit_type,
            value,
        })
    }

    fn parse_decl(&mut self, kind: DeclKind) -> Result<Stmt> {
        self.advance(); // let / var
        let mut decls = vec![self.parse_declaration()?];
        while self.match_token(&TokenKind::Comma) {
            decls.push(self.parse_declaration()?);
        }
        Ok(Stmt::Decl { kind, decls })
    }

    /// `name := value`, sugar for `var name = value`.
    fn parse_walrus_decl(&mut self) -> Result<Stmt> {
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::ColonEqual)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Decl {
            kind: DeclKind::Var,
            decls: vec![Declaration {
                name,
                explicit_type: None,
                value: Some(value),
            }],
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::If)?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_block(&[TokenKind::Else, TokenKind::End])?;
        let orelse = if self.match_token(&TokenKind::Else) {
            self.expect(&TokenKind::Colon)?;
            self.parse_block(&[TokenKind::End])?
        } else {
            Vec::new()
        };
        self.expect(&TokenKind::End)?;
        Ok(Stmt::If { test, body, orelse })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::While)?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_block(&[TokenKind::End])?;
        self.expect(&TokenKind::End)?;
        Ok(Stmt::While { test, body })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Return)?;
        let value = if self.is_at_end()
            || self.check(&TokenKind::Newline)
            || self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::End)
            || self.check(&TokenKind::Else)
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(Stmt::Return(value))
    }

    fn parse_del(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Del)?;
        let mut targets = vec![self.parse_expr()?];
        while self.match_token(&TokenKind::Comma) {
            targets.push(self.parse_expr()?);
        }
        Ok(Stmt::Del(targets))
    }

    fn parse_import(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::Import)?;
        let module = self.expect_identifier()?;
        Ok(Stmt::Import { module })
    }

    fn parse_import_from(&mut self) -> Result<Stmt> {
        self.expect(&TokenKind::From)?;
        let module = self.expect_identifier()?;
        self.expect(&TokenKind::Import)?;
        let mut names = vec![self.expect_identifier()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }
        Ok(Stmt::ImportFrom { module, names })
    }

    fn parse_expr_or_assign(&mut self) -> Result<Stmt> {
        let expr = self.parse_expr()?;
        if self.match_token(&TokenKind::Equal) {
            let value = self.parse_expr()?;
            Ok(Stmt::Assign {
                target: expr,
                value,
            })
        } else {
            Ok(Stmt::Expr(expr))
        }
    }
}

/// Pops a leading string-literal statement off a body as its docstring.
fn extract_docstring(body: &mut Vec<Stmt>) -> String {
    if let Some(Stmt::Expr(Expr::Str(_))) = body.first() {
        if let Stmt::Expr(Expr::Str(doc)) = body.remove(0) {
            return doc;
        }
    }
    String::new()
}
