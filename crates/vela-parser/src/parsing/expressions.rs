//! Expression parsing with precedence climbing.

use crate::ast::{Alias, BinOpKind, Expr, JoinDirection, Slice, UnaryOpKind};
use crate::parsing::parser::Parser;
use vela_core::{Error, Result};
use vela_lexer::TokenKind;

impl Parser<'_> {
    /// Parses a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.match_token(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(left, BinOpKind::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;
        while self.match_token(&TokenKind::And) {
            let right = self.parse_not()?;
            left = binary(left, BinOpKind::And, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.match_token(&TokenKind::Not) {
            let operand = self.parse_not()?;
            Ok(Expr::Unary {
                op: UnaryOpKind::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.match_token(&TokenKind::Less) {
                BinOpKind::Lt
            } else if self.match_token(&TokenKind::LessEqual) {
                BinOpKind::Le
            } else if self.match_token(&TokenKind::Greater) {
                BinOpKind::Gt
            } else if self.match_token(&TokenKind::GreaterEqual) {
                BinOpKind::Ge
            } else if self.match_token(&TokenKind::EqualEqual) {
                BinOpKind::Eq
            } else if self.match_token(&TokenKind::BangEqual) {
                BinOpKind::Ne
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.match_token(&TokenKind::Plus) {
                BinOpKind::Add
            } else if self.match_token(&TokenKind::Minus) {
                BinOpKind::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.match_token(&TokenKind::Star) {
                BinOpKind::Mul
            } else if self.match_token(&TokenKind::Slash) {
                BinOpKind::Div
            } else if self.match_token(&TokenKind::Percent) {
                BinOpKind::Rem
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = if self.match_token(&TokenKind::Minus) {
            UnaryOpKind::Neg
        } else if self.match_token(&TokenKind::Plus) {
            UnaryOpKind::Pos
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(&TokenKind::LeftParen) {
                let args = self.parse_args()?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.check(&TokenKind::Dollar) && self.check_ahead(1, &TokenKind::LeftParen) {
                self.advance();
                self.advance();
                let args = self.parse_args()?;
                expr = Expr::TemplateInst {
                    func: Box::new(expr),
                    args,
                };
            } else if self.match_token(&TokenKind::Dot) {
                let member = self.expect_identifier()?;
                expr = Expr::Member {
                    value: Box::new(expr),
                    member,
                };
            } else if self.match_token(&TokenKind::LeftBracket) {
                let slice = self.parse_slice()?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    slice,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("expression"));
        };
        let text = token.text.clone();
        match token.kind {
            TokenKind::Integer => {
                self.advance();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| self.literal_error("integer", &text))?;
                Ok(Expr::Integer(value))
            }
            TokenKind::Float => {
                self.advance();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| self.literal_error("float", &text))?;
                Ok(Expr::Float(value))
            }
            TokenKind::IntegerSuffix => {
                self.advance();
                let split = text
                    .find(|c: char| !c.is_ascii_digit())
                    .expect("suffix literal has a suffix");
                let value = text[..split]
                    .parse::<i64>()
                    .map_err(|_| self.literal_error("integer", &text))?;
                Ok(Expr::SuffixedLiteral {
                    literal: Box::new(Expr::Integer(value)),
                    suffix: text[split..].to_string(),
                })
            }
            TokenKind::FloatSuffix => {
                self.advance();
                let dot = text.find('.').expect("float literal has a dot");
                let split = text[dot + 1..]
                    .find(|c: char| !c.is_ascii_digit())
                    .map(|i| dot + 1 + i)
                    .expect("suffix literal has a suffix");
                let value = text[..split]
                    .parse::<f64>()
                    .map_err(|_| self.literal_error("float", &text))?;
                Ok(Expr::SuffixedLiteral {
                    literal: Box::new(Expr::Float(value)),
                    suffix: text[split..].to_string(),
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Str(unescape(&text[1..text.len() - 1])))
            }
            TokenKind::Char => {
                self.advance();
                let inner = unescape(&text[1..text.len() - 1]);
                let c = inner
                    .chars()
                    .next()
                    .ok_or_else(|| self.literal_error("character", &text))?;
                Ok(Expr::Char(c))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Id(text))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut values = Vec::new();
                if !self.check(&TokenKind::RightBracket) {
                    values.push(self.parse_expr()?);
                    while self.match_token(&TokenKind::Comma) {
                        values.push(self.parse_expr()?);
                    }
                }
                self.expect(&TokenKind::RightBracket)?;
                Ok(Expr::List(values))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::From => self.parse_query(),
            TokenKind::Sort => self.parse_sort(),
            TokenKind::Join => self.parse_join(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Arguments of a call; the opening paren is already consumed.
    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            args.push(self.parse_expr()?);
            while self.match_token(&TokenKind::Comma) {
                args.push(self.parse_expr()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(args)
    }

    /// The contents of `value[...]`; the opening bracket is consumed.
    fn parse_slice(&mut self) -> Result<Slice> {
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let slice = if self.match_token(&TokenKind::Colon) {
            let upper = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RightBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            let step = if self.match_token(&TokenKind::Colon)
                && !self.check(&TokenKind::RightBracket)
            {
                Some(Box::new(self.parse_expr()?))
            } else {
                None
            };
            Slice::Range { lower, upper, step }
        } else {
            Slice::Index(lower.ok_or_else(|| self.unexpected("subscript expression"))?)
        };
        self.expect(&TokenKind::RightBracket)?;
        Ok(slice)
    }

    /// One `[name =] expr` column.
    fn parse_alias(&mut self) -> Result<Alias> {
        let name = if self.check(&TokenKind::Identifier) && self.check_ahead(1, &TokenKind::Equal) {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Equal)?;
            name
        } else {
            String::new()
        };
        let value = self.parse_expr()?;
        Ok(Alias { name, value })
    }

    fn parse_alias_list(&mut self) -> Result<Vec<Alias>> {
        let mut aliases = vec![self.parse_alias()?];
        while self.match_token(&TokenKind::Comma) {
            aliases.push(self.parse_alias()?);
        }
        Ok(aliases)
    }

    /// `from table [select cols] [by keys] [where filter]`
    fn parse_query(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::From)?;
        let table = self.parse_expr()?;
        let cols = if self.match_token(&TokenKind::Select) {
            self.parse_alias_list()?
        } else {
            Vec::new()
        };
        let by = if self.match_token(&TokenKind::By) {
            self.parse_alias_list()?
        } else {
            Vec::new()
        };
        let filter = if self.match_token(&TokenKind::Where) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        if cols.is_empty() && by.is_empty() && filter.is_none() {
            return Err(self.unexpected("'select', 'by', or 'where'"));
        }
        Ok(Expr::Query {
            table: Box::new(table),
            cols,
            by,
            filter,
        })
    }

    /// `sort table by keys`
    fn parse_sort(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::Sort)?;
        let table = self.parse_expr()?;
        self.expect(&TokenKind::By)?;
        let by = self.parse_alias_list()?;
        Ok(Expr::Sort {
            table: Box::new(table),
            by,
        })
    }

    /// `join left, right [on keys] [asof key [strict] [dir] [within tol]]`
    fn parse_join(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::Join)?;
        let left = self.parse_expr()?;
        self.expect(&TokenKind::Comma)?;
        let right = self.parse_expr()?;
        let on = if self.match_token(&TokenKind::On) {
            self.parse_alias_list()?
        } else {
            Vec::new()
        };

        let mut asof = None;
        let mut strict = false;
        let mut direction = JoinDirection::default();
        let mut within = None;
        if self.match_token(&TokenKind::Asof) {
            asof = Some(Box::new(self.parse_alias()?));
            loop {
                if self.match_token(&TokenKind::Strict) {
                    strict = true;
                } else if self.match_token(&TokenKind::Nearest) {
                    direction = JoinDirection::Nearest;
                } else if self.match_token(&TokenKind::Backward) {
                    direction = JoinDirection::Backward;
                } else if self.match_token(&TokenKind::Forward) {
                    direction = JoinDirection::Forward;
                } else if self.match_token(&TokenKind::Within) {
                    within = Some(Box::new(self.parse_expr()?));
                } else {
                    break;
                }
            }
        }

        Ok(Expr::Join {
            left: Box::new(left),
            right: Box::new(right),
            on,
            asof,
            strict,
            direction,
            within,
        })
    }

    fn literal_error(&self, what: &str, text: &str) -> Error {
        Error::Parser(format!("Invalid {what} literal '{text}'"), self.current_span())
    }
}

fn binary(left: Expr, op: BinOpKind, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// Resolves backslash escapes in string and character literals.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
