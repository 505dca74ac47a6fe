use crate::script::ast::{AssignOp, BinaryOp, Expr, Lit, PathExpr, Program, Stmt, UnaryOp};
use crate::script::error::LangError;
use crate::script::lexer::{Span, Token, TokenKind, lex};

/// Parse a full script body: a sequence of statements.
pub(crate) fn parse_script(src: &str) -> Result<Program, LangError> {
    let tokens = lex(src)?;
    let mut p = Parser { tokens, pos: 0 };
    let mut body = Vec::new();
    while p.peek().kind != TokenKind::Eof {
        body.push(p.parse_stmt()?);
    }
    Ok(Program { body })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if t.kind != TokenKind::Eof {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), LangError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(LangError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    // ---- statements ----

    fn parse_stmt(&mut self) -> Result<Stmt, LangError> {
        if self.peek().kind == TokenKind::If {
            return self.parse_if();
        }

        let start = self.span();
        let expr = self.parse_expr()?;

        let assign_op = match self.peek().kind {
            TokenKind::Assign => Some(AssignOp::Set),
            TokenKind::PlusAssign => Some(AssignOp::Add),
            TokenKind::MinusAssign => Some(AssignOp::Sub),
            TokenKind::StarAssign => Some(AssignOp::Mul),
            TokenKind::SlashAssign => Some(AssignOp::Div),
            _ => None,
        };

        if let Some(op) = assign_op {
            let op_span = self.span();
            self.bump();
            let target = match expr {
                Expr::Path(p) => p,
                _ => {
                    return Err(LangError::new(
                        op_span.start,
                        "assignment target must be an identifier path",
                    ));
                }
            };
            let value = self.parse_expr()?;
            let end = self.end_of_stmt()?;
            return Ok(Stmt::Assign {
                span: Span {
                    start: target.span.start,
                    end,
                },
                target,
                op,
                value,
            });
        }

        let end = self.end_of_stmt()?;
        Ok(Stmt::Expr {
            expr,
            span: Span {
                start: start.start,
                end,
            },
        })
    }

    /// Consume the statement terminator. Semicolons are required between
    /// statements but optional before `}` and at end of input.
    fn end_of_stmt(&mut self) -> Result<usize, LangError> {
        let here = self.span();
        if self.consume(TokenKind::Semi) {
            return Ok(here.end);
        }
        match self.peek().kind {
            TokenKind::Eof | TokenKind::RBrace => Ok(here.start),
            _ => Err(LangError::new(
                here.start,
                format!("expected ';', found {:?}", self.peek().kind),
            )),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, LangError> {
        let start = self.span();
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_body = self.parse_block()?;
        let else_body = if self.consume(TokenKind::Else) {
            if self.peek().kind == TokenKind::If {
                vec![self.parse_if()?]
            } else {
                self.parse_block()?
            }
        } else {
            Vec::new()
        };
        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
            span: Span {
                start: start.start,
                end,
            },
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, LangError> {
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(body)
    }

    // ---- expressions, lowest to highest precedence ----

    fn parse_expr(&mut self) -> Result<Expr, LangError> {
        let cond = self.parse_or()?;
        if self.consume(TokenKind::Question) {
            let then_expr = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let else_expr = self.parse_expr()?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_and()?;
        while self.consume(TokenKind::OrOr) {
            let r = self.parse_and()?;
            e = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_and(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_equality()?;
        while self.consume(TokenKind::AndAnd) {
            let r = self.parse_equality()?;
            e = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_equality(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_comparison()?;
        loop {
            let op = if self.consume(TokenKind::EqEq) {
                BinaryOp::Eq
            } else if self.consume(TokenKind::Ne) {
                BinaryOp::Ne
            } else {
                break;
            };
            let r = self.parse_comparison()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_comparison(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_term()?;
        loop {
            let op = if self.consume(TokenKind::Lt) {
                BinaryOp::Lt
            } else if self.consume(TokenKind::Le) {
                BinaryOp::Le
            } else if self.consume(TokenKind::Gt) {
                BinaryOp::Gt
            } else if self.consume(TokenKind::Ge) {
                BinaryOp::Ge
            } else {
                break;
            };
            let r = self.parse_term()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_term(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_factor()?;
        loop {
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let r = self.parse_factor()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_factor(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_unary()?;
        loop {
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.consume(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let r = self.parse_unary()?;
            e = Expr::Binary {
                op,
                left: Box::new(e),
                right: Box::new(r),
            };
        }
        Ok(e)
    }

    fn parse_unary(&mut self) -> Result<Expr, LangError> {
        if self.consume(TokenKind::Minus) {
            let e = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(e),
            });
        }
        if self.consume(TokenKind::Bang) {
            let e = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(e),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, LangError> {
        let mut e = self.parse_primary()?;

        loop {
            if self.peek().kind == TokenKind::Dot {
                let dot_span = self.span();
                self.bump();
                let t = self.bump().clone();
                let name = match t.kind {
                    TokenKind::Ident(s) => s,
                    other => {
                        return Err(LangError::new(
                            t.span.start,
                            format!("expected ident after '.', found {other:?}"),
                        ));
                    }
                };
                e = match e {
                    Expr::Path(mut p) => {
                        p.segments.push(name);
                        p.span.end = t.span.end;
                        Expr::Path(p)
                    }
                    _ => {
                        return Err(LangError::new(
                            dot_span.start,
                            "member access base must be an identifier path",
                        ));
                    }
                };
                continue;
            }

            if self.peek().kind == TokenKind::LParen {
                let open = self.span();
                self.bump();
                let args = self.parse_args()?;
                let close_end = self.tokens[self.pos.saturating_sub(1)].span.end;
                let callee = match e {
                    Expr::Path(p) => p,
                    _ => {
                        return Err(LangError::new(
                            open.start,
                            "call target must be an identifier path",
                        ));
                    }
                };
                e = Expr::Call {
                    span: Span {
                        start: callee.span.start,
                        end: close_end,
                    },
                    callee,
                    args,
                };
                continue;
            }

            break;
        }

        Ok(e)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, LangError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, LangError> {
        let t = self.bump().clone();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Lit(Lit::Num(v))),
            TokenKind::Str(s) => Ok(Expr::Lit(Lit::Str(s))),
            TokenKind::True => Ok(Expr::Lit(Lit::Bool(true))),
            TokenKind::False => Ok(Expr::Lit(Lit::Bool(false))),
            TokenKind::Ident(s) => Ok(Expr::Path(PathExpr {
                segments: vec![s],
                span: t.span,
            })),
            TokenKind::LParen => {
                let e = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(e)
            }
            other => Err(LangError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }
}
