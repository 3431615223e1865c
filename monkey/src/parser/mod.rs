//! Pratt parser over the logos token stream

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Span, Spanned, Stmt};
use crate::error::{CompileError, Result};
use crate::lexer::Token;


/// Deepest expression nesting accepted before parsing gives up
pub const MAX_NESTING_DEPTH: usize = 1024;

/// Stack growth parameters for deeply nested input
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Binding power, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(token: &Token) -> Precedence {
    match token {
        Token::EqEq | Token::NotEq => Precedence::Equals,
        Token::Lt | Token::Gt => Precedence::LessGreater,
        Token::Plus | Token::Minus => Precedence::Sum,
        Token::Star | Token::Slash => Precedence::Product,
        Token::LParen => Precedence::Call,
        Token::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_op(token: &Token) -> Option<InfixOp> {
    Some(match token {
        Token::Plus => InfixOp::Add,
        Token::Minus => InfixOp::Sub,
        Token::Star => InfixOp::Mul,
        Token::Slash => InfixOp::Div,
        Token::Lt => InfixOp::Lt,
        Token::Gt => InfixOp::Gt,
        Token::EqEq => InfixOp::Eq,
        Token::NotEq => InfixOp::NotEq,
        _ => return None,
    })
}

/// Parse tokens into AST
pub fn parse(_filename: &str, source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    Parser::new(tokens, source.len()).parse_program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// Current expression nesting, see `MAX_NESTING_DEPTH`
    depth: usize,
    /// Span of end-of-input, for errors at EOF
    eof: Span,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>, source_len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            eof: Span::new(source_len, source_len),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or(self.eof)
    }

    /// End of the most recently consumed token
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, s)| s.end)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span> {
        match self.advance() {
            Some((token, span)) if token == expected => Ok(span),
            Some((token, span)) => Err(CompileError::parser(
                format!("expected `{expected}`, found `{token}`"),
                span,
            )),
            None => Err(CompileError::parser(
                format!("expected `{expected}`, found end of input"),
                self.eof,
            )),
        }
    }

    fn parse_program(mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.peek_span().start;
        let stmt = if self.eat(&Token::Let) {
            let name = match self.advance() {
                Some((Token::Ident(name), span)) => Spanned::new(name, span),
                Some((token, span)) => {
                    return Err(CompileError::parser(
                        format!("expected identifier after `let`, found `{token}`"),
                        span,
                    ));
                }
                None => {
                    return Err(CompileError::parser(
                        "expected identifier after `let`, found end of input",
                        self.eof,
                    ));
                }
            };
            self.expect(Token::Assign)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            Stmt::Let { name, value }
        } else {
            Stmt::Expr(self.parse_expression(Precedence::Lowest)?)
        };
        self.eat(&Token::Semi);
        Ok(Spanned::new(stmt, Span::new(start, self.prev_end())))
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(CompileError::parser(
                    "unterminated block, expected `}`",
                    self.eof,
                ));
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Spanned<Expr>> {
        let depth = self.depth;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.parse_expression_inner(precedence)
        });
        self.depth = depth;
        result
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Result<Spanned<Expr>> {
        self.descend()?;
        let mut left = self.parse_prefix()?;

        while let Some(next) = self.peek().cloned() {
            if precedence >= precedence_of(&next) {
                break;
            }
            // Each operator in a chain wraps `left` one level deeper
            self.descend()?;
            left = match next {
                Token::LParen => self.parse_call(left)?,
                Token::LBracket => self.parse_index(left)?,
                _ => self.parse_infix(left)?,
            };
        }

        Ok(left)
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(CompileError::parser(
                format!("expression nested too deeply (limit {MAX_NESTING_DEPTH})"),
                self.peek_span(),
            ));
        }
        Ok(())
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Expr>> {
        let Some((token, span)) = self.advance() else {
            return Err(CompileError::parser(
                "expected expression, found end of input",
                self.eof,
            ));
        };

        let node = match token {
            Token::IntLit(n) => Expr::IntLit(n),
            Token::StringLit(s) => Expr::StringLit(s),
            Token::True => Expr::BoolLit(true),
            Token::False => Expr::BoolLit(false),
            Token::Null => Expr::Null,
            Token::Ident(name) => Expr::Ident(name),
            Token::Bang => self.parse_prefix_op(PrefixOp::Not)?,
            Token::Minus => self.parse_prefix_op(PrefixOp::Neg)?,
            Token::LParen => {
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(Token::RParen)?;
                // Grouping keeps the inner node; the span grows to the parens
                return Ok(Spanned::new(inner.node, Span::new(span.start, self.prev_end())));
            }
            Token::LBracket => Expr::Array(self.parse_expression_list(Token::RBracket)?),
            Token::LBrace => self.parse_hash()?,
            Token::If => self.parse_if()?,
            other => {
                return Err(CompileError::parser(
                    format!("unexpected token `{other}`"),
                    span,
                ));
            }
        };

        Ok(Spanned::new(node, Span::new(span.start, self.prev_end())))
    }

    fn parse_prefix_op(&mut self, op: PrefixOp) -> Result<Expr> {
        let expr = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix {
            op,
            expr: Box::new(expr),
        })
    }

    fn parse_infix(&mut self, left: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let (token, span) = self
            .advance()
            .ok_or_else(|| CompileError::parser("expected operator", self.eof))?;
        let op = infix_op(&token)
            .ok_or_else(|| CompileError::parser(format!("unexpected token `{token}`"), span))?;
        let right = self.parse_expression(precedence_of(&token))?;
        let span = left.span.merge(right.span);
        Ok(Spanned::new(
            Expr::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        ))
    }

    fn parse_call(&mut self, callee: Spanned<Expr>) -> Result<Spanned<Expr>> {
        self.expect(Token::LParen)?;
        let args = self.parse_expression_list(Token::RParen)?;
        let span = Span::new(callee.span.start, self.prev_end());
        Ok(Spanned::new(
            Expr::Call {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    fn parse_index(&mut self, target: Spanned<Expr>) -> Result<Spanned<Expr>> {
        self.expect(Token::LBracket)?;
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(Token::RBracket)?;
        let span = Span::new(target.span.start, self.prev_end());
        Ok(Spanned::new(
            Expr::Index {
                target: Box::new(target),
                index: Box::new(index),
            },
            span,
        ))
    }

    /// Comma separated expressions up to `close`; the opener is already consumed
    fn parse_expression_list(&mut self, close: Token) -> Result<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(close)?;
            return Ok(items);
        }
    }

    fn parse_hash(&mut self) -> Result<Expr> {
        let mut pairs = Vec::new();
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Hash(pairs));
        }
        loop {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect(Token::Colon)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RBrace)?;
            return Ok(Expr::Hash(pairs));
        }
    }

    fn parse_if(&mut self) -> Result<Expr> {
        self.expect(Token::LParen)?;
        let cond = self.parse_expression(Precedence::Lowest)?;
        self.expect(Token::RParen)?;
        let consequence = self.parse_block()?;
        let alternative = if self.eat(&Token::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expr::If {
            cond: Box::new(cond),
            consequence,
            alternative,
        })
    }
}
