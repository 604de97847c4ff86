//! Recursive-descent parser for condition expressions.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, comparison, additive,
//! multiplicative, unary minus, primary.

use crate::ast::expression::{
    BinaryExpression, BinaryOperator, Expression, FunctionCall, InvalidExpression, Literal,
    PathExpression, UnaryExpression, UnaryOperator,
};
use crate::ast::Span;
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::tokenize;
use smol_str::SmolStr;

/// Nesting beyond this depth is rejected instead of recursing further.
const MAX_NESTING: usize = 128;

/// Result of parsing one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionParseResult {
    /// The parsed tree, or `None` when any error was reported.
    pub expression: Option<Expression>,
    /// Lexer and parser diagnostics.
    pub diagnostics: Vec<Diag>,
}

impl ExpressionParseResult {
    /// Returns the parsed tree, or an [`Expression::Invalid`] node carrying the
    /// first error when parsing failed.
    pub fn into_expression(self, source: &str) -> Expression {
        match self.expression {
            Some(expression) => expression,
            None => {
                let (message, span) = self
                    .diagnostics
                    .into_iter()
                    .next()
                    .map(|diag| {
                        let span = diag
                            .label
                            .map(|label| label.span)
                            .unwrap_or(0..source.len());
                        (diag.message, span)
                    })
                    .unwrap_or_else(|| ("malformed expression".to_string(), 0..source.len()));
                Expression::Invalid(InvalidExpression {
                    text: SmolStr::new(source),
                    message,
                    span,
                })
            }
        }
    }
}

/// Parses the text of a `$${...}` entry.
pub fn parse_expression(source: &str) -> ExpressionParseResult {
    let lexed = tokenize(source);
    let mut parser = ExpressionParser {
        source,
        tokens: lexed.tokens,
        pos: 0,
        depth: 0,
        diagnostics: lexed.diagnostics,
    };

    let expression = parser.parse_root();
    let expression = if !parser.diagnostics.is_empty() {
        None
    } else {
        expression
    };

    ExpressionParseResult {
        expression,
        diagnostics: parser.diagnostics,
    }
}

struct ExpressionParser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    diagnostics: Vec<Diag>,
}

impl<'s> ExpressionParser<'s> {
    fn parse_root(&mut self) -> Option<Expression> {
        if self.peek().kind == TokenKind::Eof {
            self.error_at(self.peek().span.clone(), "empty expression", "expected an expression");
            return None;
        }
        let expression = self.parse_or()?;
        if self.peek().kind != TokenKind::Eof {
            let token = self.peek().clone();
            self.error_at(
                token.span,
                format!("unexpected {} after expression", token.kind),
                "expected end of expression",
            );
            return None;
        }
        Some(expression)
    }

    fn parse_or(&mut self) -> Option<Expression> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOperator::Or, left, right);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expression> {
        let mut left = self.parse_not()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_not()?;
            left = binary(BinaryOperator::And, left, right);
        }
        Some(left)
    }

    fn parse_not(&mut self) -> Option<Expression> {
        if self.peek().kind == TokenKind::Not {
            let start = self.advance().span.start;
            let operand = self.nested(Self::parse_not)?;
            let span = start..operand.span().end;
            return Some(Expression::Unary(UnaryExpression {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
                span,
            }));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Option<Expression> {
        let left = self.parse_additive()?;
        let op = match self.peek().kind {
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            TokenKind::Lt => BinaryOperator::Lt,
            TokenKind::LtEq => BinaryOperator::LtEq,
            TokenKind::Gt => BinaryOperator::Gt,
            TokenKind::GtEq => BinaryOperator::GtEq,
            TokenKind::Like => BinaryOperator::Like,
            _ => return Some(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Some(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Option<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        if self.peek().kind == TokenKind::Minus {
            let start = self.advance().span.start;
            let operand = self.nested(Self::parse_unary)?;
            let span = start..operand.span().end;
            return Some(Expression::Unary(UnaryExpression {
                op: UnaryOperator::Minus,
                operand: Box::new(operand),
                span,
            }));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let token = self.advance();
        let text = token.slice(self.source);
        let span = token.span.clone();
        match token.kind {
            TokenKind::Integer => Some(Expression::Literal(Literal::Integer(text.into()), span)),
            TokenKind::Float => Some(Expression::Literal(Literal::Float(text.into()), span)),
            TokenKind::String => {
                let inner = &text[1..text.len() - 1];
                let value = inner.replace("''", "'");
                Some(Expression::Literal(Literal::String(value.into()), span))
            }
            TokenKind::True => Some(Expression::Literal(Literal::Boolean(true), span)),
            TokenKind::False => Some(Expression::Literal(Literal::Boolean(false), span)),
            TokenKind::Null => Some(Expression::Literal(Literal::Null, span)),
            TokenKind::QuotedPath => {
                let inner = span.start + 1..span.end - 1;
                Some(Expression::Path(PathExpression::with_span(
                    &self.source[inner.clone()],
                    inner,
                )))
            }
            TokenKind::PseudoAttribute => {
                Some(Expression::Path(PathExpression::with_span(text, span)))
            }
            TokenKind::Identifier => {
                if self.peek().kind == TokenKind::LParen {
                    self.parse_call(SmolStr::new(text), span)
                } else {
                    Some(Expression::Path(PathExpression::with_span(text, span)))
                }
            }
            TokenKind::LParen => {
                let inner = self.nested(Self::parse_or)?;
                self.expect(TokenKind::RParen, "to close '('")?;
                Some(inner)
            }
            kind => {
                self.error_at(
                    span,
                    format!("unexpected {}", kind),
                    "expected a value, attribute or function call",
                );
                None
            }
        }
    }

    fn parse_call(&mut self, name: SmolStr, name_span: Span) -> Option<Expression> {
        self.advance();
        let mut arguments = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                arguments.push(self.nested(Self::parse_or)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RParen, "to close the argument list")?;
        Some(Expression::Function(FunctionCall {
            name,
            arguments,
            span: name_span.start..close.end,
        }))
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Option<Expression>) -> Option<Expression> {
        if self.depth >= MAX_NESTING {
            self.error_at(
                self.peek().span.clone(),
                "expression nests too deeply",
                "nesting limit reached here",
            );
            return None;
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Option<Span> {
        if self.peek().kind == kind {
            return Some(self.advance().span);
        }
        let token = self.peek().clone();
        self.error_at(
            token.span,
            format!("expected {} {}, found {}", kind, context, token.kind),
            format!("expected {}", kind),
        );
        None
    }

    fn error_at(&mut self, span: Span, message: impl Into<String>, label: impl Into<String>) {
        self.diagnostics.push(
            Diag::new(message)
                .with_label(span, label)
                .with_code("template::parse"),
        );
    }
}

fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    let span = left.span().start..right.span().end;
    Expression::Binary(BinaryExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    })
}
