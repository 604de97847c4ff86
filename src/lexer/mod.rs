//! Lexical analysis for condition expressions.
//!
//! Scanning is driven by the `logos` state machine in [`token`]. The lexer
//! keeps going after an unrecognised character so that the parser sees the
//! whole expression and every problem is reported at once.

pub mod token;

use crate::diag::Diag;
use logos::Logos;
use token::{Token, TokenKind};

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, terminated by an EOF token.
    pub tokens: Vec<Token>,
    /// Diagnostics for characters that do not start any token.
    pub diagnostics: Vec<Diag>,
}

/// Tokenizes a condition expression.
pub fn tokenize(source: &str) -> LexerResult {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(next) = lexer.next() {
        let span = lexer.span();
        match next {
            Ok(kind) => tokens.push(Token::new(kind, span)),
            Err(()) => {
                let text = lexer.slice();
                let message = if text.starts_with('\'') || text.starts_with('"') {
                    "unterminated quoted text".to_string()
                } else {
                    format!("unexpected character '{}'", text)
                };
                diagnostics.push(
                    Diag::new(message)
                        .with_label(span, "not valid here")
                        .with_code("template::lex"),
                );
            }
        }
    }

    let end = source.len();
    tokens.push(Token::new(TokenKind::Eof, end..end));

    LexerResult {
        tokens,
        diagnostics,
    }
}
