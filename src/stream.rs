//! Pull-based access to a lexed token sequence.
//!
//! This is the surface a declaration parser consumes: look ahead without
//! consuming, consume one token, or require the next token to be of a
//! given kind.

use crate::lexer::LexError;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("expected {expected:?}, found {found}")]
    Unexpected { expected: Vec<TokenKind>, found: Token },
}

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, pos: 0 }
    }

    /// Index of the next token to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn finished(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Watch the token `n` ahead of the cursor without consuming it.
    pub fn peek(&self, n: usize) -> Result<&Token, LexError> {
        let at = self.pos + n;
        self.tokens.get(at).ok_or_else(|| LexError::UnexpectedEof {
            position: self.end_position(),
        })
    }

    /// Peek and check the kind, never failing at end of input.
    pub fn check(&self, kind: TokenKind) -> bool {
        self.tokens.get(self.pos).map_or(false, |t| t.is(kind))
    }

    /// Consume the next token and return it.
    pub fn read(&mut self) -> Result<Token, LexError> {
        let token = self.peek(0)?.clone();
        self.pos += 1;
        Ok(token)
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    /// Next token must be of `kind`.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, StreamError> {
        self.expect_any(&[kind])
    }

    /// Next token must be one of `kinds`.
    pub fn expect_any(&mut self, kinds: &[TokenKind]) -> Result<Token, StreamError> {
        let token = self.peek(0)?;
        if kinds.contains(&token.kind()) {
            return Ok(self.read()?);
        }
        Err(StreamError::Unexpected {
            expected: kinds.to_vec(),
            found: token.clone(),
        })
    }

    /// Consume the next token only if it is of `kind`.
    pub fn consume_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.read().ok()
        } else {
            None
        }
    }

    fn end_position(&self) -> usize {
        self.tokens
            .last()
            .map_or(0, |t| t.position() + t.text().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn expect_and_peek() {
        let mut stream = TokenStream::new(lex("@type Ship : \"shïp\";").unwrap());
        assert_eq!(stream.expect(TokenKind::Directive).unwrap().text(), "type");
        assert!(stream.check(TokenKind::Identifier));
        assert_eq!(stream.peek(1).unwrap().kind(), TokenKind::Colon);
        let err = stream.expect(TokenKind::String).unwrap_err();
        assert!(matches!(err, StreamError::Unexpected { .. }));
        stream.advance(2);
        assert_eq!(stream.read().unwrap().text(), "shïp");
        assert!(stream.consume_if(TokenKind::Semicolon).is_some());
        assert!(stream.finished());
    }

    #[test]
    fn peek_past_end_is_a_lexical_error() {
        let stream = TokenStream::new(lex("a").unwrap());
        assert!(matches!(stream.peek(1), Err(LexError::UnexpectedEof { .. })));
    }
}
