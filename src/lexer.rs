//! Hand-rolled lexer for KDL source.
//!
//! A single forward pass over the source bytes. Each position is tried against
//! the scanning rules in a fixed priority order (whitespace, newlines, comments,
//! directives, strings, resource ids, variables/expressions, numbers,
//! identifiers, symbols). Lookahead is bounded: it is only used for the `0x`
//! prefix, the `#auto` literal, `-` before a digit, and the shift operators.
//!
//! `$(` switches the lexer into expression mode. Inside an expression the
//! lexer counts parentheses; a `)` that would take the balance below zero
//! closes the expression instead of producing [`TokenKind::RParen`].

use crate::source::{SourceId, SourceMap};
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unrecognised character {ch:?} at {line}:{offset}")]
    UnrecognisedCharacter {
        ch: char,
        position: usize,
        line: usize,
        offset: usize,
    },
    #[error("unexpected end of input at byte {position}")]
    UnexpectedEof { position: usize },
    #[error("malformed resource id at {line}:{offset}")]
    MalformedResourceId {
        position: usize,
        line: usize,
        offset: usize,
    },
    #[error("unterminated string literal starting at {line}:{offset}")]
    UnterminatedString {
        position: usize,
        line: usize,
        offset: usize,
    },
}

impl LexError {
    /// Absolute byte offset the error refers to.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnrecognisedCharacter { position, .. }
            | LexError::UnexpectedEof { position }
            | LexError::MalformedResourceId { position, .. }
            | LexError::UnterminatedString { position, .. } => *position,
        }
    }
}

/// Scanner mode. Kept per lexer instance, so independent files lex without
/// any shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Inside `$( ... )`; `balance` counts unmatched `(` seen since the opener.
    Expression { balance: i32 },
}

/// Start of the token being scanned.
#[derive(Debug, Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    offset: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    file: Option<SourceId>,
    pos: usize,
    line: usize,
    line_start: usize,
    mode: Mode,
    tokens: Option<Vec<Token>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            file: None,
            pos: 0,
            line: 1,
            line_start: 0,
            mode: Mode::Normal,
            tokens: None,
        }
    }

    /// Lexer over a file held by `map`; produced tokens point back at `id`.
    pub fn for_file(map: &'a SourceMap, id: SourceId) -> Option<Self> {
        let file = map.get(id)?;
        let mut lexer = Lexer::new(file.string_contents());
        lexer.file = Some(id);
        Some(lexer)
    }

    /// Scan the whole source. The result is cached: later calls return the
    /// same tokens without scanning again.
    pub fn analyze(&mut self) -> Result<&[Token], LexError> {
        if self.tokens.is_none() {
            log::debug!("lexing {} bytes", self.source.len());
            let tokens = self.scan()?;
            log::debug!("lexed {} tokens", tokens.len());
            self.tokens = Some(tokens);
        }
        Ok(self.tokens.as_deref().unwrap_or_default())
    }

    pub fn into_tokens(mut self) -> Result<Vec<Token>, LexError> {
        self.analyze()?;
        Ok(self.tokens.unwrap_or_default())
    }
}

/// Lex a standalone piece of source text.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).into_tokens()
}

// ----------------------------------------------------------------------------
// Character classes
// ----------------------------------------------------------------------------

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_identifier(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_decimal(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    /// Byte `n` positions ahead. Running off the end is a lexical error.
    fn peek(&self, n: usize) -> Result<u8, LexError> {
        self.bytes()
            .get(self.pos + n)
            .copied()
            .ok_or(LexError::UnexpectedEof { position: self.pos + n })
    }

    fn peek_is(&self, n: usize, class: impl Fn(u8) -> bool) -> bool {
        self.bytes().get(self.pos + n).map_or(false, |&b| class(b))
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.pos,
            line: self.line,
            offset: self.pos - self.line_start,
        }
    }

    /// Advance past a run of bytes in `class`, returning the consumed slice.
    fn consume_while(&mut self, class: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek_is(0, &class) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    /// End (exclusive) of the run of `class` bytes starting at `from`.
    fn run_end(&self, from: usize, class: impl Fn(u8) -> bool) -> usize {
        let bytes = self.bytes();
        let mut end = from;
        while end < bytes.len() && class(bytes[end]) {
            end += 1;
        }
        end
    }

    fn newline_at(&mut self, index: usize) {
        self.line += 1;
        self.line_start = index + 1;
    }

    fn token(&self, text: impl Into<String>, kind: TokenKind, at: Mark) -> Token {
        Token::new(text, kind, at.position, at.line, at.offset, self.file)
    }

    fn unrecognised(&self, at: Mark) -> LexError {
        let ch = self.source[at.position..].chars().next().unwrap_or('\0');
        LexError::UnrecognisedCharacter {
            ch,
            position: at.position,
            line: at.line,
            offset: at.offset,
        }
    }
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

impl<'a> Lexer<'a> {
    fn scan(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(&ch) = self.bytes().get(self.pos) {
            // 1. Whitespace
            if ch == b' ' || ch == b'\t' {
                self.pos += 1;
                continue;
            }

            // 2. Line breaks
            if ch == b'\n' {
                self.newline_at(self.pos);
                self.pos += 1;
                continue;
            }
            if ch == b'\r' {
                self.pos += 1;
                continue;
            }

            // 3. Comment: ` through end of line
            if ch == b'`' {
                self.consume_while(|b| b != b'\n');
                continue;
            }

            let at = self.mark();
            let token = match ch {
                b'@' => {
                    self.pos += 1;
                    let name = self.consume_while(is_identifier);
                    self.token(name, TokenKind::Directive, at)
                }
                b'"' => self.scan_string(at)?,
                b'#' if self.source[self.pos..].starts_with("#auto") => {
                    let text = &self.source[self.pos + 1..self.pos + 5];
                    self.pos += 5;
                    self.token(text, TokenKind::ResourceId, at)
                }
                b'#' => self.scan_resource_id(at)?,
                b'$' if self.mode == Mode::Normal => self.scan_dollar(at)?,
                b'0' if matches!(self.peek(1), Ok(b'x' | b'X')) && self.peek_is(2, is_hex) => {
                    self.pos += 2;
                    let digits = self.consume_while(is_hex);
                    self.token(format!("0x{digits}"), TokenKind::Integer, at)
                }
                b'-' if self.peek_is(1, is_decimal) => self.scan_number(at),
                c if is_decimal(c) => self.scan_number(at),
                c if is_identifier_start(c) => {
                    let name = self.consume_while(is_identifier);
                    self.token(name, TokenKind::Identifier, at)
                }
                _ => self.scan_symbol(at)?,
            };

            #[cfg(feature = "trace_tokens")]
            log::trace!("{}:{} {}", token.line(), token.offset(), token);

            tokens.push(token);
        }

        if let Mode::Expression { balance } = self.mode {
            log::debug!("input ended inside an expression (balance {balance})");
        }
        Ok(tokens)
    }

    fn scan_string(&mut self, at: Mark) -> Result<Token, LexError> {
        let body_start = self.pos + 1;
        let Some(len) = self.source[body_start..].find('"') else {
            return Err(LexError::UnterminatedString {
                position: at.position,
                line: at.line,
                offset: at.offset,
            });
        };
        let body_end = body_start + len;
        for (i, b) in self.bytes()[body_start..body_end].iter().enumerate() {
            if *b == b'\n' {
                self.newline_at(body_start + i);
            }
        }
        self.pos = body_end + 1;
        Ok(self.token(&self.source[body_start..body_end], TokenKind::String, at))
    }

    /// `#[namespace.][type.][-]digits`
    fn scan_resource_id(&mut self, at: Mark) -> Result<Token, LexError> {
        self.peek(1)?;
        self.pos += 1;

        let mut components = Vec::new();
        for _ in 0..2 {
            let end = self.run_end(self.pos, is_identifier);
            if end == self.pos || self.bytes().get(end) != Some(&b'.') {
                break;
            }
            components.push(self.source[self.pos..end].to_string());
            self.pos = end + 1;
        }

        let number_start = self.pos;
        if self.peek_is(0, |b| b == b'-') {
            self.pos += 1;
        }
        if self.consume_while(is_decimal).is_empty() {
            return Err(LexError::MalformedResourceId {
                position: at.position,
                line: at.line,
                offset: at.offset,
            });
        }
        components.push(self.source[number_start..self.pos].to_string());

        Ok(Token::with_components(
            components,
            TokenKind::ResourceId,
            at.position,
            at.line,
            at.offset,
            self.file,
        ))
    }

    fn scan_dollar(&mut self, at: Mark) -> Result<Token, LexError> {
        let next = self.peek(1)?;
        if next == b'(' {
            self.pos += 2;
            self.mode = Mode::Expression { balance: 0 };
            return Ok(self.token("$(", TokenKind::ExpressionOpen, at));
        }
        if is_identifier(next) {
            self.pos += 1;
            let name = self.consume_while(is_identifier);
            return Ok(self.token(name, TokenKind::Variable, at));
        }
        Err(self.unrecognised(at))
    }

    /// `[-]digits`, optionally followed by `%`.
    fn scan_number(&mut self, at: Mark) -> Token {
        let start = self.pos;
        if self.peek_is(0, |b| b == b'-') {
            self.pos += 1;
        }
        self.consume_while(is_decimal);
        let text = &self.source[start..self.pos];
        if self.peek_is(0, |b| b == b'%') {
            self.pos += 1;
            return self.token(text, TokenKind::Percentage, at);
        }
        self.token(text, TokenKind::Integer, at)
    }

    fn scan_symbol(&mut self, at: Mark) -> Result<Token, LexError> {
        let ch = self.bytes()[self.pos];

        if (ch == b'<' || ch == b'>') && self.peek_is(1, |b| b == ch) {
            self.pos += 2;
            let kind = if ch == b'<' { TokenKind::LeftShift } else { TokenKind::RightShift };
            return Ok(self.token(&self.source[at.position..self.pos], kind, at));
        }

        let kind = match ch {
            b'(' => {
                if let Mode::Expression { balance } = &mut self.mode {
                    *balance += 1;
                }
                TokenKind::LParen
            }
            b')' => match self.mode {
                Mode::Expression { balance } if balance <= 0 => {
                    self.mode = Mode::Normal;
                    TokenKind::ExpressionClose
                }
                Mode::Expression { balance } => {
                    self.mode = Mode::Expression { balance: balance - 1 };
                    TokenKind::RParen
                }
                Mode::Normal => TokenKind::RParen,
            },
            b';' => TokenKind::Semicolon,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'<' => TokenKind::LAngle,
            b'>' => TokenKind::RAngle,
            b'=' => TokenKind::Equals,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'&' => TokenKind::Amp,
            b'.' => TokenKind::Dot,
            b',' => TokenKind::Comma,
            b'|' => TokenKind::Pipe,
            b'^' => TokenKind::Caret,
            b':' => TokenKind::Colon,
            b'!' => TokenKind::Exclaim,
            b'~' => TokenKind::Tilde,
            _ => return Err(self.unrecognised(at)),
        };
        self.pos += 1;
        Ok(self.token(&self.source[at.position..self.pos], kind, at))
    }
}
