//! Lexical tokens produced by the [lexer](crate::lexer).

use crate::source::SourceId;
use std::fmt;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Brackets
    LParen,         // '('
    RParen,         // ')'
    LBrace,         // '{'
    RBrace,         // '}'
    LBracket,       // '['
    RBracket,       // ']'
    LAngle,         // '<'
    RAngle,         // '>'
    ExpressionOpen, // '$('
    ExpressionClose, // ')' closing '$('

    // Punctuation and operators
    Comma,      // ','
    Dot,        // '.'
    Pipe,       // '|'
    Slash,      // '/'
    Amp,        // '&'
    Colon,      // ':'
    Semicolon,  // ';'
    Plus,       // '+'
    Minus,      // '-'
    Star,       // '*'
    Equals,     // '='
    Caret,      // '^'
    LeftShift,  // '<<'
    RightShift, // '>>'
    Tilde,      // '~'
    Exclaim,    // '!'

    // Literals
    Integer,
    Percentage,
    String,
    ResourceId,
    Identifier,

    // Markers
    Directive, // '@name'
    Variable,  // '$name'
}

/// Operator associativity used when climbing precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl TokenKind {
    /// Binding strength of a binary operator, or `None` for everything else.
    pub fn precedence(self) -> Option<i64> {
        match self {
            TokenKind::Plus | TokenKind::Minus => Some(2),
            TokenKind::Star | TokenKind::Slash => Some(3),
            TokenKind::Caret => Some(4),
            TokenKind::LeftShift | TokenKind::RightShift => Some(5),
            TokenKind::Pipe => Some(6),
            TokenKind::Amp => Some(7),
            _ => None,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            TokenKind::Caret => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    pub fn is_operator(self) -> bool {
        self.precedence().is_some()
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::Percentage
                | TokenKind::String
                | TokenKind::ResourceId
                | TokenKind::Identifier
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenValueError {
    #[error("token of kind {0:?} has no numeric value")]
    NoValue(TokenKind),
    #[error("invalid numeric literal: {0:?}")]
    InvalidNumber(String),
}

/// One lexical unit. Immutable once built.
///
/// When `components` is non-empty the text is their `.`-joined form; the
/// constructors keep the two in sync and nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    kind: TokenKind,
    components: Vec<String>,
    position: usize,
    line: usize,
    offset: usize,
    source: Option<SourceId>,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        kind: TokenKind,
        position: usize,
        line: usize,
        offset: usize,
        source: Option<SourceId>,
    ) -> Self {
        Token {
            text: text.into(),
            kind,
            components: Vec::new(),
            position,
            line,
            offset,
            source,
        }
    }

    pub fn with_components(
        components: Vec<String>,
        kind: TokenKind,
        position: usize,
        line: usize,
        offset: usize,
        source: Option<SourceId>,
    ) -> Self {
        Token {
            text: components.join("."),
            kind,
            components,
            position,
            line,
            offset,
            source,
        }
    }

    /// A token that did not come from any source file, for diagnostics raised
    /// outside of lexing.
    pub fn synthetic(text: impl Into<String>, kind: TokenKind) -> Self {
        Token::new(text, kind, 0, 0, 0, None)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Absolute byte offset of the token's first character.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Column offset within the line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    /// `(line, offset)`.
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.offset)
    }

    /// Numeric payload of the token.
    ///
    /// Operators report their precedence rank rather than a literal value.
    /// Integer and percentage literals are parsed from their text (hex when
    /// prefixed with `0x`), resource ids from their final component.
    pub fn value(&self) -> Result<i64, TokenValueError> {
        if let Some(rank) = self.kind.precedence() {
            return Ok(rank);
        }
        match self.kind {
            TokenKind::Integer | TokenKind::Percentage => parse_signed(&self.text),
            TokenKind::ResourceId => parse_signed(self.numeric_component()),
            kind => Err(TokenValueError::NoValue(kind)),
        }
    }

    /// Like [`Token::value`], but for literals that must fit an unsigned 64-bit slot.
    pub fn unsigned_value(&self) -> Result<u64, TokenValueError> {
        match self.kind {
            TokenKind::Integer | TokenKind::Percentage => parse_unsigned(&self.text),
            TokenKind::ResourceId => parse_unsigned(self.numeric_component()),
            kind => Err(TokenValueError::NoValue(kind)),
        }
    }

    pub fn associativity(&self) -> Associativity {
        self.kind.associativity()
    }

    fn numeric_component(&self) -> &str {
        self.components.last().map(String::as_str).unwrap_or(&self.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn parse_signed(text: &str) -> Result<i64, TokenValueError> {
    let invalid = || TokenValueError::InvalidNumber(text.to_string());
    match hex_digits(text) {
        // Hex literals are bit patterns: 0xFFFFFFFFFFFFFFFF is -1.
        Some(digits) => u64::from_str_radix(digits, 16)
            .map(|v| v as i64)
            .map_err(|_| invalid()),
        None => text.parse::<i64>().map_err(|_| invalid()),
    }
}

fn parse_unsigned(text: &str) -> Result<u64, TokenValueError> {
    let invalid = || TokenValueError::InvalidNumber(text.to_string());
    match hex_digits(text) {
        Some(digits) => u64::from_str_radix(digits, 16).map_err(|_| invalid()),
        None => text.parse::<u64>().map_err(|_| invalid()),
    }
}
