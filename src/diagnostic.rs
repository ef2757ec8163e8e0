//! Diagnostics: errors and warnings tied to a token, and the sinks that
//! receive them.
//!
//! Library code never prints or exits. Errors are returned as values; a
//! caller turns them into [`Diagnostic`]s and decides whether to stop at the
//! first one or keep collecting.

use crate::error::SchemaError;
use crate::lexer::LexError;
use crate::source::{SourceId, SourceMap};
use crate::token::{Token, TokenKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub token: Option<Token>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, token: Option<Token>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            token,
            message: message.into(),
        }
    }

    pub fn error(token: &Token, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, Some(token.clone()), message)
    }

    pub fn from_schema_error(err: &SchemaError) -> Self {
        Diagnostic::error(&err.token, err.message.clone())
    }

    /// A lexical error, located in `file` when known.
    pub fn from_lex_error(err: &LexError, file: Option<SourceId>) -> Self {
        let (line, offset, text) = match err {
            LexError::UnrecognisedCharacter { ch, line, offset, .. } => (*line, *offset, ch.to_string()),
            LexError::MalformedResourceId { line, offset, .. }
            | LexError::UnterminatedString { line, offset, .. } => (*line, *offset, String::new()),
            LexError::UnexpectedEof { .. } => (0, 0, String::new()),
        };
        let token = Token::new(text, TokenKind::Identifier, err.position(), line, offset, file);
        Diagnostic::new(Severity::Error, Some(token), err.to_string())
    }

    /// `path:line:offset: severity: message`; the location is dropped when
    /// there is no token.
    pub fn render(&self, sources: &SourceMap) -> String {
        match &self.token {
            Some(token) => format!("{}: {}: {}", sources.location(token), self.severity, self.message),
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

/// Receiver of diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
pub struct LogSink<'a> {
    sources: &'a SourceMap,
}

impl<'a> LogSink<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        LogSink { sources }
    }
}

impl DiagnosticSink for LogSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        let line = diagnostic.render(self.sources);
        match diagnostic.severity {
            Severity::Error => log::error!("{}", line),
            Severity::Warning => log::warn!("{}", line),
            Severity::Info => log::info!("{}", line),
        }
    }
}

/// Keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::template::Template;
    use crate::binary_type::BinaryType;

    #[test]
    fn schema_error_renders_with_location() {
        let mut sources = SourceMap::new();
        let id = sources.insert("ship.kdl", "Mass\nMass");
        let mut lexer = Lexer::for_file(&sources, id).unwrap();
        let tokens = lexer.analyze().unwrap().to_vec();

        let mut template = Template::new();
        template.add_field(tokens[0].clone(), BinaryType::Hwrd).unwrap();
        let err = template.add_field(tokens[1].clone(), BinaryType::Hwrd).unwrap_err();

        let mut sink = CollectingSink::new();
        sink.report(Diagnostic::from_schema_error(&err));
        assert!(sink.has_errors());
        assert_eq!(
            sink.diagnostics()[0].render(&sources),
            "ship.kdl:2:0: error: duplicate template field 'Mass'"
        );
    }

    #[test]
    fn lex_error_carries_position() {
        let err = crate::lexer::lex("a\n  ?").unwrap_err();
        let d = Diagnostic::from_lex_error(&err, None);
        let token = d.token.as_ref().unwrap();
        assert_eq!((token.line(), token.offset(), token.position()), (2, 2, 4));
        assert!(d.render(&SourceMap::new()).starts_with("2:2: error:"));
    }
}
