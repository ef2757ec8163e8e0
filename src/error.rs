//! Errors raised while building type declarations.

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    DuplicateTemplateField,
    DuplicateField,
    DuplicateSymbol,
    UnknownTemplateField,
    UnknownField,
}

/// A schema-definition error: what went wrong and the token it is reported at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub token: Token,
    pub message: String,
}

impl SchemaError {
    pub fn new(kind: SchemaErrorKind, token: &Token, message: impl Into<String>) -> Self {
        SchemaError {
            kind,
            token: token.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn duplicate_template_field(token: &Token) -> Self {
        Self::new(
            SchemaErrorKind::DuplicateTemplateField,
            token,
            format!("duplicate template field '{}'", token.text()),
        )
    }

    pub(crate) fn duplicate_field(token: &Token) -> Self {
        Self::new(
            SchemaErrorKind::DuplicateField,
            token,
            format!("duplicate field '{}'", token.text()),
        )
    }

    pub(crate) fn duplicate_symbol(token: &Token) -> Self {
        Self::new(
            SchemaErrorKind::DuplicateSymbol,
            token,
            format!("duplicate symbol '{}'", token.text()),
        )
    }

    pub(crate) fn unknown_template_field(token: &Token) -> Self {
        Self::new(
            SchemaErrorKind::UnknownTemplateField,
            token,
            format!("unknown template field '{}'", token.text()),
        )
    }

    pub(crate) fn unknown_field(token: &Token) -> Self {
        Self::new(
            SchemaErrorKind::UnknownField,
            token,
            format!("unknown field '{}'", token.text()),
        )
    }
}
