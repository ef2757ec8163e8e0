//! # kdlc: KDL lexer and binary resource codec
//!
//! The front half of a compiler for KDL, a small declarative language that
//! describes resource types and resource instances for a legacy fixed-layout
//! binary resource format.
//!
//! ## Pipeline
//!
//! - **Lexing**: [`Lexer`] turns source text into [`Token`]s (directives,
//!   strings, integers, resource ids, variables, `$( ... )` expressions, symbols).
//! - **Type model**: a [`Container`] is a named, four-character-coded type that
//!   owns a [`Template`] (ordered slot label → [`BinaryType`]) and the
//!   user-facing [`Field`]s mapped onto it.
//! - **Resources**: a [`Resource`] holds values for a template's slots,
//!   [`assembles`](Resource::assemble) them into bytes and
//!   [`populates`](Resource::populate) them back from a [`ResourceStore`].
//!
//! ## Binary types
//!
//! - Signed `DBYT` `DWRD` `DLNG` `DQAD`, unsigned `HBYT` `HWRD` `HLNG` `HQAD`
//! - `RECT` (top, left, bottom, right as i16)
//! - `PSTR` (length-prefixed), `Cnnn` (fixed width), `CSTR` (NUL-terminated)
//! - `HEXD` raw bytes (length-prefixed)
//!
//! ## Example
//!
//! ```
//! use kdlc::{lex, BinaryType, Container, Resource, Token, TokenKind};
//!
//! let tokens = lex("@type Ship : \"shïp\";").unwrap();
//! assert_eq!(tokens[0].kind(), TokenKind::Directive);
//!
//! let label = |s: &str| Token::synthetic(s, TokenKind::Identifier);
//! let mut ship = Container::new(label("Ship"), "shïp");
//! ship.add_template_field(label("Mass"), BinaryType::Hwrd).unwrap();
//! ship.add_template_field(label("Name"), BinaryType::Pstr).unwrap();
//!
//! let mut r = Resource::of(&ship, 128, "Shuttle");
//! r.write_short("Mass", 10).unwrap();
//! r.write_pstr("Name", "Shuttle").unwrap();
//! let bytes = r.assemble().unwrap();
//! assert_eq!(&bytes[..3], &[0, 10, 7]);
//! ```

pub mod binary_type;
pub mod codec;
pub mod container;
pub mod diagnostic;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod resource;
pub mod source;
pub mod store;
pub mod stream;
pub mod template;
pub mod token;
pub mod value;

pub use binary_type::BinaryType;
pub use codec::{PopulateError, ResourceError};
pub use container::{Container, Field, FieldValue, Repeatable, SymbolTable, TemplateReference, ValueMode};
pub use diagnostic::{CollectingSink, Diagnostic, DiagnosticSink, LogSink, Severity};
pub use error::{SchemaError, SchemaErrorKind};
pub use lexer::{lex, LexError, Lexer};
pub use resource::Resource;
pub use source::{SourceFile, SourceId, SourceMap};
pub use store::{MemoryStore, ResourceStore};
pub use stream::{StreamError, TokenStream};
pub use template::{Template, TemplateField};
pub use token::{Associativity, Token, TokenKind, TokenValueError};
pub use value::{Rect, Value};
