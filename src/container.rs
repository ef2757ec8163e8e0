//! Type declarations: a named, coded container owning a binary template and
//! the user-facing fields that map onto it.
//!
//! A [`Container`] is built once while a type declaration is parsed and is
//! read-only afterwards. Every [`Resource`](crate::resource::Resource) of the
//! type borrows its template.

use crate::binary_type::BinaryType;
use crate::error::SchemaError;
use crate::template::{Template, TemplateField};
use crate::token::{Token, TokenKind};

/// Symbolic constants (`name = literal`) attached to a field value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<(Token, Token)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add(&mut self, name: Token, value: Token) -> Result<(), SchemaError> {
        if self.get(name.text()).is_some() {
            return Err(SchemaError::duplicate_symbol(&name));
        }
        self.symbols.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.symbols
            .iter()
            .find(|(n, _)| n.text() == name)
            .map(|(_, v)| v)
    }

    /// Replace an identifier naming a symbol with the symbol's literal.
    pub fn resolve<'a>(&'a self, token: &'a Token) -> &'a Token {
        if token.is(TokenKind::Identifier) {
            if let Some(value) = self.get(token.text()) {
                return value;
            }
        }
        token
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &Token)> {
        self.symbols.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A named reference to a template slot, with its own symbol set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReference {
    pub slot: Token,
    pub symbols: SymbolTable,
}

impl TemplateReference {
    pub fn new(slot: Token) -> Self {
        TemplateReference {
            slot,
            symbols: SymbolTable::new(),
        }
    }

    pub fn add_symbol(&mut self, name: Token, value: Token) -> Result<(), SchemaError> {
        self.symbols.add(name, value)
    }
}

/// Whether a field value holds a literal or refers to another resource.
///
/// Metadata for consumers of the declaration. Writes convert literals by the
/// slot's type tag alone, so a resource id written to an integer slot stores
/// its numeric id in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMode {
    #[default]
    Value,
    Reference,
}

/// One value position of a field: which slot(s) it fills, its default, and
/// the symbols a user may write instead of a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub reference: TemplateReference,
    pub mode: ValueMode,
    pub default: Option<Token>,
    /// Suffixes appended to the slot name, one slot per suffix
    /// (`Element` + `X`, `Y` addresses `ElementX` and `ElementY`).
    pub name_extensions: Vec<Token>,
}

impl FieldValue {
    pub fn new(slot: Token) -> Self {
        FieldValue {
            reference: TemplateReference::new(slot),
            mode: ValueMode::Value,
            default: None,
            name_extensions: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Token) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_mode(mut self, mode: ValueMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<Token>) -> Self {
        self.name_extensions = extensions;
        self
    }

    pub fn slot(&self) -> &Token {
        &self.reference.slot
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.reference.symbols
    }

    pub fn add_symbol(&mut self, name: Token, value: Token) -> Result<(), SchemaError> {
        self.reference.add_symbol(name, value)
    }

    /// Template slot names this value fills.
    pub fn slot_names(&self) -> Vec<String> {
        let base = self.slot().text();
        if self.name_extensions.is_empty() {
            return vec![base.to_string()];
        }
        self.name_extensions
            .iter()
            .map(|ext| format!("{}{}", base, ext.text()))
            .collect()
    }

    /// The default literal with symbols resolved.
    pub fn resolved_default(&self) -> Option<&Token> {
        self.default.as_ref().map(|d| self.symbols().resolve(d))
    }
}

/// Instance bounds of a repeatable field group, inclusive.
///
/// Declaration metadata only: slot resolution and resource writes address
/// the slots the field's values name and never expand them per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeatable {
    pub lower: i64,
    pub upper: i64,
}

impl Repeatable {
    /// Number of instances; 0 when `upper < lower`, saturating at `usize::MAX`.
    pub fn count(&self) -> usize {
        let span = i128::from(self.upper) - i128::from(self.lower) + 1;
        usize::try_from(span.max(0)).unwrap_or(usize::MAX)
    }
}

/// A user-facing field of a type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Token,
    pub values: Vec<FieldValue>,
    pub repeatable: Option<Repeatable>,
}

impl Field {
    pub fn new(name: Token) -> Self {
        Field {
            name,
            values: Vec::new(),
            repeatable: None,
        }
    }

    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn repeatable(mut self, lower: i64, upper: i64) -> Self {
        self.repeatable = Some(Repeatable { lower, upper });
        self
    }

    pub fn name(&self) -> &str {
        self.name.text()
    }
}

/// A type declaration: name, four-character code, template and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    name: Token,
    code: String,
    template: Template,
    fields: Vec<Field>,
}

impl Container {
    pub fn new(name: Token, code: impl Into<String>) -> Self {
        Container {
            name,
            code: code.into(),
            template: Template::new(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.text()
    }

    pub fn name_token(&self) -> &Token {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn add_template_field(&mut self, label: Token, ty: BinaryType) -> Result<usize, SchemaError> {
        self.template.add_field(label, ty)
    }

    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaError> {
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(SchemaError::duplicate_field(&field.name));
        }
        self.fields.push(field);
        Ok(())
    }

    pub fn template_field_named(&self, name: &Token) -> Result<&TemplateField, SchemaError> {
        self.template.field_named(name)
    }

    pub fn field_named(&self, name: &Token) -> Result<&Field, SchemaError> {
        self.fields
            .iter()
            .find(|f| f.name() == name.text())
            .ok_or_else(|| SchemaError::unknown_field(name))
    }

    /// Template indices a field fills, in field-value order. Every slot must
    /// exist in the template.
    pub fn slots_for_field(&self, name: &Token) -> Result<Vec<usize>, SchemaError> {
        let field = self.field_named(name)?;
        let mut slots = Vec::new();
        for value in &field.values {
            for slot in value.slot_names() {
                let index = self.template.index_of(&slot).ok_or_else(|| {
                    let token = Token::new(
                        slot.as_str(),
                        TokenKind::Identifier,
                        value.slot().position(),
                        value.slot().line(),
                        value.slot().offset(),
                        value.slot().source(),
                    );
                    SchemaError::unknown_template_field(&token)
                })?;
                slots.push(index);
            }
        }
        Ok(slots)
    }
}
