//! Binary layout schema of one resource type.

use crate::binary_type::BinaryType;
use crate::error::SchemaError;
use crate::token::{Token, TokenKind};

/// One slot of a template: its label and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    pub label: Token,
    pub ty: BinaryType,
}

impl TemplateField {
    pub fn name(&self) -> &str {
        self.label.text()
    }
}

/// Ordered (label, type) pairs. Insertion order is the on-disk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    fields: Vec<TemplateField>,
}

impl Template {
    pub fn new() -> Self {
        Template::default()
    }

    /// Build a template from literal labels, in order. A repeated label fails
    /// the same way [`Template::add_field`] does.
    pub fn from_slots(slots: &[(&str, BinaryType)]) -> Result<Self, SchemaError> {
        let mut template = Template::new();
        for &(label, ty) in slots {
            template.add_field(Token::synthetic(label, TokenKind::Identifier), ty)?;
        }
        Ok(template)
    }

    /// Append a slot; labels must be unique.
    pub fn add_field(&mut self, label: Token, ty: BinaryType) -> Result<usize, SchemaError> {
        if self.index_of(label.text()).is_some() {
            return Err(SchemaError::duplicate_template_field(&label));
        }
        self.fields.push(TemplateField { label, ty });
        Ok(self.fields.len() - 1)
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TemplateField> {
        self.fields.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Look up a slot by name, reporting a missing one at `name`.
    pub fn field_named(&self, name: &Token) -> Result<&TemplateField, SchemaError> {
        self.index_of(name.text())
            .map(|i| &self.fields[i])
            .ok_or_else(|| SchemaError::unknown_template_field(name))
    }

    /// Sum of fixed widths; `None` when any slot is variable-length.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .map(|f| match f.ty {
                BinaryType::Pstr | BinaryType::Cstr | BinaryType::Hexd | BinaryType::Invalid(_) => None,
                ty => Some(ty.width()),
            })
            .sum()
    }
}
