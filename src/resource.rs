//! Resource instances: sparse slot values over a shared template.

use crate::binary_type::BinaryType;
use crate::codec::{self, PopulateError, ResourceError};
use crate::container::Container;
use crate::store::ResourceStore;
use crate::template::Template;
use crate::token::{Token, TokenKind};
use crate::value::{Rect, Value};
use std::collections::BTreeMap;

/// One instance of a type. Values are keyed by template slot index and may
/// be written in any order; [`Resource::assemble`] emits them in template order.
#[derive(Debug, Clone)]
pub struct Resource<'t> {
    type_code: String,
    id: i64,
    name: String,
    template: &'t Template,
    values: BTreeMap<usize, Value>,
}

impl<'t> Resource<'t> {
    pub fn new(type_code: impl Into<String>, id: i64, name: impl Into<String>, template: &'t Template) -> Self {
        Resource {
            type_code: type_code.into(),
            id,
            name: name.into(),
            template,
            values: BTreeMap::new(),
        }
    }

    /// A new, empty instance of `container`'s type.
    pub fn of(container: &'t Container, id: i64, name: impl Into<String>) -> Self {
        Resource::new(container.code(), id, name, container.template())
    }

    pub fn type_code(&self) -> &str {
        &self.type_code
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &'t Template {
        self.template
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.template
            .index_of(field)
            .and_then(|i| self.values.get(&i))
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(&index)
    }

    pub fn is_written(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    /// Every slot holds a value of the kind its type tag needs.
    pub fn is_complete(&self) -> bool {
        self.template
            .fields()
            .iter()
            .enumerate()
            .all(|(i, f)| self.values.get(&i).map_or(false, |v| v.fits(f.ty)))
    }

    fn slot(&self, field: &str) -> Result<(usize, BinaryType), ResourceError> {
        let index = self
            .template
            .index_of(field)
            .ok_or_else(|| ResourceError::UnknownField(field.to_string()))?;
        Ok((index, self.template.fields()[index].ty))
    }

    pub fn write_value(&mut self, field: &str, value: Value) -> Result<(), ResourceError> {
        let (index, _) = self.slot(field)?;
        self.values.insert(index, value);
        Ok(())
    }

    pub fn write_signed_byte(&mut self, field: &str, v: i8) -> Result<(), ResourceError> {
        self.write_value(field, Value::I8(v))
    }

    pub fn write_signed_short(&mut self, field: &str, v: i16) -> Result<(), ResourceError> {
        self.write_value(field, Value::I16(v))
    }

    pub fn write_signed_long(&mut self, field: &str, v: i32) -> Result<(), ResourceError> {
        self.write_value(field, Value::I32(v))
    }

    pub fn write_signed_quad(&mut self, field: &str, v: i64) -> Result<(), ResourceError> {
        self.write_value(field, Value::I64(v))
    }

    pub fn write_byte(&mut self, field: &str, v: u8) -> Result<(), ResourceError> {
        self.write_value(field, Value::U8(v))
    }

    pub fn write_short(&mut self, field: &str, v: u16) -> Result<(), ResourceError> {
        self.write_value(field, Value::U16(v))
    }

    pub fn write_long(&mut self, field: &str, v: u32) -> Result<(), ResourceError> {
        self.write_value(field, Value::U32(v))
    }

    pub fn write_quad(&mut self, field: &str, v: u64) -> Result<(), ResourceError> {
        self.write_value(field, Value::U64(v))
    }

    pub fn write_rect(&mut self, field: &str, rect: Rect) -> Result<(), ResourceError> {
        self.write_value(field, Value::Rect(rect))
    }

    pub fn write_pstr(&mut self, field: &str, text: &str) -> Result<(), ResourceError> {
        self.write_value(field, Value::string(text))
    }

    /// Write a C string; the length hint is the slot's declared width, or 0
    /// for an unbounded slot.
    pub fn write_cstr(&mut self, field: &str, text: &str) -> Result<(), ResourceError> {
        let (_, ty) = self.slot(field)?;
        codec::check_c_string(field, text)?;
        let length = match ty {
            BinaryType::Cnnn(width) => width as usize,
            _ => 0,
        };
        self.write_value(
            field,
            Value::String {
                text: text.to_string(),
                length,
            },
        )
    }

    pub fn write_data(&mut self, field: &str, data: &[u8]) -> Result<(), ResourceError> {
        self.write_value(field, Value::Bytes(data.to_vec()))
    }

    /// Convert a literal token to the value the slot's type tag needs.
    pub fn write_token(&mut self, field: &str, token: &Token) -> Result<(), ResourceError> {
        let (index, ty) = self.slot(field)?;
        let value = literal_value(field, ty, token)?;
        self.values.insert(index, value);
        Ok(())
    }

    /// Write a declared field from its literals. Literals are matched to the
    /// field's slots in order; missing trailing literals fall back to the
    /// slot's default. Symbol names are replaced by their values. More
    /// literals than slots is an error and nothing is written.
    pub fn write_field(&mut self, container: &Container, name: &Token, literals: &[Token]) -> Result<(), ResourceError> {
        let field = container
            .field_named(name)
            .map_err(|_| ResourceError::UnknownField(name.text().to_string()))?;
        let slots: usize = field.values.iter().map(|v| v.slot_names().len()).sum();
        if literals.len() > slots {
            return Err(ResourceError::TooManyValues {
                field: field.name().to_string(),
                expected: slots,
                found: literals.len(),
            });
        }
        let mut literals = literals.iter();
        for value in &field.values {
            for slot in value.slot_names() {
                let literal = literals
                    .next()
                    .or(value.default.as_ref())
                    .ok_or_else(|| ResourceError::MissingValue(slot.clone()))?;
                self.write_token(&slot, value.symbols().resolve(literal))?;
            }
        }
        Ok(())
    }

    /// Fill every unwritten slot that has a declared default. Returns the
    /// number of slots written.
    pub fn apply_defaults(&mut self, container: &Container) -> Result<usize, ResourceError> {
        let mut written = 0;
        for field in container.fields() {
            for value in &field.values {
                let Some(default) = value.resolved_default() else {
                    continue;
                };
                for slot in value.slot_names() {
                    if self.is_written(&slot) {
                        continue;
                    }
                    self.write_token(&slot, default)?;
                    written += 1;
                }
            }
        }
        log::debug!("{} #{}: {} defaults applied", self.type_code, self.id, written);
        Ok(written)
    }

    /// Serialize all slots in template order.
    pub fn assemble(&self) -> Result<Vec<u8>, ResourceError> {
        codec::assemble(self.template, &self.values)
    }

    /// Load this resource's stored bytes from `store` and decode them into
    /// the slots.
    pub fn populate<S: ResourceStore + ?Sized>(&mut self, store: &S) -> Result<(), PopulateError> {
        let Some(data) = store.find(&self.type_code, self.id) else {
            return Err(PopulateError::NotFound {
                code: self.type_code.clone(),
                id: self.id,
            });
        };
        self.import(data)
    }

    /// Decode raw resource bytes into the slots.
    pub fn import(&mut self, data: &[u8]) -> Result<(), PopulateError> {
        codec::populate(self.template, &mut self.values, data)
    }
}

fn literal_value(field: &str, ty: BinaryType, token: &Token) -> Result<Value, ResourceError> {
    let invalid = || ResourceError::InvalidLiteral {
        field: field.to_string(),
        literal: token.text().to_string(),
    };
    let out_of_range = || ResourceError::ValueOutOfRange {
        field: field.to_string(),
        literal: token.text().to_string(),
    };
    let numeric = matches!(
        token.kind(),
        TokenKind::Integer | TokenKind::Percentage | TokenKind::ResourceId
    );
    let textual = matches!(token.kind(), TokenKind::String | TokenKind::Identifier);

    if ty.is_unsigned() {
        if !numeric {
            return Err(invalid());
        }
        let v = match token.unsigned_value() {
            Ok(v) => v,
            Err(_) if token.value().is_ok() => return Err(out_of_range()),
            Err(_) => return Err(invalid()),
        };
        return Ok(match ty {
            BinaryType::Hbyt => Value::U8(u8::try_from(v).map_err(|_| out_of_range())?),
            BinaryType::Hwrd => Value::U16(u16::try_from(v).map_err(|_| out_of_range())?),
            BinaryType::Hlng => Value::U32(u32::try_from(v).map_err(|_| out_of_range())?),
            _ => Value::U64(v),
        });
    }

    if ty.is_signed() {
        if !numeric {
            return Err(invalid());
        }
        let v = signed_literal(token, ty.width() * 8).ok_or_else(out_of_range)?;
        return Ok(match ty {
            BinaryType::Dbyt => Value::I8(i8::try_from(v).map_err(|_| out_of_range())?),
            BinaryType::Dwrd => Value::I16(i16::try_from(v).map_err(|_| out_of_range())?),
            BinaryType::Dlng => Value::I32(i32::try_from(v).map_err(|_| out_of_range())?),
            _ => Value::I64(v),
        });
    }

    match ty {
        BinaryType::Pstr if textual => Ok(Value::string(token.text())),
        BinaryType::Cnnn(width) if textual => {
            codec::check_c_string(field, token.text())?;
            Ok(Value::String {
                text: token.text().to_string(),
                length: width as usize,
            })
        }
        BinaryType::Cstr if textual => {
            codec::check_c_string(field, token.text())?;
            Ok(Value::String {
                text: token.text().to_string(),
                length: 0,
            })
        }
        BinaryType::Hexd => {
            let digits = match token.kind() {
                TokenKind::Integer => token
                    .text()
                    .strip_prefix("0x")
                    .ok_or_else(invalid)?
                    .to_string(),
                TokenKind::String => token.text().split_whitespace().collect(),
                _ => return Err(invalid()),
            };
            decode_hex(&digits).map(Value::Bytes).ok_or_else(invalid)
        }
        BinaryType::Invalid(_) => Err(ResourceError::UnsupportedType {
            field: field.to_string(),
            ty,
        }),
        _ => Err(invalid()),
    }
}

/// Signed value of a literal for a slot of `bits` bits. Hex literals are bit
/// patterns of that width (`0xFFFF` in a 16-bit slot is -1).
fn signed_literal(token: &Token, bits: usize) -> Option<i64> {
    let is_hex = token.text().starts_with("0x") || token.text().starts_with("0X");
    if !is_hex {
        return token.value().ok();
    }
    let raw = token.unsigned_value().ok()?;
    if bits < 64 && raw >> bits != 0 {
        return None;
    }
    let shift = 64 - bits as u32;
    Some(((raw << shift) as i64) >> shift)
}

fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{digits}");
        padded.as_str()
    } else {
        digits
    };
    (0..digits.len())
        .step_by(2)
        .map(|i| digits.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}
