//! Encode/decode resource slot values to the legacy binary layout.
//!
//! The template is the schema: slots are written and read strictly in
//! template order. All integers are big-endian; signed kinds are two's
//! complement. Strings are written as their UTF-8 bytes.
//!
//! | Tag | Encoded as |
//! |-----|------------|
//! | `DBYT`..`DQAD` | i8 / i16 / i32 / i64 |
//! | `HBYT`..`HQAD` | u8 / u16 / u32 / u64 |
//! | `RECT` | top, left, bottom, right as i16 |
//! | `PSTR`, `HEXD` | u8 length, then at most 255 bytes |
//! | `Cnnn` | at most nnn-1 bytes, NUL padded to nnn |
//! | `CSTR` | bytes, then NUL |

use crate::binary_type::BinaryType;
use crate::template::{Template, TemplateField};
use crate::value::{Rect, Value};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

/// Longest payload a length-prefixed (`PSTR`/`HEXD`) slot can hold.
pub const MAX_PASCAL_LENGTH: usize = u8::MAX as usize;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Missing value for field: {0}")]
    MissingValue(String),
    #[error("Type mismatch in field {field}: template expects {expected}, value is {found}")]
    TypeMismatch {
        field: String,
        expected: BinaryType,
        found: &'static str,
    },
    #[error("Unsupported type {ty} for field {field}")]
    UnsupportedType { field: String, ty: BinaryType },
    #[error("Value {literal} out of range for field {field}")]
    ValueOutOfRange { field: String, literal: String },
    #[error("Invalid literal {literal} for field {field}")]
    InvalidLiteral { field: String, literal: String },
    #[error("Field {field} takes {expected} values, {found} given")]
    TooManyValues {
        field: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    #[error("No resource {code} #{id}")]
    NotFound { code: String, id: i64 },
    #[error("Unsupported type {tag} for field {field}")]
    UnsupportedType { field: String, tag: BinaryType },
    #[error("Data ended while reading field {field}: {source}")]
    Truncated {
        field: String,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize every template slot. Fails before returning anything if a slot
/// has no value or a value of the wrong kind.
pub fn assemble(template: &Template, values: &BTreeMap<usize, Value>) -> Result<Vec<u8>, ResourceError> {
    let mut out = Vec::new();
    for (index, field) in template.fields().iter().enumerate() {
        let value = values
            .get(&index)
            .ok_or_else(|| ResourceError::MissingValue(field.name().to_string()))?;
        log::debug!("assemble {} {} at {}", field.name(), field.ty, out.len());
        encode_slot(&mut out, field, value)?;
    }
    Ok(out)
}

/// Decode `bytes` slot by slot into `values`.
///
/// Slots decoded before a failure stay in `values`; decoding stops at the
/// first slot that cannot be read, so later slots are never misaligned.
pub fn populate(
    template: &Template,
    values: &mut BTreeMap<usize, Value>,
    bytes: &[u8],
) -> Result<(), PopulateError> {
    let mut r = Cursor::new(bytes);
    for (index, field) in template.fields().iter().enumerate() {
        log::debug!("populate {} {} at {}", field.name(), field.ty, r.position());
        let value = decode_slot(&mut r, field).map_err(|e| {
            log::warn!("populate stopped at field {}: {}", field.name(), e);
            e
        })?;
        values.insert(index, value);
    }
    let rest = bytes.len() as u64 - r.position();
    if rest > 0 {
        log::debug!("populate left {} trailing bytes", rest);
    }
    Ok(())
}

fn encode_slot(w: &mut Vec<u8>, field: &TemplateField, value: &Value) -> Result<(), ResourceError> {
    match (field.ty, value) {
        (BinaryType::Dbyt, Value::I8(v)) => w.write_i8(*v)?,
        (BinaryType::Dwrd, Value::I16(v)) => w.write_i16::<BigEndian>(*v)?,
        (BinaryType::Dlng, Value::I32(v)) => w.write_i32::<BigEndian>(*v)?,
        (BinaryType::Dqad, Value::I64(v)) => w.write_i64::<BigEndian>(*v)?,
        (BinaryType::Hbyt, Value::U8(v)) => w.write_u8(*v)?,
        (BinaryType::Hwrd, Value::U16(v)) => w.write_u16::<BigEndian>(*v)?,
        (BinaryType::Hlng, Value::U32(v)) => w.write_u32::<BigEndian>(*v)?,
        (BinaryType::Hqad, Value::U64(v)) => w.write_u64::<BigEndian>(*v)?,
        (BinaryType::Rect, Value::Rect(r)) => write_rect(w, r)?,
        (BinaryType::Pstr, Value::String { text, .. }) => {
            let n = floor_char_boundary(text, MAX_PASCAL_LENGTH);
            write_pascal(w, field, text.as_bytes(), n)?
        }
        (BinaryType::Hexd, Value::Bytes(bytes)) => {
            write_pascal(w, field, bytes, bytes.len().min(MAX_PASCAL_LENGTH))?
        }
        (BinaryType::Cnnn(width), Value::String { text, .. }) => {
            check_c_string(field.name(), text)?;
            let width = width as usize;
            let n = floor_char_boundary(text, width.saturating_sub(1));
            w.write_all(&text.as_bytes()[..n])?;
            w.write_all(&vec![0u8; width - n])?;
        }
        (BinaryType::Cstr, Value::String { text, .. }) => {
            check_c_string(field.name(), text)?;
            w.write_all(text.as_bytes())?;
            w.write_u8(0)?;
        }
        (ty @ BinaryType::Invalid(_), _) => {
            return Err(ResourceError::UnsupportedType {
                field: field.name().to_string(),
                ty,
            })
        }
        (expected, value) => {
            return Err(ResourceError::TypeMismatch {
                field: field.name().to_string(),
                expected,
                found: value.type_name(),
            })
        }
    }
    Ok(())
}

fn write_rect(w: &mut Vec<u8>, r: &Rect) -> std::io::Result<()> {
    w.write_i16::<BigEndian>(r.top)?;
    w.write_i16::<BigEndian>(r.left)?;
    w.write_i16::<BigEndian>(r.bottom)?;
    w.write_i16::<BigEndian>(r.right)
}

/// Length byte, then the first `keep` bytes of `bytes`.
fn write_pascal(w: &mut Vec<u8>, field: &TemplateField, bytes: &[u8], keep: usize) -> std::io::Result<()> {
    if keep < bytes.len() {
        log::warn!("field {}: {} bytes truncated to {}", field.name(), bytes.len(), keep);
    }
    w.write_u8(keep as u8)?;
    w.write_all(&bytes[..keep])
}

/// Largest char boundary of `text` at or below `max` bytes.
fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut n = text.len().min(max);
    while !text.is_char_boundary(n) {
        n -= 1;
    }
    n
}

/// C strings end at the first NUL, so one inside the text would cut it short
/// on decode and shift every later slot.
pub(crate) fn check_c_string(field: &str, text: &str) -> Result<(), ResourceError> {
    if text.contains('\0') {
        return Err(ResourceError::InvalidLiteral {
            field: field.to_string(),
            literal: text.escape_debug().to_string(),
        });
    }
    Ok(())
}

fn decode_slot(r: &mut Cursor<&[u8]>, field: &TemplateField) -> Result<Value, PopulateError> {
    let truncated = |source: std::io::Error| PopulateError::Truncated {
        field: field.name().to_string(),
        source,
    };
    let value = match field.ty {
        BinaryType::Dbyt => Value::I8(r.read_i8().map_err(truncated)?),
        BinaryType::Dwrd => Value::I16(r.read_i16::<BigEndian>().map_err(truncated)?),
        BinaryType::Dlng => Value::I32(r.read_i32::<BigEndian>().map_err(truncated)?),
        BinaryType::Dqad => Value::I64(r.read_i64::<BigEndian>().map_err(truncated)?),
        BinaryType::Hbyt => Value::U8(r.read_u8().map_err(truncated)?),
        BinaryType::Hwrd => Value::U16(r.read_u16::<BigEndian>().map_err(truncated)?),
        BinaryType::Hlng => Value::U32(r.read_u32::<BigEndian>().map_err(truncated)?),
        BinaryType::Hqad => Value::U64(r.read_u64::<BigEndian>().map_err(truncated)?),
        BinaryType::Rect => Value::Rect(read_rect(r).map_err(truncated)?),
        BinaryType::Pstr => {
            let bytes = read_pascal(r).map_err(truncated)?;
            Value::String {
                length: bytes.len(),
                text: String::from_utf8_lossy(&bytes).into_owned(),
            }
        }
        BinaryType::Hexd => Value::Bytes(read_pascal(r).map_err(truncated)?),
        BinaryType::Cnnn(width) => {
            let mut buf = vec![0u8; width as usize];
            r.read_exact(&mut buf).map_err(truncated)?;
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            Value::String {
                text: String::from_utf8_lossy(&buf[..end]).into_owned(),
                length: width as usize,
            }
        }
        BinaryType::Cstr => {
            let mut buf = Vec::new();
            loop {
                match r.read_u8() {
                    Ok(0) => break,
                    Ok(b) => buf.push(b),
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => return Err(truncated(e)),
                }
            }
            Value::String {
                text: String::from_utf8_lossy(&buf).into_owned(),
                length: 0,
            }
        }
        tag @ BinaryType::Invalid(_) => {
            return Err(PopulateError::UnsupportedType {
                field: field.name().to_string(),
                tag,
            })
        }
    };
    Ok(value)
}

fn read_rect(r: &mut Cursor<&[u8]>) -> std::io::Result<Rect> {
    Ok(Rect {
        top: r.read_i16::<BigEndian>()?,
        left: r.read_i16::<BigEndian>()?,
        bottom: r.read_i16::<BigEndian>()?,
        right: r.read_i16::<BigEndian>()?,
    })
}

/// Length byte, then that many bytes.
fn read_pascal(r: &mut Cursor<&[u8]>) -> std::io::Result<Vec<u8>> {
    let len = r.read_u8()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: Vec<Value>) -> BTreeMap<usize, Value> {
        list.into_iter().enumerate().collect()
    }

    #[test]
    fn integers_are_big_endian() {
        let t = Template::from_slots(&[
            ("a", BinaryType::Hwrd),
            ("b", BinaryType::Dlng),
            ("c", BinaryType::Dbyt),
        ])
        .unwrap();
        let out = assemble(&t, &values(vec![Value::U16(0x1234), Value::I32(-2), Value::I8(-1)])).unwrap();
        assert_eq!(out, [0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF]);
    }

    #[test]
    fn rect_order_is_top_left_bottom_right() {
        let t = Template::from_slots(&[("r", BinaryType::Rect)]).unwrap();
        let out = assemble(&t, &values(vec![Value::Rect(Rect::new(1, 2, 3, -1))])).unwrap();
        assert_eq!(out, [0, 1, 0, 2, 0, 3, 0xFF, 0xFF]);
    }

    #[test]
    fn string_shapes() {
        let t = Template::from_slots(&[
            ("p", BinaryType::Pstr),
            ("f", BinaryType::Cnnn(4)),
            ("c", BinaryType::Cstr),
            ("h", BinaryType::Hexd),
        ])
        .unwrap();
        let out = assemble(
            &t,
            &values(vec![
                Value::string("hi"),
                Value::string("abcdef"),
                Value::string("z"),
                Value::Bytes(vec![0xDE, 0xAD]),
            ]),
        )
        .unwrap();
        assert_eq!(out, [2, b'h', b'i', b'a', b'b', b'c', 0, b'z', 0, 2, 0xDE, 0xAD]);
    }

    #[test]
    fn pascal_strings_are_capped_at_255_bytes() {
        let t = Template::from_slots(&[("p", BinaryType::Pstr)]).unwrap();
        let out = assemble(&t, &values(vec![Value::string("x".repeat(300))])).unwrap();
        assert_eq!(out.len(), 256);
        assert_eq!(out[0], 255);
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let t = Template::from_slots(&[("a", BinaryType::Hwrd)]).unwrap();
        let err = assemble(&t, &values(vec![Value::I16(1)])).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::TypeMismatch { expected: BinaryType::Hwrd, found: "i16", .. }
        ));
    }

    #[test]
    fn missing_value_is_rejected() {
        let t = Template::from_slots(&[("a", BinaryType::Hwrd), ("b", BinaryType::Hwrd)]).unwrap();
        let err = assemble(&t, &values(vec![Value::U16(1)])).unwrap_err();
        assert!(matches!(err, ResourceError::MissingValue(name) if name == "b"));
    }

    #[test]
    fn pascal_truncation_keeps_whole_characters() {
        let t = Template::from_slots(&[("p", BinaryType::Pstr)]).unwrap();
        let out = assemble(&t, &values(vec![Value::string("é".repeat(128))])).unwrap();
        assert_eq!(out[0], 254);
        let mut back = BTreeMap::new();
        populate(&t, &mut back, &out).unwrap();
        assert_eq!(back[&0].as_str(), Some("é".repeat(127).as_str()));
    }

    #[test]
    fn fixed_strings_truncate_on_character_boundaries() {
        let t = Template::from_slots(&[("f", BinaryType::Cnnn(4))]).unwrap();
        let out = assemble(&t, &values(vec![Value::string("aéé")])).unwrap();
        assert_eq!(out, [b'a', 0xC3, 0xA9, 0]);
    }

    #[test]
    fn interior_nul_is_rejected() {
        let t = Template::from_slots(&[("c", BinaryType::Cstr), ("n", BinaryType::Hbyt)]).unwrap();
        let err = assemble(&t, &values(vec![Value::string("a\0b"), Value::U8(7)])).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidLiteral { ref field, .. } if field == "c"));

        let t = Template::from_slots(&[("f", BinaryType::Cnnn(8))]).unwrap();
        assert!(assemble(&t, &values(vec![Value::string("a\0")])).is_err());
    }

    #[test]
    fn unbounded_cstring_ends_at_eof() {
        let t = Template::from_slots(&[("c", BinaryType::Cstr)]).unwrap();
        let mut out = BTreeMap::new();
        populate(&t, &mut out, b"tail").unwrap();
        assert_eq!(out[&0], Value::String { text: "tail".into(), length: 0 });
    }

    #[test]
    fn truncated_input_keeps_earlier_fields() {
        let t = Template::from_slots(&[("a", BinaryType::Hbyt), ("b", BinaryType::Hlng)]).unwrap();
        let mut out = BTreeMap::new();
        let err = populate(&t, &mut out, &[7, 0, 0]).unwrap_err();
        assert!(matches!(err, PopulateError::Truncated { ref field, .. } if field == "b"));
        assert_eq!(out.get(&0), Some(&Value::U8(7)));
        assert!(out.get(&1).is_none());
    }
}
