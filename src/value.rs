//! Slot values held by a resource (codec representation).

use crate::binary_type::BinaryType;

/// Four signed 16-bit edges, stored on disk in this field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    pub fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Rect { top, left, bottom, right }
    }
}

/// A single slot value. One variant per family of binary encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Rect(Rect),
    /// Text plus its length hint: the byte length for Pascal strings, the
    /// declared width for fixed C strings, 0 for unbounded C strings.
    String { text: String, length: usize },
    Bytes(Vec<u8>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.len();
        Value::String { text, length }
    }

    /// Whether this value can be encoded as `ty`.
    pub fn fits(&self, ty: BinaryType) -> bool {
        matches!(
            (self, ty),
            (Value::I8(_), BinaryType::Dbyt)
                | (Value::I16(_), BinaryType::Dwrd)
                | (Value::I32(_), BinaryType::Dlng)
                | (Value::I64(_), BinaryType::Dqad)
                | (Value::U8(_), BinaryType::Hbyt)
                | (Value::U16(_), BinaryType::Hwrd)
                | (Value::U32(_), BinaryType::Hlng)
                | (Value::U64(_), BinaryType::Hqad)
                | (Value::Rect(_), BinaryType::Rect)
                | (Value::String { .. }, BinaryType::Pstr | BinaryType::Cnnn(_) | BinaryType::Cstr)
                | (Value::Bytes(_), BinaryType::Hexd)
        )
    }

    /// Short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Rect(_) => "rect",
            Value::String { .. } => "string",
            Value::Bytes(_) => "bytes",
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(x) => Some(*x as u64),
            Value::U16(x) => Some(*x as u64),
            Value::U32(x) => Some(*x as u64),
            Value::U64(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(x) => Some(*x as i64),
            Value::I16(x) => Some(*x as i64),
            Value::I32(x) => Some(*x as i64),
            Value::I64(x) => Some(*x),
            Value::U8(x) => Some(*x as i64),
            Value::U16(x) => Some(*x as i64),
            Value::U32(x) => Some(*x as i64),
            Value::U64(x) => i64::try_from(*x).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Value::Rect(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}
