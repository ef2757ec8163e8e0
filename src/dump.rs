//! Format tokens, slot values and raw resource bytes for display.

use crate::resource::Resource;
use crate::token::Token;
use crate::value::Value;
use std::fmt::Write;

/// One token per line: kind, text, and optionally `line:offset`.
pub fn format_token(token: &Token, positions: bool) -> String {
    let mut out = String::new();
    if positions {
        let _ = write!(out, "{:>4}:{:<3} ", token.line(), token.offset());
    }
    let _ = write!(out, "{:?} {:?}", token.kind(), token.text());
    if token.components().len() > 1 {
        let _ = write!(out, " {:?}", token.components());
    }
    out
}

pub fn format_value(v: &Value) -> String {
    match v {
        Value::U8(x) => format!("{}", x),
        Value::U16(x) => format!("{}", x),
        Value::U32(x) => format!("{}", x),
        Value::U64(x) => format!("{}", x),
        Value::I8(x) => format!("{}", x),
        Value::I16(x) => format!("{}", x),
        Value::I32(x) => format!("{}", x),
        Value::I64(x) => format!("{}", x),
        Value::Rect(r) => format!("({}, {}, {}, {})", r.top, r.left, r.bottom, r.right),
        Value::String { text, .. } => format!("{:?}", text),
        Value::Bytes(b) => format!("0x{}", hex(b)),
    }
}

/// Every template slot in order as `label TYPE = value`, `<unset>` for
/// slots not written yet.
pub fn format_resource(resource: &Resource<'_>) -> String {
    let mut out = format!("{} #{} {:?}\n", resource.type_code(), resource.id(), resource.name());
    for (i, field) in resource.template().fields().iter().enumerate() {
        let value = resource
            .value_at(i)
            .map(format_value)
            .unwrap_or_else(|| "<unset>".to_string());
        let _ = writeln!(out, "  {} {} = {}", field.name(), field.ty, value);
    }
    out
}

/// Classic 16-bytes-per-row hex dump with offsets.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", row * 16);
        for b in chunk {
            let _ = write!(out, "{:02x} ", b);
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push(' ');
        out.extend(chunk.iter().map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' }));
        out.push('\n');
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
