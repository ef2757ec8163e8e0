//! Binary field encodings (type tags) of the legacy resource format.
//!
//! Every tag has a 16-bit raw form. The high nibble selects the kind; for
//! integers the low bits hold the width in bytes, and for fixed-width C
//! strings the low 12 bits hold the declared width.
//!
//! | Raw | Mnemonic | On disk |
//! |-----|----------|---------|
//! | `0x0001`..`0x0008` | `DBYT` `DWRD` `DLNG` `DQAD` | signed, 1/2/4/8 bytes |
//! | `0x1001`..`0x1008` | `HBYT` `HWRD` `HLNG` `HQAD` | unsigned, 1/2/4/8 bytes |
//! | `0x2000` | `RECT` | 4 x i16 (top, left, bottom, right) |
//! | `0x3000` | `PSTR` | length byte + bytes |
//! | `0x4nnn` | `Cnnn` | nnn bytes, NUL padded |
//! | `0x5000` | `CSTR` | bytes + NUL |
//! | `0x6000` | `HEXD` | length byte + bytes |

use std::fmt;

const KIND_MASK: u16 = 0xF000;
const WIDTH_MASK: u16 = 0x0FFF;

const KIND_SIGNED: u16 = 0x0000;
const KIND_UNSIGNED: u16 = 0x1000;
const KIND_RECT: u16 = 0x2000;
const KIND_PSTR: u16 = 0x3000;
const KIND_CNNN: u16 = 0x4000;
const KIND_CSTR: u16 = 0x5000;
const KIND_HEXD: u16 = 0x6000;

/// Largest declared width of a `Cnnn` field.
pub const MAX_FIXED_CSTRING_WIDTH: u16 = WIDTH_MASK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryType {
    Dbyt,
    Dwrd,
    Dlng,
    Dqad,
    Hbyt,
    Hwrd,
    Hlng,
    Hqad,
    Rect,
    Pstr,
    /// C string of a fixed declared width in bytes.
    Cnnn(u16),
    Cstr,
    Hexd,
    /// A raw tag that does not name any known encoding.
    Invalid(u16),
}

impl BinaryType {
    /// Decode a raw 16-bit tag. Unknown tags become [`BinaryType::Invalid`].
    pub fn from_raw(raw: u16) -> Self {
        let width = raw & WIDTH_MASK;
        match (raw & KIND_MASK, width) {
            (KIND_SIGNED, 1) => BinaryType::Dbyt,
            (KIND_SIGNED, 2) => BinaryType::Dwrd,
            (KIND_SIGNED, 4) => BinaryType::Dlng,
            (KIND_SIGNED, 8) => BinaryType::Dqad,
            (KIND_UNSIGNED, 1) => BinaryType::Hbyt,
            (KIND_UNSIGNED, 2) => BinaryType::Hwrd,
            (KIND_UNSIGNED, 4) => BinaryType::Hlng,
            (KIND_UNSIGNED, 8) => BinaryType::Hqad,
            (KIND_RECT, 0) => BinaryType::Rect,
            (KIND_PSTR, 0) => BinaryType::Pstr,
            (KIND_CNNN, w) if w > 0 => BinaryType::Cnnn(w),
            (KIND_CSTR, 0) => BinaryType::Cstr,
            (KIND_HEXD, 0) => BinaryType::Hexd,
            _ => BinaryType::Invalid(raw),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            BinaryType::Dbyt => KIND_SIGNED | 1,
            BinaryType::Dwrd => KIND_SIGNED | 2,
            BinaryType::Dlng => KIND_SIGNED | 4,
            BinaryType::Dqad => KIND_SIGNED | 8,
            BinaryType::Hbyt => KIND_UNSIGNED | 1,
            BinaryType::Hwrd => KIND_UNSIGNED | 2,
            BinaryType::Hlng => KIND_UNSIGNED | 4,
            BinaryType::Hqad => KIND_UNSIGNED | 8,
            BinaryType::Rect => KIND_RECT,
            BinaryType::Pstr => KIND_PSTR,
            BinaryType::Cnnn(w) => KIND_CNNN | (w & WIDTH_MASK),
            BinaryType::Cstr => KIND_CSTR,
            BinaryType::Hexd => KIND_HEXD,
            BinaryType::Invalid(raw) => raw,
        }
    }

    /// Bytes occupied on disk, or 0 for variable-length encodings.
    pub fn width(self) -> usize {
        match self {
            BinaryType::Dbyt | BinaryType::Hbyt => 1,
            BinaryType::Dwrd | BinaryType::Hwrd => 2,
            BinaryType::Dlng | BinaryType::Hlng => 4,
            BinaryType::Dqad | BinaryType::Hqad => 8,
            BinaryType::Rect => 8,
            BinaryType::Cnnn(w) => w as usize,
            BinaryType::Pstr | BinaryType::Cstr | BinaryType::Hexd | BinaryType::Invalid(_) => 0,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BinaryType::Dbyt | BinaryType::Dwrd | BinaryType::Dlng | BinaryType::Dqad
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BinaryType::Hbyt | BinaryType::Hwrd | BinaryType::Hlng | BinaryType::Hqad
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_string(self) -> bool {
        matches!(self, BinaryType::Pstr | BinaryType::Cnnn(_) | BinaryType::Cstr)
    }

    pub fn is_valid(self) -> bool {
        !matches!(self, BinaryType::Invalid(_))
    }

    /// Parse a template mnemonic such as `HWRD`, `PSTR` or `C020` (width in hex).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        let ty = match name {
            "DBYT" => BinaryType::Dbyt,
            "DWRD" => BinaryType::Dwrd,
            "DLNG" => BinaryType::Dlng,
            "DQAD" => BinaryType::Dqad,
            "HBYT" => BinaryType::Hbyt,
            "HWRD" => BinaryType::Hwrd,
            "HLNG" => BinaryType::Hlng,
            "HQAD" => BinaryType::Hqad,
            "RECT" => BinaryType::Rect,
            "PSTR" => BinaryType::Pstr,
            "CSTR" => BinaryType::Cstr,
            "HEXD" => BinaryType::Hexd,
            _ => {
                let digits = name.strip_prefix('C')?;
                if digits.len() != 3 {
                    return None;
                }
                let width = u16::from_str_radix(digits, 16).ok()?;
                if width == 0 {
                    return None;
                }
                BinaryType::Cnnn(width)
            }
        };
        Some(ty)
    }

    pub fn mnemonic(self) -> String {
        match self {
            BinaryType::Dbyt => "DBYT".to_string(),
            BinaryType::Dwrd => "DWRD".to_string(),
            BinaryType::Dlng => "DLNG".to_string(),
            BinaryType::Dqad => "DQAD".to_string(),
            BinaryType::Hbyt => "HBYT".to_string(),
            BinaryType::Hwrd => "HWRD".to_string(),
            BinaryType::Hlng => "HLNG".to_string(),
            BinaryType::Hqad => "HQAD".to_string(),
            BinaryType::Rect => "RECT".to_string(),
            BinaryType::Pstr => "PSTR".to_string(),
            BinaryType::Cnnn(w) => format!("C{:03X}", w),
            BinaryType::Cstr => "CSTR".to_string(),
            BinaryType::Hexd => "HEXD".to_string(),
            BinaryType::Invalid(raw) => format!("?{:04X}", raw),
        }
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic())
    }
}
