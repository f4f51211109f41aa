use std::fmt;

use crate::error::ExecutionError;
use crate::types::DataType;
use crate::value::FieldValue;

/// Built-in single-input functions.
///
/// Each function declares a fixed input and output type, so these nodes are
/// fully checked at verification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `lowercase`: string → string
    Lowercase,
    /// `uppercase`: string → string
    Uppercase,
    /// `trim`: string → string, strips leading and trailing whitespace
    Trim,
    /// `hex_encode`: long → string, two's-complement hex digits
    HexEncode,
    /// `hex_decode`: string → long, accepts up to 16 hex digits
    HexDecode,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Lowercase => "lowercase",
            Function::Uppercase => "uppercase",
            Function::Trim => "trim",
            Function::HexEncode => "hex_encode",
            Function::HexDecode => "hex_decode",
        }
    }

    pub fn input_type(self) -> DataType {
        match self {
            Function::Lowercase | Function::Uppercase | Function::Trim | Function::HexDecode => {
                DataType::String
            }
            Function::HexEncode => DataType::Long,
        }
    }

    pub fn output_type(self) -> DataType {
        match self {
            Function::Lowercase | Function::Uppercase | Function::Trim | Function::HexEncode => {
                DataType::String
            }
            Function::HexDecode => DataType::Long,
        }
    }

    /// Applies the function to a value that already matched [`Function::input_type`].
    pub(crate) fn apply(self, input: &FieldValue) -> Result<FieldValue, ExecutionError> {
        match (self, input) {
            (Function::Lowercase, FieldValue::String(s)) => Ok(FieldValue::String(s.to_lowercase())),
            (Function::Uppercase, FieldValue::String(s)) => Ok(FieldValue::String(s.to_uppercase())),
            (Function::Trim, FieldValue::String(s)) => Ok(FieldValue::String(s.trim().to_string())),
            (Function::HexEncode, FieldValue::Long(n)) => Ok(FieldValue::String(format!("{:x}", n))),
            (Function::HexDecode, FieldValue::String(s)) => decode_hex(s),
            (_, other) => Err(ExecutionError::InputTypeMismatch {
                expected: self.input_type(),
                actual: other.data_type(),
            }),
        }
    }
}

fn decode_hex(text: &str) -> Result<FieldValue, ExecutionError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let invalid = || ExecutionError::InvalidConversion {
        value: text.to_string(),
        target: DataType::Long,
    };
    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    // 16 digits may set the sign bit; reinterpret rather than overflow.
    u64::from_str_radix(digits, 16)
        .map(|bits| FieldValue::Long(bits as i64))
        .map_err(|_| invalid())
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
