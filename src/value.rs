use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ExecutionError;
use crate::types::{DataType, NumericType};

/// A concrete field value flowing through an expression at execution time.
///
/// There is one variant per numeric [`DataType`] plus booleans, strings and
/// typed arrays. A missing value is represented as `Option::None` by the
/// execution pass, never as a variant of this enum.
///
/// # Equality
///
/// Floating-point payloads compare and hash by bit pattern, so a
/// `FieldValue` is a valid `Eq + Hash` key and expression trees holding
/// constants can be deduplicated. Under this rule `NaN == NaN` and
/// `0.0 != -0.0`.
///
/// # Examples
///
/// ```
/// use indexing_expr::{DataType, FieldValue};
///
/// let value = FieldValue::from(42i64);
/// assert_eq!(value.data_type(), DataType::Long);
///
/// let text = FieldValue::from("hello");
/// assert_eq!(text.data_type(), DataType::String);
/// ```
#[derive(Debug, Clone)]
pub enum FieldValue {
    Byte(i8),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    Array(Array),
}

impl FieldValue {
    /// Runtime type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            FieldValue::Byte(_) => DataType::Byte,
            FieldValue::Int(_) => DataType::Int,
            FieldValue::Long(_) => DataType::Long,
            FieldValue::Float(_) => DataType::Float,
            FieldValue::Double(_) => DataType::Double,
            FieldValue::Bool(_) => DataType::Bool,
            FieldValue::String(_) => DataType::String,
            FieldValue::Array(array) => DataType::array(array.element_type().clone()),
        }
    }

    /// Numeric kind of this value, if it is numeric.
    pub fn numeric_type(&self) -> Option<NumericType> {
        match self {
            FieldValue::Byte(_) => Some(NumericType::Byte),
            FieldValue::Int(_) => Some(NumericType::Int),
            FieldValue::Long(_) => Some(NumericType::Long),
            FieldValue::Float(_) => Some(NumericType::Float),
            FieldValue::Double(_) => Some(NumericType::Double),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_type().is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            FieldValue::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Integral payload widened to `i64`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            FieldValue::Byte(n) => Some(i64::from(*n)),
            FieldValue::Int(n) => Some(i64::from(*n)),
            FieldValue::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Floating-point payload widened to `f64`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(f64::from(*n)),
            FieldValue::Double(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        use FieldValue::*;
        match (self, other) {
            (Byte(a), Byte(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Bool(a), Bool(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Byte(n) => n.hash(state),
            FieldValue::Int(n) => n.hash(state),
            FieldValue::Long(n) => n.hash(state),
            FieldValue::Float(n) => n.to_bits().hash(state),
            FieldValue::Double(n) => n.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::String(s) => s.hash(state),
            FieldValue::Array(array) => array.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Byte(n) => write!(f, "{}", n),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Long(n) => write!(f, "{}L", n),
            FieldValue::Float(n) => write!(f, "{}f", n),
            FieldValue::Double(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::String(s) => write!(f, "{:?}", s),
            FieldValue::Array(array) => write!(f, "{}", array),
        }
    }
}

impl From<i8> for FieldValue {
    fn from(value: i8) -> Self {
        FieldValue::Byte(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Long(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Array> for FieldValue {
    fn from(value: Array) -> Self {
        FieldValue::Array(value)
    }
}

/// Ordered container whose element type is fixed when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Array {
    element_type: DataType,
    values: Vec<FieldValue>,
}

impl Array {
    pub fn new(element_type: DataType) -> Self {
        Array {
            element_type,
            values: Vec::new(),
        }
    }

    pub fn element_type(&self) -> &DataType {
        &self.element_type
    }

    /// Appends a value, rejecting values whose runtime type differs from the
    /// element type.
    pub fn add(&mut self, value: FieldValue) -> Result<(), ExecutionError> {
        let actual = value.data_type();
        if actual != self.element_type {
            return Err(ExecutionError::ArrayElementMismatch {
                expected: self.element_type.clone(),
                actual,
            });
        }
        self.values.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        self.values.iter()
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a FieldValue;
    type IntoIter = std::slice::Iter<'a, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}
