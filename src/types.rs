//! Static type vocabulary for the indexing expression language.
//!
//! A [`DataType`] describes the shape a field value has at configuration time.
//! The numeric subset is split out as [`NumericType`] so the promotion rule can
//! be written as an exhaustive match instead of a chain of identity checks.
//!
//! # Promotion
//!
//! ```
//! use indexing_expr::types::NumericType;
//!
//! assert_eq!(NumericType::Int.promote(NumericType::Long), NumericType::Long);
//! assert_eq!(NumericType::Float.promote(NumericType::Long), NumericType::Float);
//! assert_eq!(NumericType::Byte.promote(NumericType::Byte), NumericType::Int);
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Static description of a field's value shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    /// 8-bit signed integer
    Byte,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE-754 float
    Float,
    /// 64-bit IEEE-754 float
    Double,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Ordered container with a fixed element type
    Array(Box<DataType>),
    /// The type is only known once a concrete value flows through.
    ///
    /// Verification treats a node producing this type as deferred rather
    /// than failed.
    Unresolved,
}

impl DataType {
    /// Array constructor: `DataType::array(DataType::Int)` is `Array<int>`.
    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    /// Returns the numeric view of this type, if it belongs to the numeric subset.
    pub fn as_numeric(&self) -> Option<NumericType> {
        match self {
            DataType::Byte => Some(NumericType::Byte),
            DataType::Int => Some(NumericType::Int),
            DataType::Long => Some(NumericType::Long),
            DataType::Float => Some(NumericType::Float),
            DataType::Double => Some(NumericType::Double),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_numeric().is_some()
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, DataType::Unresolved)
    }

    /// Element type of an array type.
    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            DataType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Human-readable name used in diagnostics.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Byte => write!(f, "byte"),
            DataType::Int => write!(f, "int"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::Bool => write!(f, "bool"),
            DataType::String => write!(f, "string"),
            DataType::Array(element) => write!(f, "Array<{}>", element),
            DataType::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// The numeric subset of [`DataType`].
///
/// Ordered `{Byte, Int} < Long < Float < Double` for promotion purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumericType {
    Byte,
    Int,
    Long,
    Float,
    Double,
}

impl NumericType {
    /// Shared result kind of a binary arithmetic operator.
    ///
    /// Commutative. `Byte` is accepted as an operand but never returned: a
    /// `Byte`/`Byte` or `Byte`/`Int` pair widens to `Int`.
    pub fn promote(self, other: NumericType) -> NumericType {
        use NumericType::*;
        match (self, other) {
            (Double, _) | (_, Double) => Double,
            (Float, _) | (_, Float) => Float,
            (Long, _) | (_, Long) => Long,
            _ => Int,
        }
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, NumericType::Float | NumericType::Double)
    }

    pub fn data_type(self) -> DataType {
        DataType::from(self)
    }
}

impl From<NumericType> for DataType {
    fn from(value: NumericType) -> Self {
        match value {
            NumericType::Byte => DataType::Byte,
            NumericType::Int => DataType::Int,
            NumericType::Long => DataType::Long,
            NumericType::Float => DataType::Float,
            NumericType::Double => DataType::Double,
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DataType::from(*self))
    }
}
