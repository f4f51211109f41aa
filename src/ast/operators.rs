use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary arithmetic operators.
///
/// Lower precedence values bind tighter: `*`, `/` and `%` have precedence 0,
/// `+` and `-` have precedence 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArithmeticOperator {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Remainder (`%`)
    Modulo,
}

impl ArithmeticOperator {
    pub fn precedence(self) -> u8 {
        match self {
            ArithmeticOperator::Multiply | ArithmeticOperator::Divide | ArithmeticOperator::Modulo => 0,
            ArithmeticOperator::Add | ArithmeticOperator::Subtract => 1,
        }
    }

    /// Returns true if `self` binds at least as tightly as `other`.
    pub fn precedes(self, other: ArithmeticOperator) -> bool {
        self.precedence() <= other.precedence()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
            ArithmeticOperator::Modulo => "%",
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
