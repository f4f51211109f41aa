use std::fmt;

use crate::ast::{ArithmeticOperator, Function};
use crate::error::VerificationError;
use crate::types::{DataType, NumericType};
use crate::value::FieldValue;

/// A node of an indexing expression tree.
///
/// Trees are compared and hashed structurally, so identical stages can be
/// deduplicated across a pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Literal value; ignores its input.
    ///
    /// # Example
    /// ```text
    /// 42
    /// 2.5
    /// "hello"
    /// ```
    Constant(FieldValue),

    /// Passes its input through unchanged (`this`).
    This,

    /// Reads a named field of the current document.
    ///
    /// # Example
    /// ```text
    /// input price
    /// ```
    Input(String),

    /// Binary arithmetic over two operands that both see the same input.
    ///
    /// # Example
    /// ```text
    /// input price * 2
    /// ```
    Arithmetic(ArithmeticExpression),

    /// Wraps the input into a single-element array (`to_array`).
    ToArray,

    /// Numeric conversion (`to_byte`, `to_int`, `to_long`, `to_float`, `to_double`).
    ToNumeric(NumericType),

    /// Built-in function applied to the input.
    Function(Function),

    /// Pipes each stage's output into the next (`a | b | c`).
    Statement(Vec<Expression>),
}

impl Expression {
    pub fn constant(value: impl Into<FieldValue>) -> Self {
        Expression::Constant(value.into())
    }

    pub fn input(field: impl Into<String>) -> Self {
        Expression::Input(field.into())
    }

    /// Builds an arithmetic node, failing if the operands demand conflicting
    /// input types.
    pub fn arithmetic(
        left: Expression,
        op: ArithmeticOperator,
        right: Expression,
    ) -> Result<Self, VerificationError> {
        ArithmeticExpression::new(left, op, right).map(Expression::Arithmetic)
    }

    pub fn statement(stages: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Statement(stages.into_iter().collect())
    }

    /// Short variant name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Constant(_) => "constant",
            Expression::This => "this",
            Expression::Input(_) => "input",
            Expression::Arithmetic(_) => "arithmetic",
            Expression::ToArray => "to_array",
            Expression::ToNumeric(_) => "to_numeric",
            Expression::Function(_) => "function",
            Expression::Statement(_) => "statement",
        }
    }

    /// The input type this node demands, or `None` if it is unconstrained.
    ///
    /// `Some(DataType::Unresolved)` accepts any type but still requires an
    /// input to be present.
    pub fn required_input_type(&self) -> Option<DataType> {
        match self {
            Expression::Constant(_) | Expression::Input(_) => None,
            Expression::This | Expression::ToArray | Expression::ToNumeric(_) => {
                Some(DataType::Unresolved)
            }
            Expression::Arithmetic(arithmetic) => arithmetic.required_input.clone(),
            Expression::Function(function) => Some(function.input_type()),
            Expression::Statement(stages) => {
                stages.first().and_then(Expression::required_input_type)
            }
        }
    }

    /// The output type this node creates, independent of its input.
    ///
    /// `None` means the node forwards a type it does not create itself.
    /// Arithmetic and array nodes report [`DataType::Unresolved`]: their
    /// output depends on what their input turns out to be.
    pub fn created_output_type(&self) -> Option<DataType> {
        match self {
            Expression::Constant(value) => Some(value.data_type()),
            Expression::This | Expression::Input(_) => None,
            Expression::Arithmetic(_) | Expression::ToArray => Some(DataType::Unresolved),
            Expression::ToNumeric(target) => Some(target.data_type()),
            Expression::Function(function) => Some(function.output_type()),
            Expression::Statement(stages) => stages.last().and_then(Expression::created_output_type),
        }
    }

    /// Direct children in evaluation order. Empty for leaves.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Arithmetic(arithmetic) => vec![arithmetic.left(), arithmetic.right()],
            Expression::Statement(stages) => stages.iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Expression::Arithmetic(_) | Expression::Statement(_))
    }
}

impl From<ArithmeticExpression> for Expression {
    fn from(value: ArithmeticExpression) -> Self {
        Expression::Arithmetic(value)
    }
}

impl From<Function> for Expression {
    fn from(value: Function) -> Self {
        Expression::Function(value)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::This => write!(f, "this"),
            Expression::Input(field) => write!(f, "input {}", field),
            Expression::Arithmetic(arithmetic) => write!(f, "{}", arithmetic),
            Expression::ToArray => write!(f, "to_array"),
            Expression::ToNumeric(target) => write!(f, "to_{}", target),
            Expression::Function(function) => write!(f, "{}", function),
            Expression::Statement(stages) => {
                for (i, stage) in stages.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", stage)?;
                }
                Ok(())
            }
        }
    }
}

/// Binary arithmetic node: `left op right`.
///
/// The required input type is unified from both operands when the node is
/// built, so a node that exists never carries conflicting requirements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArithmeticExpression {
    left: Box<Expression>,
    op: ArithmeticOperator,
    right: Box<Expression>,
    required_input: Option<DataType>,
}

impl ArithmeticExpression {
    pub fn new(
        left: Expression,
        op: ArithmeticOperator,
        right: Expression,
    ) -> Result<Self, VerificationError> {
        let required_input = unify_required_input(
            op,
            left.required_input_type().as_ref(),
            right.required_input_type().as_ref(),
        )?;
        Ok(ArithmeticExpression {
            left: Box::new(left),
            op,
            right: Box::new(right),
            required_input,
        })
    }

    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn op(&self) -> ArithmeticOperator {
        self.op
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, operand: &Expression, is_right: bool) -> fmt::Result {
        let parenthesise = match operand {
            Expression::Arithmetic(inner) if is_right => inner.op.precedence() >= self.op.precedence(),
            Expression::Arithmetic(inner) => !inner.op.precedes(self.op),
            Expression::Statement(stages) => stages.len() > 1,
            _ => false,
        };
        if parenthesise {
            write!(f, "({})", operand)
        } else {
            write!(f, "{}", operand)
        }
    }
}

impl fmt::Display for ArithmeticExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_operand(f, &self.left, false)?;
        write!(f, " {} ", self.op)?;
        self.fmt_operand(f, &self.right, true)
    }
}

/// Unifies the input requirements of two operands.
///
/// If both operands demand an input type, the types must be equal; otherwise
/// whichever one is present wins. [`DataType::Unresolved`] is compared like
/// any other type, so `this + lowercase` conflicts, and so do `int` and
/// `long`.
pub fn unify_required_input(
    op: ArithmeticOperator,
    left: Option<&DataType>,
    right: Option<&DataType>,
) -> Result<Option<DataType>, VerificationError> {
    match (left, right) {
        (None, None) => Ok(None),
        (Some(ty), None) | (None, Some(ty)) => Ok(Some(ty.clone())),
        (Some(l), Some(r)) if l == r => Ok(Some(l.clone())),
        (Some(l), Some(r)) => Err(VerificationError::ConflictingInputTypes {
            left: l.clone(),
            op,
            right: r.clone(),
        }),
    }
}
