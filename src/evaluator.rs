use std::collections::HashMap;

use log::{debug, trace};

use crate::ast::{ArithmeticExpression, Expression};
use crate::error::ExecutionError;
use crate::numeric;
use crate::value::{Array, FieldValue};

/// Scratch state for executing one tree against one document.
///
/// Holds the document's field values readable through `input <name>`. A new
/// context is created per document; contexts are never shared between
/// threads, while the tree they execute may be.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Field values of the current document
    fields: HashMap<String, FieldValue>,
    /// Number of nodes executed so far
    executed: usize,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a document field readable through `input <name>`.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Replaces all document fields at once.
    pub fn with_fields(mut self, fields: HashMap<String, FieldValue>) -> Self {
        self.fields = fields;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Executes `expr` against `input` and returns the value it produces.
    ///
    /// A `None` input is a missing value. Nodes that require input produce
    /// `None` for it rather than failing.
    pub fn execute(
        &mut self,
        expr: &Expression,
        input: Option<&FieldValue>,
    ) -> Result<Option<FieldValue>, ExecutionError> {
        trace!("executing {} '{}'", expr.kind_name(), expr);

        if let Some(required) = expr.required_input_type() {
            let Some(value) = input else {
                return Ok(None);
            };
            let actual = value.data_type();
            if !required.is_unresolved() && actual != required {
                return Err(ExecutionError::InputTypeMismatch {
                    expected: required,
                    actual,
                });
            }
        }

        let output = self.execute_node(expr, input)?;
        self.executed += 1;
        Ok(output)
    }

    fn execute_node(
        &mut self,
        expr: &Expression,
        input: Option<&FieldValue>,
    ) -> Result<Option<FieldValue>, ExecutionError> {
        match expr {
            Expression::Constant(value) => Ok(Some(value.clone())),
            Expression::This => Ok(input.cloned()),
            Expression::Input(field) => Ok(self.fields.get(field).cloned()),
            Expression::Arithmetic(arithmetic) => {
                let left = self.execute(arithmetic.left(), input)?;
                let right = self.execute(arithmetic.right(), input)?;
                match (left, right) {
                    (Some(left), Some(right)) => evaluate_arithmetic(arithmetic, &left, &right).map(Some),
                    _ => Ok(None),
                }
            }
            Expression::ToArray => input.map(to_array).transpose(),
            Expression::ToNumeric(target) => input.map(|value| numeric::convert(value, *target)).transpose(),
            Expression::Function(function) => input.map(|value| function.apply(value)).transpose(),
            Expression::Statement(stages) => {
                let mut current = input.cloned();
                for stage in stages {
                    current = self.execute(stage, current.as_ref())?;
                }
                Ok(current)
            }
        }
    }
}

/// Fuses two operand values exactly and narrows the result by their runtime
/// kinds, which may differ from the statically verified types when those were
/// unresolved.
fn evaluate_arithmetic(
    expr: &ArithmeticExpression,
    left: &FieldValue,
    right: &FieldValue,
) -> Result<FieldValue, ExecutionError> {
    let (Some(left_kind), Some(right_kind)) = (left.numeric_type(), right.numeric_type()) else {
        return Err(ExecutionError::UnsupportedArithmetic {
            left: left.data_type(),
            op: expr.op(),
            right: right.data_type(),
        });
    };

    let lhs = numeric::to_decimal(left)?;
    let rhs = numeric::to_decimal(right)?;
    let result = numeric::apply(expr.op(), lhs, rhs)
        .ok_or_else(|| ExecutionError::DivisionByZero(expr.to_string()))?;

    numeric::narrow(&result, left_kind.promote(right_kind))
}

/// Wraps a value into an array typed by the value's own runtime type.
fn to_array(value: &FieldValue) -> Result<FieldValue, ExecutionError> {
    let mut array = Array::new(value.data_type());
    array.add(value.clone())?;
    Ok(FieldValue::Array(array))
}

impl Expression {
    /// Executes this expression within an existing pass.
    pub fn execute(
        &self,
        context: &mut ExecutionContext,
        input: Option<&FieldValue>,
    ) -> Result<Option<FieldValue>, ExecutionError> {
        context.execute(self, input)
    }

    /// Executes this expression against a single value with a fresh context.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexing_expr::{ArithmeticOperator, Expression, FieldValue};
    ///
    /// let expr = Expression::arithmetic(
    ///     Expression::This,
    ///     ArithmeticOperator::Multiply,
    ///     Expression::constant(3i32),
    /// ).unwrap();
    ///
    /// let output = expr.execute_value(FieldValue::Int(7)).unwrap();
    /// assert_eq!(output, Some(FieldValue::Int(21)));
    /// ```
    pub fn execute_value(&self, input: FieldValue) -> Result<Option<FieldValue>, ExecutionError> {
        let mut context = ExecutionContext::new();
        let output = context.execute(self, Some(&input))?;
        debug!("executed '{}' over {} nodes", self, context.executed());
        Ok(output)
    }
}
