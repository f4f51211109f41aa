//! Static type propagation.
//!
//! A [`VerificationContext`] runs one verification pass over one tree. The
//! pass is a function from an input type to an output type: every node
//! receives its input explicitly and returns its output explicitly, so the
//! operands of a composite always see the same input and never each other's
//! result. The first conflict aborts the pass.

use std::collections::HashMap;

use log::{debug, trace};

use crate::ast::expressions::unify_required_input;
use crate::ast::{ArithmeticExpression, ArithmeticOperator, Expression};
use crate::error::VerificationError;
use crate::types::DataType;

/// Scratch state for a single verification pass.
///
/// Carries the declared field types of the document schema and counts what
/// the pass has seen. Not meant to be reused across passes.
#[derive(Debug, Default)]
pub struct VerificationContext {
    field_types: HashMap<String, DataType>,
    verified: usize,
    deferred: usize,
}

impl VerificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the type of a document field readable through `input <name>`.
    pub fn with_field_type(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.field_types.insert(name.into(), data_type);
        self
    }

    pub fn field_type(&self, name: &str) -> Option<&DataType> {
        self.field_types.get(name)
    }

    pub fn field_types(&self) -> &HashMap<String, DataType> {
        &self.field_types
    }

    /// Number of nodes verified so far.
    pub fn verified(&self) -> usize {
        self.verified
    }

    /// Number of nodes whose output type was left unresolved for execution
    /// time to decide.
    pub fn deferred(&self) -> usize {
        self.deferred
    }

    /// Verifies `expr` against `input` and returns the type it produces.
    ///
    /// `None` as input means the stage receives no value; `None` as output
    /// means the stage produces none.
    pub fn verify(
        &mut self,
        expr: &Expression,
        input: Option<&DataType>,
    ) -> Result<Option<DataType>, VerificationError> {
        trace!("verifying {} '{}' with input {:?}", expr.kind_name(), expr, input);

        check_required_input(expr, input)?;
        let output = self.verify_node(expr, input)?;
        check_created_output(expr, output.as_ref())?;

        self.verified += 1;
        Ok(output)
    }

    fn verify_node(
        &mut self,
        expr: &Expression,
        input: Option<&DataType>,
    ) -> Result<Option<DataType>, VerificationError> {
        match expr {
            Expression::Constant(value) => Ok(Some(value.data_type())),
            Expression::This => Ok(input.cloned()),
            Expression::Input(field) => self
                .field_types
                .get(field)
                .cloned()
                .map(Some)
                .ok_or_else(|| VerificationError::UnknownField(field.clone())),
            Expression::Arithmetic(arithmetic) => self.verify_arithmetic(arithmetic, input),
            Expression::ToArray => {
                let element = input.cloned().unwrap_or(DataType::Unresolved);
                if element.is_unresolved() {
                    self.defer(expr);
                }
                Ok(Some(DataType::array(element)))
            }
            Expression::ToNumeric(target) => match input {
                Some(ty) if ty.is_numeric() || ty.is_unresolved() || *ty == DataType::String => {
                    Ok(Some(target.data_type()))
                }
                Some(ty) => Err(VerificationError::UnsupportedInput {
                    expression: expr.to_string(),
                    actual: ty.clone(),
                }),
                None => Ok(Some(target.data_type())),
            },
            Expression::Function(function) => Ok(Some(function.output_type())),
            Expression::Statement(stages) => {
                let mut current = input.cloned();
                for stage in stages {
                    current = self.verify(stage, current.as_ref())?;
                }
                Ok(current)
            }
        }
    }

    fn verify_arithmetic(
        &mut self,
        expr: &ArithmeticExpression,
        input: Option<&DataType>,
    ) -> Result<Option<DataType>, VerificationError> {
        unify_required_input(
            expr.op(),
            expr.left().required_input_type().as_ref(),
            expr.right().required_input_type().as_ref(),
        )?;

        let left = self.verify(expr.left(), input)?;
        let right = self.verify(expr.right(), input)?;

        let (Some(left), Some(right)) = (left, right) else {
            return Err(VerificationError::NullArithmetic(expr.to_string()));
        };

        let output = arithmetic_output_type(expr.op(), &left, &right)?;
        if output.is_unresolved() {
            debug!("deferring '{}' to execution: operand types {} and {}", expr, left, right);
            self.deferred += 1;
        }
        Ok(Some(output))
    }

    fn defer(&mut self, expr: &Expression) {
        debug!("deferring '{}' to execution: input type unresolved", expr);
        self.deferred += 1;
    }
}

/// Output type of `left op right`.
///
/// Both operands must be numeric. If either is `float` or `double` the result
/// is `double` when either is `double`, else `float`. Otherwise `long` when
/// either is `long`, otherwise `int`. An unresolved operand makes the result
/// unresolved, unless the other operand can already never be numeric.
pub fn arithmetic_output_type(
    op: ArithmeticOperator,
    left: &DataType,
    right: &DataType,
) -> Result<DataType, VerificationError> {
    let unsupported = || VerificationError::UnsupportedArithmetic {
        left: left.clone(),
        op,
        right: right.clone(),
    };

    let admissible = |ty: &DataType| ty.is_numeric() || ty.is_unresolved();
    if !admissible(left) || !admissible(right) {
        return Err(unsupported());
    }

    match (left.as_numeric(), right.as_numeric()) {
        (Some(l), Some(r)) => Ok(l.promote(r).data_type()),
        _ => Ok(DataType::Unresolved),
    }
}

fn check_required_input(expr: &Expression, input: Option<&DataType>) -> Result<(), VerificationError> {
    let Some(required) = expr.required_input_type() else {
        return Ok(());
    };
    match input {
        None => Err(VerificationError::MissingInput { expected: required }),
        Some(actual) if actual.is_unresolved() || required.is_unresolved() => Ok(()),
        Some(actual) if *actual != required => Err(VerificationError::InputTypeMismatch {
            expected: required,
            actual: actual.clone(),
        }),
        Some(_) => Ok(()),
    }
}

fn check_created_output(expr: &Expression, output: Option<&DataType>) -> Result<(), VerificationError> {
    match (expr.created_output_type(), output) {
        (Some(created), Some(actual))
            if !created.is_unresolved() && !actual.is_unresolved() && created != *actual =>
        {
            Err(VerificationError::OutputTypeMismatch {
                expected: created,
                actual: actual.clone(),
            })
        }
        _ => Ok(()),
    }
}

impl Expression {
    /// Verifies this expression within an existing pass.
    pub fn verify(
        &self,
        context: &mut VerificationContext,
        input: Option<&DataType>,
    ) -> Result<Option<DataType>, VerificationError> {
        context.verify(self, input)
    }

    /// Runs a complete verification pass with a fresh context.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexing_expr::{ArithmeticOperator, DataType, Expression};
    ///
    /// let expr = Expression::arithmetic(
    ///     Expression::This,
    ///     ArithmeticOperator::Multiply,
    ///     Expression::constant(2i64),
    /// ).unwrap();
    ///
    /// let output = expr.verify_input(DataType::Int).unwrap();
    /// assert_eq!(output, Some(DataType::Long));
    /// ```
    pub fn verify_input(&self, input: DataType) -> Result<Option<DataType>, VerificationError> {
        let mut context = VerificationContext::new();
        debug!("verifying '{}' against {}", self, input);
        let output = context.verify(self, Some(&input))?;
        debug!(
            "verified '{}': {} nodes, {} deferred, output {:?}",
            self,
            context.verified(),
            context.deferred(),
            output
        );
        Ok(output)
    }
}
