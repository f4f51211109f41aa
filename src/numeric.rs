//! Exact decimal arithmetic over numeric field values.
//!
//! Operands are lifted into [`BigDecimal`] before any operator runs, so the
//! result does not depend on native floating-point rounding. Floating-point
//! operands are lifted through their shortest round-trip decimal rendering
//! (`0.1f64` becomes exactly `0.1`; a `f32` is widened to `f64` first).
//! Results are narrowed back into a concrete kind chosen by
//! [`NumericType::promote`].

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use num_bigint::{BigInt, Sign};

use crate::ast::ArithmeticOperator;
use crate::error::ExecutionError;
use crate::types::{DataType, NumericType};
use crate::value::FieldValue;

/// Significant decimal digits kept by division.
pub const DIVISION_PRECISION: u64 = 64;

/// Lifts a numeric value into an exact decimal.
pub fn to_decimal(value: &FieldValue) -> Result<BigDecimal, ExecutionError> {
    match value {
        FieldValue::Byte(n) => Ok(BigDecimal::from(i64::from(*n))),
        FieldValue::Int(n) => Ok(BigDecimal::from(i64::from(*n))),
        FieldValue::Long(n) => Ok(BigDecimal::from(*n)),
        FieldValue::Float(n) => float_to_decimal(f64::from(*n)),
        FieldValue::Double(n) => float_to_decimal(*n),
        other => Err(ExecutionError::InvalidConversion {
            value: other.to_string(),
            target: DataType::Double,
        }),
    }
}

fn float_to_decimal(value: f64) -> Result<BigDecimal, ExecutionError> {
    if !value.is_finite() {
        return Err(ExecutionError::NonFiniteOperand(value.to_string()));
    }
    // f64's Display never uses exponent notation and round-trips exactly.
    BigDecimal::from_str(&value.to_string())
        .map_err(|_| ExecutionError::NonFiniteOperand(value.to_string()))
}

/// Applies `op` exactly. Returns `None` when the divisor of `/` or `%` is zero.
pub fn apply(op: ArithmeticOperator, lhs: BigDecimal, rhs: BigDecimal) -> Option<BigDecimal> {
    match op {
        ArithmeticOperator::Add => Some(lhs + rhs),
        ArithmeticOperator::Subtract => Some(lhs - rhs),
        ArithmeticOperator::Multiply => Some(lhs * rhs),
        ArithmeticOperator::Divide => {
            if rhs.is_zero() {
                return None;
            }
            Some(divide(lhs, rhs))
        }
        // Truncated remainder: the result takes the sign of the dividend.
        ArithmeticOperator::Modulo => {
            if rhs.is_zero() {
                return None;
            }
            Some(lhs % rhs)
        }
    }
}

/// Divides with a single rounding step to [`DIVISION_PRECISION`] digits.
///
/// The truncated quotient carries at least two guard digits plus a sticky
/// digit for a non-zero remainder, so `with_prec` sees enough to round
/// correctly. `rhs` must be non-zero.
fn divide(lhs: BigDecimal, rhs: BigDecimal) -> BigDecimal {
    let (numerator, numerator_scale) = lhs.into_bigint_and_exponent();
    let (denominator, denominator_scale) = rhs.into_bigint_and_exponent();

    let denominator_digits = BigDecimal::new(denominator.clone(), 0).digits();
    let mut shift = DIVISION_PRECISION + 2 + denominator_digits;
    let scaled = numerator * BigInt::from(10u32).pow(shift as u32);

    let mut quotient = &scaled / &denominator;
    if !(&scaled % &denominator).is_zero() {
        let sticky = if quotient.sign() == Sign::Minus { -1 } else { 1 };
        quotient = quotient * 10 + sticky;
        shift += 1;
    }

    let scale = numerator_scale - denominator_scale + shift as i64;
    BigDecimal::new(quotient, scale).with_prec(DIVISION_PRECISION)
}

/// Narrows an exact decimal into a value of the given kind.
///
/// Floating-point kinds round to the nearest representable value. Integral
/// kinds truncate toward zero and keep the low-order two's-complement bits
/// when the value is out of range.
pub fn narrow(value: &BigDecimal, kind: NumericType) -> Result<FieldValue, ExecutionError> {
    match kind {
        NumericType::Double => parse_float::<f64>(value, kind).map(FieldValue::Double),
        NumericType::Float => parse_float::<f32>(value, kind).map(FieldValue::Float),
        NumericType::Long => Ok(FieldValue::Long(truncate_wrapping(value))),
        NumericType::Int => Ok(FieldValue::Int(truncate_wrapping(value) as i32)),
        NumericType::Byte => Ok(FieldValue::Byte(truncate_wrapping(value) as i8)),
    }
}

fn parse_float<F: FromStr>(value: &BigDecimal, kind: NumericType) -> Result<F, ExecutionError> {
    value
        .to_string()
        .parse::<F>()
        .map_err(|_| ExecutionError::InvalidConversion {
            value: value.to_string(),
            target: kind.data_type(),
        })
}

fn truncate_wrapping(value: &BigDecimal) -> i64 {
    let (integral, _) = value.with_scale(0).into_bigint_and_exponent();
    let (sign, words) = integral.to_u64_digits();
    let low = words.first().copied().unwrap_or(0) as i64;
    if sign == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

/// Converts any numeric or string value into the target kind.
///
/// Numeric inputs narrow exactly like arithmetic results. String inputs must
/// parse as a decimal number; integral targets additionally require a whole
/// number in range.
pub fn convert(value: &FieldValue, target: NumericType) -> Result<FieldValue, ExecutionError> {
    if value.is_numeric() {
        return narrow(&to_decimal(value)?, target);
    }

    let invalid = || ExecutionError::InvalidConversion {
        value: value.to_string(),
        target: target.data_type(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    let decimal = BigDecimal::from_str(text.trim()).map_err(|_| invalid())?;

    if target.is_floating_point() {
        return narrow(&decimal, target);
    }
    if !decimal.is_integer() {
        return Err(invalid());
    }
    let whole = decimal.to_i64().ok_or_else(invalid)?;
    match target {
        NumericType::Long => Ok(FieldValue::Long(whole)),
        NumericType::Int => i32::try_from(whole).map(FieldValue::Int).map_err(|_| invalid()),
        NumericType::Byte => i8::try_from(whole).map(FieldValue::Byte).map_err(|_| invalid()),
        NumericType::Float | NumericType::Double => narrow(&decimal, target),
    }
}
