pub mod ast;
pub mod error;
pub mod evaluator;
pub mod json;
pub mod numeric;
pub mod select;
pub mod transform;
pub mod types;
pub mod value;
pub mod verifier;

pub use ast::{ArithmeticExpression, ArithmeticOperator, Expression, Function};
pub use error::{Error, ExecutionError, Result, VerificationError};
pub use evaluator::ExecutionContext;
pub use json::{document_fields, field_value_to_json, json_to_field_value};
pub use transform::{ExpressionConverter, IdentityConverter, Rewrite};
pub use types::{DataType, NumericType};
pub use value::{Array, FieldValue};
pub use verifier::VerificationContext;
