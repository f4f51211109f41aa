//! JSON <-> FieldValue conversion utilities
//!
//! JSON has a single number type, so reading a value needs the field's
//! declared [`DataType`] to pick the concrete kind. JSON `null` reads as a
//! missing value.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::error::ExecutionError;
use crate::types::DataType;
use crate::value::{Array, FieldValue};

/// Convert a JSON value into a field value of the given type.
///
/// With [`DataType::Unresolved`] the kind is inferred: integers read as
/// `long`, other numbers as `double`, arrays by their first element. An empty
/// array with no declared element type reads as an empty `Array<unresolved>`.
pub fn json_to_field_value(json: &Json, data_type: &DataType) -> Result<Option<FieldValue>, ExecutionError> {
    if json.is_null() {
        return Ok(None);
    }
    let invalid = || ExecutionError::InvalidConversion {
        value: json.to_string(),
        target: data_type.clone(),
    };

    let value = match (data_type, json) {
        (DataType::Byte, Json::Number(n)) => {
            let n = n.as_i64().ok_or_else(invalid)?;
            FieldValue::Byte(i8::try_from(n).map_err(|_| invalid())?)
        }
        (DataType::Int, Json::Number(n)) => {
            let n = n.as_i64().ok_or_else(invalid)?;
            FieldValue::Int(i32::try_from(n).map_err(|_| invalid())?)
        }
        (DataType::Long, Json::Number(n)) => FieldValue::Long(n.as_i64().ok_or_else(invalid)?),
        (DataType::Float, Json::Number(n)) => FieldValue::Float(n.as_f64().ok_or_else(invalid)? as f32),
        (DataType::Double, Json::Number(n)) => FieldValue::Double(n.as_f64().ok_or_else(invalid)?),
        (DataType::Bool, Json::Bool(b)) => FieldValue::Bool(*b),
        (DataType::String, Json::String(s)) => FieldValue::String(s.clone()),
        (DataType::Array(element), Json::Array(items)) => {
            let element = match (element.as_ref(), items.first()) {
                (DataType::Unresolved, Some(first)) => infer_type(first).ok_or_else(invalid)?,
                (DataType::Unresolved, None) => DataType::Unresolved,
                (element, _) => element.clone(),
            };
            let mut array = Array::new(element.clone());
            for item in items {
                let value = json_to_field_value(item, &element)?.ok_or_else(invalid)?;
                array.add(value)?;
            }
            FieldValue::Array(array)
        }
        (DataType::Unresolved, json) => {
            let inferred = infer_type(json).ok_or_else(invalid)?;
            return json_to_field_value(json, &inferred);
        }
        _ => return Err(invalid()),
    };
    Ok(Some(value))
}

fn infer_type(json: &Json) -> Option<DataType> {
    match json {
        Json::Number(n) if n.is_i64() => Some(DataType::Long),
        Json::Number(_) => Some(DataType::Double),
        Json::Bool(_) => Some(DataType::Bool),
        Json::String(_) => Some(DataType::String),
        Json::Array(items) => match items.first() {
            Some(first) => infer_type(first).map(DataType::array),
            None => Some(DataType::array(DataType::Unresolved)),
        },
        Json::Null | Json::Object(_) => None,
    }
}

/// Convert a field value into JSON.
///
/// Non-finite floats have no JSON form and become `null`.
pub fn field_value_to_json(value: &FieldValue) -> Json {
    match value {
        FieldValue::Byte(n) => Json::from(*n),
        FieldValue::Int(n) => Json::from(*n),
        FieldValue::Long(n) => Json::from(*n),
        FieldValue::Float(n) => serde_json::Number::from_f64(f64::from(*n))
            .map(Json::Number)
            .unwrap_or(Json::Null),
        FieldValue::Double(n) => serde_json::Number::from_f64(*n)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        FieldValue::Bool(b) => Json::Bool(*b),
        FieldValue::String(s) => Json::String(s.clone()),
        FieldValue::Array(array) => Json::Array(array.iter().map(field_value_to_json).collect()),
    }
}

/// Reads the fields declared in `schema` out of a JSON object document.
///
/// Fields missing from the document, or set to `null`, are left out. Fields
/// not declared in the schema are ignored.
pub fn document_fields(
    document: &Json,
    schema: &HashMap<String, DataType>,
) -> Result<HashMap<String, FieldValue>, ExecutionError> {
    let object = document
        .as_object()
        .ok_or_else(|| ExecutionError::InvalidDocument(format!("expected a JSON object, got {}", document)))?;

    let mut fields = HashMap::new();
    for (name, data_type) in schema {
        let Some(json) = object.get(name) else {
            continue;
        };
        if let Some(value) = json_to_field_value(json, data_type)? {
            fields.insert(name.clone(), value);
        }
    }
    Ok(fields)
}
