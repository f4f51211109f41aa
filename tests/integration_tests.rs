// tests/integration_tests.rs
//
// End-to-end flows: a stage is built, verified once against a schema, then
// executed per document.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

use serde_json::json;

use indexing_expr::*;

fn arith(left: Expression, op: ArithmeticOperator, right: Expression) -> Expression {
    Expression::arithmetic(left, op, right).unwrap()
}

fn schema() -> HashMap<String, DataType> {
    HashMap::from([
        ("price".to_string(), DataType::Long),
        ("discount".to_string(), DataType::Double),
        ("title".to_string(), DataType::String),
        ("tags".to_string(), DataType::array(DataType::String)),
    ])
}

fn verifier(schema: &HashMap<String, DataType>) -> VerificationContext {
    schema
        .iter()
        .fold(VerificationContext::new(), |ctx, (name, ty)| ctx.with_field_type(name.clone(), ty.clone()))
}

/// Verifies `stage` once, then runs it over each document.
fn run_stage(stage: &Expression, documents: &[serde_json::Value]) -> Vec<serde_json::Value> {
    let schema = schema();
    verifier(&schema).verify(stage, None).unwrap();

    documents
        .iter()
        .map(|document| {
            let fields = document_fields(document, &schema).unwrap();
            let mut ctx = ExecutionContext::new().with_fields(fields);
            match ctx.execute(stage, None).unwrap() {
                Some(value) => field_value_to_json(&value),
                None => serde_json::Value::Null,
            }
        })
        .collect()
}

// ============================================================================
// Pipeline Flow
// ============================================================================

#[test]
fn test_stage_over_documents() {
    let stage = Expression::statement([
        arith(Expression::input("price"), ArithmeticOperator::Multiply, Expression::constant(2i32)),
        Expression::ToArray,
    ]);

    let output = run_stage(
        &stage,
        &[json!({"price": 21}), json!({"title": "no price"}), json!({"price": null})],
    );

    assert_eq!(output, vec![json!([42]), json!(null), json!(null)]);
}

#[test]
fn test_mixed_kinds_over_documents() {
    // (input price - input price * input discount) / 100
    let stage = arith(
        arith(
            Expression::input("price"),
            ArithmeticOperator::Subtract,
            arith(Expression::input("price"), ArithmeticOperator::Multiply, Expression::input("discount")),
        ),
        ArithmeticOperator::Divide,
        Expression::constant(100i32),
    );

    let mut ctx = verifier(&schema());
    assert_eq!(ctx.verify(&stage, None).unwrap(), Some(DataType::Double));
    assert_eq!(stage.to_string(), "(input price - input price * input discount) / 100");

    let output = run_stage(&stage, &[json!({"price": 1000, "discount": 0.1})]);
    assert_eq!(output, vec![json!(9.0)]);
}

#[test]
fn test_string_stage_over_documents() {
    let stage = Expression::statement([
        Expression::input("title"),
        Expression::Function(Function::Trim),
        Expression::Function(Function::Uppercase),
    ]);

    let output = run_stage(&stage, &[json!({"title": "  rust  "}), json!({})]);
    assert_eq!(output, vec![json!("RUST"), json!(null)]);
}

#[test]
fn test_rejected_configuration_never_runs() {
    let stage = arith(Expression::input("title"), ArithmeticOperator::Add, Expression::constant(1i32));
    let err = verifier(&schema()).verify(&stage, None).unwrap_err();
    assert!(matches!(err, VerificationError::UnsupportedArithmetic { .. }));

    let stage = arith(Expression::input("tags"), ArithmeticOperator::Add, Expression::constant(1i32));
    let err = verifier(&schema()).verify(&stage, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Attempting to perform unsupported arithmetic: [Array<string>] + [int]"
    );
}

// ============================================================================
// JSON Conversion
// ============================================================================

#[test]
fn test_document_must_be_object() {
    let err = document_fields(&json!([1, 2]), &schema()).unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidDocument(_)));
}

#[test]
fn test_typed_json_reads() {
    let fields = document_fields(
        &json!({"price": 5, "tags": ["a", "b"], "extra": true}),
        &schema(),
    )
    .unwrap();

    assert_eq!(fields.get("price"), Some(&FieldValue::Long(5)));
    assert_eq!(fields.get("tags").map(FieldValue::data_type), Some(DataType::array(DataType::String)));
    assert!(!fields.contains_key("extra"));
}

#[test]
fn test_json_range_checked() {
    let err = json_to_field_value(&json!(300), &DataType::Byte).unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidConversion { .. }));

    assert_eq!(
        json_to_field_value(&json!(-128), &DataType::Byte).unwrap(),
        Some(FieldValue::Byte(-128))
    );
}

#[test]
fn test_json_inference() {
    assert_eq!(
        json_to_field_value(&json!(3), &DataType::Unresolved).unwrap(),
        Some(FieldValue::Long(3))
    );
    assert_eq!(
        json_to_field_value(&json!(2.5), &DataType::Unresolved).unwrap(),
        Some(FieldValue::Double(2.5))
    );
    let array = json_to_field_value(&json!([1.5, 2.5]), &DataType::Unresolved)
        .unwrap()
        .unwrap();
    assert_eq!(array.data_type(), DataType::array(DataType::Double));
    assert_eq!(json_to_field_value(&json!(null), &DataType::Int).unwrap(), None);
}

#[test]
fn test_empty_json_array() {
    let untyped = json_to_field_value(&json!([]), &DataType::Unresolved).unwrap().unwrap();
    assert_eq!(untyped.data_type(), DataType::array(DataType::Unresolved));
    assert!(untyped.as_array().unwrap().is_empty());

    let declared = json_to_field_value(&json!([]), &DataType::array(DataType::Unresolved))
        .unwrap()
        .unwrap();
    assert_eq!(declared, untyped);

    let typed = json_to_field_value(&json!([]), &DataType::array(DataType::Long))
        .unwrap()
        .unwrap();
    assert_eq!(typed.data_type(), DataType::array(DataType::Long));
}

#[test]
fn test_non_finite_json_output() {
    assert_eq!(field_value_to_json(&FieldValue::Double(f64::NAN)), json!(null));
    assert_eq!(field_value_to_json(&FieldValue::Float(0.5)), json!(0.5));
}

// ============================================================================
// Sharing Trees
// ============================================================================

#[test]
fn test_tree_shared_across_threads() {
    let stage = Arc::new(arith(
        arith(Expression::This, ArithmeticOperator::Multiply, Expression::This),
        ArithmeticOperator::Add,
        Expression::input("offset"),
    ));

    let results: Vec<Option<FieldValue>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8i64)
            .map(|i| {
                let stage = Arc::clone(&stage);
                s.spawn(move || {
                    let mut ctx = ExecutionContext::new().with_field("offset", i);
                    ctx.execute(&stage, Some(&FieldValue::Long(i))).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected: Vec<_> = (0..8i64).map(|i| Some(FieldValue::Long(i * i + i))).collect();
    assert_eq!(results, expected);
}

#[test]
fn test_structurally_equal_trees_deduplicate() {
    let build = || {
        Expression::statement([
            arith(Expression::input("price"), ArithmeticOperator::Add, Expression::constant(0.5f64)),
            Expression::ToArray,
        ])
    };

    let mut stages = HashSet::new();
    stages.insert(build());
    stages.insert(build());
    stages.insert(Expression::ToArray);

    assert_eq!(stages.len(), 2);
}

#[test]
fn test_display_renders_source_form() {
    let cases = [
        (
            arith(
                arith(Expression::input("a"), ArithmeticOperator::Add, Expression::input("b")),
                ArithmeticOperator::Divide,
                Expression::constant(2i32),
            ),
            "(input a + input b) / 2",
        ),
        (
            arith(
                Expression::input("a"),
                ArithmeticOperator::Subtract,
                arith(Expression::input("b"), ArithmeticOperator::Subtract, Expression::input("c")),
            ),
            "input a - (input b - input c)",
        ),
        (
            arith(
                arith(Expression::input("a"), ArithmeticOperator::Multiply, Expression::input("b")),
                ArithmeticOperator::Add,
                Expression::constant(1i64),
            ),
            "input a * input b + 1L",
        ),
        (
            Expression::statement([Expression::input("title"), Expression::ToNumeric(NumericType::Long)]),
            "input title | to_long",
        ),
    ];

    for (expr, expected) in cases {
        assert_eq!(expr.to_string(), expected);
    }
}
