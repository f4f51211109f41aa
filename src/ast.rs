//! # Indexing Expression Language - Abstract Syntax Tree
//!
//! This module defines the expression trees a pipeline stage owns. A tree is
//! built once when the pipeline configuration is compiled, verified once
//! against the stage's declared input type, and then executed once per
//! document.
//!
//! ## Architecture Overview
//!
//! - **[expressions]** - The [`Expression`] node enum and [`ArithmeticExpression`]
//! - **[operators]** - Arithmetic operators with precedence
//! - **[functions]** - Built-in single-input functions
//!
//! The passes themselves live next door: [`crate::verifier`] propagates types,
//! [`crate::evaluator`] propagates values, [`crate::transform`] rebuilds trees
//! and [`crate::select`] walks them.
//!
//! ## Syntax
//!
//! Trees render back into the indexing language they were parsed from:
//!
//! ```text
//! input price * 2 | to_array
//! input title | lowercase | trim
//! (input a + input b) / 2
//! ```
//!
//! ## Input Requirements
//!
//! Every node declares the input it demands on arrival:
//!
//! - `None` - unconstrained, the node ignores or tolerates a missing input
//! - `Some(DataType::Unresolved)` - any type, but some input must be present
//! - `Some(ty)` - exactly `ty`
//!
//! ## Immutability
//!
//! Trees have no interior mutability. One tree may be shared across threads
//! and executed against many documents at once, each with its own
//! [`crate::ExecutionContext`].
pub mod expressions;
pub mod functions;
pub mod operators;

pub use expressions::{ArithmeticExpression, Expression};
pub use functions::Function;
pub use operators::ArithmeticOperator;
