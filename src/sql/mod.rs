//! Structural SQL building: tokens, expressions, queries, and dialects.
//!
//! Statements are assembled as data (expressions and clauses), then
//! serialized through the token layer for a concrete dialect. String
//! concatenation never touches user input; values travel as bind
//! parameters.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
