//! # AskSQL
//!
//! A deterministic English-to-SQL translator for a fixed sales schema.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              English Question (one line)                 │
//! │  ("sales by quarter in 2025", "top 5 customers ...")     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [nlq: tokenize + extract]
//! ┌─────────────────────────────────────────────────────────┐
//! │       QuestionFacts (measure, dimension, bucket,         │
//! │              period filters, top-N, clauses)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Query AST + parameters (placeholder order)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql: tokens + dialect]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Parameterized SQL (SQLite `?` / PostgreSQL `$N`)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The same question always yields the same SQL and parameters: there is
//! no model, no randomness, and no network dependency anywhere in the
//! pipeline. User-supplied values travel exclusively as bind parameters.

pub mod nlq;
pub mod planner;
pub mod schema;
pub mod sql;

// Re-export SQL submodules at crate level for convenient paths
pub use sql::dialect;
pub use sql::expr;
pub use sql::query;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::expr::{
        // Constructors
        avg,
        bind,
        coalesce,
        col,
        count,
        count_distinct,
        lit_int,
        lit_str,
        max,
        min,
        sum,
        table_col,
        // Types
        BinaryOperator,
        Expr,
        ExprExt,
        Literal,
    };
    pub use crate::nlq::keywords::{AggFunc, Dimension};
    pub use crate::nlq::time::Bucket;
    pub use crate::planner::{
        analyze, build_plan, translate, Measure, QuestionFacts, Translation, TranslateError, Value,
    };
    pub use crate::query::{
        Cte, CteBody, Join, JoinType, OrderByExpr, Query, SelectExpr, SortDir, TableRef,
    };
    pub use crate::token::{Token, TokenStream};
}

// Also export at crate root for convenience
pub use dialect::Dialect;
pub use planner::{translate, Translation, TranslateError, Value};
