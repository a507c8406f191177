//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the differences
//! between the two supported engines:
//!
//! - Bind placeholders: `?` (SQLite) vs `$N` (PostgreSQL)
//! - Period labels: `strftime` vs `to_char`
//! - Quarter derivation: CASE over the month number vs `'YYYY-"Q"Q'`
//!
//! Every dialect supports exactly the bucket set {day, month, quarter,
//! year}; the `Bucket` enum is closed, so an unsupported combination is
//! unrepresentable.

mod postgres;
mod sqlite;

pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::nlq::time::Bucket;
use crate::sql::expr::Expr;

/// Quote an identifier with ANSI double quotes, doubling embedded quotes.
pub(crate) fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// SQL dialect trait - defines how dialect-specific constructs are rendered.
///
/// Date expressions all target `orders.order_date`, the single time axis of
/// the fixed sales schema.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String {
        quote_double(ident)
    }

    /// Quote a string literal.
    ///
    /// Both dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Bind-parameter marker for the given zero-based index.
    ///
    /// - SQLite: `?`
    /// - PostgreSQL: `$1`, `$2`, ... (1-based positional)
    fn placeholder(&self, index: usize) -> String;

    /// Per-row period label expression, e.g. `"2025-Q4"` for quarter.
    fn period_label(&self, bucket: Bucket) -> Expr;

    /// GROUP BY expressions for the bucket.
    ///
    /// May differ textually from the label (SQLite quarter groups by the
    /// year integer and the quarter CASE separately).
    fn period_group_by(&self, bucket: Bucket) -> Vec<Expr>;

    /// ORDER BY key for the bucket: a sortable surrogate, e.g. the composed
    /// `year*10+quarter` integer for SQLite quarter ordering.
    fn period_order_key(&self, bucket: Bucket) -> Expr;

    /// Equality-on-year condition with one bound parameter.
    fn year_equals(&self, index: usize) -> Expr;

    /// Date BETWEEN condition with two bound parameters.
    fn date_between(&self, low_index: usize, high_index: usize) -> Expr {
        use crate::sql::expr::{bind, table_col, ExprExt};
        table_col(crate::schema::ORDERS, crate::schema::ORDER_DATE_COL)
            .between(bind(low_index), bind(high_index))
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Single-file embedded engine.
    #[default]
    Sqlite,
    /// Client/server engine.
    Postgres,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::Postgres => &Postgres,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn period_label(&self, bucket: Bucket) -> Expr {
        self.dialect().period_label(bucket)
    }

    fn period_group_by(&self, bucket: Bucket) -> Vec<Expr> {
        self.dialect().period_group_by(bucket)
    }

    fn period_order_key(&self, bucket: Bucket) -> Expr {
        self.dialect().period_order_key(bucket)
    }

    fn year_equals(&self, index: usize) -> Expr {
        self.dialect().year_equals(index)
    }

    fn date_between(&self, low_index: usize, high_index: usize) -> Expr {
        self.dialect().date_between(low_index, high_index)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::Sqlite.to_string(), "sqlite");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::Sqlite.quote_identifier("orders"), "\"orders\"");
        assert_eq!(
            Dialect::Postgres.quote_identifier("weird\"name"),
            "\"weird\"\"name\""
        );
    }

    #[test]
    fn test_placeholder_syntax() {
        assert_eq!(Dialect::Sqlite.placeholder(0), "?");
        assert_eq!(Dialect::Sqlite.placeholder(5), "?");
        assert_eq!(Dialect::Postgres.placeholder(0), "$1");
        assert_eq!(Dialect::Postgres.placeholder(5), "$6");
    }

    #[test]
    fn test_date_between_serializes_placeholders_in_order() {
        let e = Dialect::Postgres.date_between(3, 4);
        let sql = e
            .to_tokens_for_dialect(Dialect::Postgres)
            .serialize(Dialect::Postgres);
        assert_eq!(sql, "\"orders\".\"order_date\" BETWEEN $4 AND $5");
    }
}
