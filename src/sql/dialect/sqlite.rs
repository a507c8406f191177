//! SQLite SQL dialect (the single-file embedded engine).
//!
//! Date handling is strftime-based. Quarter numbers are derived from the
//! month with a CASE over the fixed boundaries Jan-Mar/Apr-Jun/Jul-Sep/Oct-Dec,
//! and quarters order by the composed `year*10 + quarter` integer.

use super::SqlDialect;
use crate::nlq::time::Bucket;
use crate::schema::ORDER_DATE;
use crate::sql::expr::{bind, raw_sql, Expr, ExprExt};

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

/// CASE expression deriving the 1-4 quarter number from the month.
fn quarter_case() -> String {
    format!(
        "CASE \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 1 AND 3 THEN 1 \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 4 AND 6 THEN 2 \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 7 AND 9 THEN 3 \
         ELSE 4 END",
        d = ORDER_DATE
    )
}

/// Calendar year of the order date, as an integer.
fn year_int() -> String {
    format!("CAST(strftime('%Y', {}) AS INTEGER)", ORDER_DATE)
}

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn period_label(&self, bucket: Bucket) -> Expr {
        match bucket {
            Bucket::Day => raw_sql(&format!("strftime('%Y-%m-%d', {})", ORDER_DATE)),
            Bucket::Month => raw_sql(&format!("strftime('%Y-%m', {})", ORDER_DATE)),
            Bucket::Year => raw_sql(&format!("strftime('%Y', {})", ORDER_DATE)),
            Bucket::Quarter => raw_sql(&format!(
                "strftime('%Y', {}) || '-Q' || {}",
                ORDER_DATE,
                quarter_case()
            )),
        }
    }

    fn period_group_by(&self, bucket: Bucket) -> Vec<Expr> {
        match bucket {
            Bucket::Day | Bucket::Month | Bucket::Year => vec![self.period_label(bucket)],
            Bucket::Quarter => vec![raw_sql(&year_int()), raw_sql(&quarter_case())],
        }
    }

    fn period_order_key(&self, bucket: Bucket) -> Expr {
        match bucket {
            Bucket::Day | Bucket::Month | Bucket::Year => self.period_label(bucket),
            Bucket::Quarter => raw_sql(&format!("({}*10 + {})", year_int(), quarter_case())),
        }
    }

    fn year_equals(&self, index: usize) -> Expr {
        raw_sql(&year_int()).eq(bind(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    fn render(e: Expr) -> String {
        e.to_tokens_for_dialect(Dialect::Sqlite)
            .serialize(Dialect::Sqlite)
    }

    #[test]
    fn test_month_label() {
        assert_eq!(
            render(Sqlite.period_label(Bucket::Month)),
            "strftime('%Y-%m', orders.order_date)"
        );
    }

    #[test]
    fn test_quarter_label_composes_year_and_case() {
        let sql = render(Sqlite.period_label(Bucket::Quarter));
        assert!(sql.starts_with("strftime('%Y', orders.order_date) || '-Q' || CASE"));
        assert!(sql.contains("BETWEEN 7 AND 9 THEN 3"));
    }

    #[test]
    fn test_quarter_groups_by_year_and_quarter() {
        let group = Sqlite.period_group_by(Bucket::Quarter);
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_quarter_order_key_is_composed_integer() {
        let sql = render(Sqlite.period_order_key(Bucket::Quarter));
        assert!(sql.starts_with("(CAST(strftime('%Y', orders.order_date) AS INTEGER)*10 + CASE"));
    }

    #[test]
    fn test_year_equals_condition() {
        assert_eq!(
            render(Sqlite.year_equals(0)),
            "CAST(strftime('%Y', orders.order_date) AS INTEGER) = ?"
        );
    }
}
