//! PostgreSQL SQL dialect (the client/server engine).
//!
//! Date handling is to_char-based, with `$N` positional bind markers.
//! Grouping reuses the rendered label expression so every selected column
//! is provably grouped (PostgreSQL enforces functional dependency), and the
//! labels themselves sort correctly ("YYYY-MM", "YYYY-Qn", "YYYY").

use super::SqlDialect;
use crate::nlq::time::Bucket;
use crate::schema::ORDER_DATE;
use crate::sql::expr::{bind, raw_sql, Expr, ExprExt};

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn period_label(&self, bucket: Bucket) -> Expr {
        let fmt = match bucket {
            Bucket::Day => "YYYY-MM-DD",
            Bucket::Month => "YYYY-MM",
            Bucket::Quarter => "YYYY-\"Q\"Q",
            Bucket::Year => "YYYY",
        };
        raw_sql(&format!("to_char({}::date, '{}')", ORDER_DATE, fmt))
    }

    fn period_group_by(&self, bucket: Bucket) -> Vec<Expr> {
        vec![self.period_label(bucket)]
    }

    fn period_order_key(&self, bucket: Bucket) -> Expr {
        self.period_label(bucket)
    }

    fn year_equals(&self, index: usize) -> Expr {
        raw_sql(&format!("EXTRACT(YEAR FROM {})::INT", ORDER_DATE)).eq(bind(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    fn render(e: Expr) -> String {
        e.to_tokens_for_dialect(Dialect::Postgres)
            .serialize(Dialect::Postgres)
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            render(Postgres.period_label(Bucket::Month)),
            "to_char(orders.order_date::date, 'YYYY-MM')"
        );
        assert_eq!(
            render(Postgres.period_label(Bucket::Quarter)),
            "to_char(orders.order_date::date, 'YYYY-\"Q\"Q')"
        );
    }

    #[test]
    fn test_group_by_matches_label() {
        let group = Postgres.period_group_by(Bucket::Quarter);
        assert_eq!(group, vec![Postgres.period_label(Bucket::Quarter)]);
    }

    #[test]
    fn test_year_equals_condition() {
        assert_eq!(
            render(Postgres.year_equals(2)),
            "EXTRACT(YEAR FROM orders.order_date)::INT = $3"
        );
    }
}
