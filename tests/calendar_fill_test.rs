use asksql::planner::{translate, Value};
use asksql::Dialect;

#[test]
fn test_month_fill_emits_twelve_calendar_rows() {
    let t = translate("total sales by month in 2023", Dialect::Sqlite).unwrap();
    assert!(t.sql.starts_with("WITH \"cal\" (\"period\", \"ord\") AS (VALUES "));
    for m in 1..=12 {
        assert!(
            t.sql.contains(&format!("('2023-{m:02}', {m})")),
            "missing month {m}"
        );
    }
    assert_eq!(t.params, vec![Value::Int(2023)]);
}

#[test]
fn test_quarter_fill_emits_four_calendar_rows() {
    let t = translate("total sales by quarter in 2025", Dialect::Sqlite).unwrap();
    assert!(t.sql.contains(
        "(VALUES ('2025-Q1', 1), ('2025-Q2', 2), ('2025-Q3', 3), ('2025-Q4', 4))"
    ));
}

#[test]
fn test_year_fill_emits_single_row() {
    let t = translate("yearly revenue in 2024", Dialect::Sqlite).unwrap();
    assert!(t.sql.contains("(VALUES ('2024', 1))"));
}

#[test]
fn test_fill_outer_shape() {
    let t = translate("orders count by month in 2024", Dialect::Sqlite).unwrap();
    // Real aggregation lands in the agg CTE, filtered to the pinned year.
    assert!(t.sql.contains("\"agg\" AS (\n"));
    assert!(t.sql.contains("COUNT(DISTINCT \"orders\".\"order_id\") AS \"value\""));
    assert!(t
        .sql
        .contains("WHERE CAST(strftime('%Y', orders.order_date) AS INTEGER) = ?"));
    // The outer select joins the calendar and zero-fills missing periods.
    assert!(t.sql.contains("\"cal\".\"period\" AS \"period\""));
    assert!(t.sql.contains("COALESCE(\"agg\".\"value\", 0) AS \"value\""));
    assert!(t
        .sql
        .contains("LEFT JOIN \"agg\" ON \"agg\".\"period\" = \"cal\".\"period\""));
    assert!(t.sql.ends_with("ORDER BY \"cal\".\"ord\" ASC"));
    assert_eq!(t.params, vec![Value::Int(2024)]);
}

#[test]
fn test_fill_on_postgres_groups_by_label() {
    let t = translate("total sales by quarter in 2025", Dialect::Postgres).unwrap();
    assert!(t
        .sql
        .contains("to_char(orders.order_date::date, 'YYYY-\"Q\"Q') AS \"period\""));
    assert!(t
        .sql
        .contains("GROUP BY to_char(orders.order_date::date, 'YYYY-\"Q\"Q')"));
    assert!(t.sql.contains("EXTRACT(YEAR FROM orders.order_date)::INT = $1"));
    assert_eq!(t.params, vec![Value::Int(2025)]);
}

#[test]
fn test_no_fill_with_dimension() {
    let t = translate("monthly revenue in 2025 by product", Dialect::Sqlite).unwrap();
    assert!(!t.sql.contains("WITH"));
    assert!(!t.sql.contains("COALESCE"));
}

#[test]
fn test_no_fill_without_pinned_year() {
    let t = translate("total sales by quarter", Dialect::Sqlite).unwrap();
    assert!(!t.sql.contains("WITH"));
    assert!(t.sql.contains("GROUP BY CAST(strftime('%Y', orders.order_date) AS INTEGER), CASE"));
}

#[test]
fn test_no_fill_at_day_granularity() {
    let t = translate("sales by day in 2023", Dialect::Sqlite).unwrap();
    assert!(!t.sql.contains("WITH"));
    assert!(t.sql.contains("strftime('%Y-%m-%d', orders.order_date) AS \"period\""));
}

#[test]
fn test_named_month_does_not_fill() {
    // "January 2025" infers a daily series; fill only applies to
    // month/quarter/year buckets.
    let t = translate("sales in January 2025", Dialect::Sqlite).unwrap();
    assert!(!t.sql.contains("WITH"));
}
