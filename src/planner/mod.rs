//! Question analysis and query planning.
//!
//! [`analyze`] reduces a question to [`QuestionFacts`] (measure, dimension,
//! bucket, filters), [`build_plan`] turns the facts into a [`Query`] plus its
//! bound parameters, and [`translate`] runs the whole pipeline down to SQL
//! text. Parameters are bound in the order their placeholders appear in the
//! statement, so the list can be handed to either engine's positional
//! binding as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::nlq::keywords::{
    extract_agg, extract_dimension, extract_top_n, wants_distinct, wants_orders_count, AggFunc,
    Dimension,
};
use crate::nlq::lexer::tokenize_and_tag;
use crate::nlq::time::{
    extract_bucket, extract_date_range, extract_period_filter, Bucket, PeriodFilter,
    TimeCondition,
};
use crate::schema;
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::expr::{
    avg, bind, coalesce, col, count, count_distinct, lit_int, lit_str, max, min, sum, table_col,
    Expr, ExprExt,
};
use crate::sql::query::{Cte, OrderByExpr, Query, SelectExpr, TableRef};

/// A value bound to a placeholder, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

/// Translation failure.
///
/// The supported grammar degrades every question to a valid plan (the bare
/// total query is the floor), so no variant is currently produced; this is
/// reserved for grammar growth where no SQL can be formed at all.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("could not form a query from the question")]
    Unrecognized,
}

/// The measure (the `value` column) of the planned query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// COUNT(DISTINCT orders.order_id).
    OrdersCount,
    /// COUNT(DISTINCT customers.customer_id).
    DistinctCustomers,
    /// Keyword aggregate over order_items.line_total.
    Agg(AggFunc),
}

/// Comparison operator of an explicit WHERE-tail clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
}

/// An explicit single-comparison filter from the question's "where ..."
/// tail, e.g. `products.category = 'Toys'`. The column name is restricted
/// to `[a-zA-Z_.]` by the recognizer; the value is always bound, never
/// spliced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClause {
    pub column: String,
    pub op: CompareOp,
    pub value: String,
}

impl SimpleClause {
    fn to_expr(&self, index: usize) -> Expr {
        let column = match self.column.split_once('.') {
            Some((table, column)) => table_col(table, column),
            None => col(&self.column),
        };
        match self.op {
            CompareOp::Eq => column.eq(bind(index)),
            CompareOp::Gt => column.gt(bind(index)),
            CompareOp::Lt => column.lt(bind(index)),
        }
    }
}

/// Everything the planner extracts from one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionFacts {
    pub measure: Measure,
    pub dimension: Option<Dimension>,
    pub bucket: Option<Bucket>,
    pub top_n: Option<u64>,
    pub period: PeriodFilter,
    pub where_tail: Option<SimpleClause>,
    pub date_range: Option<(String, String)>,
    /// Set when the question pins exactly one year and groups by a
    /// fillable bucket without a dimension; enables calendar fill.
    pub fill_year: Option<i32>,
}

static WHERE_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z_\.]+)\s*(=|>|<)\s*'?(.*?)'?$").expect("valid where-tail pattern")
});

/// Recognize the explicit comparison after the word "where". The tail must
/// consist of exactly one `column op value` comparison; anything else (such
/// as a "date between" range, handled separately) is ignored.
fn extract_where_tail(text: &str) -> Option<SimpleClause> {
    let padded = format!(" {text} ");
    if !padded.contains(" where ") {
        return None;
    }
    let tail = text.splitn(2, "where").nth(1)?.trim();
    let caps = WHERE_TAIL_RE.captures(tail)?;
    let op = match &caps[2] {
        "=" => CompareOp::Eq,
        ">" => CompareOp::Gt,
        _ => CompareOp::Lt,
    };
    Some(SimpleClause {
        column: caps[1].to_string(),
        op,
        value: caps[3].to_string(),
    })
}

/// Analyze a question into planning facts.
pub fn analyze(question: &str) -> QuestionFacts {
    let (tokens, _tagged) = tokenize_and_tag(question);
    facts_from_tokens(question, &tokens)
}

/// Fact extraction over an already-tokenized question. Split out so the
/// degraded tokenizer path can be exercised directly.
pub fn facts_from_tokens(question: &str, tokens: &[String]) -> QuestionFacts {
    let text = question.to_lowercase();

    let measure = if wants_orders_count(&text) {
        Measure::OrdersCount
    } else if wants_distinct(tokens) && tokens.iter().any(|t| t == "customer") {
        Measure::DistinctCustomers
    } else {
        Measure::Agg(extract_agg(tokens))
    };

    let dimension = extract_dimension(tokens);
    let period = extract_period_filter(&text);
    // Explicit bucket vocabulary wins over the filter-inferred bucket.
    let bucket = extract_bucket(tokens, &text).or(period.bucket);
    let top_n = extract_top_n(tokens);
    let where_tail = extract_where_tail(&text);
    let date_range = extract_date_range(&text);

    let fill_year = match (dimension, bucket) {
        (None, Some(Bucket::Month | Bucket::Quarter | Bucket::Year)) => period.single_year,
        _ => None,
    };

    debug!(
        ?measure,
        ?dimension,
        ?bucket,
        ?top_n,
        ?fill_year,
        "analyzed question"
    );

    QuestionFacts {
        measure,
        dimension,
        bucket,
        top_n,
        period,
        where_tail,
        date_range,
        fill_year,
    }
}

/// A planned query with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub query: Query,
    pub params: Vec<Value>,
}

/// The finished translation: SQL text plus bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: Dialect,
}

/// Accumulates bound values; `push` returns the placeholder index to embed.
struct ParamBinder {
    params: Vec<Value>,
}

impl ParamBinder {
    fn new() -> Self {
        Self { params: Vec::new() }
    }

    fn push(&mut self, value: Value) -> usize {
        self.params.push(value);
        self.params.len() - 1
    }
}

fn measure_expr(measure: Measure) -> Expr {
    match measure {
        Measure::OrdersCount => count_distinct(table_col(schema::ORDERS, "order_id")),
        Measure::DistinctCustomers => {
            count_distinct(table_col(schema::CUSTOMERS, "customer_id"))
        }
        Measure::Agg(agg) => {
            let line_total = table_col(schema::ORDER_ITEMS, schema::LINE_TOTAL);
            match agg {
                AggFunc::Sum => sum(line_total),
                AggFunc::Avg => avg(line_total),
                AggFunc::Count => count(line_total),
                AggFunc::Max => max(line_total),
                AggFunc::Min => min(line_total),
            }
        }
    }
}

/// The join skeleton with every WHERE fragment applied, in the fixed order
/// period filters, WHERE-tail clause, explicit date range. Binding happens
/// in the same order, keeping placeholders and parameters aligned.
fn filtered_base(facts: &QuestionFacts, dialect: Dialect, binder: &mut ParamBinder) -> Query {
    let mut query = schema::base_query();

    for condition in &facts.period.conditions {
        let expr = match condition {
            TimeCondition::Between { start, end } => {
                let low = binder.push(Value::Str(start.clone()));
                let high = binder.push(Value::Str(end.clone()));
                dialect.date_between(low, high)
            }
            TimeCondition::YearEquals(year) => {
                let index = binder.push(Value::Int(i64::from(*year)));
                dialect.year_equals(index)
            }
        };
        query = query.filter(expr);
    }

    if let Some(clause) = &facts.where_tail {
        let index = binder.push(Value::Str(clause.value.clone()));
        query = query.filter(clause.to_expr(index));
    }

    if let Some((start, end)) = &facts.date_range {
        let low = binder.push(Value::Str(start.clone()));
        let high = binder.push(Value::Str(end.clone()));
        query = query.filter(dialect.date_between(low, high));
    }

    query
}

/// Synthetic calendar rows for one year at the given granularity.
fn calendar_rows(bucket: Bucket, year: i32) -> Vec<Vec<Expr>> {
    match bucket {
        Bucket::Month => (1..=12)
            .map(|m| vec![lit_str(&format!("{year}-{m:02}")), lit_int(m)])
            .collect(),
        Bucket::Quarter => (1..=4)
            .map(|q| vec![lit_str(&format!("{year}-Q{q}")), lit_int(q)])
            .collect(),
        Bucket::Year => vec![vec![lit_str(&year.to_string()), lit_int(1)]],
        // fill_year is only ever set for month/quarter/year buckets
        Bucket::Day => unreachable!("no calendar fill at day granularity"),
    }
}

/// Gap-free period aggregation: a `cal` VALUES CTE carries every expected
/// period of the year, the real aggregation lands in `agg`, and the outer
/// select LEFT JOINs them with COALESCE 0 so empty periods still appear.
fn calendar_fill_query(
    base: Query,
    dialect: Dialect,
    bucket: Bucket,
    year: i32,
    measure: SelectExpr,
) -> Query {
    let agg = base
        .select(vec![
            SelectExpr::new(dialect.period_label(bucket)).with_alias("period"),
            measure,
        ])
        .group_by(dialect.period_group_by(bucket));

    Query::new()
        .with_cte(Cte::values(
            "cal",
            vec!["period", "ord"],
            calendar_rows(bucket, year),
        ))
        .with_cte(Cte::new("agg", agg))
        .select(vec![
            SelectExpr::new(table_col("cal", "period")).with_alias("period"),
            SelectExpr::new(coalesce(vec![table_col("agg", "value"), lit_int(0)]))
                .with_alias("value"),
        ])
        .from(TableRef::new("cal"))
        .left_join(
            TableRef::new("agg"),
            table_col("agg", "period").eq(table_col("cal", "period")),
        )
        .order_by(vec![OrderByExpr::asc(table_col("cal", "ord"))])
}

/// Plan a query from analyzed facts.
pub fn build_plan(facts: &QuestionFacts, dialect: Dialect) -> QueryPlan {
    let mut binder = ParamBinder::new();
    let base = filtered_base(facts, dialect, &mut binder);
    let measure = SelectExpr::new(measure_expr(facts.measure)).with_alias("value");

    let query = match (facts.dimension, facts.bucket) {
        // Dimension crossed with a period axis.
        (Some(dimension), Some(bucket)) => {
            let dim_col = schema::dimension_column(dimension);
            let mut group = vec![dim_col.clone()];
            group.extend(dialect.period_group_by(bucket));
            let mut query = base
                .select(vec![
                    SelectExpr::new(dim_col.clone()).with_alias("dimension"),
                    SelectExpr::new(dialect.period_label(bucket)).with_alias("period"),
                    measure,
                ])
                .group_by(group)
                .order_by(vec![
                    OrderByExpr::asc(dim_col),
                    OrderByExpr::asc(dialect.period_order_key(bucket)),
                ]);
            if let Some(n) = facts.top_n {
                query = query.limit(n);
            }
            query
        }

        // Pure dimension ranking, highest value first.
        (Some(dimension), None) => {
            let dim_col = schema::dimension_column(dimension);
            let mut query = base
                .select(vec![
                    SelectExpr::new(dim_col.clone()).with_alias("dimension"),
                    measure,
                ])
                .group_by(vec![dim_col])
                .order_by(vec![OrderByExpr::desc(col("value"))]);
            if let Some(n) = facts.top_n {
                query = query.limit(n);
            }
            query
        }

        // Time series, gap-free when a single year is pinned.
        (None, Some(bucket)) => {
            if let Some(year) = facts.fill_year {
                calendar_fill_query(base, dialect, bucket, year, measure)
            } else {
                let mut query = base
                    .select(vec![
                        SelectExpr::new(dialect.period_label(bucket)).with_alias("period"),
                        measure,
                    ])
                    .group_by(dialect.period_group_by(bucket))
                    .order_by(vec![OrderByExpr::asc(dialect.period_order_key(bucket))]);
                if let Some(n) = facts.top_n {
                    query = query.limit(n);
                }
                query
            }
        }

        // Scalar total.
        (None, None) => base.select(vec![measure]).limit(1),
    };

    QueryPlan {
        query,
        params: binder.params,
    }
}

/// Translate an English question into SQL for the given dialect.
pub fn translate(question: &str, dialect: Dialect) -> Result<Translation, TranslateError> {
    let facts = analyze(question);
    let plan = build_plan(&facts, dialect);
    debug!(%dialect, params = plan.params.len(), "planned query");
    Ok(Translation {
        sql: plan.query.to_sql(dialect),
        params: plan.params,
        dialect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(question: &str) -> QuestionFacts {
        analyze(question)
    }

    #[test]
    fn test_measure_resolution_precedence() {
        // "count of orders" outranks the distinct-customers measure.
        assert_eq!(
            facts("distinct customer count of orders").measure,
            Measure::OrdersCount
        );
        assert_eq!(
            facts("distinct customer count").measure,
            Measure::DistinctCustomers
        );
        assert_eq!(
            facts("count of products").measure,
            Measure::Agg(AggFunc::Count)
        );
    }

    #[test]
    fn test_distinct_customers_requires_singular_token() {
        // "customers" selects the dimension, not the distinct measure.
        let f = facts("unique customers");
        assert_eq!(f.measure, Measure::Agg(AggFunc::Sum));
        assert_eq!(f.dimension, Some(Dimension::Customer));
    }

    #[test]
    fn test_where_tail_extraction() {
        let clause = extract_where_tail("total sales where products.category = 'toys'")
            .expect("clause recognized");
        assert_eq!(clause.column, "products.category");
        assert_eq!(clause.op, CompareOp::Eq);
        assert_eq!(clause.value, "toys");

        let clause = extract_where_tail("sales where line_total > 100").expect("clause recognized");
        assert_eq!(clause.op, CompareOp::Gt);
        assert_eq!(clause.value, "100");
    }

    #[test]
    fn test_where_tail_ignores_date_range_tail() {
        assert_eq!(
            extract_where_tail("total sales by day where date between 2025-10-20 and 2025-10-25"),
            None
        );
        assert_eq!(extract_where_tail("nowhere category = 'toys'"), None);
    }

    #[test]
    fn test_fill_year_gating() {
        assert_eq!(facts("total sales by month in 2023").fill_year, Some(2023));
        // Dimension present: no fill.
        assert_eq!(facts("monthly revenue in 2025 by product").fill_year, None);
        // Day bucket: no fill.
        assert_eq!(facts("sales by day in 2023").fill_year, None);
        // No pinned year: no fill.
        assert_eq!(facts("yearly revenue").fill_year, None);
    }

    #[test]
    fn test_params_follow_placeholder_order() {
        let f = facts("sales in Q4 2025 where products.category = 'toys'");
        let plan = build_plan(&f, Dialect::Postgres);
        assert_eq!(
            plan.params,
            vec![
                Value::Str("2025-10-01".into()),
                Value::Str("2025-12-31".into()),
                Value::Str("toys".into()),
            ]
        );
        let sql = plan.query.to_sql(Dialect::Postgres);
        let p1 = sql.find("$1").expect("$1 present");
        let p2 = sql.find("$2").expect("$2 present");
        let p3 = sql.find("$3").expect("$3 present");
        assert!(p1 < p2 && p2 < p3);
    }

    #[test]
    fn test_scalar_shape() {
        let plan = build_plan(&facts("total sales"), Dialect::Sqlite);
        let sql = plan.query.to_sql(Dialect::Sqlite);
        assert!(sql.contains("SUM(\"order_items\".\"line_total\") AS \"value\""));
        assert!(!sql.contains("GROUP BY"));
        assert!(sql.ends_with("LIMIT 1"));
        assert!(plan.params.is_empty());
    }

    #[test]
    fn test_blank_question_degrades_to_total() {
        let t = translate("   ", Dialect::Sqlite).expect("blank input still plans");
        assert!(t.sql.ends_with("LIMIT 1"));
        assert!(t.params.is_empty());
    }
}
