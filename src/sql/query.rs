//! Query builder - construct SELECT statements with a fluent API.

use super::dialect::Dialect;
use super::expr::{Expr, ExprExt};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens_for_dialect(dialect);
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Table Reference
// =============================================================================

/// A table (or CTE) reference.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub table: String,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.table.clone()));
        ts
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());
        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens_for_dialect(dialect));

        ts
    }
}

// =============================================================================
// ORDER BY
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// An ORDER BY expression.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct OrderByExpr {
    pub expr: Expr,
    pub dir: SortDir,
}

impl OrderByExpr {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            dir: SortDir::Desc,
        }
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = self.expr.to_tokens_for_dialect(dialect);
        ts.space().push(match self.dir {
            SortDir::Asc => Token::Asc,
            SortDir::Desc => Token::Desc,
        });
        ts
    }
}

// =============================================================================
// CTE (Common Table Expression)
// =============================================================================

/// The body of a CTE: either a subquery or an inline VALUES list.
///
/// The VALUES form carries the synthetic calendar rows for calendar fill.
#[derive(Debug, Clone, PartialEq)]
pub enum CteBody {
    Select(Box<Query>),
    Values(Vec<Vec<Expr>>),
}

/// A Common Table Expression (WITH clause).
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct Cte {
    pub name: String,
    pub columns: Option<Vec<String>>,
    pub body: CteBody,
}

impl Cte {
    pub fn new(name: &str, query: Query) -> Self {
        Self {
            name: name.into(),
            columns: None,
            body: CteBody::Select(Box::new(query)),
        }
    }

    /// Create a CTE whose body is an inline VALUES list.
    pub fn values(name: &str, columns: Vec<&str>, rows: Vec<Vec<Expr>>) -> Self {
        Self {
            name: name.into(),
            columns: Some(columns.into_iter().map(String::from).collect()),
            body: CteBody::Values(rows),
        }
    }

    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()));

        if let Some(cols) = &self.columns {
            ts.space().lparen();
            for (i, col) in cols.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(col.clone()));
            }
            ts.rparen();
        }

        ts.space().push(Token::As).space().lparen();

        match &self.body {
            CteBody::Select(query) => {
                ts.newline()
                    .append(&query.to_tokens_for_dialect(dialect))
                    .newline();
            }
            CteBody::Values(rows) => {
                ts.push(Token::Values).space();
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.lparen();
                    for (j, value) in row.iter().enumerate() {
                        if j > 0 {
                            ts.comma().space();
                        }
                        ts.append(&value.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }
        }

        ts.rparen();
        ts
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql()"]
pub struct Query {
    pub with: Vec<Cte>,
    pub select: Vec<SelectExpr>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<u64>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a CTE (WITH clause).
    pub fn with_cte(mut self, cte: Cte) -> Self {
        self.with.push(cte);
        self
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Set the FROM table.
    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    /// Add a JOIN.
    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            table,
            on,
        });
        self
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Inner, table, on)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: TableRef, on: Expr) -> Self {
        self.join(JoinType::Left, table, on)
    }

    /// Add a WHERE condition (ANDed after existing conditions, preserving
    /// left-to-right fragment order).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, exprs: Vec<OrderByExpr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Convert to token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        // WITH clause
        if !self.with.is_empty() {
            ts.push(Token::With).space();
            for (i, cte) in self.with.iter().enumerate() {
                if i > 0 {
                    ts.comma().newline();
                }
                ts.append(&cte.to_tokens_for_dialect(dialect));
            }
            ts.newline();
        }

        // SELECT
        ts.push(Token::Select);

        // Columns
        for (i, select_expr) in self.select.iter().enumerate() {
            if i == 0 {
                ts.newline().indent(1);
            } else {
                ts.comma().newline().indent(1);
            }
            ts.append(&select_expr.to_tokens_for_dialect(dialect));
        }

        // FROM
        if let Some(from) = &self.from {
            ts.newline().push(Token::From).space();
            ts.append(&from.to_tokens());
        }

        // JOINs
        for join in &self.joins {
            ts.newline();
            ts.append(&join.to_tokens_for_dialect(dialect));
        }

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            ts.newline().push(Token::Where).space();
            ts.append(&where_clause.to_tokens_for_dialect(dialect));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.newline().push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens_for_dialect(dialect));
            }
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            ts.newline().push(Token::OrderBy).space();
            for (i, expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens_for_dialect(dialect));
            }
        }

        // LIMIT
        if let Some(limit) = self.limit {
            ts.newline()
                .push(Token::Limit)
                .space()
                .push(Token::LitInt(limit as i64));
        }

        ts
    }

    /// Generate SQL string for a specific dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::expr::{bind, col, lit_int, lit_str, sum, table_col};

    #[test]
    fn test_simple_select() {
        let q = Query::new()
            .select(vec![SelectExpr::new(sum(col("line_total"))).with_alias("value")])
            .from(TableRef::new("order_items"));

        assert_eq!(
            q.to_sql(Dialect::Sqlite),
            "SELECT\n  SUM(\"line_total\") AS \"value\"\nFROM \"order_items\""
        );
    }

    #[test]
    fn test_join_where_group_order_limit() {
        let q = Query::new()
            .select(vec![
                SelectExpr::new(table_col("customers", "customer_name")).with_alias("dimension"),
                SelectExpr::new(sum(col("line_total"))).with_alias("value"),
            ])
            .from(TableRef::new("order_items"))
            .inner_join(
                TableRef::new("orders"),
                table_col("order_items", "order_id").eq(table_col("orders", "order_id")),
            )
            .filter(table_col("orders", "order_date").between(bind(0), bind(1)))
            .group_by(vec![table_col("customers", "customer_name")])
            .order_by(vec![OrderByExpr::desc(col("value"))])
            .limit(5);

        let sql = q.to_sql(Dialect::Sqlite);
        assert!(sql.contains("INNER JOIN \"orders\" ON \"order_items\".\"order_id\" = \"orders\".\"order_id\""));
        assert!(sql.contains("WHERE \"orders\".\"order_date\" BETWEEN ? AND ?"));
        assert!(sql.contains("GROUP BY \"customers\".\"customer_name\""));
        assert!(sql.contains("ORDER BY \"value\" DESC"));
        assert!(sql.ends_with("LIMIT 5"));
    }

    #[test]
    fn test_filter_and_composition_order() {
        let q = Query::new()
            .select(vec![SelectExpr::new(col("a"))])
            .from(TableRef::new("t"))
            .filter(col("x").eq(bind(0)))
            .filter(col("y").gt(bind(1)));

        let sql = q.to_sql(Dialect::Postgres);
        assert!(sql.contains("WHERE \"x\" = $1 AND \"y\" > $2"));
    }

    #[test]
    fn test_values_cte() {
        let cal = Cte::values(
            "cal",
            vec!["period", "ord"],
            vec![
                vec![lit_str("2023-01"), lit_int(1)],
                vec![lit_str("2023-02"), lit_int(2)],
            ],
        );
        let q = Query::new()
            .with_cte(cal)
            .select(vec![SelectExpr::new(table_col("cal", "period"))])
            .from(TableRef::new("cal"));

        let sql = q.to_sql(Dialect::Sqlite);
        assert!(sql.starts_with(
            "WITH \"cal\" (\"period\", \"ord\") AS (VALUES ('2023-01', 1), ('2023-02', 2))"
        ));
    }

    #[test]
    fn test_subquery_cte() {
        let inner = Query::new()
            .select(vec![SelectExpr::new(sum(col("line_total"))).with_alias("value")])
            .from(TableRef::new("order_items"));
        let q = Query::new()
            .with_cte(Cte::new("agg", inner))
            .select(vec![SelectExpr::new(table_col("agg", "value"))])
            .from(TableRef::new("agg"));

        let sql = q.to_sql(Dialect::Sqlite);
        assert!(sql.starts_with("WITH \"agg\" AS (\n"));
        assert!(sql.contains("FROM \"agg\""));
    }
}
