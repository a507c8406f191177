//! The fixed four-table sales schema this translator targets.
//!
//! The schema is supplied by the external introspection collaborator and is
//! assumed verbatim: `orders(order_id, customer_id, order_date)`,
//! `order_items(order_id, product_id, line_total)`,
//! `products(product_id, product_name, category)`,
//! `customers(customer_id, customer_name)`. Arbitrary schemas are out of
//! scope.

use crate::nlq::keywords::Dimension;
use crate::sql::expr::{table_col, Expr, ExprExt};
use crate::sql::query::{Query, TableRef};

pub const ORDERS: &str = "orders";
pub const ORDER_ITEMS: &str = "order_items";
pub const PRODUCTS: &str = "products";
pub const CUSTOMERS: &str = "customers";

/// Date column driving every time expression.
pub const ORDER_DATE_COL: &str = "order_date";

/// Qualified order-date column for raw dialect fragments.
pub const ORDER_DATE: &str = "orders.order_date";

/// Measure column for the value aggregates.
pub const LINE_TOTAL: &str = "line_total";

/// The fixed join skeleton: order_items joined to orders, left-joined to
/// products and customers.
pub fn base_query() -> Query {
    Query::new()
        .from(TableRef::new(ORDER_ITEMS))
        .inner_join(
            TableRef::new(ORDERS),
            table_col(ORDER_ITEMS, "order_id").eq(table_col(ORDERS, "order_id")),
        )
        .left_join(
            TableRef::new(PRODUCTS),
            table_col(ORDER_ITEMS, "product_id").eq(table_col(PRODUCTS, "product_id")),
        )
        .left_join(
            TableRef::new(CUSTOMERS),
            table_col(ORDERS, "customer_id").eq(table_col(CUSTOMERS, "customer_id")),
        )
}

/// The grouping column for a dimension axis.
pub fn dimension_column(dimension: Dimension) -> Expr {
    match dimension {
        Dimension::Customer => table_col(CUSTOMERS, "customer_name"),
        Dimension::Product => table_col(PRODUCTS, "product_name"),
        Dimension::Category => table_col(PRODUCTS, "category"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::dialect::Dialect;

    #[test]
    fn test_join_skeleton() {
        let sql = base_query()
            .select(vec![crate::sql::expr::col("line_total")])
            .to_sql(Dialect::Sqlite);
        assert!(sql.contains("FROM \"order_items\""));
        assert!(sql.contains(
            "INNER JOIN \"orders\" ON \"order_items\".\"order_id\" = \"orders\".\"order_id\""
        ));
        assert!(sql.contains(
            "LEFT JOIN \"products\" ON \"order_items\".\"product_id\" = \"products\".\"product_id\""
        ));
        assert!(sql.contains(
            "LEFT JOIN \"customers\" ON \"orders\".\"customer_id\" = \"customers\".\"customer_id\""
        ));
    }

    #[test]
    fn test_dimension_columns() {
        let sql = dimension_column(Dimension::Category)
            .to_tokens_for_dialect(Dialect::Sqlite)
            .serialize(Dialect::Sqlite);
        assert_eq!(sql, "\"products\".\"category\"");
    }
}
