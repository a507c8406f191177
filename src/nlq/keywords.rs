//! Keyword extractors: pure functions over the question's token set.

use once_cell::sync::Lazy;
use regex::Regex;

/// Aggregate function selected by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    Sum,
    Avg,
    Count,
    Max,
    Min,
}

/// Fixed keyword-to-aggregate mapping. First match in token order wins.
const AGG_KEYWORDS: &[(&str, AggFunc)] = &[
    ("total", AggFunc::Sum),
    ("sum", AggFunc::Sum),
    ("sales", AggFunc::Sum),
    ("revenue", AggFunc::Sum),
    ("average", AggFunc::Avg),
    ("avg", AggFunc::Avg),
    ("count", AggFunc::Count),
    ("number", AggFunc::Count),
    ("maximum", AggFunc::Max),
    ("max", AggFunc::Max),
    ("minimum", AggFunc::Min),
    ("min", AggFunc::Min),
];

/// Resolve the aggregate keyword; defaults to SUM when nothing matches.
pub fn extract_agg(tokens: &[String]) -> AggFunc {
    tokens
        .iter()
        .find_map(|token| {
            AGG_KEYWORDS
                .iter()
                .find(|(keyword, _)| keyword == token)
                .map(|(_, agg)| *agg)
        })
        .unwrap_or(AggFunc::Sum)
}

/// True if the question asks for distinct/unique values.
pub fn wants_distinct(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == "distinct" || t == "unique")
}

/// Non-time grouping axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Customer,
    Product,
    Category,
}

/// Resolve the dimension keyword.
///
/// Fixed precedence customer > product > category: a question naming both
/// "customer" and "product" resolves to customer.
pub fn extract_dimension(tokens: &[String]) -> Option<Dimension> {
    let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
    if has(&["customer", "customers"]) {
        Some(Dimension::Customer)
    } else if has(&["product", "products"]) {
        Some(Dimension::Product)
    } else if has(&["category", "categories"]) {
        Some(Dimension::Category)
    } else {
        None
    }
}

static TOP_N_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(top|best)\s+(\d+)\b").expect("valid top-n pattern"));

/// Extract a top-N count ("top 5", "best 3").
pub fn extract_top_n(tokens: &[String]) -> Option<u64> {
    let joined = tokens.join(" ");
    TOP_N_RE
        .captures(&joined)
        .and_then(|caps| caps[2].parse().ok())
}

static ORDERS_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\border(s)?\s+count\b|\bcount of orders\b|\bnumber of orders\b|\border volume\b")
        .expect("valid orders-count pattern")
});

/// True if the question asks for the order count, which forces the measure
/// to count-distinct-orders regardless of the aggregate keyword.
pub fn wants_orders_count(text: &str) -> bool {
    ORDERS_COUNT_RE.is_match(&text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_agg_first_match_wins() {
        assert_eq!(extract_agg(&toks("average sales by month")), AggFunc::Avg);
        assert_eq!(extract_agg(&toks("sales average")), AggFunc::Sum);
    }

    #[test]
    fn test_agg_defaults_to_sum() {
        assert_eq!(extract_agg(&toks("by month in 2023")), AggFunc::Sum);
    }

    #[test]
    fn test_distinct_flag() {
        assert!(wants_distinct(&toks("unique customers")));
        assert!(!wants_distinct(&toks("top customers")));
    }

    #[test]
    fn test_dimension_precedence_customer_over_product() {
        assert_eq!(
            extract_dimension(&toks("sales by product and customer")),
            Some(Dimension::Customer)
        );
        assert_eq!(
            extract_dimension(&toks("sales by category")),
            Some(Dimension::Category)
        );
        assert_eq!(extract_dimension(&toks("sales by month")), None);
    }

    #[test]
    fn test_top_n() {
        assert_eq!(extract_top_n(&toks("top 5 customers")), Some(5));
        assert_eq!(extract_top_n(&toks("best 3 products")), Some(3));
        assert_eq!(extract_top_n(&toks("all customers")), None);
    }

    #[test]
    fn test_orders_count_phrases() {
        assert!(wants_orders_count("orders count by month in 2024"));
        assert!(wants_orders_count("order count"));
        assert!(wants_orders_count("count of orders in january"));
        assert!(wants_orders_count("NUMBER OF ORDERS"));
        assert!(wants_orders_count("order volume by quarter"));
        assert!(!wants_orders_count("count of customers"));
    }
}
