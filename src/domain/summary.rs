//! Dashboard statistics derived from a working table.
//!
//! The summary is a pure projection: it never fails and never touches the
//! store. Missing or unusable input is reported through the message text.

use super::models::Table;

/// Placeholder shown when there is nothing to summarize.
pub const NOT_AVAILABLE: &str = "N/A";

/// The two dashboard values shown above the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub record_count: String,
    pub column_sum: String,
}

impl Default for SummaryResult {
    fn default() -> Self {
        Self {
            record_count: NOT_AVAILABLE.to_string(),
            column_sum: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Outcome of classifying one column for summation.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericColumn {
    Missing,
    NotNumeric,
    /// Numeric cells in row order; null cells are skipped.
    Values(Vec<f64>),
}

/// Classifies `column` of `table`.
///
/// A column is numeric only when every non-null cell reads as a number and
/// at least one such cell exists. One stray text cell makes the whole column
/// non-numeric.
pub fn numeric_column(table: &Table, column: &str) -> NumericColumn {
    let Some(idx) = table.column_index(column) else {
        return NumericColumn::Missing;
    };

    let mut values = Vec::new();
    for value in table.column_values(idx) {
        if value.is_null() {
            continue;
        }
        match value.as_number() {
            Some(n) => values.push(n),
            None => return NumericColumn::NotNumeric,
        }
    }

    if values.is_empty() {
        NumericColumn::NotNumeric
    } else {
        NumericColumn::Values(values)
    }
}

/// Computes the record count and the sum of `target_column`.
///
/// # Examples
///
/// ```
/// use xldash::domain::{compute_summary, Table, Value};
///
/// let table = Table::from_rows(
///     vec!["name".to_string(), "age".to_string()],
///     vec![
///         vec![Value::Text("a".to_string()), Value::Integer(10)],
///         vec![Value::Text("b".to_string()), Value::Integer(20)],
///     ],
/// );
/// let summary = compute_summary(Some(&table), "age");
/// assert_eq!(summary.record_count, "Total Records: 2");
/// assert_eq!(summary.column_sum, "Sum of 'age': 30.00");
/// ```
pub fn compute_summary(table: Option<&Table>, target_column: &str) -> SummaryResult {
    let Some(table) = table.filter(|t| !t.is_empty()) else {
        return SummaryResult::default();
    };

    let column_sum = match numeric_column(table, target_column) {
        NumericColumn::Missing => format!("Column '{}' not found.", target_column),
        NumericColumn::NotNumeric => format!("Column '{}' is not numeric.", target_column),
        NumericColumn::Values(values) => {
            let sum: f64 = values.iter().sum();
            format!("Sum of '{}': {}", target_column, format_grouped(sum))
        }
    };

    SummaryResult {
        record_count: format!("Total Records: {}", table.row_count()),
        column_sum,
    }
}

/// Formats a number with comma thousands separators and two decimals.
///
/// ```
/// use xldash::domain::format_grouped;
///
/// assert_eq!(format_grouped(1234567.891), "1,234,567.89");
/// assert_eq!(format_grouped(-1000.0), "-1,000.00");
/// ```
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sales() -> Table {
        Table::from_rows(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec![text("a"), Value::Integer(10)],
                vec![text("b"), Value::Integer(20)],
            ],
        )
    }

    #[test]
    fn test_absent_and_empty_tables_are_not_available() {
        assert_eq!(compute_summary(None, "age"), SummaryResult::default());

        let empty = Table::new(vec!["age".to_string()]);
        let summary = compute_summary(Some(&empty), "age");
        assert_eq!(summary.record_count, "N/A");
        assert_eq!(summary.column_sum, "N/A");
    }

    #[test]
    fn test_sales_scenario() {
        let summary = compute_summary(Some(&sales()), "age");
        assert_eq!(summary.record_count, "Total Records: 2");
        assert_eq!(summary.column_sum, "Sum of 'age': 30.00");
    }

    #[test]
    fn test_record_count_matches_rows() {
        let mut table = Table::new(vec!["x".to_string()]);
        for i in 0..137 {
            table.push_row(vec![Value::Integer(i)]);
        }
        let summary = compute_summary(Some(&table), "x");
        assert_eq!(summary.record_count, "Total Records: 137");
        assert_eq!(summary.column_sum, "Sum of 'x': 9,316.00");
    }

    #[test]
    fn test_missing_column() {
        let summary = compute_summary(Some(&sales()), "amount");
        assert_eq!(summary.column_sum, "Column 'amount' not found.");
        assert_eq!(summary.record_count, "Total Records: 2");
    }

    #[test]
    fn test_text_column_is_not_numeric() {
        let summary = compute_summary(Some(&sales()), "name");
        assert_eq!(summary.column_sum, "Column 'name' is not numeric.");
    }

    #[test]
    fn test_mixed_column_is_not_numeric_as_a_whole() {
        let table = Table::from_rows(
            vec!["v".to_string()],
            vec![
                vec![Value::Integer(5)],
                vec![text("oops")],
                vec![Value::Real(1.5)],
            ],
        );
        assert_eq!(numeric_column(&table, "v"), NumericColumn::NotNumeric);
        assert_eq!(
            compute_summary(Some(&table), "v").column_sum,
            "Column 'v' is not numeric."
        );
    }

    #[test]
    fn test_nulls_contribute_zero() {
        let table = Table::from_rows(
            vec!["v".to_string()],
            vec![
                vec![Value::Real(1.25)],
                vec![Value::Null],
                vec![text("2.5")],
            ],
        );
        assert_eq!(
            compute_summary(Some(&table), "v").column_sum,
            "Sum of 'v': 3.75"
        );
    }

    #[test]
    fn test_all_null_column_is_not_numeric() {
        let table = Table::from_rows(vec!["v".to_string()], vec![vec![Value::Null]]);
        assert_eq!(numeric_column(&table, "v"), NumericColumn::NotNumeric);
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0), "0.00");
        assert_eq!(format_grouped(999.999), "1,000.00");
        assert_eq!(format_grouped(123.4), "123.40");
        assert_eq!(format_grouped(1234.5), "1,234.50");
        assert_eq!(format_grouped(123456.0), "123,456.00");
        assert_eq!(format_grouped(-0.001), "0.00");
        assert_eq!(format_grouped(-9876543.21), "-9,876,543.21");
    }
}
