use crate::data::{ColumnType, Table, Value};
use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One group of an aggregation: the key value and its summed total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: Value,
    pub total: f64,
}

/// Grouped, summed and ranked view of a table.
///
/// Rows are ordered by descending total; ties keep first-occurrence order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTable {
    pub key_column: String,
    pub value_column: String,
    pub rows: Vec<GroupTotal>,
}

/// Hashable identity of a group key. Numbers compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Missing,
    Number(u64),
    Text(String),
}

impl GroupKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Missing => GroupKey::Missing,
            // -0.0 and 0.0 are the same key
            Value::Number(n) => GroupKey::Number((n + 0.0).to_bits()),
            Value::Text(s) => GroupKey::Text(s.clone()),
        }
    }
}

/// Sum `value_col` per distinct `key_col` value, in first-occurrence order.
///
/// Missing values contribute zero. Fails if either column is absent or the
/// value column is not numeric.
pub fn group_sums(table: &Table, key_col: &str, value_col: &str) -> Result<Vec<GroupTotal>> {
    let key_idx = table
        .column_index(key_col)
        .ok_or_else(|| DashboardError::aggregation(key_col, "column not found"))?;
    let value_idx = table
        .column_index(value_col)
        .ok_or_else(|| DashboardError::aggregation(value_col, "column not found"))?;

    if table.column_type(value_col) != Some(ColumnType::Numeric) {
        return Err(DashboardError::aggregation(value_col, "column is not numeric"));
    }

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for row in table.rows() {
        let key = &row[key_idx];
        let amount = row[value_idx].as_f64().unwrap_or(0.0);

        let slot = *index.entry(GroupKey::of(key)).or_insert_with(|| {
            groups.push(GroupTotal {
                key: key.clone(),
                total: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].total += amount;
    }

    Ok(groups)
}

/// Group, sum, then keep the `n` largest groups.
pub fn top_n_by_sum(table: &Table, key_col: &str, value_col: &str, n: usize) -> Result<AggregatedTable> {
    let mut rows = group_sums(table, key_col, value_col)?;
    let distinct = rows.len();

    // sort_by is stable, so equal totals stay in first-occurrence order
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    rows.truncate(n);

    debug!(key = key_col, value = value_col, distinct, kept = rows.len(), "aggregated table");

    Ok(AggregatedTable {
        key_column: key_col.to_string(),
        value_column: value_col.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::load_table;

    fn products(n: usize) -> Table {
        let mut csv = String::from("product,sales_amount\n");
        for i in 0..n {
            // Two rows per product so sums matter
            csv.push_str(&format!("P{},{}\nP{},{}\n", i, i * 10, i, 1));
        }
        load_table(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_top_ten_of_twelve() {
        let table = products(12);
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        assert_eq!(agg.rows.len(), 10);
        assert_eq!(agg.rows[0].key, Value::Text("P11".to_string()));
        assert_eq!(agg.rows[0].total, 111.0);
        let keys: Vec<String> = agg.rows.iter().map(|r| r.key.to_string()).collect();
        assert!(!keys.contains(&"P0".to_string()));
        assert!(!keys.contains(&"P1".to_string()));
    }

    #[test]
    fn test_fewer_groups_than_n() {
        let table = products(3);
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        assert_eq!(agg.rows.len(), 3);
    }

    #[test]
    fn test_sorted_non_increasing_and_sums_exact() {
        let table = load_table(b"product,sales_amount\nA,5\nB,7\nA,4\nC,1\nB,-2\n").unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        let totals: Vec<f64> = agg.rows.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![9.0, 5.0, 1.0]);
        assert!(totals.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let table = load_table(b"product,sales_amount\nZed,5\nAlpha,5\nMid,5\n").unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 2).unwrap();
        let keys: Vec<String> = agg.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["Zed", "Alpha"]);
    }

    #[test]
    fn test_nan_cells_rank_as_zero() {
        let table = load_table(b"product,sales_amount\nA,5\nB,NAN\nC,-nan\n").unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        let ranked: Vec<(String, f64)> = agg.rows.iter().map(|r| (r.key.to_string(), r.total)).collect();
        assert_eq!(
            ranked,
            vec![("A".to_string(), 5.0), ("B".to_string(), 0.0), ("C".to_string(), 0.0)]
        );
    }

    #[test]
    fn test_missing_values_and_keys() {
        let table = load_table(b"product,sales_amount\nA,\n,3\nA,2\n,4\n").unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        assert_eq!(agg.rows.len(), 2);
        assert_eq!(agg.rows[0].key, Value::Missing);
        assert_eq!(agg.rows[0].total, 7.0);
        assert_eq!(agg.rows[1].total, 2.0);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let table = load_table(b"product,sales_amount\nwidget,1\nWidget,2\n").unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        assert_eq!(agg.rows.len(), 2);
    }

    #[test]
    fn test_numeric_keys() {
        let table = load_table(b"store,sales_amount\n1,10\n1.0,5\n2,1\n").unwrap();
        let agg = top_n_by_sum(&table, "store", "sales_amount", 10).unwrap();
        assert_eq!(agg.rows.len(), 2);
        assert_eq!(agg.rows[0].total, 15.0);
    }

    #[test]
    fn test_non_numeric_value_column() {
        let table = load_table(b"product,sales_amount\nA,lots\n").unwrap();
        let result = top_n_by_sum(&table, "product", "sales_amount", 10);
        assert!(matches!(result, Err(DashboardError::Aggregation { .. })));
    }
}
