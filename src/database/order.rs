use serde::{Deserialize, Serialize};

use super::entity::Table;
use super::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub sort: SortDirection,
}

impl OrderBy {
    /// Parse an order spec like `"due_date asc, created_at"`.
    ///
    /// Columns without a direction sort descending. Every column is checked
    /// against the table descriptor before it can reach SQL.
    pub fn parse(spec: &str, table: &Table) -> Result<Vec<OrderBy>, StoreError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(col) = it.next() else { continue };
            let sort = match it.next() {
                None => SortDirection::Desc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) => {
                    return Err(StoreError::InvalidQuery(format!("Invalid sort direction: {}", dir)))
                }
            };
            if it.next().is_some() {
                return Err(StoreError::InvalidQuery(format!("Invalid order clause: {}", trimmed)));
            }
            if !table.is_readable(col) {
                return Err(StoreError::InvalidQuery(format!(
                    "Cannot order {} by unknown column: {}",
                    table.name, col
                )));
            }
            out.push(OrderBy { column: col.to_string(), sort });
        }
        Ok(out)
    }

    /// Resolve an optional caller-supplied spec, falling back to the table default
    pub fn resolve(spec: Option<&str>, table: &Table) -> Result<Vec<OrderBy>, StoreError> {
        match spec.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Self::parse(s, table),
            None => Self::parse(table.default_order, table),
        }
    }

    pub fn generate(orders: &[OrderBy]) -> String {
        if orders.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = orders
            .iter()
            .map(|o| format!("t.\"{}\" {}", o.column, o.sort.to_sql()))
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    }
}
