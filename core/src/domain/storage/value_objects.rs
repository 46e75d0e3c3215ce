use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::common::entities::app_errors::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrder {
    pub column: String,
    pub direction: SortDirection,
}

/// Table selection with equality filters, in the provider's query dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub table: String,
    pub columns: String,
    pub filters: Vec<RowFilter>,
    pub order: Option<RowOrder>,
}

impl RowQuery {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(RowFilter {
            column: column.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(RowOrder {
            column: column.into(),
            direction,
        });
        self
    }

    /// Query-string pairs: `select=*`, `col=eq.value`, `order=col.asc`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];

        pairs.extend(
            self.filters
                .iter()
                .map(|f| (f.column.clone(), format!("eq.{}", f.value))),
        );

        if let Some(order) = &self.order {
            let direction = match order.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        pairs
    }
}

pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, CoreError> {
    serde_json::from_value(row).map_err(|e| {
        tracing::error!("Failed to decode row: {}", e);
        CoreError::Decode(e.to_string())
    })
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, CoreError> {
    rows.into_iter().map(decode_row).collect()
}
