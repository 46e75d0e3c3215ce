use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        storage::{ports::RowStore, value_objects::RowQuery},
    },
    infrastructure::{
        hosted::HostedProject,
        http::{send, send_json},
    },
};

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Row storage over the hosted project's REST interface. Requests run as
/// the signed-in user so row-level policies apply.
#[derive(Debug, Clone)]
pub struct HostedRowStore {
    project: HostedProject,
}

impl HostedRowStore {
    pub fn new(project: HostedProject) -> Self {
        Self { project }
    }

    async fn table_request(&self, method: Method, table: &str) -> RequestBuilder {
        self.project
            .authorized(method, &format!("/rest/v1/{}", table))
            .await
    }

    async fn write_one(
        &self,
        table: String,
        row: Value,
        prefer: &str,
        action: &str,
    ) -> Result<Value, CoreError> {
        let request = self
            .table_request(Method::POST, &table)
            .await
            .header("Prefer", prefer)
            .json(&row);

        let rows: Vec<Value> = send_json(request, action).await?;
        rows.into_iter().next().ok_or_else(|| {
            tracing::error!(%table, "{} returned no rows", action);
            CoreError::Decode(format!("{} on {} returned no rows", action, table))
        })
    }
}

impl RowStore for HostedRowStore {
    #[instrument(skip(self), fields(table = %query.table))]
    async fn select_rows(&self, query: RowQuery) -> Result<Vec<Value>, CoreError> {
        let request = self
            .table_request(Method::GET, &query.table)
            .await
            .query(&query.to_query_pairs());

        let rows: Vec<Value> = send_json(request, "Select").await?;
        debug!(count = rows.len(), "Rows selected");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = %query.table))]
    async fn get_row(&self, query: RowQuery) -> Result<Option<Value>, CoreError> {
        let mut pairs = query.to_query_pairs();
        pairs.push(("limit".to_string(), "1".to_string()));

        let request = self
            .table_request(Method::GET, &query.table)
            .await
            .query(&pairs);

        let rows: Vec<Value> = send_json(request, "Get row").await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, row))]
    async fn insert_row(&self, table: String, row: Value) -> Result<Value, CoreError> {
        self.write_one(table, row, RETURN_REPRESENTATION, "Insert")
            .await
    }

    #[instrument(skip(self, row))]
    async fn upsert_row(&self, table: String, row: Value) -> Result<Value, CoreError> {
        self.write_one(table, row, MERGE_DUPLICATES, "Upsert").await
    }

    #[instrument(skip(self, changes), fields(table = %query.table))]
    async fn update_rows(&self, query: RowQuery, changes: Value) -> Result<Vec<Value>, CoreError> {
        let request = self
            .table_request(Method::PATCH, &query.table)
            .await
            .query(&query.to_query_pairs())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&changes);

        let rows: Vec<Value> = send_json(request, "Update").await?;
        debug!(count = rows.len(), "Rows updated");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = %query.table))]
    async fn delete_rows(&self, query: RowQuery) -> Result<(), CoreError> {
        let filters: Vec<(String, String)> = query
            .to_query_pairs()
            .into_iter()
            .filter(|(key, _)| key != "select" && key != "order")
            .collect();

        let request = self
            .table_request(Method::DELETE, &query.table)
            .await
            .query(&filters);

        send(request, "Delete").await?;
        Ok(())
    }
}
