use std::future::Future;

use serde_json::Value;

use crate::domain::common::entities::app_errors::CoreError;

use super::value_objects::RowQuery;

/// Row-level storage on the hosted provider. Rows cross this port as JSON
/// objects; typed services decode them.
#[cfg_attr(test, mockall::automock)]
pub trait RowStore: Send + Sync {
    /// Select every row matching the query.
    fn select_rows(
        &self,
        query: RowQuery,
    ) -> impl Future<Output = Result<Vec<Value>, CoreError>> + Send;

    /// Select at most one row matching the query.
    fn get_row(
        &self,
        query: RowQuery,
    ) -> impl Future<Output = Result<Option<Value>, CoreError>> + Send;

    /// Insert a row and return it as stored.
    fn insert_row(
        &self,
        table: String,
        row: Value,
    ) -> impl Future<Output = Result<Value, CoreError>> + Send;

    /// Insert a row, merging into an existing one on primary key conflict.
    fn upsert_row(
        &self,
        table: String,
        row: Value,
    ) -> impl Future<Output = Result<Value, CoreError>> + Send;

    /// Apply `changes` to every row matching the query and return them.
    fn update_rows(
        &self,
        query: RowQuery,
        changes: Value,
    ) -> impl Future<Output = Result<Vec<Value>, CoreError>> + Send;

    fn delete_rows(&self, query: RowQuery) -> impl Future<Output = Result<(), CoreError>> + Send;
}
