use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::common::entities::app_errors::CoreError;

/// Sends the request and turns transport failures and non-success statuses
/// into [`CoreError`]. `action` only labels the log lines.
pub(crate) async fn send(request: RequestBuilder, action: &str) -> Result<Response, CoreError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!("{} request failed: {}", action, e);
        CoreError::Transport(e.to_string())
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!("{} returned error: {} - {}", action, status, body);
        return Err(CoreError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    action: &str,
) -> Result<T, CoreError> {
    response.json().await.map_err(|e| {
        tracing::error!("Failed to parse {} response: {}", action, e);
        CoreError::Decode(e.to_string())
    })
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    action: &str,
) -> Result<T, CoreError> {
    let response = send(request, action).await?;
    read_json(response, action).await
}
