use reqwest::{
    Client,
    multipart::{Form, Part},
};
use tracing::instrument;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        health::entities::HealthStatus,
        menu::{
            entities::{MenuFile, MenuId, ParseReport, UploadReceipt},
            ports::MenuBackend,
            value_objects::{ParseMenuRequest, QaRequest},
        },
        safety::entities::SafetyAnswer,
    },
    infrastructure::http::send_json,
};

/// Menu backend spoken to over plain HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpMenuBackend {
    base_url: String,
    client: Client,
}

impl HttpMenuBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl MenuBackend for HttpMenuBackend {
    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, CoreError> {
        send_json(self.client.get(self.url("/health")), "Health check").await
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.size()))]
    async fn upload_menu(&self, file: MenuFile) -> Result<UploadReceipt, CoreError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| CoreError::Invalid(format!("bad mime type {}: {}", file.mime_type, e)))?;

        let form = Form::new().part("file", part);
        let request = self.client.post(self.url("/menus/upload")).multipart(form);

        send_json(request, "Upload").await
    }

    #[instrument(skip(self, request), fields(%menu_id))]
    async fn parse_menu(
        &self,
        menu_id: MenuId,
        request: ParseMenuRequest,
    ) -> Result<ParseReport, CoreError> {
        let path = format!("/menus/{}/parse", urlencoding::encode(menu_id.as_str()));
        let request = self.client.post(self.url(&path)).json(&request);

        send_json(request, "Parse").await
    }

    #[instrument(skip(self, request), fields(menu_id = %request.menu_id))]
    async fn ask(&self, request: QaRequest) -> Result<SafetyAnswer, CoreError> {
        let request = self.client.post(self.url("/qa")).json(&request);
        send_json(request, "Ask").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_drops_trailing_slash() {
        let backend = HttpMenuBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/qa"), "http://localhost:8000/qa");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let backend = HttpMenuBackend::new("http://127.0.0.1:1");
        let result = backend.health().await;
        assert!(matches!(result, Err(CoreError::Transport(_))));
    }
}
