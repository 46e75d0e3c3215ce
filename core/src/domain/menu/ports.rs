use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    health::entities::HealthStatus,
    menu::{
        entities::{MenuFile, MenuId, ParseReport, UploadReceipt},
        value_objects::{ParseMenuRequest, QaRequest},
    },
    safety::entities::SafetyAnswer,
};

/// Menu parsing and question-answering backend.
#[cfg_attr(test, mockall::automock)]
pub trait MenuBackend: Send + Sync {
    fn health(&self) -> impl Future<Output = Result<HealthStatus, CoreError>> + Send;

    /// Send the file as multipart form data, field `file`.
    fn upload_menu(
        &self,
        file: MenuFile,
    ) -> impl Future<Output = Result<UploadReceipt, CoreError>> + Send;

    fn parse_menu(
        &self,
        menu_id: MenuId,
        request: ParseMenuRequest,
    ) -> impl Future<Output = Result<ParseReport, CoreError>> + Send;

    fn ask(
        &self,
        request: QaRequest,
    ) -> impl Future<Output = Result<SafetyAnswer, CoreError>> + Send;
}
