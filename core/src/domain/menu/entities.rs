use std::{fmt, path::Path};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::common::entities::app_errors::CoreError;

/// Opaque menu identifier assigned by the backend on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuId(String);

impl MenuId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MenuId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A local menu document picked by the user, not yet sent anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl MenuFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).to_string();

        Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::Invalid(format!("not a file path: {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(CoreError::Invalid(format!("{} is empty", file_name)));
        }

        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Menus are accepted as images or PDFs. Anything else is sent as an opaque
/// byte stream and left for the backend to reject.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    NotParsed,
    Parsed { pages: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMenu {
    pub id: MenuId,
    pub parse_status: ParseStatus,
}

impl UploadedMenu {
    pub fn new(id: MenuId) -> Self {
        Self {
            id,
            parse_status: ParseStatus::NotParsed,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self.parse_status, ParseStatus::Parsed { .. })
    }

    pub fn mark_parsed(&mut self, pages: u32) {
        self.parse_status = ParseStatus::Parsed { pages };
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub menu_id: MenuId,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    #[serde(default)]
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_for_accepted_formats() {
        assert_eq!(mime_type_for("lunch.PDF"), "application/pdf");
        assert_eq!(mime_type_for("board.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("menu.png"), "image/png");
        assert_eq!(mime_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(mime_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_uploaded_menu_starts_unparsed() {
        let mut menu = UploadedMenu::new(MenuId::from("abc123"));
        assert!(!menu.is_parsed());
        menu.mark_parsed(3);
        assert_eq!(menu.parse_status, ParseStatus::Parsed { pages: 3 });
    }

    #[test]
    fn test_upload_receipt_ignores_missing_filename() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"menu_id":"abc123"}"#).unwrap();
        assert_eq!(receipt.menu_id.as_str(), "abc123");
        assert_eq!(receipt.filename, None);
    }

    #[tokio::test]
    async fn test_menu_file_from_missing_path_is_io_error() {
        let result = MenuFile::from_path("/definitely/not/here/menu.pdf").await;
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
