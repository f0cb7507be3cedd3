//! Uploaded-file validation.
//!
//! File bytes live in an external blob store; the domain only keeps a path
//! reference. What we validate here is the metadata presented at upload time:
//! the extension must be allowed for the kind of file and the size must stay
//! under [`MAX_UPLOAD_BYTES`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Size ceiling for every upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff"];
const ATTACHMENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "pdf"];

/// What an upload is for; decides the storage folder and allowed extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProductImage,
    TicketAttachment,
    ProfilePicture,
    RankingIcon,
}

impl UploadKind {
    pub fn folder(self) -> &'static str {
        match self {
            UploadKind::ProductImage => "product_images",
            UploadKind::TicketAttachment => "support_ticket_attachments",
            UploadKind::ProfilePicture => "profile_pictures",
            UploadKind::RankingIcon => "ranking_icons",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::TicketAttachment => ATTACHMENT_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }
}

/// Upload metadata as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub file_name: String,
    pub size_bytes: u64,
}

impl Upload {
    /// Validate the upload for `kind` and derive its storage reference.
    pub fn accept(&self, kind: UploadKind) -> Result<FileRef, DomainError> {
        let name = self.file_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(DomainError::validation("invalid file name"));
        }

        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let allowed = kind.allowed_extensions();
        if !allowed.contains(&extension.as_str()) {
            return Err(DomainError::validation(format!(
                "file extension '{extension}' is not allowed; allowed: {}",
                allowed.join(", ")
            )));
        }

        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(DomainError::validation(format!(
                "file too large ( > {MAX_UPLOAD_BYTES} bytes )"
            )));
        }

        Ok(FileRef(format!("{}/{}-{}", kind.folder(), Uuid::now_v7(), name)))
    }
}

/// Path of an accepted file inside the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    /// Wrap a path read back from storage (already validated when accepted).
    pub fn from_stored(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, size: u64) -> Upload {
        Upload {
            file_name: name.to_string(),
            size_bytes: size,
        }
    }

    #[test]
    fn accepted_upload_lands_in_kind_folder() {
        let file = upload("Logo.PNG", 1024).accept(UploadKind::ProductImage).unwrap();
        assert!(file.as_str().starts_with("product_images/"));
        assert!(file.as_str().ends_with("-Logo.PNG"));
    }

    #[test]
    fn pdf_only_allowed_for_ticket_attachments() {
        assert!(upload("invoice.pdf", 10).accept(UploadKind::TicketAttachment).is_ok());
        assert!(upload("invoice.pdf", 10).accept(UploadKind::ProductImage).is_err());
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(upload("a.jpg", MAX_UPLOAD_BYTES).accept(UploadKind::RankingIcon).is_ok());
        let err = upload("a.jpg", MAX_UPLOAD_BYTES + 1)
            .accept(UploadKind::RankingIcon)
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn rejects_missing_extension_and_paths() {
        assert!(upload("README", 1).accept(UploadKind::ProfilePicture).is_err());
        assert!(upload("../etc/passwd.png", 1).accept(UploadKind::ProfilePicture).is_err());
        assert!(upload("  ", 1).accept(UploadKind::ProfilePicture).is_err());
    }
}
