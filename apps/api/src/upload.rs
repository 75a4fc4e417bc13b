//! Resume files and the multipart forms that carry them.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Request bodies that may carry a resume get more room than axum's 2 MiB
/// default so oversized files reach validation instead of a bare 413.
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOC_MIME: &str = "application/msword";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const ACCEPTED_RESUME_TYPES: [&str; 3] = [PDF_MIME, DOC_MIME, DOCX_MIME];

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub file_name: String,
    /// Declared content type, as sent by the client.
    pub content_type: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn has_accepted_type(&self) -> bool {
        ACCEPTED_RESUME_TYPES.contains(&self.content_type.as_str())
    }
}

/// Text fields plus the optional `resume` file of a multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub resume: Option<ResumeFile>,
}

impl UploadForm {
    /// Trimmed value of a text field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Reads every part of the body. A `resume` part without a file name or
    /// with no content is what browsers send for an empty file input, and is
    /// treated as no file.
    pub async fn read(mut multipart: Multipart) -> Result<Self, axum::extract::multipart::MultipartError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "resume" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                if let Some(file_name) = file_name.filter(|n| !n.is_empty()) {
                    if !bytes.is_empty() {
                        form.resume = Some(ResumeFile {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                continue;
            }

            let value = field.text().await?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_types() {
        assert!(ResumeFile::new("cv.pdf", PDF_MIME, vec![1u8]).has_accepted_type());
        assert!(ResumeFile::new("cv.doc", DOC_MIME, vec![1u8]).has_accepted_type());
        assert!(ResumeFile::new("cv.docx", DOCX_MIME, vec![1u8]).has_accepted_type());
        assert!(!ResumeFile::new("cv.txt", "text/plain", vec![1u8]).has_accepted_type());
    }

    #[test]
    fn test_blank_text_field_counts_as_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("linkedinUrl".to_string(), "   ".to_string());
        form.fields.insert("name".to_string(), " Ada ".to_string());
        assert_eq!(form.text("linkedinUrl"), None);
        assert_eq!(form.text("name"), Some("Ada"));
        assert_eq!(form.text("missing"), None);
    }
}
