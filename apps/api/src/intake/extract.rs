//! Resolves where a submission's text comes from and extracts it.
//!
//! Only PDF files are actually parsed. Word documents and profile URLs
//! return fixed placeholder text: there is no real extraction for them.

use serde::{Deserialize, Serialize};

use crate::intake::IntakeError;
use crate::upload::{ResumeFile, DOCX_MIME, DOC_MIME, PDF_MIME};

pub const WORD_PLACEHOLDER: &str = "[DOCX parsing not implemented]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Resume,
    Linkedin,
    Portfolio,
}

/// The one text source a submission resolves to. An uploaded file wins over
/// a LinkedIn URL, which wins over a portfolio URL.
#[derive(Debug, Clone, Copy)]
pub enum ResumeSource<'a> {
    File(&'a ResumeFile),
    Linkedin(&'a str),
    Portfolio(&'a str),
}

impl<'a> ResumeSource<'a> {
    pub fn resolve(
        file: Option<&'a ResumeFile>,
        linkedin_url: Option<&'a str>,
        portfolio_url: Option<&'a str>,
    ) -> Result<Self, IntakeError> {
        if let Some(file) = file {
            Ok(ResumeSource::File(file))
        } else if let Some(url) = linkedin_url {
            Ok(ResumeSource::Linkedin(url))
        } else if let Some(url) = portfolio_url {
            Ok(ResumeSource::Portfolio(url))
        } else {
            Err(IntakeError::NoSource)
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ResumeSource::File(_) => SourceKind::Resume,
            ResumeSource::Linkedin(_) => SourceKind::Linkedin,
            ResumeSource::Portfolio(_) => SourceKind::Portfolio,
        }
    }

    pub async fn extract_text(&self) -> Result<String, IntakeError> {
        match self {
            ResumeSource::File(file) => extract_file_text(file).await,
            ResumeSource::Linkedin(url) | ResumeSource::Portfolio(url) => Ok(fetch_profile_data(url)),
        }
    }
}

async fn extract_file_text(file: &ResumeFile) -> Result<String, IntakeError> {
    match file.content_type.as_str() {
        PDF_MIME => {
            let bytes = file.bytes.clone();
            // pdf-extract is CPU-bound and synchronous.
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| IntakeError::Pdf(e.to_string()))?
                .map_err(|e| IntakeError::Pdf(e.to_string()))
        }
        DOCX_MIME | DOC_MIME => Ok(WORD_PLACEHOLDER.to_string()),
        _ => Err(IntakeError::UnsupportedFileType),
    }
}

/// Placeholder for LinkedIn/portfolio retrieval; nothing is fetched.
pub fn fetch_profile_data(url: &str) -> String {
    format!("Fetched data from {url}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str) -> ResumeFile {
        ResumeFile::new("cv", content_type, vec![1u8, 2, 3])
    }

    #[test]
    fn test_file_takes_precedence() {
        let f = file(PDF_MIME);
        let source = ResumeSource::resolve(Some(&f), Some("https://linkedin.com/in/a"), None).unwrap();
        assert_eq!(source.kind(), SourceKind::Resume);
    }

    #[test]
    fn test_linkedin_before_portfolio() {
        let source =
            ResumeSource::resolve(None, Some("https://linkedin.com/in/a"), Some("https://a.dev")).unwrap();
        assert_eq!(source.kind(), SourceKind::Linkedin);
        let source = ResumeSource::resolve(None, None, Some("https://a.dev")).unwrap();
        assert_eq!(source.kind(), SourceKind::Portfolio);
    }

    #[test]
    fn test_no_source_is_an_error() {
        let err = ResumeSource::resolve(None, None, None).unwrap_err();
        assert_eq!(err.to_string(), "No resume or profile URL provided");
    }

    #[tokio::test]
    async fn test_word_documents_return_placeholder() {
        for mime in [DOCX_MIME, DOC_MIME] {
            let f = file(mime);
            let text = ResumeSource::File(&f).extract_text().await.unwrap();
            assert_eq!(text, WORD_PLACEHOLDER);
        }
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected() {
        let f = file("image/png");
        let err = ResumeSource::File(&f).extract_text().await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type");
    }

    #[tokio::test]
    async fn test_profile_urls_return_placeholder() {
        let text = ResumeSource::Portfolio("https://a.dev").extract_text().await.unwrap();
        assert_eq!(text, "Fetched data from https://a.dev");
    }

    #[tokio::test]
    async fn test_garbage_pdf_fails_to_parse() {
        let f = file(PDF_MIME);
        let err = ResumeSource::File(&f).extract_text().await.unwrap_err();
        assert!(matches!(err, IntakeError::Pdf(_)));
    }
}
