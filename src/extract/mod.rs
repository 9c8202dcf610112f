//! Upload validation and text extraction.
//!
//! Uploads are screened against a MIME allow-list and a size cap before any text is
//! produced. Extraction itself is a seam: plain text passes through unchanged, while
//! binary formats currently yield fixed demonstration narratives so the rest of the
//! pipeline can be exercised end to end. Swapping in real OCR or PDF parsing means
//! providing another [`TextExtractor`].

use async_trait::async_trait;
use thiserror::Error;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for ingestion.
pub const ACCEPTED_MIME_TYPES: [&str; 7] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "image/jpeg",
    "image/png",
    "image/jpg",
];

/// Document handed to the server for ingestion.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Original file name, echoed into placeholder narratives and session metadata.
    pub file_name: String,
    /// Declared MIME type of the upload.
    pub mime_type: String,
    /// Raw upload content. For `text/plain` this is the document text itself.
    pub content: String,
}

/// Errors surfaced while validating or extracting an upload.
///
/// Display strings double as user-facing messages, so they stay in plain language.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Declared MIME type is not in the allow-list.
    #[error("Please upload a valid file (PDF, DOC, DOCX, TXT, JPG, PNG)")]
    UnsupportedType {
        /// The rejected MIME type, kept for logging.
        mime_type: String,
    },
    /// Upload exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File size must be less than 10MB")]
    TooLarge {
        /// Size of the rejected upload, in bytes.
        size: usize,
    },
    /// Plain-text upload contained no usable text.
    #[error("File is empty")]
    EmptyFile,
}

/// Interface implemented by text extraction backends.
///
/// Async so that real OCR or parsing services can slot in behind the same seam.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Validate the upload and produce the document text.
    async fn extract(&self, upload: &DocumentUpload) -> Result<String, ExtractError>;
}

/// Build the default extractor.
pub fn get_text_extractor() -> Box<dyn TextExtractor + Send + Sync> {
    Box::new(PlaceholderExtractor)
}

/// Extractor that passes plain text through and substitutes canned narratives for
/// binary formats.
pub struct PlaceholderExtractor;

#[async_trait]
impl TextExtractor for PlaceholderExtractor {
    async fn extract(&self, upload: &DocumentUpload) -> Result<String, ExtractError> {
        if !ACCEPTED_MIME_TYPES.contains(&upload.mime_type.as_str()) {
            return Err(ExtractError::UnsupportedType {
                mime_type: upload.mime_type.clone(),
            });
        }
        if upload.content.len() > MAX_UPLOAD_BYTES {
            return Err(ExtractError::TooLarge {
                size: upload.content.len(),
            });
        }

        if upload.mime_type == "text/plain" {
            if upload.content.trim().is_empty() {
                return Err(ExtractError::EmptyFile);
            }
            return Ok(upload.content.clone());
        }

        if upload.mime_type.starts_with("image/") {
            return Ok(image_placeholder(&upload.file_name));
        }
        if upload.mime_type == "application/pdf" {
            return Ok(pdf_placeholder(&upload.file_name));
        }
        Ok(generic_placeholder(&upload.mime_type, &upload.file_name))
    }
}

const IMAGE_SAMPLE: &str = "Sample Document Content\n\nArtificial Intelligence has revolutionized modern technology. Machine learning algorithms can now process vast amounts of data and identify patterns that humans might miss. Deep learning, a subset of machine learning, uses neural networks with multiple layers to solve complex problems.\n\nApplications of AI include natural language processing, computer vision, robotics, and autonomous vehicles. Companies worldwide are investing heavily in AI research and development. The technology continues to evolve rapidly, with new breakthroughs happening regularly.\n\nEthical considerations around AI include bias in algorithms, privacy concerns, and the impact on employment. As AI becomes more prevalent, it's crucial to develop frameworks for responsible AI development and deployment.";

const PDF_SAMPLE: &str = "Sample PDF Document\n\nCloud computing has transformed how businesses operate. Organizations can now access computing resources on-demand without maintaining physical infrastructure. Major cloud providers offer services including storage, computing power, databases, and AI tools.\n\nBenefits of cloud computing include scalability, cost efficiency, and flexibility. Companies can scale resources up or down based on demand. This pay-as-you-go model reduces capital expenses and allows businesses to focus on core operations.\n\nChallenges include data security, compliance requirements, and potential vendor lock-in. Organizations must carefully evaluate cloud providers and implement proper security measures to protect sensitive data.";

const GENERIC_SAMPLE: &str = "Sample Document\n\nCybersecurity has become increasingly important in our digital age. Organizations face constant threats from hackers, malware, and data breaches. Protecting sensitive information requires multiple layers of security including firewalls, encryption, and employee training.\n\nCommon security measures include strong password policies, two-factor authentication, regular software updates, and security audits. Companies must also develop incident response plans to quickly address security breaches when they occur.\n\nEmerging technologies like blockchain and quantum computing will impact future cybersecurity strategies. As threats evolve, security practices must adapt to protect against new vulnerabilities.";

fn image_placeholder(file_name: &str) -> String {
    format!(
        "This is a demonstration with an image file ({file_name}). In production, this would use OCR (Tesseract.js) to extract text from the image. For now, here's sample text to demonstrate the features:\n\n{IMAGE_SAMPLE}"
    )
}

fn pdf_placeholder(file_name: &str) -> String {
    format!(
        "This is a demonstration with a PDF file ({file_name}). In production, this would use pdf-parse library to extract text. For now, here's sample text:\n\n{PDF_SAMPLE}"
    )
}

fn generic_placeholder(mime_type: &str, file_name: &str) -> String {
    format!(
        "This is a demonstration with a {mime_type} file ({file_name}). In production, this would use mammoth library for DOCX files. Here's sample text:\n\n{GENERIC_SAMPLE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(mime_type: &str, content: &str) -> DocumentUpload {
        DocumentUpload {
            file_name: "report.bin".into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn rejects_unlisted_mime_type() {
        let error = PlaceholderExtractor
            .extract(&upload("application/zip", "data"))
            .await
            .expect_err("zip should be rejected");
        assert_eq!(
            error.to_string(),
            "Please upload a valid file (PDF, DOC, DOCX, TXT, JPG, PNG)"
        );
    }

    #[tokio::test]
    async fn rejects_oversized_upload() {
        let body = "x".repeat(MAX_UPLOAD_BYTES + 1);
        let error = PlaceholderExtractor
            .extract(&upload("text/plain", &body))
            .await
            .expect_err("oversized upload should be rejected");
        assert_eq!(error.to_string(), "File size must be less than 10MB");
    }

    #[tokio::test]
    async fn accepts_upload_at_exact_size_cap() {
        let body = "x".repeat(MAX_UPLOAD_BYTES);
        let text = PlaceholderExtractor
            .extract(&upload("text/plain", &body))
            .await
            .expect("cap is inclusive");
        assert_eq!(text.len(), MAX_UPLOAD_BYTES);
    }

    #[tokio::test]
    async fn rejects_whitespace_only_text() {
        let error = PlaceholderExtractor
            .extract(&upload("text/plain", "   \n\t  "))
            .await
            .expect_err("blank text should be rejected");
        assert_eq!(error, ExtractError::EmptyFile);
    }

    #[tokio::test]
    async fn passes_plain_text_through_unchanged() {
        let text = PlaceholderExtractor
            .extract(&upload("text/plain", "The quarterly report shows growth."))
            .await
            .expect("text extraction");
        assert_eq!(text, "The quarterly report shows growth.");
    }

    #[tokio::test]
    async fn pdf_upload_yields_narrative_with_file_name() {
        let text = PlaceholderExtractor
            .extract(&DocumentUpload {
                file_name: "whitepaper.pdf".into(),
                mime_type: "application/pdf".into(),
                content: String::new(),
            })
            .await
            .expect("pdf extraction");
        assert!(text.contains("(whitepaper.pdf)"));
        assert!(text.contains("Cloud computing"));
    }

    #[tokio::test]
    async fn image_upload_yields_ai_narrative() {
        let text = PlaceholderExtractor
            .extract(&DocumentUpload {
                file_name: "scan.png".into(),
                mime_type: "image/png".into(),
                content: String::new(),
            })
            .await
            .expect("image extraction");
        assert!(text.contains("an image file (scan.png)"));
        assert!(text.contains("Artificial Intelligence"));
    }

    #[tokio::test]
    async fn word_upload_falls_back_to_generic_narrative() {
        let text = PlaceholderExtractor
            .extract(&DocumentUpload {
                file_name: "notes.docx".into(),
                mime_type:
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                        .into(),
                content: String::new(),
            })
            .await
            .expect("docx extraction");
        assert!(text.contains("notes.docx"));
        assert!(text.contains("Cybersecurity"));
    }
}
