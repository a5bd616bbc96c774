use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Upload size ceiling applied when no explicit limit is configured.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Document formats the resume parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Pdf, DocumentFormat::Docx];

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Detects the format from the file name, falling back to the declared
    /// content type when the name carries no known extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let by_extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .and_then(|ext| Self::ALL.into_iter().find(|f| f.extension() == ext));

        by_extension.or_else(|| {
            let declared = content_type?.split(';').next()?.trim().to_ascii_lowercase();
            Self::ALL.into_iter().find(|f| f.mime_type() == declared)
        })
    }
}

/// A file picked by the user, held in memory until it is handed to the parser.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }
}

/// Why an upload was refused before reaching the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("no file was chosen")]
    NoFile,

    #[error("`{file_name}` is not a PDF or DOCX document")]
    UnsupportedType { file_name: String },

    #[error("`{file_name}` is empty")]
    Empty { file_name: String },

    #[error("`{file_name}` is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },
}

/// Client-side checks applied before any parse call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConstraints {
    pub allowed: Vec<DocumentFormat>,
    pub max_bytes: usize,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            allowed: DocumentFormat::ALL.to_vec(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadConstraints {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Value for an `<input type="file" accept=…>` attribute.
    pub fn accept_attribute(&self) -> String {
        self.allowed
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn check(&self, file: Option<&UploadedFile>) -> Result<DocumentFormat, UploadRejection> {
        let file = file.ok_or(UploadRejection::NoFile)?;

        let format = DocumentFormat::detect(&file.file_name, file.content_type.as_deref())
            .filter(|f| self.allowed.contains(f))
            .ok_or_else(|| UploadRejection::UnsupportedType {
                file_name: file.file_name.clone(),
            })?;

        if file.bytes.is_empty() {
            return Err(UploadRejection::Empty {
                file_name: file.file_name.clone(),
            });
        }
        if file.bytes.len() > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                file_name: file.file_name.clone(),
                size: file.bytes.len(),
                limit: self.max_bytes,
            });
        }

        Ok(format)
    }
}
