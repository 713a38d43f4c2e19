use std::path::Path;

/// A product document picked up from the documents directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub content_type: ContentType,
    pub size_bytes: u64,
}

impl Document {
    pub fn new(filename: String, content_type: ContentType, size_bytes: u64) -> Self {
        Self {
            filename,
            content_type,
            size_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Pdf,
    Text,
}

impl ContentType {
    /// Matches the file-name suffix, case-sensitively: `REPORT.PDF` is not a
    /// document, a file named just `.txt` is.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if name.ends_with(".txt") {
            Some(Self::Text)
        } else {
            None
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
        }
    }
}
