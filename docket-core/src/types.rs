//! Shared document types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The document formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Portable Document Format; loaded page by page.
    Pdf,
    /// Office Open XML word-processing document; loaded as a single segment.
    Docx,
}

impl DocumentType {
    /// The canonical lowercase name ("pdf" or "docx").
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentType::Pdf),
            "docx" => Ok(DocumentType::Docx),
            other => Err(CoreError::InvalidArgument(format!(
                "unsupported document type: '{other}' (expected 'pdf' or 'docx')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!("pdf".parse::<DocumentType>().unwrap(), DocumentType::Pdf);
        assert_eq!("DOCX".parse::<DocumentType>().unwrap(), DocumentType::Docx);
    }

    #[test]
    fn rejects_unknown_types() {
        let err = "odt".parse::<DocumentType>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&DocumentType::Pdf).unwrap(), "\"pdf\"");
        let parsed: DocumentType = serde_json::from_str("\"docx\"").unwrap();
        assert_eq!(parsed, DocumentType::Docx);
    }
}
