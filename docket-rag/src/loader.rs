//! Document loading: raw PDF/DOCX files into page-level text segments.
//!
//! Sources may be local paths or `http(s)` URLs. Parsing is CPU-bound and
//! runs under [`tokio::task::spawn_blocking`] so it never stalls the async
//! runtime.

use std::io::{Cursor, Read};
use std::path::Path;

use async_trait::async_trait;
use docket_core::DocumentType;
use tracing::debug;

use crate::document::PageSegment;
use crate::error::{RagError, Result};

/// Converts a raw file into an ordered sequence of [`PageSegment`]s.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load a file of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::FileNotFound`] if a local path does not exist
    /// and [`RagError::Load`] if the file cannot be fetched or parsed.
    async fn load(&self, path: &Path, document_type: DocumentType) -> Result<Vec<PageSegment>>;
}

/// The default loader for PDF and DOCX sources, local or remote.
///
/// PDF pages map one-to-one onto segments, preserving the parser's page
/// boundaries; whitespace-only pages are skipped. DOCX has no native page
/// boundaries, so the whole document becomes a single segment.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader {
    client: reqwest::Client,
}

impl FileDocumentLoader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the raw bytes from a local path or an `http(s)` URL.
    async fn read_source(&self, path: &Path) -> Result<Vec<u8>> {
        if let Some(url) = as_url(path) {
            let response = self.client.get(url).send().await.map_err(|e| RagError::Load {
                format: "remote",
                message: format!("fetch failed: {e}"),
            })?;
            if !response.status().is_success() {
                return Err(RagError::Load {
                    format: "remote",
                    message: format!("fetch returned {}", response.status()),
                });
            }
            let bytes = response.bytes().await.map_err(|e| RagError::Load {
                format: "remote",
                message: format!("fetch failed: {e}"),
            })?;
            return Ok(bytes.to_vec());
        }

        if tokio::fs::metadata(path).await.is_err() {
            return Err(RagError::FileNotFound(path.to_path_buf()));
        }
        tokio::fs::read(path)
            .await
            .map_err(|e| RagError::Load { format: "file", message: e.to_string() })
    }
}

/// Treat the path as a URL when it carries an http(s) scheme.
fn as_url(path: &Path) -> Option<&str> {
    path.to_str().filter(|s| s.starts_with("http://") || s.starts_with("https://"))
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self, path: &Path, document_type: DocumentType) -> Result<Vec<PageSegment>> {
        let bytes = self.read_source(path).await?;

        let owned = path.to_path_buf();
        let segments = match document_type {
            DocumentType::Pdf => {
                tokio::task::spawn_blocking(move || load_pdf_pages(&bytes, &owned))
                    .await
                    .map_err(|e| RagError::Load { format: "pdf", message: e.to_string() })??
            }
            DocumentType::Docx => {
                tokio::task::spawn_blocking(move || load_docx(&bytes, &owned))
                    .await
                    .map_err(|e| RagError::Load { format: "docx", message: e.to_string() })??
            }
        };

        debug!(
            path = %path.display(),
            document_type = %document_type,
            segment_count = segments.len(),
            "loaded document"
        );
        Ok(segments)
    }
}

/// Extract one segment per PDF page, in page order.
fn load_pdf_pages(bytes: &[u8], path: &Path) -> Result<Vec<PageSegment>> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| RagError::Load { format: "pdf", message: e.to_string() })?;

    let source_path = path.display().to_string();
    let mut segments = Vec::new();

    // get_pages returns a BTreeMap, so iteration follows page order.
    for (page_number, _) in doc.get_pages() {
        let text = doc
            .extract_text(&[page_number])
            .map_err(|e| RagError::Load {
                format: "pdf",
                message: format!("page {page_number}: {e}"),
            })?;
        if text.trim().is_empty() {
            continue;
        }
        segments.push(PageSegment { text, page_number, source_path: source_path.clone() });
    }

    Ok(segments)
}

/// Extract the whole DOCX body as a single segment.
///
/// A `.docx` file is a zip archive; the text lives in `word/document.xml`.
/// Paragraph ends become newlines so downstream chunking sees prose shape.
fn load_docx(bytes: &[u8], path: &Path) -> Result<Vec<PageSegment>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| RagError::Load { format: "docx", message: e.to_string() })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| RagError::Load {
            format: "docx",
            message: format!("missing word/document.xml: {e}"),
        })?
        .read_to_string(&mut xml)
        .map_err(|e| RagError::Load { format: "docx", message: e.to_string() })?;

    let text = docx_xml_to_text(&xml)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![PageSegment {
        text,
        page_number: 1,
        source_path: path.display().to_string(),
    }])
}

/// Pull plain text out of a `word/document.xml` payload.
fn docx_xml_to_text(xml: &str) -> Result<String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    // Drop inter-element formatting whitespace.
    reader.config_mut().trim_text(true);
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let unescaped = t.unescape().map_err(|e| RagError::Load {
                    format: "docx",
                    message: e.to_string(),
                })?;
                text.push_str(&unescaped);
            }
            // Paragraph and line-break elements become newlines.
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => text.push('\n'),
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => text.push('\n'),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(RagError::Load { format: "docx", message: e.to_string() });
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Write a PDF with one page per entry in `page_texts`.
    fn write_pdf(path: &Path, page_texts: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn pdf_pages_map_to_segments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_pages.pdf");
        write_pdf(&path, &["alpha page text", "beta page text"]);

        let loader = FileDocumentLoader::new();
        let segments = loader.load(&path, DocumentType::Pdf).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].page_number, 1);
        assert!(segments[0].text.contains("alpha page text"));
        assert_eq!(segments[1].page_number, 2);
        assert!(segments[1].text.contains("beta page text"));
        assert_eq!(segments[0].source_path, path.display().to_string());
    }

    #[tokio::test]
    async fn garbage_bytes_fail_as_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        tokio::fs::write(&path, b"not a pdf at all").await.unwrap();

        let loader = FileDocumentLoader::new();
        let err = loader.load(&path, DocumentType::Pdf).await.unwrap_err();
        assert!(matches!(err, RagError::Load { format: "pdf", .. }));
    }

    #[tokio::test]
    async fn missing_file_fails_with_file_not_found() {
        let loader = FileDocumentLoader::new();
        let err = loader
            .load(Path::new("/nonexistent/report.pdf"), DocumentType::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::FileNotFound(_)));
    }

    #[test]
    fn docx_xml_paragraphs_become_newlines() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second &amp; third.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = docx_xml_to_text(xml).unwrap();
        assert_eq!(text, "First paragraph.\nSecond & third.\n");
    }

    #[test]
    fn docx_xml_line_breaks_become_newlines() {
        let xml = "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
<w:body><w:p><w:r><w:t>line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p></w:body></w:document>";
        let text = docx_xml_to_text(xml).unwrap();
        assert_eq!(text, "line one\nline two\n");
    }
}
