//! PDF document parser producing styled fragments.

use std::io::Read;
use std::path::Path;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{DocumentFragments, TextFragment};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::extractor::StyleExtractor;
use super::options::{ErrorMode, ParseOptions};

/// Page size used when neither the page nor its ancestors set a MediaBox.
pub const LETTER_SIZE: (f32, f32) = (612.0, 792.0);

/// PDF document parser.
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
    source_file: String,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        detect_format_from_path(path)?;

        let backend = LopdfBackend::load_file(path)?;
        let source_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::with_backend(backend, options, source_file))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options, String::new()))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn with_backend(backend: LopdfBackend, options: ParseOptions, source_file: String) -> Self {
        if backend.is_encrypted() {
            log::debug!("{}: document is encrypted", source_file);
        }
        Self {
            backend,
            options,
            source_file,
        }
    }

    /// Name reported as the outline's source file.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_file = name.into();
        self
    }

    /// Source file name; empty for in-memory documents.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// `(width, height)` of a page.
    pub fn page_size(&self, page_num: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page_num)?;
        Ok(self.size_of(page_num, page_id))
    }

    /// Extract the fragments of every page.
    ///
    /// In lenient mode a page that fails to extract is logged and skipped.
    pub fn extract(&self) -> Result<DocumentFragments> {
        let pages = self.backend.pages();
        let mut document = DocumentFragments::new(self.source_file.clone(), pages.len() as u32);
        let extractor = StyleExtractor::new(&self.backend);

        for (&page_num, &page_id) in &pages {
            let (_, height) = self.size_of(page_num, page_id);
            document = document.with_page_height(page_num, height);

            match extractor.extract_page(page_num, page_id, height) {
                Ok(fragments) => document.fragments.extend(fragments),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!(
                        "{}: skipping page {}: {}",
                        self.source_file,
                        page_num,
                        e
                    );
                }
                Err(e) => {
                    return Err(Error::TextExtract(format!("page {}: {}", page_num, e)));
                }
            }
        }

        log::debug!(
            "{}: {} fragments from {} pages",
            self.source_file,
            document.fragments.len(),
            document.page_count
        );
        Ok(document)
    }

    /// Extract the fragments of one page.
    pub fn extract_page(&self, page_num: u32) -> Result<Vec<TextFragment>> {
        let page_id = self.page_id(page_num)?;
        let (_, height) = self.size_of(page_num, page_id);
        StyleExtractor::new(&self.backend).extract_page(page_num, page_id, height)
    }

    fn page_id(&self, page_num: u32) -> Result<PageId> {
        let pages = self.backend.pages();
        pages
            .get(&page_num)
            .copied()
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))
    }

    fn size_of(&self, page_num: u32, page_id: PageId) -> (f32, f32) {
        self.backend.page_size(page_id).unwrap_or_else(|| {
            log::debug!("page {} has no MediaBox, assuming letter size", page_num);
            LETTER_SIZE
        })
    }
}
