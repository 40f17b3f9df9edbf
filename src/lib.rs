//! # pdfoutline
//!
//! Infer a PDF's title and H1-H3 heading outline from its typography.
//!
//! Most PDFs carry no usable structure tags: headings are just larger or
//! bolder text. This library extracts styled text fragments from each page
//! and ranks font sizes against the body text to recover the outline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{outline_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = outline_file("report.pdf")?;
//!     println!("{}", outline.title());
//!     for heading in outline.headings() {
//!         println!("{} {} (p.{})", heading.level, heading.text, heading.page);
//!     }
//!
//!     let json = render::to_json(&outline, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`parser`]: styled fragments from page content streams
//! - [`engine`]: body size, heading ladder, title, heading rules, assembly
//! - [`render`]: JSON output
//! - [`batch`]: whole directories, in parallel
//!
//! The engine also runs on fragments from any other extractor; see
//! [`extract_outline`].

pub mod batch;
pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{discover_pdfs, BatchProcessor, BatchReport, FileOutcome, FileStatus};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use engine::{DetectionOptions, OutlineEngine};
pub use error::{Error, Result};
pub use model::{
    DocumentFragments, Heading, HeadingLevel, Outline, OutlineMetadata, TextFragment,
};
pub use parser::{ErrorMode, ParseOptions, PdfParser};
pub use render::JsonFormat;

use std::io::Read;
use std::path::Path;

/// Infer the outline of already extracted fragments.
///
/// # Example
///
/// ```
/// use pdfoutline::{extract_outline, DocumentFragments, TextFragment};
///
/// let doc = DocumentFragments::new("memo.pdf", 1)
///     .with_fragment(TextFragment::new("Quarterly Memo", 24.0, 1).at(72.0, 60.0).bold())
///     .with_fragment(TextFragment::new("Sales grew.", 11.0, 1).at(72.0, 200.0))
///     .with_fragment(TextFragment::new("Costs fell.", 11.0, 1).at(72.0, 214.0));
///
/// let outline = extract_outline(&doc).unwrap();
/// assert_eq!(outline.title(), "Quarterly Memo");
/// ```
pub fn extract_outline(document: &DocumentFragments) -> Result<Outline> {
    engine::infer_outline(document)
}

/// Infer the outline of extracted fragments with custom options.
pub fn extract_outline_with_options(
    document: &DocumentFragments,
    options: DetectionOptions,
) -> Result<Outline> {
    OutlineEngine::new(options)?.run(document)
}

/// Extract the outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_file;
///
/// let outline = outline_file("document.pdf").unwrap();
/// println!("Headings: {}", outline.headings().len());
/// ```
pub fn outline_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    Outliner::new().parse(path).map(OutlineResult::into_outline)
}

/// Extract the outline of a PDF held in memory.
pub fn outline_bytes(data: &[u8]) -> Result<Outline> {
    Outliner::new().parse_bytes(data).map(OutlineResult::into_outline)
}

/// Extract the outline of a PDF read from `reader`.
pub fn outline_reader<R: Read>(reader: R) -> Result<Outline> {
    let parser = PdfParser::from_reader(reader)?;
    OutlineEngine::default().run(&parser.extract()?)
}

/// Builder for outline extraction with options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{DetectionOptions, Outliner};
///
/// let json = Outliner::new()
///     .lenient()
///     .with_detection(DetectionOptions::new().with_max_heading_chars(120))
///     .parse("document.pdf")?
///     .to_json(pdfoutline::JsonFormat::Compact)?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Outliner {
    parse_options: ParseOptions,
    detection: DetectionOptions,
}

impl Outliner {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip pages that fail to extract instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Set detection options.
    pub fn with_detection(mut self, options: DetectionOptions) -> Self {
        self.detection = options;
        self
    }

    /// Extract the outline of a PDF file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<OutlineResult> {
        let engine = OutlineEngine::new(self.detection)?;
        let parser = PdfParser::open_with_options(path, self.parse_options)?;
        OutlineResult::build(&engine, parser.extract()?)
    }

    /// Extract the outline of a PDF held in memory.
    pub fn parse_bytes(self, data: &[u8]) -> Result<OutlineResult> {
        let engine = OutlineEngine::new(self.detection)?;
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options)?;
        OutlineResult::build(&engine, parser.extract()?)
    }
}

/// Fragments and outline of one document.
#[derive(Debug, Clone)]
pub struct OutlineResult {
    /// Extracted fragments
    pub fragments: DocumentFragments,
    outline: Outline,
}

impl OutlineResult {
    fn build(engine: &OutlineEngine, fragments: DocumentFragments) -> Result<Self> {
        let outline = engine.run(&fragments)?;
        Ok(Self { fragments, outline })
    }

    /// The outline.
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Consume the result, keeping the outline.
    pub fn into_outline(self) -> Outline {
        self.outline
    }

    /// Outline as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.outline, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outliner_builder() {
        let outliner = Outliner::new()
            .lenient()
            .with_detection(DetectionOptions::new().with_size_tolerance(1.0));
        assert_eq!(outliner.parse_options.error_mode, ErrorMode::Lenient);
        assert_eq!(outliner.detection.size_tolerance, 1.0);
    }

    #[test]
    fn test_outline_bytes_empty_data() {
        assert!(outline_bytes(&[]).is_err());
    }

    #[test]
    fn test_outline_bytes_invalid_data() {
        assert!(outline_bytes(b"This is not a PDF file").is_err());
    }

    #[test]
    fn test_outline_file_nonexistent() {
        assert!(outline_file("/nonexistent/path/file.pdf").is_err());
    }

    #[test]
    fn test_outline_reader_invalid() {
        let cursor = std::io::Cursor::new(b"%PDF-1.7 truncated".to_vec());
        assert!(outline_reader(cursor).is_err());
    }

    #[test]
    fn test_invalid_detection_options() {
        let result = Outliner::new()
            .with_detection(DetectionOptions::new().with_histogram_precision(-1.0))
            .parse_bytes(b"%PDF-1.4");
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_extract_outline_with_options() {
        let doc = DocumentFragments::new("a.pdf", 1)
            .with_fragment(TextFragment::new("Overview", 14.0, 1).at(72.0, 300.0).bold())
            .with_fragment(TextFragment::new("body", 11.0, 1).at(72.0, 100.0))
            .with_fragment(TextFragment::new("body", 11.0, 1).at(72.0, 114.0));
        let strict = DetectionOptions::new().with_max_heading_chars(4);
        let outline = extract_outline_with_options(&doc, strict).unwrap();
        assert!(outline.headings().is_empty());
    }
}
