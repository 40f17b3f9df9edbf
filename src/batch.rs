//! Directory batch processing.
//!
//! Every PDF in an input directory gets a `<stem>.json` in the output
//! directory: the outline, or a failure record when the document could not
//! be processed. Documents are independent and run in parallel with rayon.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::detect::has_pdf_extension;
use crate::engine::{DetectionOptions, OutlineEngine};
use crate::error::Result;
use crate::model::Outline;
use crate::parser::{ParseOptions, PdfParser};
use crate::render::{failure_json, to_json, to_json_with_error, JsonFormat};

/// Error note for documents without extractable text.
pub const NO_TEXT_ERROR: &str = "No text content found in PDF";

/// PDF files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn discover_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        log::warn!("input directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// How one document ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Outline written
    Outlined { title: String, headings: usize },
    /// No text to analyze; empty outline written
    NoText,
    /// Processing failed; failure record written
    Failed(String),
}

/// Result for one input file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Input PDF
    pub source: PathBuf,
    /// JSON file written
    pub output: PathBuf,
    /// Status
    pub status: FileStatus,
}

impl FileOutcome {
    /// Check if an outline was produced.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Outlined { .. })
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Outcomes in discovery order
    pub outcomes: Vec<FileOutcome>,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of files processed.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Files with an outline.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Files without text.
    pub fn no_text(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == FileStatus::NoText)
            .count()
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Failed(_)))
            .count()
    }
}

enum Processed {
    Outline(Outline),
    NoText { page_count: u32 },
}

type ProgressFn = Arc<dyn Fn(&FileOutcome) + Send + Sync>;

/// Processes every PDF of a directory.
#[derive(Clone)]
pub struct BatchProcessor {
    detection: DetectionOptions,
    parse: ParseOptions,
    format: JsonFormat,
    parallel: bool,
    progress: Option<ProgressFn>,
}

impl BatchProcessor {
    /// Create a processor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set detection options.
    pub fn with_detection(mut self, options: DetectionOptions) -> Self {
        self.detection = options;
        self
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set the JSON format of the written files.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Process one document at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Call `f` after each document, from the worker that processed it.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileOutcome) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(f));
        self
    }

    /// Process every PDF in `input`, writing JSON files to `output`.
    pub fn process_directory<P, Q>(&self, input: P, output: Q) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let start = Instant::now();
        let engine = OutlineEngine::new(self.detection.clone())?;
        let output = output.as_ref();
        fs::create_dir_all(output)?;

        let files = discover_pdfs(input)?;
        log::info!("processing {} PDF files", files.len());

        let outcomes: Vec<FileOutcome> = if self.parallel {
            files
                .par_iter()
                .map(|path| self.run_one(&engine, path, output))
                .collect()
        } else {
            files
                .iter()
                .map(|path| self.run_one(&engine, path, output))
                .collect()
        };

        let report = BatchReport {
            outcomes,
            elapsed: start.elapsed(),
        };
        log::info!(
            "batch finished in {:.2?}: {} outlined, {} without text, {} failed",
            report.elapsed,
            report.succeeded(),
            report.no_text(),
            report.failed()
        );
        Ok(report)
    }

    /// Process one PDF, writing `<stem>.json` to `output_dir`.
    pub fn process_file<P, Q>(&self, pdf: P, output_dir: Q) -> Result<FileOutcome>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let engine = OutlineEngine::new(self.detection.clone())?;
        fs::create_dir_all(output_dir.as_ref())?;
        Ok(self.run_one(&engine, pdf.as_ref(), output_dir.as_ref()))
    }

    fn run_one(&self, engine: &OutlineEngine, path: &Path, output_dir: &Path) -> FileOutcome {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let source_file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = output_dir.join(format!("{}.json", stem));

        let (json, status) = match self.outline(engine, path) {
            Ok(Processed::Outline(outline)) => {
                let status = FileStatus::Outlined {
                    title: outline.title().to_string(),
                    headings: outline.headings().len(),
                };
                (to_json(&outline, self.format), status)
            }
            Ok(Processed::NoText { page_count }) => {
                let outline = Outline::empty(page_count, source_file.clone());
                (
                    to_json_with_error(&outline, NO_TEXT_ERROR, self.format),
                    FileStatus::NoText,
                )
            }
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                let message = format!("Failed to process PDF: {}", e);
                (
                    failure_json(&source_file, &message, self.format),
                    FileStatus::Failed(message),
                )
            }
        };

        let status = match json.and_then(|json| Ok(fs::write(&output, json)?)) {
            Ok(()) => status,
            Err(e) => {
                log::warn!("cannot write {}: {}", output.display(), e);
                FileStatus::Failed(format!("cannot write {}: {}", output.display(), e))
            }
        };

        let outcome = FileOutcome {
            source: path.to_path_buf(),
            output,
            status,
        };
        if let Some(progress) = &self.progress {
            progress(&outcome);
        }
        outcome
    }

    fn outline(&self, engine: &OutlineEngine, path: &Path) -> Result<Processed> {
        let parser = PdfParser::open_with_options(path, self.parse.clone())?;
        let document = parser.extract()?;
        if document.fragments.iter().all(|f| f.is_blank()) {
            return Ok(Processed::NoText {
                page_count: document.page_count,
            });
        }
        engine.run(&document).map(Processed::Outline)
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self {
            detection: DetectionOptions::default(),
            parse: ParseOptions::default(),
            format: JsonFormat::default(),
            parallel: true,
            progress: None,
        }
    }
}

impl fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("detection", &self.detection)
            .field("parse", &self.parse)
            .field("format", &self.format)
            .field("parallel", &self.parallel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discover_pdfs_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = discover_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_discover_missing_directory() {
        assert!(discover_pdfs("/nonexistent/input").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pdf_writes_failure_record() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        fs::write(input.path().join("broken.pdf"), b"%PDF-1.4\ngarbage").unwrap();

        let report = BatchProcessor::new()
            .sequential()
            .process_directory(input.path(), output.path())
            .unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.failed(), 1);

        let json = fs::read_to_string(output.path().join("broken.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "");
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to process PDF: "));
        assert_eq!(value["metadata"]["source_file"], "broken.pdf");
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let result = BatchProcessor::new()
            .with_detection(DetectionOptions::new().with_title_band(0.0))
            .process_directory(input.path(), output.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| FileOutcome {
            source: PathBuf::from("a.pdf"),
            output: PathBuf::from("a.json"),
            status,
        };
        let report = BatchReport {
            outcomes: vec![
                outcome(FileStatus::Outlined {
                    title: "T".to_string(),
                    headings: 2,
                }),
                outcome(FileStatus::NoText),
                outcome(FileStatus::Failed("x".to_string())),
            ],
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.no_text(), 1);
        assert_eq!(report.failed(), 1);
    }
}
