//! Integration tests for fragment extraction from generated PDFs.

mod common;

use pdfoutline::{outline_bytes, HeadingLevel, Outliner, PdfParser};

use common::{body, build_pdf, report_pdf};

#[test]
fn test_extract_fragments_with_style() {
    let parser = PdfParser::from_bytes(&report_pdf()).unwrap();
    assert_eq!(parser.page_count(), 3);
    assert_eq!(parser.page_size(1).unwrap(), (612.0, 792.0));

    let document = parser.extract().unwrap();
    assert_eq!(document.page_count, 3);
    assert_eq!(document.page_heights.get(&2), Some(&792.0));

    let title = document
        .fragments
        .iter()
        .find(|f| f.text == "Annual Report 2024")
        .unwrap();
    assert_eq!(title.page, 1);
    assert_eq!(title.font_size, 24.0);
    assert_eq!(title.font_name, "Helvetica-Bold");
    assert!(title.bold);
    assert_eq!(title.x, 180.0);
    // top-left origin: top edge sits above the baseline
    assert!(title.y > 0.0 && title.y < 792.0 - 720.0);

    let body_lines = document
        .fragments
        .iter()
        .filter(|f| f.font_size == 11.0 && !f.bold)
        .count();
    assert_eq!(body_lines, 30);
}

#[test]
fn test_outline_from_generated_pdf() {
    let outline = outline_bytes(&report_pdf()).unwrap();
    assert_eq!(outline.title(), "Annual Report 2024");

    let headings: Vec<(&str, HeadingLevel, u32)> = outline
        .headings()
        .iter()
        .map(|h| (h.text.as_str(), h.level, h.page))
        .collect();
    assert_eq!(
        headings,
        vec![
            ("Executive Summary", HeadingLevel::H1, 2),
            ("Financial Overview", HeadingLevel::H2, 3),
        ]
    );
}

#[test]
fn test_outliner_reports_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, report_pdf()).unwrap();

    let result = Outliner::new().lenient().parse(&path).unwrap();
    assert_eq!(result.outline().metadata().source_file, "report.pdf");
    assert_eq!(result.outline().metadata().page_count, 3);
    assert!(!result.fragments.fragments.is_empty());
}

#[test]
fn test_page_without_text() {
    let pdf = build_pdf(&[body(5, 700), Vec::new()]);
    let parser = PdfParser::from_bytes(&pdf).unwrap();
    assert!(parser.extract_page(2).unwrap().is_empty());
    assert!(parser.extract_page(3).is_err());
}
