//! Integration tests for heading inference on extracted fragments.

use pdfoutline::engine::{RejectReason, Verdict};
use pdfoutline::{
    extract_outline, extract_outline_with_options, render, DetectionOptions, DocumentFragments,
    Error, HeadingLevel, JsonFormat, Outline, OutlineEngine, TextFragment,
};

const PAGE_HEIGHT: f32 = 792.0;

fn body_page(doc: &mut DocumentFragments, page: u32, from_y: f32, lines: usize) {
    for line in 0..lines {
        doc.push(
            TextFragment::new("Revenue and margins were in line with guidance.", 11.0, page)
                .with_font("Times-Roman")
                .at(72.0, from_y + line as f32 * 14.0),
        );
    }
}

fn summary(outline: &Outline) -> Vec<(&str, HeadingLevel, u32)> {
    outline
        .headings()
        .iter()
        .map(|h| (h.text.as_str(), h.level, h.page))
        .collect()
}

/// Title on page 1 and one heading per level on the following pages.
fn annual_report() -> DocumentFragments {
    let mut doc =
        DocumentFragments::new("annual_report.pdf", 3).with_uniform_page_height(PAGE_HEIGHT);
    doc.push(
        TextFragment::new("Annual Report 2024", 24.0, 1)
            .with_font("Helvetica-Bold")
            .at(190.0, 80.0),
    );
    for page in 1..=3 {
        body_page(&mut doc, page, 220.0, 12);
    }
    doc.push(
        TextFragment::new("Executive Summary", 16.0, 2)
            .with_font("Helvetica-Bold")
            .at(72.0, 160.0),
    );
    doc.push(
        TextFragment::new("Financial Overview", 13.0, 3)
            .with_font("Helvetica-Bold")
            .at(72.0, 160.0),
    );
    doc
}

#[test]
fn test_title_and_ladder_levels() {
    let outline = extract_outline(&annual_report()).unwrap();
    assert_eq!(outline.title(), "Annual Report 2024");
    assert_eq!(
        summary(&outline),
        vec![
            ("Executive Summary", HeadingLevel::H1, 2),
            ("Financial Overview", HeadingLevel::H2, 3),
        ]
    );
    assert_eq!(outline.metadata().page_count, 3);
    assert_eq!(outline.metadata().source_file, "annual_report.pdf");
}

#[test]
fn test_title_not_repeated_as_heading() {
    let outline = extract_outline(&annual_report()).unwrap();
    assert!(outline
        .headings()
        .iter()
        .all(|h| h.text != outline.title()));
}

#[test]
fn test_bottom_margin_text_excluded() {
    let mut doc = DocumentFragments::new("footer.pdf", 5).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=5 {
        body_page(&mut doc, page, 200.0, 10);
    }
    doc.push(
        TextFragment::new("Methods", 16.0, 3)
            .with_font("Helvetica-Bold")
            .at(72.0, 150.0),
    );
    // 30pt running footer in the bottom 5% of page 5
    doc.push(
        TextFragment::new("CONFIDENTIAL", 30.0, 5)
            .with_font("Helvetica-Bold")
            .at(200.0, 760.0),
    );

    let engine = OutlineEngine::default();
    let analysis = engine.analyze(&doc).unwrap();
    let footer = analysis
        .candidates
        .iter()
        .find(|c| c.fragment.text == "CONFIDENTIAL")
        .unwrap();
    assert_eq!(footer.level, HeadingLevel::H1);
    assert_eq!(footer.verdict, Verdict::Rejected(RejectReason::BottomMargin));

    let outline = analysis.outline();
    assert_eq!(summary(&outline), vec![("Methods", HeadingLevel::H2, 3)]);
}

#[test]
fn test_overlong_heading_rejected() {
    let tail: String = " long caption".repeat(20).chars().take(200).collect();
    let long_text = "A".repeat(10) + &tail;
    assert_eq!(long_text.chars().count(), 210);

    let mut doc = DocumentFragments::new("long.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 200.0, 10);
    }
    doc.push(
        TextFragment::new("Background", 16.0, 1)
            .with_font("Helvetica-Bold")
            .at(72.0, 400.0),
    );
    doc.push(
        TextFragment::new(long_text.clone(), 13.0, 2)
            .with_font("Helvetica-Bold")
            .at(72.0, 150.0),
    );

    let analysis = OutlineEngine::default().analyze(&doc).unwrap();
    let long = analysis
        .candidates
        .iter()
        .find(|c| c.fragment.text == long_text)
        .unwrap();
    assert_eq!(long.level, HeadingLevel::H2);
    assert_eq!(
        long.verdict,
        Verdict::Rejected(RejectReason::TooLong {
            chars: 210,
            max: 200
        })
    );

    let outline = analysis.outline();
    assert_eq!(summary(&outline), vec![("Background", HeadingLevel::H1, 1)]);
}

#[test]
fn test_length_cap_is_configurable() {
    let mut doc = DocumentFragments::new("long.pdf", 1).with_uniform_page_height(PAGE_HEIGHT);
    body_page(&mut doc, 1, 200.0, 10);
    doc.push(
        TextFragment::new("Results And Discussion", 16.0, 1)
            .with_font("Helvetica-Bold")
            .at(72.0, 400.0),
    );

    let outline = extract_outline_with_options(
        &doc,
        DetectionOptions::new().with_max_heading_chars(10),
    )
    .unwrap();
    assert!(outline.headings().is_empty());
}

#[test]
fn test_two_line_heading_merged() {
    let mut doc = DocumentFragments::new("book.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 220.0, 12);
    }
    doc.push(
        TextFragment::new("Chapter 1:", 18.0, 2)
            .with_font("Georgia-Bold")
            .at(72.0, 100.0)
            .with_extent(90.0, 18.0),
    );
    doc.push(
        TextFragment::new("Introduction", 18.0, 2)
            .with_font("Georgia-Bold")
            .at(72.0, 122.0)
            .with_extent(110.0, 18.0),
    );

    let outline = extract_outline(&doc).unwrap();
    assert_eq!(
        summary(&outline),
        vec![("Chapter 1: Introduction", HeadingLevel::H1, 2)]
    );
}

#[test]
fn test_overprinted_title_consumed() {
    let mut doc = DocumentFragments::new("overprint.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for _ in 0..2 {
        doc.push(
            TextFragment::new("Annual Report 2024", 24.0, 1)
                .with_font("Helvetica-Bold")
                .at(150.0, 72.0),
        );
    }
    for page in 1..=2 {
        body_page(&mut doc, page, 220.0, 12);
    }
    doc.push(
        TextFragment::new("Executive Summary", 16.0, 2)
            .with_font("Helvetica-Bold")
            .at(72.0, 160.0),
    );

    let analysis = OutlineEngine::default().analyze(&doc).unwrap();
    assert_eq!(analysis.title.as_ref().unwrap().fragments, vec![0, 1]);
    assert!(analysis.candidates.iter().all(|c| c.fragment.font_size != 24.0));

    let outline = analysis.outline();
    assert_eq!(outline.title(), "Annual Report 2024");
    assert_eq!(
        summary(&outline),
        vec![("Executive Summary", HeadingLevel::H1, 2)]
    );
}

#[test]
fn test_overprinted_line_in_wrapped_heading() {
    let mut doc = DocumentFragments::new("book.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 220.0, 12);
    }
    for _ in 0..2 {
        doc.push(
            TextFragment::new("Chapter 1:", 18.0, 2)
                .with_font("Georgia-Bold")
                .at(72.0, 100.0),
        );
    }
    doc.push(
        TextFragment::new("Introduction", 18.0, 2)
            .with_font("Georgia-Bold")
            .at(72.0, 122.0),
    );

    let outline = extract_outline(&doc).unwrap();
    assert_eq!(
        summary(&outline),
        vec![("Chapter 1: Introduction", HeadingLevel::H1, 2)]
    );
}

#[test]
fn test_merged_heading_over_length_cap_dropped() {
    let line: String = "Regional outlook ".repeat(9).chars().take(150).collect();
    let mut doc = DocumentFragments::new("wrapped.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 220.0, 12);
    }
    for y in [100.0, 118.0] {
        doc.push(
            TextFragment::new(line.clone(), 14.0, 2)
                .with_font("Helvetica-Bold")
                .at(72.0, y),
        );
    }

    let analysis = OutlineEngine::default().analyze(&doc).unwrap();
    // each line passes the cap alone
    assert_eq!(analysis.accepted(), 2);
    assert!(analysis.outline().headings().is_empty());
}

#[test]
fn test_headings_in_reading_order() {
    let mut doc = DocumentFragments::new("order.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 300.0, 10);
    }
    let heading = |text: &str, size: f32, page: u32, y: f32| {
        TextFragment::new(text, size, page)
            .with_font("Arial-BoldMT")
            .at(72.0, y)
    };
    doc.push(heading("Scope", 13.0, 2, 250.0));
    doc.push(heading("Purpose", 16.0, 2, 120.0));
    doc.push(heading("Context", 13.0, 1, 500.0));
    // below the title band, so not taken as the title
    doc.push(heading("Overview", 16.0, 1, 260.0));

    let outline = extract_outline(&doc).unwrap();
    assert_eq!(
        summary(&outline),
        vec![
            ("Overview", HeadingLevel::H1, 1),
            ("Context", HeadingLevel::H2, 1),
            ("Purpose", HeadingLevel::H1, 2),
            ("Scope", HeadingLevel::H2, 2),
        ]
    );
}

#[test]
fn test_input_order_does_not_matter() {
    let doc = annual_report();
    let mut reversed = doc.clone();
    reversed.fragments.reverse();

    let a = extract_outline(&doc).unwrap();
    let b = extract_outline(&reversed).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_json_output_is_stable() {
    let doc = annual_report();
    let first = render::to_json(&extract_outline(&doc).unwrap(), JsonFormat::Pretty).unwrap();
    let second = render::to_json(&extract_outline(&doc).unwrap(), JsonFormat::Pretty).unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["title"], "Annual Report 2024");
    assert_eq!(
        value["headings"],
        serde_json::json!([
            {"text": "Executive Summary", "level": "H1", "page": 2},
            {"text": "Financial Overview", "level": "H2", "page": 3},
        ])
    );
    assert_eq!(value["metadata"]["page_count"], 3);
}

#[test]
fn test_single_style_document() {
    let mut doc = DocumentFragments::new("plain.pdf", 2).with_uniform_page_height(PAGE_HEIGHT);
    for page in 1..=2 {
        body_page(&mut doc, page, 100.0, 20);
    }

    let outline = extract_outline(&doc).unwrap();
    assert_eq!(outline.title(), "");
    assert!(outline.headings().is_empty());
}

#[test]
fn test_empty_document() {
    let doc = DocumentFragments::new("empty.pdf", 4);
    let outline = extract_outline(&doc).unwrap();
    assert!(outline.is_empty());
    assert_eq!(outline.metadata().page_count, 4);
}

#[test]
fn test_fragment_on_missing_page_rejected() {
    let doc = DocumentFragments::new("bad.pdf", 1)
        .with_fragment(TextFragment::new("ok", 11.0, 1).at(72.0, 100.0))
        .with_fragment(TextFragment::new("ghost", 11.0, 3).at(72.0, 100.0));

    let err = extract_outline(&doc).unwrap_err();
    assert!(matches!(err, Error::ContractViolation { index: 1, .. }));
}

#[test]
fn test_explain_confidence() {
    let doc = annual_report();
    let analysis = OutlineEngine::default().analyze(&doc).unwrap();
    assert_eq!(analysis.accepted(), 2);
    for candidate in &analysis.candidates {
        // bold, first on its page, title case
        assert!((candidate.confidence() - 1.0).abs() < 1e-6);
    }
    assert_eq!(analysis.title.as_ref().unwrap().font_size, 24.0);
}
