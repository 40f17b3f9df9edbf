//! PDF fixtures shared by the integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One line of text: font resource, size, x, baseline, text.
pub type Line = (&'static str, i64, i64, i64, &'static str);

fn text_ops(lines: &[Line]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for &(font, size, x, baseline, text) in lines {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Integer(x), Object::Integer(baseline)],
        ));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Build a PDF with one page per entry of `pages`, using Helvetica as F1
/// and Helvetica-Bold as F2.
pub fn build_pdf(pages: &[Vec<Line>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let content = Content {
            operations: text_ops(lines),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn body(page_lines: usize, from_baseline: i64) -> Vec<Line> {
    (0..page_lines as i64)
        .map(|i| {
            (
                "F1",
                11,
                72,
                from_baseline - i * 14,
                "The committee reviewed the quarterly figures.",
            )
        })
        .collect()
}

pub fn report_pdf() -> Vec<u8> {
    let mut page1 = vec![("F2", 24, 180, 720, "Annual Report 2024")];
    page1.extend(body(10, 600));
    let mut page2 = vec![("F2", 16, 72, 700, "Executive Summary")];
    page2.extend(body(10, 600));
    let mut page3 = vec![("F2", 13, 72, 700, "Financial Overview")];
    page3.extend(body(10, 600));
    build_pdf(&[page1, page2, page3])
}
