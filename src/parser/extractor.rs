//! Styled text extraction from page content streams.
//!
//! Walks the text operators of a page, tracking the text and line matrices,
//! font, leading and horizontal scaling, and emits one [`TextFragment`] per
//! shown string. Coordinates are converted to a top-left origin.

use std::collections::HashMap;

use crate::engine::{is_spaceless_script_char, push_joined};
use crate::error::Result;
use crate::model::{estimate_width, TextFragment};

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};

/// Share of the font size above the baseline taken as the glyph top.
const ASCENT: f32 = 0.8;
/// TJ adjustments larger than this (thousandths of an em) are word gaps.
const TJ_SPACE_THRESHOLD: f32 = 200.0;
/// Font size before any `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translated(self, tx: f32, ty: f32) -> Self {
        Self {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..self
        }
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Text state between `BT` and `ET`.
#[derive(Debug, Clone)]
struct TextState {
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_resource: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    horizontal_scale: f32,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_resource: Vec::new(),
            font_name: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            leading: 0.0,
            horizontal_scale: 1.0,
            in_text: false,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
        self.in_text = true;
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.translated(tx, ty);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn effective_size(&self) -> f32 {
        self.font_size * self.text_matrix.scale()
    }

    /// Move the pen right by `advance` unscaled text-space units.
    fn advance(&mut self, advance: f32) {
        let tx = advance * self.horizontal_scale;
        self.text_matrix = self.text_matrix.translated(tx, 0.0);
    }
}

/// Strip a subset prefix such as `ABCDEF+Helvetica-Bold`.
fn clean_font_name(base_font: &str) -> &str {
    match base_font.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => base_font,
    }
}

fn number(ops: &[PdfValue], i: usize) -> Option<f32> {
    ops.get(i).and_then(PdfValue::as_number)
}

/// Extracts styled fragments from the pages of one document.
pub struct StyleExtractor<'b, B: PdfBackend> {
    backend: &'b B,
}

impl<'b, B: PdfBackend> StyleExtractor<'b, B> {
    /// Create an extractor over `backend`.
    pub fn new(backend: &'b B) -> Self {
        Self { backend }
    }

    /// Extract the fragments of one page.
    ///
    /// `page_number` is 1-based; `page_height` converts baselines to a
    /// top-left origin.
    pub fn extract_page(
        &self,
        page_number: u32,
        page_id: PageId,
        page_height: f32,
    ) -> Result<Vec<TextFragment>> {
        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name, clean_font_name(&f.base_font).to_string()))
            .collect();
        let content = self.backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let ops = self.backend.decode_content(&content)?;
        Ok(self.walk(page_number, page_id, page_height, &fonts, &ops))
    }

    fn walk(
        &self,
        page_number: u32,
        page_id: PageId,
        page_height: f32,
        fonts: &HashMap<Vec<u8>, String>,
        ops: &[ContentOp],
    ) -> Vec<TextFragment> {
        let mut fragments = Vec::new();
        let mut state = TextState::default();

        for op in ops {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "BT" => state.begin_text(),
                "ET" => state.in_text = false,
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = operands.first() {
                        state.font_name = fonts
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned());
                        state.font_resource = name.clone();
                    }
                    if let Some(size) = number(operands, 1) {
                        state.font_size = size;
                    }
                }
                "Tm" => {
                    if operands.len() >= 6 {
                        state.set_matrix(Matrix {
                            a: number(operands, 0).unwrap_or(1.0),
                            b: number(operands, 1).unwrap_or(0.0),
                            c: number(operands, 2).unwrap_or(0.0),
                            d: number(operands, 3).unwrap_or(1.0),
                            e: number(operands, 4).unwrap_or(0.0),
                            f: number(operands, 5).unwrap_or(0.0),
                        });
                    }
                }
                "Td" | "TD" => {
                    let tx = number(operands, 0).unwrap_or(0.0);
                    let ty = number(operands, 1).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "TL" => {
                    if let Some(leading) = number(operands, 0) {
                        state.leading = leading;
                    }
                }
                "Tz" => {
                    if let Some(scale) = number(operands, 0) {
                        state.horizontal_scale = scale / 100.0;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "'" | "\"" => {
                    if op.operator != "Tj" {
                        state.next_line();
                    }
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = operands.get(index) {
                        let text = self.decode(page_id, &state, bytes);
                        let advance = estimate_width(&text, state.font_size);
                        self.emit(&mut fragments, &state, text, page_number, page_height);
                        state.advance(advance);
                    }
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = operands.first() {
                        let (text, advance) = self.decode_array(page_id, &state, items);
                        self.emit(&mut fragments, &state, text, page_number, page_height);
                        state.advance(advance);
                    }
                }
                _ => {}
            }
        }

        fragments
    }

    fn decode(&self, page_id: PageId, state: &TextState, bytes: &[u8]) -> String {
        self.backend
            .decode_text(page_id, &state.font_resource, bytes)
    }

    /// Decode a TJ array. Large negative adjustments become word spaces.
    /// Returns the text and the pen advance in unscaled text space.
    fn decode_array(&self, page_id: PageId, state: &TextState, items: &[PdfValue]) -> (String, f32) {
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let piece = self.decode(page_id, state, bytes);
                    advance += estimate_width(&piece, state.font_size);
                    text.push_str(&piece);
                }
                other => {
                    let Some(adjustment) = other.as_number().map(|n| -n) else {
                        continue;
                    };
                    advance += adjustment / 1000.0 * state.font_size;
                    if adjustment > TJ_SPACE_THRESHOLD
                        && text
                            .chars()
                            .last()
                            .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c))
                    {
                        text.push(' ');
                    }
                }
            }
        }
        (text, advance)
    }

    fn emit(
        &self,
        fragments: &mut Vec<TextFragment>,
        state: &TextState,
        text: String,
        page_number: u32,
        page_height: f32,
    ) {
        if !state.in_text {
            return;
        }
        let mut trimmed = String::new();
        push_joined(&mut trimmed, &text);
        if trimmed.is_empty() {
            return;
        }

        let size = state.effective_size();
        if !(size.is_finite() && size > 0.0) {
            log::trace!("skipping text with font size {} on page {}", size, page_number);
            return;
        }
        let x = state.text_matrix.e;
        let baseline = state.text_matrix.f;
        let width = estimate_width(&trimmed, size) * state.horizontal_scale.abs();
        let y = page_height - (baseline + ASCENT * size);

        fragments.push(
            TextFragment::new(trimmed, size, page_number)
                .with_font(state.font_name.clone())
                .at(x, y)
                .with_extent(width, size),
        );
    }
}
