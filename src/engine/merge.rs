//! Reading order and joining of fragments that belong to one logical line.
//!
//! Titles and headings are often rendered as several runs: words set by
//! separate show-text operators, or a long heading wrapped onto a second
//! line. [`FragmentRun`] decides geometrically whether the next fragment
//! continues the run; callers check font size or level themselves.
//! Overprinted copies (the same text drawn twice at one spot, a common way
//! to fake bold) are absorbed without repeating their text.

use std::cmp::Ordering;

use crate::model::TextFragment;

use super::text::{normalize_for_dedup, push_joined};

/// Baselines within this share of the font size are on the same line.
const SAME_LINE_TOLERANCE: f32 = 0.3;
/// Largest horizontal gap between runs on one line, in font sizes.
const MAX_WORD_GAP: f32 = 1.5;
/// Gaps wider than this share of the font size separate words.
const SPACE_GAP: f32 = 0.15;
/// Largest blank space between wrapped lines, in font sizes.
const MAX_LINE_GAP: f32 = 0.8;
/// Lines may overlap a little when heights are estimated.
const MAX_LINE_OVERLAP: f32 = 0.3;
/// Left edges or centers within this share of the font size are aligned.
const ALIGN_TOLERANCE: f32 = 0.5;
/// Copies of a fragment offset by at most this share of the font size are
/// the same glyphs drawn twice.
const OVERPRINT_TOLERANCE: f32 = 0.3;

fn cmp_position(a: &TextFragment, b: &TextFragment) -> Ordering {
    a.page
        .cmp(&b.page)
        .then(a.y.total_cmp(&b.y))
        .then(a.x.total_cmp(&b.x))
}

/// Sort fragments into reading order.
///
/// Returns `(position in items, line id)` pairs: top-to-bottom lines, and
/// left-to-right within a line. Line ids increase through the document.
pub fn reading_order(items: &[&TextFragment]) -> Vec<(usize, usize)> {
    let mut by_position: Vec<usize> = (0..items.len()).collect();
    by_position.sort_by(|&a, &b| cmp_position(items[a], items[b]).then(a.cmp(&b)));

    let mut lines = vec![0usize; items.len()];
    let mut line_id = 0usize;
    let mut anchor: Option<&TextFragment> = None;
    for &pos in &by_position {
        let fragment = items[pos];
        if let Some(first) = anchor {
            if !same_line(first, fragment) {
                line_id += 1;
                anchor = Some(fragment);
            }
        } else {
            anchor = Some(fragment);
        }
        lines[pos] = line_id;
    }

    let mut ordered: Vec<(usize, usize)> = by_position.iter().map(|&p| (p, lines[p])).collect();
    ordered.sort_by(|&(a, line_a), &(b, line_b)| {
        line_a
            .cmp(&line_b)
            .then(items[a].x.total_cmp(&items[b].x))
            .then(a.cmp(&b))
    });
    ordered
}

fn same_line(a: &TextFragment, b: &TextFragment) -> bool {
    a.page == b.page && (a.y - b.y).abs() <= a.font_size.max(b.font_size) * SAME_LINE_TOLERANCE
}

/// A run of fragments read as one piece of text.
#[derive(Debug, Clone)]
pub struct FragmentRun<'a> {
    fragments: Vec<&'a TextFragment>,
    line_start: usize,
    text: String,
}

impl<'a> FragmentRun<'a> {
    /// Start a run.
    pub fn start(fragment: &'a TextFragment) -> Self {
        let mut text = String::new();
        push_joined(&mut text, &fragment.text);
        Self {
            fragments: vec![fragment],
            line_start: 0,
            text,
        }
    }

    /// Append `next` if it continues the current line or starts the next
    /// line of the same block. An overprinted copy of a fragment already in
    /// the run is absorbed without adding text. Returns whether `next` now
    /// belongs to the run.
    pub fn try_extend(&mut self, next: &'a TextFragment) -> bool {
        let last = self.last();
        if next.page != last.page {
            return false;
        }
        if self.overprints(next) {
            return true;
        }
        let size = last.font_size.max(next.font_size);

        if same_line(last, next) {
            let gap = next.x - last.right();
            if next.x <= last.x || gap > size * MAX_WORD_GAP {
                return false;
            }
            let spaced = gap > size * SPACE_GAP
                || last.text.ends_with(char::is_whitespace)
                || next.text.starts_with(char::is_whitespace);
            self.append(next, spaced);
            return true;
        }

        if !self.starts_next_line(next, size) {
            return false;
        }
        self.line_start = self.fragments.len();
        self.append(next, true);
        true
    }

    /// Whether `next` repeats a fragment of the run at the same spot.
    pub fn overprints(&self, next: &TextFragment) -> bool {
        let key = normalize_for_dedup(&next.text);
        self.fragments.iter().any(|f| {
            let tolerance = f.font_size.max(next.font_size) * OVERPRINT_TOLERANCE;
            f.page == next.page
                && (f.x - next.x).abs() <= tolerance
                && (f.y - next.y).abs() <= tolerance
                && normalize_for_dedup(&f.text) == key
        })
    }

    fn starts_next_line(&self, next: &TextFragment, size: f32) -> bool {
        let line = &self.fragments[self.line_start..];
        let line_top = line.iter().map(|f| f.y).fold(f32::INFINITY, f32::min);
        let line_bottom = line.iter().map(|f| f.bottom()).fold(f32::NEG_INFINITY, f32::max);
        if next.y <= line_top {
            return false;
        }
        let gap = next.y - line_bottom;
        if gap < -size * MAX_LINE_OVERLAP || gap > size * MAX_LINE_GAP {
            return false;
        }

        let left = line.iter().map(|f| f.x).fold(f32::INFINITY, f32::min);
        let right = line.iter().map(|f| f.right()).fold(f32::NEG_INFINITY, f32::max);
        let tolerance = size * ALIGN_TOLERANCE;
        let left_aligned = (next.x - left).abs() <= tolerance;
        let centered = (next.center_x() - (left + right) / 2.0).abs() <= tolerance;
        left_aligned || centered
    }

    fn append(&mut self, next: &'a TextFragment, spaced: bool) {
        if spaced {
            push_joined(&mut self.text, &next.text);
        } else {
            // Continuation of a word split across runs.
            self.text.push_str(next.text.trim());
        }
        self.fragments.push(next);
    }

    fn last(&self) -> &'a TextFragment {
        self.fragments[self.fragments.len() - 1]
    }

    /// First fragment of the run.
    pub fn first(&self) -> &'a TextFragment {
        self.fragments[0]
    }

    /// Fragments in the run, in reading order. Overprinted copies are not
    /// listed.
    #[cfg(test)]
    pub fn fragments(&self) -> &[&'a TextFragment] {
        &self.fragments
    }

    /// Joined text.
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the run, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Top edge of the run.
    pub fn top(&self) -> f32 {
        self.first().y
    }
}
