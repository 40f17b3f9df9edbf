//! Final outline assembly: merging, deduplication, ordering.

use std::collections::HashSet;

use crate::model::{Heading, HeadingLevel, Outline, OutlineMetadata, TextFragment};

use super::classify::HeadingCandidate;
use super::merge::{reading_order, FragmentRun};
use super::options::DetectionOptions;
use super::text::normalize_for_dedup;

/// Builds the [`Outline`] from the title and classified candidates.
#[derive(Debug, Clone, Copy)]
pub struct OutlineAssembler {
    max_heading_chars: usize,
}

impl Default for OutlineAssembler {
    fn default() -> Self {
        Self {
            max_heading_chars: DetectionOptions::default().max_heading_chars,
        }
    }
}

impl OutlineAssembler {
    /// Create an assembler with the default length cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop merged headings longer than `chars` characters.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Assemble the outline. Rejected candidates are ignored, and so are
    /// merged headings that exceed the length cap even though each of
    /// their fragments passed it alone.
    pub fn assemble(
        &self,
        title: Option<&str>,
        candidates: &[HeadingCandidate<'_>],
        page_count: u32,
        source_file: &str,
    ) -> Outline {
        let accepted: Vec<&HeadingCandidate<'_>> =
            candidates.iter().filter(|c| c.is_accepted()).collect();
        let refs: Vec<&TextFragment> = accepted.iter().map(|c| c.fragment).collect();

        let mut runs: Vec<(HeadingLevel, FragmentRun<'_>)> = Vec::new();
        for (pos, _) in reading_order(&refs) {
            let candidate = accepted[pos];
            if let Some((level, run)) = runs.last_mut() {
                if *level == candidate.level && run.try_extend(candidate.fragment) {
                    continue;
                }
            }
            runs.push((candidate.level, FragmentRun::start(candidate.fragment)));
        }

        let mut seen: HashSet<(String, HeadingLevel, u32)> = HashSet::new();
        let mut headings: Vec<Heading> = Vec::with_capacity(runs.len());
        for (level, run) in runs {
            let page = run.first().page;
            let top = run.top();
            let text = run.into_text();
            if text.is_empty() {
                continue;
            }
            let chars = text.chars().count();
            if chars > self.max_heading_chars {
                log::trace!("dropping merged {} on page {}: {} chars", level, page, chars);
                continue;
            }
            if !seen.insert((normalize_for_dedup(&text), level, page)) {
                log::trace!("dropping duplicate {} {:?} on page {}", level, text, page);
                continue;
            }
            headings.push(Heading::new(text, level, page, top));
        }
        headings.sort_by(|a, b| a.page.cmp(&b.page).then(a.top.total_cmp(&b.top)));

        Outline::new(
            title.unwrap_or_default().to_string(),
            headings,
            OutlineMetadata {
                page_count,
                source_file: source_file.to_string(),
            },
        )
    }
}
