//! Title detection on the first page.

use crate::model::{PageGeometry, TextFragment};

use super::merge::{reading_order, FragmentRun};
use super::options::DetectionOptions;
use super::profile::FontProfile;

/// The detected title and the fragments it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    /// Joined title text
    pub text: String,
    /// Indices of the consumed fragments in the document
    pub fragments: Vec<usize>,
    /// Font size of the title
    pub font_size: f32,
    /// Top edge of the title on page 1
    pub top: f32,
}

/// Picks the title from the largest text near the top of page 1.
#[derive(Debug, Clone, Copy)]
pub struct TitleDetector<'o> {
    options: &'o DetectionOptions,
}

impl<'o> TitleDetector<'o> {
    /// Create a detector.
    pub fn new(options: &'o DetectionOptions) -> Self {
        Self { options }
    }

    /// Find the title among `fragments`.
    ///
    /// Returns `None` when page 1 has no text larger than body text, or when
    /// its largest text starts below the title band.
    pub fn detect(
        &self,
        fragments: &[TextFragment],
        profile: &FontProfile,
        geometry: &PageGeometry,
    ) -> Option<TitleMatch> {
        let first_page: Vec<usize> = fragments
            .iter()
            .enumerate()
            .filter(|(_, f)| f.page == 1 && !f.is_blank())
            .map(|(i, _)| i)
            .collect();

        let max_size = first_page
            .iter()
            .map(|&i| fragments[i].font_size)
            .fold(f32::NEG_INFINITY, f32::max);
        if first_page.is_empty() || !profile.exceeds_body(max_size) {
            log::debug!(
                "no title: largest page-1 size {:.1}pt does not exceed body {:.1}pt",
                max_size,
                profile.body_size()
            );
            return None;
        }

        let band = geometry.height(1) * self.options.title_band;
        let candidates: Vec<usize> = first_page
            .into_iter()
            .filter(|&i| {
                let f = &fragments[i];
                profile.same_size(f.font_size, max_size) && f.y < band
            })
            .collect();
        if candidates.is_empty() {
            log::debug!("no title: {:.1}pt text lies below the title band", max_size);
            return None;
        }

        let refs: Vec<&TextFragment> = candidates.iter().map(|&i| &fragments[i]).collect();
        let mut order = reading_order(&refs).into_iter().map(|(pos, _)| candidates[pos]);

        let first = order.next()?;
        let mut run = FragmentRun::start(&fragments[first]);
        let mut consumed = vec![first];
        for index in order {
            if run.try_extend(&fragments[index]) {
                consumed.push(index);
            }
        }

        let top = run.top();
        let text = run.into_text();
        if text.is_empty() {
            return None;
        }
        log::debug!("title: {:?} ({} fragments, {:.1}pt)", text, consumed.len(), max_size);
        consumed.sort_unstable();
        Some(TitleMatch {
            text,
            fragments: consumed,
            font_size: max_size,
            top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::profile::FontProfiler;

    fn detect(fragments: &[TextFragment]) -> Option<TitleMatch> {
        let options = DetectionOptions::default();
        let profile = FontProfiler::new(&options).profile(fragments);
        TitleDetector::new(&options).detect(fragments, &profile, &PageGeometry::uniform(792.0))
    }

    fn body(page: u32, y: f32) -> TextFragment {
        TextFragment::new("Body text of the document.", 11.0, page).at(72.0, y)
    }

    #[test]
    fn test_largest_top_text_is_title() {
        let fragments = vec![
            TextFragment::new("Annual Report 2024", 24.0, 1).at(150.0, 80.0).bold(),
            body(1, 200.0),
            body(1, 220.0),
        ];
        let title = detect(&fragments).unwrap();
        assert_eq!(title.text, "Annual Report 2024");
        assert_eq!(title.fragments, vec![0]);
    }

    #[test]
    fn test_topmost_wins_among_equal_sizes() {
        let fragments = vec![
            body(1, 300.0),
            TextFragment::new("Second Block", 24.0, 1).at(72.0, 200.0),
            TextFragment::new("First Block", 24.0, 1).at(72.0, 90.0),
            body(1, 320.0),
        ];
        let title = detect(&fragments).unwrap();
        assert_eq!(title.text, "First Block");
        assert_eq!(title.fragments, vec![2]);
    }

    #[test]
    fn test_two_line_title_merges() {
        let fragments = vec![
            TextFragment::new("Understanding Heading", 22.0, 1).at(100.0, 80.0),
            TextFragment::new("Inference", 22.0, 1).at(100.0, 106.0),
            body(1, 200.0),
            body(1, 215.0),
        ];
        let title = detect(&fragments).unwrap();
        assert_eq!(title.text, "Understanding Heading Inference");
        assert_eq!(title.fragments, vec![0, 1]);
    }

    #[test]
    fn test_title_must_be_in_top_band() {
        let fragments = vec![
            body(1, 60.0),
            TextFragment::new("Low Banner", 24.0, 1).at(72.0, 500.0),
            body(1, 80.0),
        ];
        assert!(detect(&fragments).is_none());
    }

    #[test]
    fn test_no_title_without_larger_text() {
        let fragments = vec![body(1, 60.0), body(1, 80.0), body(2, 60.0)];
        assert!(detect(&fragments).is_none());
    }

    #[test]
    fn test_title_only_from_first_page() {
        let fragments = vec![
            body(1, 60.0),
            body(1, 80.0),
            TextFragment::new("Chapter Heading", 24.0, 2).at(72.0, 60.0),
        ];
        assert!(detect(&fragments).is_none());
    }

    #[test]
    fn test_title_text_preserved_verbatim() {
        let fragments = vec![
            TextFragment::new("  iOS  Release NOTES ", 20.0, 1).at(72.0, 50.0),
            body(1, 120.0),
            body(1, 140.0),
        ];
        assert_eq!(detect(&fragments).unwrap().text, "iOS  Release NOTES");
    }
}
