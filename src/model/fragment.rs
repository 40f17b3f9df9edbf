//! Styled text fragments and the per-document input to the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One contiguous run of styled text on a page.
///
/// Coordinates use a top-left origin: `y` grows downwards, so a smaller `y`
/// is nearer the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
    /// Page number (1-indexed)
    pub page: u32,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width of the run
    pub width: f32,
    /// Height of the run
    pub height: f32,
}

impl TextFragment {
    /// Create a fragment at the top-left corner of `page`.
    ///
    /// Height defaults to the font size and width to an estimate from the
    /// character count; use [`at`](Self::at) and [`with_extent`](Self::with_extent)
    /// to place it.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        let text = text.into();
        let width = estimate_width(&text, font_size);
        Self {
            text,
            font_size,
            font_name: String::new(),
            bold: false,
            italic: false,
            page,
            x: 0.0,
            y: 0.0,
            width,
            height: font_size,
        }
    }

    /// Set the top-left position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set width and height.
    pub fn with_extent(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the font name, deriving bold/italic flags from it.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        let lower = self.font_name.to_lowercase();
        self.bold = ["bold", "black", "heavy"].iter().any(|k| lower.contains(k));
        self.italic = ["italic", "oblique"].iter().any(|k| lower.contains(k));
        self
    }

    /// Mark the fragment bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Mark the fragment italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// True when the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check the fragment against the extractor contract.
    ///
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize, page_count: u32) -> Result<()> {
        if self.page == 0 {
            return Err(Error::contract(index, "page numbers are 1-based, got 0"));
        }
        if self.page > page_count {
            return Err(Error::contract(
                index,
                format!("page {} exceeds page count {}", self.page, page_count),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(Error::contract(
                index,
                format!("font size must be positive, got {}", self.font_size),
            ));
        }
        for (name, value) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_finite() {
                return Err(Error::contract(index, format!("{} is not finite", name)));
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(Error::contract(index, "negative extent"));
        }
        Ok(())
    }
}

/// Rough advance width: half an em per character.
pub(crate) fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// Everything the engine needs to know about one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFragments {
    /// Styled fragments in extraction order
    pub fragments: Vec<TextFragment>,
    /// Total number of pages
    pub page_count: u32,
    /// Source file name, echoed in the outline metadata
    pub source_file: String,
    /// Known page heights in points, keyed by page number
    #[serde(default)]
    pub page_heights: BTreeMap<u32, f32>,
}

impl DocumentFragments {
    /// Create an empty document.
    pub fn new(source_file: impl Into<String>, page_count: u32) -> Self {
        Self {
            fragments: Vec::new(),
            page_count,
            source_file: source_file.into(),
            page_heights: BTreeMap::new(),
        }
    }

    /// Add a fragment.
    pub fn push(&mut self, fragment: TextFragment) {
        self.fragments.push(fragment);
    }

    /// Add a fragment, builder style.
    pub fn with_fragment(mut self, fragment: TextFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Record the height of a page.
    pub fn with_page_height(mut self, page: u32, height: f32) -> Self {
        self.page_heights.insert(page, height);
        self
    }

    /// Set the same height for every page.
    pub fn with_uniform_page_height(mut self, height: f32) -> Self {
        for page in 1..=self.page_count {
            self.page_heights.insert(page, height);
        }
        self
    }

    /// Check whether there are no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Validate every fragment and page height.
    pub fn validate(&self) -> Result<()> {
        for (index, fragment) in self.fragments.iter().enumerate() {
            fragment.validate(index, self.page_count)?;
        }
        for (page, height) in &self.page_heights {
            if !height.is_finite() || *height <= 0.0 {
                return Err(Error::Other(format!(
                    "page {} has invalid height {}",
                    page, height
                )));
            }
        }
        Ok(())
    }
}

/// Page heights resolved for one run.
///
/// Pages without a recorded height fall back to the default height, grown
/// to fit the lowest fragment on that page.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    heights: BTreeMap<u32, f32>,
    default_height: f32,
}

impl PageGeometry {
    /// Resolve heights for every page that has fragments.
    pub fn resolve(doc: &DocumentFragments, default_height: f32) -> Self {
        let mut heights = doc.page_heights.clone();
        for fragment in &doc.fragments {
            if doc.page_heights.contains_key(&fragment.page) {
                continue;
            }
            let entry = heights.entry(fragment.page).or_insert(default_height);
            *entry = entry.max(fragment.bottom());
        }
        Self {
            heights,
            default_height,
        }
    }

    /// Uniform geometry, mostly for tests.
    pub fn uniform(height: f32) -> Self {
        Self {
            heights: BTreeMap::new(),
            default_height: height,
        }
    }

    /// Height of `page`.
    pub fn height(&self, page: u32) -> f32 {
        self.heights
            .get(&page)
            .copied()
            .unwrap_or(self.default_height)
    }
}
