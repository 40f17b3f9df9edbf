//! The inferred outline: title plus H1-H3 headings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Heading level. Only three levels are inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// All levels, outermost first.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Level for a 0-based ladder rank.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    /// 0-based ladder rank.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Label used in the JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H1" => Ok(HeadingLevel::H1),
            "H2" => Ok(HeadingLevel::H2),
            "H3" => Ok(HeadingLevel::H3),
            other => Err(Error::Other(format!("unknown heading level: {}", other))),
        }
    }
}

/// One entry of the outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading text
    pub text: String,
    /// Heading level
    pub level: HeadingLevel,
    /// Page number (1-indexed)
    pub page: u32,
    /// Top edge of the first line; reading-order key, not serialized
    #[serde(skip)]
    pub top: f32,
}

impl Heading {
    /// Create a heading.
    pub fn new(text: impl Into<String>, level: HeadingLevel, page: u32, top: f32) -> Self {
        Self {
            text: text.into(),
            level,
            page,
            top,
        }
    }
}

/// Document facts carried alongside the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineMetadata {
    /// Total number of pages
    pub page_count: u32,
    /// Source file name
    pub source_file: String,
}

/// A document outline. Built once by the assembler and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    title: String,
    headings: Vec<Heading>,
    metadata: OutlineMetadata,
}

impl Outline {
    pub(crate) fn new(title: String, headings: Vec<Heading>, metadata: OutlineMetadata) -> Self {
        Self {
            title,
            headings,
            metadata,
        }
    }

    /// Outline with no title and no headings.
    pub fn empty(page_count: u32, source_file: impl Into<String>) -> Self {
        Self::new(
            String::new(),
            Vec::new(),
            OutlineMetadata {
                page_count,
                source_file: source_file.into(),
            },
        )
    }

    /// Detected title; empty when none was found.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether a title was detected.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Headings in reading order.
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Document metadata.
    pub fn metadata(&self) -> &OutlineMetadata {
        &self.metadata
    }

    /// Headings at one level.
    pub fn headings_at(&self, level: HeadingLevel) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }

    /// Check if no heading was detected.
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}
