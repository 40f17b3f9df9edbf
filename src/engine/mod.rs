//! Heading inference engine.
//!
//! Turns the flat list of styled fragments of one document into an
//! [`Outline`]:
//!
//! 1. [`FontProfiler`] finds the body size and the heading-size ladder
//! 2. [`TitleDetector`] takes the title from the top of page 1
//! 3. [`HeadingClassifier`] maps fragments to levels and applies the rules
//! 4. [`OutlineAssembler`] merges, deduplicates and orders the headings
//!
//! The engine is synchronous and keeps no state between documents.

mod assemble;
mod classify;
mod merge;
mod options;
mod profile;
mod text;
mod title;

use std::collections::HashSet;

pub use assemble::OutlineAssembler;
pub use classify::{
    BoldnessRule, BottomMarginRule, CapitalizationRule, HeadingCandidate, HeadingClassifier,
    HeadingRule, LengthRule, RejectReason, RuleContext, RuleOutcome, RuleSet, Signal, Verdict,
    WhitespaceRule,
};
pub use options::DetectionOptions;
pub use profile::{FontProfile, FontProfiler, FontSizeLadder, SizeCluster, SizeHistogram};
pub use text::{is_all_caps, is_title_case, normalize_for_dedup};
pub use title::{TitleDetector, TitleMatch};

pub(crate) use text::{is_spaceless_script_char, push_joined};

use crate::error::Result;
use crate::model::{DocumentFragments, Outline, PageGeometry};

/// Intermediate results of one engine run.
#[derive(Debug)]
pub struct Analysis<'a> {
    /// Font profile after the title was removed from the histogram
    pub profile: FontProfile,
    /// Detected title
    pub title: Option<TitleMatch>,
    /// Every ladder-matched fragment with its verdict, in reading order
    pub candidates: Vec<HeadingCandidate<'a>>,
    /// Page heights used for the positional rules
    pub geometry: PageGeometry,
    document: &'a DocumentFragments,
    max_heading_chars: usize,
}

impl Analysis<'_> {
    /// Assemble the outline.
    pub fn outline(&self) -> Outline {
        OutlineAssembler::new()
            .with_max_heading_chars(self.max_heading_chars)
            .assemble(
                self.title.as_ref().map(|t| t.text.as_str()),
                &self.candidates,
                self.document.page_count,
                &self.document.source_file,
            )
    }

    /// Number of accepted candidates.
    pub fn accepted(&self) -> usize {
        self.candidates.iter().filter(|c| c.is_accepted()).count()
    }
}

/// Runs the full inference pipeline.
#[derive(Debug, Clone)]
pub struct OutlineEngine {
    options: DetectionOptions,
    rules: RuleSet,
}

impl OutlineEngine {
    /// Create an engine after validating `options`.
    pub fn new(options: DetectionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            rules: RuleSet::standard(),
        })
    }

    /// Replace the heading rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    /// Infer the outline of `document`.
    pub fn run(&self, document: &DocumentFragments) -> Result<Outline> {
        Ok(self.analyze(document)?.outline())
    }

    /// Run every stage and keep the intermediate results.
    pub fn analyze<'a>(&self, document: &'a DocumentFragments) -> Result<Analysis<'a>> {
        document.validate()?;
        let fragments = &document.fragments;
        if document.is_empty() {
            log::debug!("{}: no fragments", document.source_file);
        }

        let geometry = PageGeometry::resolve(document, self.options.default_page_height);
        let profile = FontProfiler::new(&self.options).profile(fragments);
        let title = TitleDetector::new(&self.options).detect(fragments, &profile, &geometry);

        let consumed: HashSet<usize> = title
            .as_ref()
            .map(|t| t.fragments.iter().copied().collect())
            .unwrap_or_default();
        let profile = profile.without(consumed.iter().map(|&i| &fragments[i]));

        let pool: Vec<usize> = (0..fragments.len())
            .filter(|i| !consumed.contains(i))
            .collect();
        let candidates = HeadingClassifier::with_rules(&self.options, self.rules.clone())
            .classify(fragments, &pool, &profile, &geometry);

        log::debug!(
            "{}: body {:.1}pt, ladder {:?}, {} candidates",
            document.source_file,
            profile.body_size(),
            profile.ladder().sizes(),
            candidates.len()
        );

        Ok(Analysis {
            profile,
            title,
            candidates,
            geometry,
            document,
            max_heading_chars: self.options.max_heading_chars,
        })
    }
}

impl Default for OutlineEngine {
    fn default() -> Self {
        Self {
            options: DetectionOptions::default(),
            rules: RuleSet::standard(),
        }
    }
}

/// Infer the outline of `document` with default options.
pub fn infer_outline(document: &DocumentFragments) -> Result<Outline> {
    OutlineEngine::default().run(document)
}
