//! Heading candidate classification.
//!
//! Every fragment whose size falls in the ladder becomes a
//! [`HeadingCandidate`]. The [`RuleSet`] then runs each [`HeadingRule`] in
//! order: rules either add a confidence [`Signal`] or reject the candidate,
//! and the first rejection is the verdict.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{HeadingLevel, PageGeometry, TextFragment};

use super::merge::reading_order;
use super::options::DetectionOptions;
use super::profile::FontProfile;
use super::text::{is_all_caps, is_title_case};

/// Evidence that raises a candidate's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Rendered in a bold face
    Bold,
    /// Preceded by a large vertical gap, or first on its page
    WhitespaceAbove,
    /// Most words capitalized
    TitleCase,
    /// Every cased letter upper case
    AllCaps,
}

impl Signal {
    fn weight(self) -> f32 {
        match self {
            Signal::Bold => 0.25,
            Signal::WhitespaceAbove => 0.15,
            Signal::TitleCase | Signal::AllCaps => 0.2,
        }
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Regular weight while bold text of the same level exists
    NotBold,
    /// Starts in the footer band
    BottomMargin,
    /// Longer than the heading length cap
    TooLong { chars: usize, max: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotBold => write!(f, "not bold while bold text shares its level"),
            RejectReason::BottomMargin => write!(f, "in the bottom margin"),
            RejectReason::TooLong { chars, max } => {
                write!(f, "{} characters exceeds {}", chars, max)
            }
        }
    }
}

/// Classification result for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

/// A fragment whose size maps to a heading level.
#[derive(Debug, Clone)]
pub struct HeadingCandidate<'a> {
    /// The fragment
    pub fragment: &'a TextFragment,
    /// Index of the fragment in the document
    pub index: usize,
    /// Level given by the ladder
    pub level: HeadingLevel,
    /// Gap to the previous line on the page; `None` when first on the page
    pub gap_above: Option<f32>,
    /// Signals raised by the rules
    pub signals: Vec<Signal>,
    /// Final verdict
    pub verdict: Verdict,
}

impl HeadingCandidate<'_> {
    /// Base confidence of any candidate the ladder matched.
    pub const BASE_CONFIDENCE: f32 = 0.4;

    /// Check if the candidate was accepted.
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }

    /// Confidence in `[0, 1]` from the signals raised.
    pub fn confidence(&self) -> f32 {
        let score: f32 = self.signals.iter().map(|s| s.weight()).sum();
        (Self::BASE_CONFIDENCE + score).min(1.0)
    }
}

/// Document-wide facts available to every rule.
#[derive(Debug, Clone)]
pub struct RuleContext<'c> {
    pub options: &'c DetectionOptions,
    pub geometry: &'c PageGeometry,
    pub body_size: f32,
    /// Levels that have at least one bold fragment in the pool
    pub bold_levels: BTreeSet<HeadingLevel>,
}

/// What a rule concluded about a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Nothing to add
    Pass,
    /// Raise confidence
    Signal(Signal),
    /// Disqualify
    Reject(RejectReason),
}

/// A single heading heuristic.
pub trait HeadingRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Judge one candidate.
    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome;
}

/// Regular-weight text loses to bold text at the same level.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoldnessRule;

impl HeadingRule for BoldnessRule {
    fn name(&self) -> &'static str {
        "boldness"
    }

    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome {
        if candidate.fragment.bold {
            RuleOutcome::Signal(Signal::Bold)
        } else if ctx.bold_levels.contains(&candidate.level) {
            RuleOutcome::Reject(RejectReason::NotBold)
        } else {
            RuleOutcome::Pass
        }
    }
}

/// A wide gap above the fragment suggests a section break.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceRule;

impl HeadingRule for WhitespaceRule {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome {
        match candidate.gap_above {
            None => RuleOutcome::Signal(Signal::WhitespaceAbove),
            Some(gap) if gap > ctx.options.whitespace_factor * ctx.body_size => {
                RuleOutcome::Signal(Signal::WhitespaceAbove)
            }
            Some(_) => RuleOutcome::Pass,
        }
    }
}

/// Headings are usually Title Case or ALL CAPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizationRule;

impl HeadingRule for CapitalizationRule {
    fn name(&self) -> &'static str {
        "capitalization"
    }

    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome {
        let text = &candidate.fragment.text;
        if is_all_caps(text) {
            RuleOutcome::Signal(Signal::AllCaps)
        } else if is_title_case(text, ctx.options.title_case_ratio) {
            RuleOutcome::Signal(Signal::TitleCase)
        } else {
            log::debug!(
                "lower-case heading candidate on page {}: {:?}",
                candidate.fragment.page,
                text
            );
            RuleOutcome::Pass
        }
    }
}

/// Footers and page numbers sit in the bottom band.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomMarginRule;

impl HeadingRule for BottomMarginRule {
    fn name(&self) -> &'static str {
        "bottom_margin"
    }

    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome {
        let fragment = candidate.fragment;
        let height = ctx.geometry.height(fragment.page);
        if fragment.y >= height * (1.0 - ctx.options.bottom_margin_band) {
            RuleOutcome::Reject(RejectReason::BottomMargin)
        } else {
            RuleOutcome::Pass
        }
    }
}

/// Long text is prose set in a large face.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthRule;

impl HeadingRule for LengthRule {
    fn name(&self) -> &'static str {
        "length"
    }

    fn evaluate(&self, candidate: &HeadingCandidate<'_>, ctx: &RuleContext<'_>) -> RuleOutcome {
        let chars = candidate.fragment.text.trim().chars().count();
        let max = ctx.options.max_heading_chars;
        if chars > max {
            RuleOutcome::Reject(RejectReason::TooLong { chars, max })
        } else {
            RuleOutcome::Pass
        }
    }
}

/// Ordered list of rules; the first rejection wins.
#[derive(Clone)]
pub struct RuleSet {
    rules: Vec<Arc<dyn HeadingRule>>,
}

impl RuleSet {
    /// An empty rule set that accepts every candidate.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Boldness, whitespace, capitalization, bottom margin, length.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(BoldnessRule)
            .with_rule(WhitespaceRule)
            .with_rule(CapitalizationRule)
            .with_rule(BottomMarginRule)
            .with_rule(LengthRule)
    }

    /// Append a rule.
    pub fn with_rule<R: HeadingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules against `candidate`, filling in signals and verdict.
    pub fn evaluate(&self, candidate: &mut HeadingCandidate<'_>, ctx: &RuleContext<'_>) {
        for rule in &self.rules {
            match rule.evaluate(candidate, ctx) {
                RuleOutcome::Pass => {}
                RuleOutcome::Signal(signal) => candidate.signals.push(signal),
                RuleOutcome::Reject(reason) => {
                    log::trace!(
                        "rule {} rejected {:?} on page {}: {}",
                        rule.name(),
                        candidate.fragment.text,
                        candidate.fragment.page,
                        reason
                    );
                    candidate.verdict = Verdict::Rejected(reason);
                    return;
                }
            }
        }
        candidate.verdict = Verdict::Accepted;
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.names()).finish()
    }
}

/// Maps fragments to heading levels and applies the rules.
#[derive(Debug, Clone)]
pub struct HeadingClassifier<'o> {
    options: &'o DetectionOptions,
    rules: RuleSet,
}

impl<'o> HeadingClassifier<'o> {
    /// Create a classifier with the standard rules.
    pub fn new(options: &'o DetectionOptions) -> Self {
        Self::with_rules(options, RuleSet::standard())
    }

    /// Create a classifier with custom rules.
    pub fn with_rules(options: &'o DetectionOptions, rules: RuleSet) -> Self {
        Self { options, rules }
    }

    /// Classify the fragments at `pool` indices, in reading order.
    ///
    /// Fragments outside the pool (the title) are skipped for whitespace
    /// measurement but still count for the boldness gate: a level is bold
    /// when any non-blank fragment of its size is bold anywhere in the
    /// document.
    pub fn classify<'a>(
        &self,
        fragments: &'a [TextFragment],
        pool: &[usize],
        profile: &FontProfile,
        geometry: &PageGeometry,
    ) -> Vec<HeadingCandidate<'a>> {
        let pool: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&i| !fragments[i].is_blank())
            .collect();
        let ladder = profile.ladder();
        if ladder.is_empty() {
            return Vec::new();
        }

        let bold_levels: BTreeSet<HeadingLevel> = fragments
            .iter()
            .filter(|f| f.bold && !f.is_blank())
            .filter_map(|f| ladder.level_of(f.font_size))
            .collect();
        let ctx = RuleContext {
            options: self.options,
            geometry,
            body_size: profile.body_size(),
            bold_levels,
        };

        let refs: Vec<&TextFragment> = pool.iter().map(|&i| &fragments[i]).collect();
        let mut candidates = Vec::new();

        let mut page = 0u32;
        let mut line = usize::MAX;
        let mut line_bottom: Option<f32> = None;
        let mut previous_bottom: Option<f32> = None;

        for (pos, line_id) in reading_order(&refs) {
            let index = pool[pos];
            let fragment = &fragments[index];

            if fragment.page != page {
                page = fragment.page;
                line_bottom = None;
                previous_bottom = None;
                line = usize::MAX;
            }
            if line_id != line {
                line = line_id;
                previous_bottom = line_bottom;
                line_bottom = Some(fragment.bottom());
            } else {
                line_bottom = line_bottom.map(|b| b.max(fragment.bottom()));
            }

            let Some(level) = ladder.level_of(fragment.font_size) else {
                continue;
            };
            let mut candidate = HeadingCandidate {
                fragment,
                index,
                level,
                gap_above: previous_bottom.map(|b| fragment.y - b),
                signals: Vec::new(),
                verdict: Verdict::Accepted,
            };
            self.rules.evaluate(&mut candidate, &ctx);
            log::trace!(
                "{} candidate {:?} page {}: {:?} (confidence {:.2})",
                level,
                fragment.text,
                fragment.page,
                candidate.verdict,
                candidate.confidence()
            );
            candidates.push(candidate);
        }

        candidates
    }
}
