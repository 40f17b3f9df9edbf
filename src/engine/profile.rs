//! Font size statistics: body text size and the heading-size ladder.
//!
//! Sizes are rounded to the histogram precision and compared as integer
//! steps, so clustering never depends on float rounding.

use std::collections::BTreeMap;

use crate::model::{HeadingLevel, TextFragment};

use super::options::DetectionOptions;

/// Fragment counts per rounded font size.
#[derive(Debug, Clone)]
pub struct SizeHistogram {
    precision: f32,
    counts: BTreeMap<i64, usize>,
}

impl SizeHistogram {
    /// Create an empty histogram rounding to `precision` points.
    pub fn new(precision: f32) -> Self {
        Self {
            precision,
            counts: BTreeMap::new(),
        }
    }

    /// Rounded step for a font size.
    pub fn key(&self, size: f32) -> i64 {
        (size / self.precision).round() as i64
    }

    /// Font size for a step.
    pub fn size_of(&self, key: i64) -> f32 {
        key as f32 * self.precision
    }

    /// Count one fragment of `size`.
    pub fn add(&mut self, size: f32) {
        let key = self.key(size);
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Forget one fragment of `size`.
    pub fn remove(&mut self, size: f32) {
        let key = self.key(size);
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    /// Number of fragments counted at `size`.
    pub fn count(&self, size: f32) -> usize {
        self.counts.get(&self.key(size)).copied().unwrap_or(0)
    }

    /// Number of distinct rounded sizes.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Check if nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Step with the highest count; the smaller size wins a tie.
    pub fn mode_key(&self) -> Option<i64> {
        let mut best: Option<(i64, usize)> = None;
        // Ascending iteration: a later key only wins with a strictly higher count.
        for (&key, &count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((key, count)),
            }
        }
        best.map(|(key, _)| key)
    }

    /// `(size, count)` pairs, smallest size first.
    pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
        self.counts
            .iter()
            .map(move |(&key, &count)| (self.size_of(key), count))
    }
}

/// A group of font sizes treated as one heading level.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeCluster {
    largest: i64,
    smallest: i64,
    precision: f32,
    /// Fragments counted in this cluster
    pub fragments: usize,
}

impl SizeCluster {
    /// Largest size in the cluster; the ladder's representative size.
    pub fn size(&self) -> f32 {
        self.largest as f32 * self.precision
    }

    /// Smallest size in the cluster.
    pub fn smallest_size(&self) -> f32 {
        self.smallest as f32 * self.precision
    }

    fn contains_key(&self, key: i64) -> bool {
        key >= self.smallest && key <= self.largest
    }
}

/// Size clusters above body text, largest first, mapped to H1-H3.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSizeLadder {
    clusters: Vec<SizeCluster>,
    precision: f32,
}

impl FontSizeLadder {
    /// Only the three largest clusters become heading levels.
    pub const MAX_LEVELS: usize = 3;

    /// A ladder with no levels.
    pub fn empty(precision: f32) -> Self {
        Self {
            clusters: Vec::new(),
            precision,
        }
    }

    /// Cluster the sizes in `histogram` that exceed `body_key` by more than
    /// `tolerance_steps`.
    pub fn build(histogram: &SizeHistogram, body_key: i64, tolerance_steps: i64) -> Self {
        let mut clusters: Vec<SizeCluster> = Vec::new();

        for (&key, &count) in histogram.counts.iter().rev() {
            if key - body_key <= tolerance_steps {
                break;
            }
            match clusters.last_mut() {
                Some(cluster) if cluster.largest - key <= tolerance_steps => {
                    cluster.smallest = key;
                    cluster.fragments += count;
                }
                _ => {
                    if clusters.len() == Self::MAX_LEVELS {
                        break;
                    }
                    clusters.push(SizeCluster {
                        largest: key,
                        smallest: key,
                        precision: histogram.precision,
                        fragments: count,
                    });
                }
            }
        }

        Self {
            clusters,
            precision: histogram.precision,
        }
    }

    /// Heading level for a font size, if it falls in a cluster.
    pub fn level_of(&self, font_size: f32) -> Option<HeadingLevel> {
        let key = (font_size / self.precision).round() as i64;
        self.clusters
            .iter()
            .position(|c| c.contains_key(key))
            .and_then(HeadingLevel::from_rank)
    }

    /// Representative size per level, largest first.
    pub fn sizes(&self) -> Vec<f32> {
        self.clusters.iter().map(SizeCluster::size).collect()
    }

    /// The clusters, largest first.
    pub fn clusters(&self) -> &[SizeCluster] {
        &self.clusters
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Check if there are no levels.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Result of profiling one document.
#[derive(Debug, Clone)]
pub struct FontProfile {
    histogram: SizeHistogram,
    body_key: Option<i64>,
    tolerance_steps: i64,
    degenerate: bool,
    ladder: FontSizeLadder,
}

impl FontProfile {
    /// Body text size; 0 when the document has no text.
    pub fn body_size(&self) -> f32 {
        self.body_key
            .map(|k| self.histogram.size_of(k))
            .unwrap_or(0.0)
    }

    /// The heading ladder.
    pub fn ladder(&self) -> &FontSizeLadder {
        &self.ladder
    }

    /// The size histogram.
    pub fn histogram(&self) -> &SizeHistogram {
        &self.histogram
    }

    /// Fewer than two distinct sizes in the whole document.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether `size` stands out from body text by more than the tolerance.
    pub fn exceeds_body(&self, size: f32) -> bool {
        match self.body_key {
            Some(body) => self.histogram.key(size) - body > self.tolerance_steps,
            None => false,
        }
    }

    /// Whether two sizes fall within the clustering tolerance of each other.
    pub fn same_size(&self, a: f32, b: f32) -> bool {
        (self.histogram.key(a) - self.histogram.key(b)).abs() <= self.tolerance_steps
    }

    /// Drop fragments from the histogram and rebuild the ladder.
    ///
    /// Body size and degeneracy stay those of the whole document.
    pub fn without<'a, I>(mut self, removed: I) -> Self
    where
        I: IntoIterator<Item = &'a TextFragment>,
    {
        for fragment in removed {
            self.histogram.remove(fragment.font_size);
        }
        self.ladder = self.build_ladder();
        self
    }

    fn build_ladder(&self) -> FontSizeLadder {
        match self.body_key {
            Some(body) if !self.degenerate => {
                FontSizeLadder::build(&self.histogram, body, self.tolerance_steps)
            }
            _ => FontSizeLadder::empty(self.histogram.precision),
        }
    }
}

/// Builds a [`FontProfile`] from a document's fragments.
#[derive(Debug, Clone, Copy)]
pub struct FontProfiler<'o> {
    options: &'o DetectionOptions,
}

impl<'o> FontProfiler<'o> {
    /// Create a profiler.
    pub fn new(options: &'o DetectionOptions) -> Self {
        Self { options }
    }

    /// Profile the given fragments. Blank fragments are ignored.
    pub fn profile<'a, I>(&self, fragments: I) -> FontProfile
    where
        I: IntoIterator<Item = &'a TextFragment>,
    {
        let precision = self.options.histogram_precision;
        let mut histogram = SizeHistogram::new(precision);
        for fragment in fragments {
            if !fragment.is_blank() {
                histogram.add(fragment.font_size);
            }
        }

        let tolerance_steps = (self.options.size_tolerance / precision).round() as i64;
        let mut profile = FontProfile {
            body_key: histogram.mode_key(),
            degenerate: histogram.distinct() < 2,
            tolerance_steps,
            ladder: FontSizeLadder::empty(precision),
            histogram,
        };
        profile.ladder = profile.build_ladder();

        log::debug!(
            "font profile: body={:.1}pt, {} distinct sizes, ladder={:?}",
            profile.body_size(),
            profile.histogram.distinct(),
            profile.ladder.sizes()
        );
        profile
    }
}
