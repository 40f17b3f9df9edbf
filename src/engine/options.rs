//! Detection thresholds.
//!
//! Every tolerance and band the engine uses lives here so it can be tuned
//! against a reference set without touching the classification code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options controlling heading inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    /// Font sizes within this many points of a cluster's largest size
    /// belong to that cluster
    pub size_tolerance: f32,

    /// Font sizes are rounded to this step before counting
    pub histogram_precision: f32,

    /// Fraction of the page height, from the top, where a title may start
    pub title_band: f32,

    /// Fraction of the page height, from the bottom, treated as footer
    pub bottom_margin_band: f32,

    /// Longer text is prose, not a heading
    pub max_heading_chars: usize,

    /// Gap above a heading, in multiples of the body size, that counts as
    /// significant whitespace
    pub whitespace_factor: f32,

    /// Share of capitalized words for text to count as Title Case
    pub title_case_ratio: f32,

    /// Page height used when the extractor did not report one
    pub default_page_height: f32,
}

impl DetectionOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size clustering tolerance.
    pub fn with_size_tolerance(mut self, points: f32) -> Self {
        self.size_tolerance = points;
        self
    }

    /// Set the histogram rounding step.
    pub fn with_histogram_precision(mut self, points: f32) -> Self {
        self.histogram_precision = points;
        self
    }

    /// Set the title band.
    pub fn with_title_band(mut self, fraction: f32) -> Self {
        self.title_band = fraction;
        self
    }

    /// Set the bottom margin band.
    pub fn with_bottom_margin_band(mut self, fraction: f32) -> Self {
        self.bottom_margin_band = fraction;
        self
    }

    /// Set the heading length cap.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Set the whitespace-above factor.
    pub fn with_whitespace_factor(mut self, factor: f32) -> Self {
        self.whitespace_factor = factor;
        self
    }

    /// Set the Title Case ratio.
    pub fn with_title_case_ratio(mut self, ratio: f32) -> Self {
        self.title_case_ratio = ratio;
        self
    }

    /// Set the fallback page height.
    pub fn with_default_page_height(mut self, points: f32) -> Self {
        self.default_page_height = points;
        self
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.size_tolerance.is_finite() || self.size_tolerance < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "size_tolerance must be >= 0, got {}",
                self.size_tolerance
            )));
        }
        if !self.histogram_precision.is_finite() || self.histogram_precision <= 0.0 {
            return Err(Error::InvalidOptions(format!(
                "histogram_precision must be > 0, got {}",
                self.histogram_precision
            )));
        }
        for (name, value) in [
            ("title_band", self.title_band),
            ("bottom_margin_band", self.bottom_margin_band),
            ("title_case_ratio", self.title_case_ratio),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::InvalidOptions(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.whitespace_factor.is_finite() || self.whitespace_factor < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "whitespace_factor must be >= 0, got {}",
                self.whitespace_factor
            )));
        }
        if !self.default_page_height.is_finite() || self.default_page_height <= 0.0 {
            return Err(Error::InvalidOptions(format!(
                "default_page_height must be > 0, got {}",
                self.default_page_height
            )));
        }
        if self.max_heading_chars == 0 {
            return Err(Error::InvalidOptions(
                "max_heading_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidOptions(format!("cannot parse options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            size_tolerance: 0.5,
            histogram_precision: 0.1,
            title_band: 0.30,
            bottom_margin_band: 0.10,
            max_heading_chars: 200,
            whitespace_factor: 1.5,
            title_case_ratio: 0.6,
            default_page_height: 792.0, // US Letter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DetectionOptions::default();
        assert_eq!(options.size_tolerance, 0.5);
        assert_eq!(options.max_heading_chars, 200);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let options = DetectionOptions::new()
            .with_size_tolerance(1.0)
            .with_title_band(0.25)
            .with_bottom_margin_band(0.05)
            .with_max_heading_chars(120);

        assert_eq!(options.size_tolerance, 1.0);
        assert_eq!(options.title_band, 0.25);
        assert_eq!(options.bottom_margin_band, 0.05);
        assert_eq!(options.max_heading_chars, 120);
    }

    #[test]
    fn test_validate_rejects_bad_band() {
        let options = DetectionOptions::new().with_title_band(1.5);
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));

        let options = DetectionOptions::new().with_bottom_margin_band(f32::NAN);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_precision() {
        let options = DetectionOptions::new().with_histogram_precision(0.0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let options = DetectionOptions::from_json_str(r#"{"max_heading_chars": 80}"#).unwrap();
        assert_eq!(options.max_heading_chars, 80);
        assert_eq!(options.size_tolerance, 0.5);
    }

    #[test]
    fn test_from_json_invalid_value() {
        let result = DetectionOptions::from_json_str(r#"{"size_tolerance": -1.0}"#);
        assert!(result.is_err());
    }
}
