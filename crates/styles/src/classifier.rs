//! Cross-sectional tercile classification.

use std::collections::BTreeMap;

use carhart_math::percentile;
use carhart_primitives::{Classification, CrossSection, LabelSet, Panel, Symbol, Tercile};
use carhart_traits::{MetricInputs, SortMetric};
use tracing::{debug, warn};

use crate::StyleError;

/// Configuration for tercile classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TercileConfig {
    /// Percentile of the lower cut point.
    pub low_percentile: f64,
    /// Percentile of the upper cut point.
    pub high_percentile: f64,
    /// Minimum number of present values for a date to be classified.
    pub min_observations: usize,
}

impl Default for TercileConfig {
    fn default() -> Self {
        Self { low_percentile: 0.3, high_percentile: 0.7, min_observations: 3 }
    }
}

impl TercileConfig {
    /// Check that the cut points are ordered percentiles.
    ///
    /// # Errors
    /// Returns `StyleError::InvalidConfig` describing the first violation.
    pub fn validate(&self) -> Result<(), StyleError> {
        let in_range = |p: f64| (0.0..=1.0).contains(&p);
        if !in_range(self.low_percentile) || !in_range(self.high_percentile) {
            return Err(StyleError::InvalidConfig(format!(
                "percentiles must lie in [0, 1], got {} and {}",
                self.low_percentile, self.high_percentile
            )));
        }
        if self.low_percentile >= self.high_percentile {
            return Err(StyleError::InvalidConfig(format!(
                "low percentile {} must be below high percentile {}",
                self.low_percentile, self.high_percentile
            )));
        }
        if self.min_observations == 0 {
            return Err(StyleError::InvalidConfig("min_observations must be positive".into()));
        }
        Ok(())
    }
}

/// Splits each date's cross-section into three buckets at two percentiles of
/// a metric.
///
/// One implementation serves every metric; what is ranked comes from a
/// [`SortMetric`] and how the buckets are named from its [`LabelSet`].
#[derive(Debug, Clone, Default)]
pub struct TercileClassifier {
    config: TercileConfig,
}

impl TercileClassifier {
    /// Create a classifier with 30th/70th percentile cut points.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom configuration.
    #[must_use]
    pub const fn with_config(config: TercileConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &TercileConfig {
        &self.config
    }

    /// Lower and upper cut points of `values`.
    ///
    /// # Errors
    /// Returns `StyleError::Math` if the values are empty or a percentile is
    /// out of range.
    pub fn cut_points(&self, values: &[f64]) -> Result<(f64, f64), StyleError> {
        let low = percentile(values, self.config.low_percentile)?;
        let high = percentile(values, self.config.high_percentile)?;
        Ok((low, high))
    }

    /// Classify one date's cross-section.
    ///
    /// Returns `Ok(None)` when fewer than `min_observations` values are
    /// present. Otherwise every instrument with a value gets exactly one
    /// bucket: `value <= low` is low, `value >= high` is high, anything else
    /// is middle.
    ///
    /// # Errors
    /// Returns `StyleError::Math` if the configured percentiles are invalid.
    pub fn classify_cross_section(
        &self,
        metric: &CrossSection,
    ) -> Result<Option<BTreeMap<Symbol, Tercile>>, StyleError> {
        if metric.len() < self.config.min_observations {
            return Ok(None);
        }
        let (low, high) = self.cut_points(&metric.values())?;
        let buckets = metric
            .iter()
            .map(|(symbol, value)| {
                let tercile = if value <= low {
                    Tercile::Low
                } else if value >= high {
                    Tercile::High
                } else {
                    Tercile::Middle
                };
                (symbol.clone(), tercile)
            })
            .collect();
        Ok(Some(buckets))
    }

    /// Classify every date of a metric panel.
    ///
    /// # Errors
    /// Returns `StyleError` if the configuration is invalid.
    pub fn classify_panel(
        &self,
        values: &Panel,
        labels: LabelSet,
    ) -> Result<Classification, StyleError> {
        self.config.validate()?;
        let mut classification = Classification::new(labels);
        for (date, xs) in values.iter() {
            match self.classify_cross_section(xs)? {
                Some(buckets) => classification.insert(date, buckets),
                None => {
                    warn!(%date, present = xs.len(), "too few values to classify date");
                    classification.mark_undefined(date);
                }
            }
        }
        Ok(classification)
    }

    /// Evaluate `metric` on `inputs` and classify every return date.
    ///
    /// Return dates on which the metric is entirely absent are recorded as
    /// undefined alongside dates with too few values.
    ///
    /// # Errors
    /// Returns `StyleError` if the configuration is invalid.
    pub fn classify(
        &self,
        metric: &dyn SortMetric,
        inputs: &MetricInputs<'_>,
    ) -> Result<Classification, StyleError> {
        let values = metric.evaluate(inputs);
        let mut classification = self.classify_panel(&values, metric.labels())?;

        let classified = classification.dates();
        let mut absent = 0usize;
        for date in inputs.returns.dates() {
            if !classified.contains(&date) && !classification.undefined_dates().contains(&date) {
                classification.mark_undefined(date);
                absent += 1;
            }
        }
        debug!(
            metric = metric.name(),
            classified = classified.len(),
            undefined = classification.undefined_dates().len(),
            absent,
            "classified metric"
        );
        Ok(classification)
    }
}
