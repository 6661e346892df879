//! Trailing-return momentum.

use carhart_primitives::{Date, DateSeries, LabelSet, Panel};
use carhart_traits::{MetricInputs, SortMetric};

use crate::StyleError;

/// Configuration for momentum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentumConfig {
    /// Number of daily returns compounded.
    pub window: usize,
    /// Most recent returns excluded from the window.
    pub skip: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window: 252, // ~1 year
            skip: 1,
        }
    }
}

impl MomentumConfig {
    /// Check that the window is non-empty and the skip shorter than it.
    ///
    /// # Errors
    /// Returns `StyleError::InvalidConfig` for a zero window or a skip of at
    /// least the window length.
    pub fn validate(&self) -> Result<(), StyleError> {
        if self.window == 0 {
            return Err(StyleError::InvalidConfig("momentum window must be positive".into()));
        }
        if self.skip >= self.window {
            return Err(StyleError::InvalidConfig(format!(
                "momentum skip must be shorter than the window ({}), got {}",
                self.window, self.skip
            )));
        }
        Ok(())
    }

    /// Index of the first calendar date with a complete window.
    ///
    /// Saturates instead of overflowing for an unvalidated configuration.
    #[must_use]
    pub const fn first_index(&self) -> usize {
        self.window.saturating_add(self.skip).saturating_sub(1)
    }
}

/// Momentum engine.
///
/// On the `i`-th date of the return calendar, momentum is
/// `prod(1 + r[i - k] for k in skip..skip + window) - 1`. Every return in the
/// window must be present; otherwise the value is absent. Nothing is filled.
#[derive(Debug, Clone, Default)]
pub struct MomentumEngine {
    config: MomentumConfig,
}

impl MomentumEngine {
    /// Create a momentum engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a momentum engine with custom configuration.
    #[must_use]
    pub const fn with_config(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// Momentum of one return series on `calendar`.
    #[must_use]
    pub fn trailing(&self, returns: &DateSeries, calendar: &[Date]) -> DateSeries {
        let MomentumConfig { window, skip } = self.config;
        let mut out = DateSeries::new();
        if window == 0 {
            return out;
        }

        let aligned: Vec<Option<f64>> = calendar.iter().map(|d| returns.get(*d)).collect();
        for i in self.config.first_index()..calendar.len() {
            let end = i + 1 - skip;
            let start = end - window;
            let growth = aligned[start..end]
                .iter()
                .try_fold(1.0, |acc, r| r.map(|r| acc * (1.0 + r)));
            if let Some(growth) = growth {
                out.insert(calendar[i], growth - 1.0);
            }
        }
        out
    }

    /// Momentum of every instrument in a returns panel, on the panel's calendar.
    #[must_use]
    pub fn compute(&self, returns: &Panel) -> Panel {
        let calendar: Vec<Date> = returns.dates().into_iter().collect();
        let symbols = returns.symbols();
        let series: Vec<_> =
            symbols.iter().map(|s| (s, self.trailing(&returns.series(s), &calendar))).collect();
        Panel::from_series(series.iter().map(|(s, m)| (*s, m)))
    }
}

impl SortMetric for MomentumEngine {
    fn name(&self) -> &str {
        "momentum"
    }

    fn labels(&self) -> LabelSet {
        LabelSet::MOMENTUM
    }

    fn evaluate(&self, inputs: &MetricInputs<'_>) -> Panel {
        self.compute(inputs.returns)
    }
}
