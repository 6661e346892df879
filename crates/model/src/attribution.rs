//! Return attribution for individual instruments.
//!
//! Splits an instrument's summed daily return over its estimation sample into
//! the part explained by each factor, the intercept and the residual.

use carhart_primitives::{Date, DateSeries, Factor, FactorReturns};

use crate::EstimationResult;

/// Contribution of one factor to an instrument's return.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorContribution {
    /// Factor.
    pub factor: Factor,
    /// Loading of the instrument on the factor.
    pub exposure: f64,
    /// Summed factor return over the sample.
    pub factor_return: f64,
    /// `exposure * factor_return`.
    pub contribution: f64,
}

/// Attribution of an instrument's return over its estimation sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// First and last date of the sample.
    pub period: Option<(Date, Date)>,
    /// Summed realized daily return of the instrument over the sample.
    pub total_return: f64,
    /// Per-factor contributions, in [`Factor::ALL`] order.
    pub contributions: Vec<FactorContribution>,
    /// Intercept times the number of observations.
    pub alpha_contribution: f64,
    /// Summed residual.
    pub residual_contribution: f64,
    /// Coefficient of determination of the regression.
    pub r_squared: f64,
}

impl Attribution {
    /// Attribute the realized `returns` of the instrument behind `result` to
    /// the factors in `factors`.
    ///
    /// Only the regression dates are summed. When `returns` is the series the
    /// regression was fitted on, the parts add up to `total_return` up to
    /// rounding; see [`Attribution::unexplained`].
    #[must_use]
    pub fn compute(
        result: &EstimationResult,
        returns: &DateSeries,
        factors: &FactorReturns,
    ) -> Self {
        let dates: Vec<Date> = result.residuals.iter().map(|(d, _)| d).collect();

        let contributions: Vec<FactorContribution> = Factor::ALL
            .iter()
            .map(|&factor| {
                let series = factors.get(factor);
                let factor_return: f64 = dates.iter().filter_map(|d| series.get(*d)).sum();
                let exposure = result.loading(factor);
                let contribution = exposure * factor_return;
                FactorContribution { factor, exposure, factor_return, contribution }
            })
            .collect();

        let alpha_contribution = result.alpha * dates.len() as f64;
        let residual_contribution: f64 = result.residuals.iter().map(|(_, e)| e).sum();
        let total_return: f64 = dates.iter().filter_map(|d| returns.get(*d)).sum();

        Self {
            period: result.residuals.span(),
            total_return,
            contributions,
            alpha_contribution,
            residual_contribution,
            r_squared: result.r_squared,
        }
    }

    /// Return explained by the factors, excluding alpha and residual.
    #[must_use]
    pub fn factor_explained_return(&self) -> f64 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }

    /// Realized return not covered by alpha, factor contributions and residual.
    #[must_use]
    pub fn unexplained(&self) -> f64 {
        self.total_return
            - self.alpha_contribution
            - self.factor_explained_return()
            - self.residual_contribution
    }

    /// Print a concise summary of the attribution.
    pub fn print_summary(&self, symbol: &str) {
        let rule = "=".repeat(80);
        println!("\n{rule}");
        println!("FACTOR ATTRIBUTION: {symbol}");
        println!("{rule}");
        if let Some((start, end)) = self.period {
            println!("Period: {start} to {end}");
        }
        println!("Total Return: {:>+8.2}%", self.total_return * 100.0);
        println!("{:<14} {:>10} {:>12} {:>14}", "Factor", "Exposure", "Factor Ret", "Contribution");
        println!("{:-<14} {:-^10} {:-^12} {:-^14}", "", "", "", "");
        for c in &self.contributions {
            println!(
                "{:<14} {:>10.3} {:>11.2}% {:>13.2}%",
                c.factor.name(),
                c.exposure,
                c.factor_return * 100.0,
                c.contribution * 100.0
            );
        }
        let rest = [("Alpha", self.alpha_contribution), ("Residual", self.residual_contribution)];
        for (label, value) in rest {
            println!("{:<14} {:>10} {:>12} {:>13.2}%", label, "-", "-", value * 100.0);
        }
        println!("R-squared: {:>6.1}%", self.r_squared * 100.0);
        println!("{rule}\n");
    }
}
