//! Pipeline output.

use std::collections::BTreeMap;

use carhart_primitives::{
    Date, DateSeries, Factor, FactorReturns, Panel, PortfolioWeights, Symbol,
};
use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::{Attribution, EstimationResult, Exclusion, RiskAssessment, Stage};

/// Exclusions listed individually by [`RiskReport::print_summary`].
const SUMMARY_EXCLUSIONS: usize = 10;

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct RiskReport {
    /// Daily factor returns.
    pub factor_returns: FactorReturns,
    /// Per-instrument regression results.
    pub estimates: BTreeMap<Symbol, EstimationResult>,
    /// Row order of `loadings`, `specific_variance` and the covariance matrices.
    pub symbols: Vec<Symbol>,
    /// `(instruments x factors)` loading matrix.
    pub loadings: Array2<f64>,
    /// Specific variance per instrument.
    pub specific_variance: Array1<f64>,
    /// Factor covariance.
    pub factor_covariance: Array2<f64>,
    /// Factor correlation.
    pub factor_correlation: Array2<f64>,
    /// Date whose weights define the portfolio.
    pub weight_date: Date,
    /// Portfolio weights aligned to `symbols`.
    pub weights: PortfolioWeights,
    /// Variance, standard deviation, VaR and decomposition.
    pub risk: RiskAssessment,
    /// Realized daily portfolio returns under the fixed weights.
    pub portfolio_returns: DateSeries,
    /// Realized daily instrument returns.
    pub returns: Panel,
    /// Instruments and dates left out, with reasons.
    pub exclusions: Vec<Exclusion>,
}

impl RiskReport {
    /// Total asset covariance.
    #[must_use]
    pub const fn total_covariance(&self) -> &Array2<f64> {
        &self.risk.total_covariance
    }

    /// Attribute the realized return of `symbol` over its estimation sample.
    ///
    /// `None` if the instrument was not estimated.
    #[must_use]
    pub fn attribution(&self, symbol: &Symbol) -> Option<Attribution> {
        let result = self.estimates.get(symbol)?;
        Some(Attribution::compute(result, &self.returns.series(symbol), &self.factor_returns))
    }

    /// Exclusions raised at `stage`.
    pub fn exclusions_at(&self, stage: Stage) -> impl Iterator<Item = &Exclusion> + '_ {
        self.exclusions.iter().filter(move |e| e.context.stage == stage)
    }

    /// Residual series of one instrument.
    #[must_use]
    pub fn residuals(&self, symbol: &Symbol) -> Option<&DateSeries> {
        self.estimates.get(symbol).map(|r| &r.residuals)
    }

    /// Factor returns in long format: `date | factor | factor_return`.
    ///
    /// # Errors
    /// Returns a `PolarsError` if the frame cannot be assembled.
    pub fn factor_frame(&self) -> PolarsResult<DataFrame> {
        let mut dates: Vec<Date> = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        for factor in Factor::ALL {
            for (date, value) in self.factor_returns.get(factor).iter() {
                dates.push(date);
                names.push(factor.name());
                values.push(value);
            }
        }
        DataFrame::new(vec![
            Column::new("date".into(), dates),
            Column::new("factor".into(), names),
            Column::new("factor_return".into(), values),
        ])
    }

    /// Residuals in long format: `date | symbol | residual_return`.
    ///
    /// # Errors
    /// Returns a `PolarsError` if the frame cannot be assembled.
    pub fn residual_frame(&self) -> PolarsResult<DataFrame> {
        let mut dates: Vec<Date> = Vec::new();
        let mut symbols: Vec<&str> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        for (symbol, result) in &self.estimates {
            for (date, value) in result.residuals.iter() {
                dates.push(date);
                symbols.push(symbol.as_str());
                values.push(value);
            }
        }
        DataFrame::new(vec![
            Column::new("date".into(), dates),
            Column::new("symbol".into(), symbols),
            Column::new("residual_return".into(), values),
        ])
    }

    /// Loadings with diagnostics, one row per instrument.
    ///
    /// # Errors
    /// Returns a `PolarsError` if the frame cannot be assembled.
    pub fn loading_frame(&self) -> PolarsResult<DataFrame> {
        let results: Vec<&EstimationResult> = self.estimates.values().collect();
        let mut columns = vec![Column::new(
            "symbol".into(),
            results.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>(),
        )];
        columns.push(Column::new(
            "alpha".into(),
            results.iter().map(|r| r.alpha).collect::<Vec<_>>(),
        ));
        for factor in Factor::ALL {
            columns.push(Column::new(
                factor.name().into(),
                results.iter().map(|r| r.loading(factor)).collect::<Vec<_>>(),
            ));
        }
        columns.push(Column::new(
            "r_squared".into(),
            results.iter().map(|r| r.r_squared).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            "specific_variance".into(),
            results.iter().map(|r| r.specific_variance).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            "n_obs".into(),
            results.iter().map(|r| r.n_obs as u64).collect::<Vec<_>>(),
        ));
        DataFrame::new(columns)
    }

    /// Print a concise summary of the run.
    pub fn print_summary(&self) {
        let rule = "=".repeat(80);
        let thin = "-".repeat(80);
        println!("\n{rule}");
        println!("FOUR-FACTOR RISK REPORT");
        println!("{rule}");
        println!(
            "Instruments: {}   Excluded: {}   Weights as of: {}",
            self.symbols.len(),
            self.exclusions.len(),
            self.weight_date
        );
        if let Some((start, end)) = self.factor_returns.market.span() {
            println!("Factor sample: {start} to {end}");
        }
        println!("{thin}");

        println!("\nFACTOR LOADINGS:");
        print!("{:<10} {:>9}", "Symbol", "Weight");
        for factor in Factor::ALL {
            print!(" {:>9}", factor.name());
        }
        println!(" {:>9} {:>12}", "R²", "Spec. Vol");
        for (i, symbol) in self.symbols.iter().enumerate() {
            print!("{:<10} {:>8.2}%", symbol.as_str(), self.weights.weights()[i] * 100.0);
            for factor in Factor::ALL {
                print!(" {:>9.3}", self.loadings[[i, factor.index()]]);
            }
            let r_squared = self.estimates.get(symbol).map_or(f64::NAN, |r| r.r_squared);
            println!(" {:>9.3} {:>11.2}%", r_squared, self.specific_variance[i].sqrt() * 100.0);
        }

        println!("\nFACTOR CORRELATION:");
        print!("{:<10}", "");
        for factor in Factor::ALL {
            print!(" {:>9}", factor.name());
        }
        println!();
        for row in Factor::ALL {
            print!("{:<10}", row.name());
            for col in Factor::ALL {
                print!(" {:>9.3}", self.factor_correlation[[row.index(), col.index()]]);
            }
            println!();
        }

        let decomposition = &self.risk.decomposition;
        println!("\n{thin}");
        println!("PORTFOLIO RISK (one day):");
        println!("  Variance:                {:>12.8}", self.risk.variance);
        println!("  Standard deviation:      {:>11.4}%", self.risk.std_dev * 100.0);
        println!(
            "  VaR at {:>4.1}%:            {:>11.4}%",
            self.risk.confidence * 100.0,
            self.risk.value_at_risk * 100.0
        );
        println!("  Factor variance share:   {:>11.1}%", decomposition.factor_share() * 100.0);

        if !self.exclusions.is_empty() {
            println!("\nEXCLUSIONS:");
            let mut per_stage: BTreeMap<Stage, usize> = BTreeMap::new();
            for exclusion in &self.exclusions {
                *per_stage.entry(exclusion.context.stage).or_default() += 1;
            }
            for (stage, count) in per_stage {
                println!("  {:<16} {count:>6}", stage.name());
            }
            for exclusion in self.exclusions.iter().take(SUMMARY_EXCLUSIONS) {
                println!("  {exclusion}");
            }
            if self.exclusions.len() > SUMMARY_EXCLUSIONS {
                println!("  ... {} more", self.exclusions.len() - SUMMARY_EXCLUSIONS);
            }
        }
        println!("{rule}\n");
    }
}
