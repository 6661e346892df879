//! Metrics driving cross-sectional tercile sorts.

use carhart_primitives::{LabelSet, Panel};

/// Inputs a sort metric may draw on.
#[derive(Debug, Clone, Copy)]
pub struct MetricInputs<'a> {
    /// Daily simple returns per instrument.
    pub returns: &'a Panel,
    /// Market capitalization per instrument.
    pub market_caps: &'a Panel,
    /// Book equity per instrument, already carried forward.
    pub book_equity: &'a Panel,
}

/// A per-date, per-instrument metric used to rank instruments into terciles.
///
/// The classification logic is shared by every metric; implementors only
/// decide how the metric is extracted and how the buckets are named.
pub trait SortMetric: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Display names of the three buckets.
    fn labels(&self) -> LabelSet;

    /// Metric value per date and instrument. Dates or instruments where the
    /// metric is undefined must be absent from the result.
    fn evaluate(&self, inputs: &MetricInputs<'_>) -> Panel;
}
