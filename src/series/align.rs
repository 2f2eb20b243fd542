//! Explicit date joins.
//!
//! - `inner_join`: training rows, dates present in all three return series.
//! - `prediction_domain`: dates where both reference series have a value; the
//!   target is not required, which is what lets its gaps be estimated.

use crate::domain::{AlignedDataset, AlignedRow, DomainRow, PredictionDomain, ReturnSeries};

/// Inner join of target, ref1 and ref2 on date, in ascending date order.
pub fn inner_join(target: &ReturnSeries, ref1: &ReturnSeries, ref2: &ReturnSeries) -> AlignedDataset {
    let rows = target
        .iter()
        .filter_map(|(date, t)| {
            let r1 = ref1.get(date)?;
            let r2 = ref2.get(date)?;
            Some(AlignedRow {
                date,
                target: t,
                ref1: r1,
                ref2: r2,
            })
        })
        .collect();

    AlignedDataset { rows }
}

/// Dates on which a prediction can be made: both reference values present.
///
/// A date seen in only one reference series is excluded rather than
/// extrapolated from a single reference.
pub fn prediction_domain(ref1: &ReturnSeries, ref2: &ReturnSeries) -> PredictionDomain {
    let rows = ref1
        .iter()
        .filter_map(|(date, r1)| {
            ref2.get(date).map(|r2| DomainRow {
                date,
                ref1: r1,
                ref2: r2,
            })
        })
        .collect();

    PredictionDomain { rows }
}
