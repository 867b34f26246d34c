//! Scalar KPIs for the dashboard header.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filter::FilteredView;
use crate::types::{KpiSummary, LoanRecord, RateDescription};
use crate::util::{mean, median};

/// Which rows `total_funding` sums over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TotalFundingScope {
    /// Only the rows in the filtered view.
    Filtered,
    /// The whole loaded dataset, whatever the filters say.
    #[default]
    Unfiltered,
}

/// Reduce a filtered view to the three headline numbers.
///
/// `records` is the full loaded dataset; it is only read when `scope` is
/// [`TotalFundingScope::Unfiltered`].
pub fn summarize(view: &FilteredView<'_>, records: &[LoanRecord], scope: TotalFundingScope) -> KpiSummary {
    KpiSummary {
        loan_count: loan_count(view),
        total_funding: match scope {
            TotalFundingScope::Filtered => view.iter().map(|r| r.loan_amount).sum(),
            TotalFundingScope::Unfiltered => records.iter().filter_map(LoanRecord::valid_loan_amount).sum(),
        },
        avg_funding_rate: mean(view.iter().filter_map(|r| r.funding_rate).collect()),
    }
}

/// Distinct loan ids in the view. Rows aggregated without an id each count
/// as one loan.
pub fn loan_count(view: &FilteredView<'_>) -> usize {
    let mut ids = BTreeSet::new();
    let mut anonymous = 0usize;
    for row in view.iter() {
        match row.id {
            Some(id) => {
                ids.insert(id);
            }
            None => anonymous += 1,
        }
    }
    ids.len() + anonymous
}

/// Count, mean, min, max and median of the per-record funding rate.
pub fn describe_rates(records: &[LoanRecord]) -> RateDescription {
    let rates: Vec<f64> = records.iter().filter_map(LoanRecord::funding_rate).collect();
    let undefined = records.len() - rates.len();
    let min = rates.iter().copied().min_by(f64::total_cmp);
    let max = rates.iter().copied().max_by(f64::total_cmp);
    RateDescription {
        count: rates.len(),
        undefined,
        mean: mean(rates.clone()),
        min,
        max,
        median: median(rates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AggregatedRow, FundedTime};

    fn loan(id: u64, funded: f64, loan: f64) -> LoanRecord {
        LoanRecord {
            id: Some(id),
            region: "X".into(),
            country: "Y".into(),
            sector: "Food".into(),
            borrower_genders: "female".into(),
            funded_time: FundedTime::NotFunded,
            funded_amount: Some(funded),
            loan_amount: Some(loan),
        }
    }

    fn agg(id: Option<u64>, rate: Option<f64>, amount: f64) -> AggregatedRow {
        AggregatedRow {
            id,
            region: "X".into(),
            country: "Y".into(),
            sector: "Food".into(),
            borrower_genders: "female".into(),
            funded_time: None,
            funding_rate: rate,
            loan_amount: amount,
            source_rows: 1,
        }
    }

    #[test]
    fn average_skips_sentinel() {
        let records = vec![loan(1, 80.0, 100.0), loan(2, 10.0, 0.0), loan(3, 50.0, 50.0)];
        let rows = vec![agg(Some(1), Some(0.8), 100.0), agg(Some(2), None, 0.0), agg(Some(3), Some(1.0), 50.0)];
        let view = FilteredView { rows: rows.iter().collect() };
        let kpi = summarize(&view, &records, TotalFundingScope::Unfiltered);
        assert_eq!(kpi.loan_count, 3);
        assert!((kpi.avg_funding_rate.unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(kpi.total_funding, 150.0);
    }

    #[test]
    fn scope_decides_total_source() {
        let records = vec![loan(1, 80.0, 100.0), loan(2, 25.0, 50.0), loan(3, 1.0, -4.0)];
        let rows = vec![agg(Some(1), Some(0.8), 100.0)];
        let view = FilteredView { rows: rows.iter().collect() };
        assert_eq!(summarize(&view, &records, TotalFundingScope::Unfiltered).total_funding, 150.0);
        assert_eq!(summarize(&view, &records, TotalFundingScope::Filtered).total_funding, 100.0);
    }

    #[test]
    fn empty_view_has_undefined_average() {
        let view = FilteredView::default();
        let kpi = summarize(&view, &[], TotalFundingScope::Filtered);
        assert_eq!(kpi.loan_count, 0);
        assert_eq!(kpi.total_funding, 0.0);
        assert_eq!(kpi.avg_funding_rate, None);
    }

    #[test]
    fn all_sentinel_view_has_undefined_average() {
        let rows = vec![agg(Some(7), None, 0.0)];
        let view = FilteredView { rows: rows.iter().collect() };
        assert_eq!(summarize(&view, &[], TotalFundingScope::Filtered).avg_funding_rate, None);
    }

    #[test]
    fn loan_count_is_distinct_ids() {
        let rows = vec![
            agg(Some(1), Some(1.0), 10.0),
            agg(Some(1), Some(0.5), 10.0),
            agg(None, Some(0.5), 10.0),
            agg(None, Some(0.5), 10.0),
        ];
        let view = FilteredView { rows: rows.iter().collect() };
        assert_eq!(loan_count(&view), 3);
    }

    #[test]
    fn describe_reports_undefined_rates() {
        let d = describe_rates(&[loan(1, 80.0, 100.0), loan(2, 10.0, 0.0), loan(3, 50.0, 50.0)]);
        assert_eq!(d.count, 2);
        assert_eq!(d.undefined, 1);
        assert_eq!(d.min, Some(0.8));
        assert_eq!(d.max, Some(1.0));
        assert!((d.median.unwrap() - 0.9).abs() < 1e-12);
    }
}
