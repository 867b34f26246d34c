//! Data-quality counters.
//!
//! Problems found in individual rows never abort a run. They are tallied here
//! and the affected rows are left out of the computations they would corrupt.

use serde::Serialize;
use tracing::warn;

use crate::ratio::RateIssue;
use crate::types::{FundedTime, LoanRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub total_records: usize,
    pub missing_amount: usize,
    pub zero_loan_amount: usize,
    pub negative_amount: usize,
    pub unparsable_funded_time: usize,
    pub not_funded: usize,
    pub missing_id: usize,
    /// Rows with at least one blank categorical field.
    pub missing_category: usize,
}

impl QualityReport {
    /// Rows whose funding rate is the undefined sentinel.
    pub fn undefined_rates(&self) -> usize {
        self.missing_amount + self.zero_loan_amount + self.negative_amount
    }

    pub fn has_issues(&self) -> bool {
        self.undefined_rates() > 0
            || self.unparsable_funded_time > 0
            || self.missing_id > 0
            || self.missing_category > 0
    }
}

pub fn assess(records: &[LoanRecord]) -> QualityReport {
    let mut report = QualityReport {
        total_records: records.len(),
        ..Default::default()
    };
    for r in records {
        match r.rate() {
            Ok(_) => {}
            Err(RateIssue::MissingAmount) => report.missing_amount += 1,
            Err(RateIssue::ZeroLoanAmount) => report.zero_loan_amount += 1,
            Err(RateIssue::NegativeAmount) => report.negative_amount += 1,
        }
        match &r.funded_time {
            FundedTime::Funded(_) => {}
            FundedTime::NotFunded => report.not_funded += 1,
            FundedTime::Unparsable(_) => report.unparsable_funded_time += 1,
        }
        if r.id.is_none() {
            report.missing_id += 1;
        }
        if [&r.region, &r.country, &r.sector, &r.borrower_genders]
            .iter()
            .any(|v| v.is_empty())
        {
            report.missing_category += 1;
        }
    }

    if report.negative_amount > 0 {
        warn!(rows = report.negative_amount, "negative amounts excluded from funding rates");
    }
    if report.unparsable_funded_time > 0 {
        warn!(
            rows = report.unparsable_funded_time,
            "unparsable funded_time values excluded from aggregation"
        );
    }
    report
}
