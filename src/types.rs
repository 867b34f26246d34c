use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::format_rate;

/// Column names the input table must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "id",
    "region",
    "country",
    "sector",
    "borrower_genders",
    "funded_time",
    "funded_amount",
    "loan_amount",
];

/// One CSV row exactly as read. Every field is optional text so a single bad
/// cell never fails the whole row; cleaning happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub id: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
    pub borrower_genders: Option<String>,
    pub funded_time: Option<String>,
    pub funded_amount: Option<String>,
    pub loan_amount: Option<String>,
}

/// Normalised `funded_time` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundedTime {
    Funded(NaiveDateTime),
    /// Empty cell: the loan never funded.
    NotFunded,
    /// Non-empty cell that no supported timestamp format accepts. The raw text
    /// is kept for diagnostics.
    Unparsable(String),
}

impl FundedTime {
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            FundedTime::Funded(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_unparsable(&self) -> bool {
        matches!(self, FundedTime::Unparsable(_))
    }
}

/// A cleaned loan row. Amounts stay optional: the ratio calculator decides
/// what a missing or out-of-domain amount means.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    pub id: Option<u64>,
    pub region: String,
    pub country: String,
    pub sector: String,
    pub borrower_genders: String,
    pub funded_time: FundedTime,
    pub funded_amount: Option<f64>,
    pub loan_amount: Option<f64>,
}

/// Aggregation key. `id` is `None` for every row when grouping without
/// identifiers; `funded_time` is `None` for loans that never funded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub id: Option<u64>,
    pub region: String,
    pub country: String,
    pub sector: String,
    pub borrower_genders: String,
    pub funded_time: Option<NaiveDateTime>,
}

/// One row of the aggregated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRow {
    pub id: Option<u64>,
    pub region: String,
    pub country: String,
    pub sector: String,
    pub borrower_genders: String,
    pub funded_time: Option<NaiveDateTime>,
    /// Mean of the defined funding rates in the group; `None` when every
    /// member's rate is undefined.
    pub funding_rate: Option<f64>,
    /// Sum of in-domain `loan_amount` values of the group's source rows.
    pub loan_amount: f64,
    pub source_rows: usize,
}

impl AggregatedRow {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            id: self.id,
            region: self.region.clone(),
            country: self.country.clone(),
            sector: self.sector.clone(),
            borrower_genders: self.borrower_genders.clone(),
            funded_time: self.funded_time,
        }
    }

    pub fn funded_date(&self) -> Option<NaiveDate> {
        self.funded_time.map(|ts| ts.date())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub loan_count: usize,
    pub total_funding: f64,
    /// `None` when the view is empty or holds only undefined rates.
    pub avg_funding_rate: Option<f64>,
}

/// Distribution of the per-record funding rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateDescription {
    pub count: usize,
    pub undefined: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

fn display_rate(v: &Option<f64>) -> String {
    format_rate(*v)
}

/// Bar-chart row: mean funding rate for one value of a dimension.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DimensionRate {
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Rows")]
    #[tabled(rename = "Rows")]
    pub rows: usize,
    #[serde(rename = "MeanFundingRate")]
    #[tabled(rename = "MeanFundingRate", display_with = "display_rate")]
    pub mean_funding_rate: Option<f64>,
}

/// Time-series point: mean funding rate for one calendar day.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DailyRate {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Rows")]
    #[tabled(rename = "Rows")]
    pub rows: usize,
    #[serde(rename = "MeanFundingRate")]
    #[tabled(rename = "MeanFundingRate", display_with = "display_rate")]
    pub mean_funding_rate: Option<f64>,
}
