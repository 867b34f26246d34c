//! Grouping of loan records into the aggregated funding-rate table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{AggregatedRow, GroupKey, LoanRecord};
use crate::util::mean;

/// Which fields make up the aggregation key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeyMode {
    /// `(id, region, country, sector, borrower_genders, funded_time)`
    #[default]
    WithId,
    /// Same tuple without `id`, for datasets lacking a stable loan identifier.
    WithoutId,
}

#[derive(Default)]
struct Acc {
    rates: Vec<f64>,
    loan_amount: f64,
    rows: usize,
}

/// Group `records` by the key tuple and average the funding rate per group.
///
/// Rows with an unparsable `funded_time`, and rows without an `id` when the
/// key includes it, have no valid key and are left out. They stay in the
/// dataset and are counted by [`crate::quality::assess`]. Undefined rates
/// count towards a group's membership but not its mean.
pub fn aggregate(records: &[LoanRecord], mode: KeyMode) -> Vec<AggregatedRow> {
    let mut groups: BTreeMap<GroupKey, Acc> = BTreeMap::new();
    let mut skipped = 0usize;
    for r in records {
        let Some(key) = group_key(r, mode) else {
            skipped += 1;
            continue;
        };
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(rate) = r.funding_rate() {
            acc.rates.push(rate);
        }
        if let Some(amount) = r.valid_loan_amount() {
            acc.loan_amount += amount;
        }
    }
    if skipped > 0 {
        debug!(skipped, "records without a valid aggregation key");
    }

    let rows: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|(key, acc)| AggregatedRow {
            id: key.id,
            region: key.region,
            country: key.country,
            sector: key.sector,
            borrower_genders: key.borrower_genders,
            funded_time: key.funded_time,
            funding_rate: mean(acc.rates),
            loan_amount: acc.loan_amount,
            source_rows: acc.rows,
        })
        .collect();
    info!(records = records.len(), groups = rows.len(), ?mode, "aggregated funding rates");
    rows
}

/// The aggregation key of a record, or `None` when it cannot be grouped.
pub fn group_key(r: &LoanRecord, mode: KeyMode) -> Option<GroupKey> {
    if r.funded_time.is_unparsable() {
        return None;
    }
    let id = match mode {
        KeyMode::WithId => Some(r.id?),
        KeyMode::WithoutId => None,
    };
    Some(GroupKey {
        id,
        region: r.region.clone(),
        country: r.country.clone(),
        sector: r.sector.clone(),
        borrower_genders: r.borrower_genders.clone(),
        funded_time: r.funded_time.timestamp(),
    })
}
