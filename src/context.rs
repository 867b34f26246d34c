//! Per-session dashboard state.
//!
//! A [`Dashboard`] owns the loaded records and the aggregated table built from
//! them once. Every filter change calls [`Dashboard::recompute`], which only
//! borrows that state, so concurrent sessions never share anything mutable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::filter::{self, DateRange, Dimension, FilterSelection, FilteredView, Selection};
use crate::metrics::summarize;
use crate::quality::{assess, QualityReport};
use crate::reports::{rate_by_day, rate_by_dimension};
use crate::types::{AggregatedRow, DailyRate, DimensionRate, KpiSummary, LoanRecord};

#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<LoanRecord>,
    aggregated: Vec<AggregatedRow>,
    quality: QualityReport,
    config: EngineConfig,
}

/// Everything one recomputation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView<'a> {
    pub rows: FilteredView<'a>,
    pub kpis: KpiSummary,
}

impl DashboardView<'_> {
    pub fn rate_by_day(&self) -> Vec<DailyRate> {
        rate_by_day(&self.rows)
    }

    pub fn rate_by(&self, dimension: Dimension) -> Vec<DimensionRate> {
        rate_by_dimension(&self.rows, dimension)
    }
}

impl Dashboard {
    pub fn new(records: Vec<LoanRecord>, config: EngineConfig) -> Self {
        let quality = assess(&records);
        let aggregated = aggregate(&records, config.key_mode);
        Self {
            records,
            aggregated,
            quality,
            config,
        }
    }

    pub fn records(&self) -> &[LoanRecord] {
        &self.records
    }

    pub fn aggregated(&self) -> &[AggregatedRow] {
        &self.aggregated
    }

    pub fn quality(&self) -> &QualityReport {
        &self.quality
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Swap engine switches. The cached table is rebuilt only when the key
    /// changes.
    pub fn set_config(&mut self, config: EngineConfig) {
        if config.key_mode != self.config.key_mode {
            self.aggregated = aggregate(&self.records, config.key_mode);
        }
        self.config = config;
    }

    pub fn recompute(&self, selection: &FilterSelection) -> DashboardView<'_> {
        if selection.dates.is_inverted() {
            warn!(start = ?selection.dates.start, end = ?selection.dates.end, "start date is after end date");
        }
        let rows = filter::apply(&self.aggregated, selection, self.config.combination_mode);
        let kpis = summarize(&rows, &self.records, self.config.total_funding_scope);
        debug!(
            kept = rows.len(),
            of = self.aggregated.len(),
            mode = ?self.config.combination_mode,
            "recomputed view"
        );
        DashboardView { rows, kpis }
    }

    /// Values offered by the filter controls.
    pub fn filter_options(&self) -> FilterOptions {
        let mut values: BTreeMap<Dimension, BTreeSet<String>> = BTreeMap::new();
        for row in &self.aggregated {
            for dim in Dimension::ALL {
                if let Some(v) = dim.value(row) {
                    values.entry(dim).or_default().insert(v.into_owned());
                }
            }
        }
        let dates = self.aggregated.iter().filter_map(AggregatedRow::funded_date);
        let (min_date, max_date) = dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
            (Some(lo.map_or(d, |l| l.min(d))), Some(hi.map_or(d, |h| h.max(d))))
        });
        FilterOptions {
            values: values
                .into_iter()
                .map(|(dim, set)| {
                    let mut list: Vec<String> = set.into_iter().collect();
                    if dim == Dimension::Id {
                        list.sort_by_key(|v| v.parse::<u64>().unwrap_or(u64::MAX));
                    }
                    (dim, list)
                })
                .collect(),
            min_date,
            max_date,
        }
    }
}

/// Distinct values per dimension (sorted) and the funded-date span.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub values: BTreeMap<Dimension, Vec<String>>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn values(&self, dimension: Dimension) -> &[String] {
        self.values.get(&dimension).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every known value selected on the four descriptive dimensions and the
    /// full date span, which is what the controls show before the user
    /// touches them. Ids start unrestricted.
    pub fn default_selection(&self) -> FilterSelection {
        let mut selection = FilterSelection::unrestricted().with_dates(DateRange {
            start: self.min_date,
            end: self.max_date,
        });
        for dim in [Dimension::Region, Dimension::Country, Dimension::Sector, Dimension::Gender] {
            selection = selection.with(dim, Selection::from_values(self.values(dim).iter().cloned()));
        }
        selection
    }
}
