//! Multi-select filtering of the aggregated table.
//!
//! Each categorical dimension carries a [`Selection`]; the date range is a
//! closed interval on the funded date. How the active predicates combine is
//! chosen by [`CombinationMode`].

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::AggregatedRow;

/// How active predicates combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CombinationMode {
    /// Keep a row only if it passes every active predicate.
    All,
    /// Keep a row if it passes at least one active predicate. More filters
    /// widen the view.
    #[default]
    Any,
}

/// A categorical column that can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    Country,
    Sector,
    Gender,
    Id,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Region,
        Dimension::Country,
        Dimension::Sector,
        Dimension::Gender,
        Dimension::Id,
    ];

    /// Column name in the input table.
    pub fn field(self) -> &'static str {
        match self {
            Dimension::Region => "region",
            Dimension::Country => "country",
            Dimension::Sector => "sector",
            Dimension::Gender => "borrower_genders",
            Dimension::Id => "id",
        }
    }

    pub fn value(self, row: &AggregatedRow) -> Option<Cow<'_, str>> {
        match self {
            Dimension::Region => Some(Cow::Borrowed(row.region.as_str())),
            Dimension::Country => Some(Cow::Borrowed(row.country.as_str())),
            Dimension::Sector => Some(Cow::Borrowed(row.sector.as_str())),
            Dimension::Gender => Some(Cow::Borrowed(row.borrower_genders.as_str())),
            Dimension::Id => row.id.map(|id| Cow::Owned(id.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Allowed values for one dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Unrestricted.
    #[default]
    All,
    /// Only these values. An empty set selects nothing.
    Only(BTreeSet<String>),
}

impl Selection {
    /// Selection from a multi-select control: picking nothing means "no
    /// restriction", not "match nothing".
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    /// Explicit "select none".
    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Selection::Only(_))
    }
}

/// The same predicate shape for every categorical dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalFilter {
    pub dimension: Dimension,
    pub selection: Selection,
}

impl CategoricalFilter {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            selection: Selection::All,
        }
    }

    pub fn is_active(&self) -> bool {
        self.selection.is_restricted()
    }

    pub fn matches(&self, row: &AggregatedRow) -> bool {
        match &self.selection {
            Selection::All => true,
            Selection::Only(set) => self
                .dimension
                .value(row)
                .is_some_and(|v| set.contains(v.as_ref())),
        }
    }
}

/// Closed interval on the funded date. A missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Loans that never funded have no date and never match.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(d) = date else {
            return false;
        };
        self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e)
    }
}

/// Everything the user has chosen in the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub region: CategoricalFilter,
    pub country: CategoricalFilter,
    pub sector: CategoricalFilter,
    pub gender: CategoricalFilter,
    pub id: CategoricalFilter,
    pub dates: DateRange,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            region: CategoricalFilter::new(Dimension::Region),
            country: CategoricalFilter::new(Dimension::Country),
            sector: CategoricalFilter::new(Dimension::Sector),
            gender: CategoricalFilter::new(Dimension::Gender),
            id: CategoricalFilter::new(Dimension::Id),
            dates: DateRange::default(),
        }
    }
}

impl FilterSelection {
    /// No restriction on any dimension or date.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, dimension: Dimension, selection: Selection) -> Self {
        self.filter_mut(dimension).selection = selection;
        self
    }

    #[must_use]
    pub fn with_values<I, S>(self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(dimension, Selection::from_values(values))
    }

    #[must_use]
    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn filter(&self, dimension: Dimension) -> &CategoricalFilter {
        match dimension {
            Dimension::Region => &self.region,
            Dimension::Country => &self.country,
            Dimension::Sector => &self.sector,
            Dimension::Gender => &self.gender,
            Dimension::Id => &self.id,
        }
    }

    pub fn filter_mut(&mut self, dimension: Dimension) -> &mut CategoricalFilter {
        match dimension {
            Dimension::Region => &mut self.region,
            Dimension::Country => &mut self.country,
            Dimension::Sector => &mut self.sector,
            Dimension::Gender => &mut self.gender,
            Dimension::Id => &mut self.id,
        }
    }

    /// The predicates that restrict anything, in a fixed order.
    pub fn active_predicates(&self) -> Vec<Predicate<'_>> {
        let mut preds: Vec<Predicate<'_>> = Dimension::ALL
            .iter()
            .map(|d| self.filter(*d))
            .filter(|f| f.is_active())
            .map(Predicate::Category)
            .collect();
        if self.dates.is_active() {
            preds.push(Predicate::Dates(&self.dates));
        }
        preds
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Predicate<'s> {
    Category(&'s CategoricalFilter),
    Dates(&'s DateRange),
}

impl Predicate<'_> {
    pub fn matches(&self, row: &AggregatedRow) -> bool {
        match self {
            Predicate::Category(f) => f.matches(row),
            Predicate::Dates(range) => range.contains(row.funded_date()),
        }
    }
}

/// Rows of the aggregated table that survive a selection. Borrows from the
/// table; rebuilt for every selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    pub rows: Vec<&'a AggregatedRow>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a AggregatedRow> + '_ {
        self.rows.iter().copied()
    }
}

/// Apply `selection` to `rows` under `mode`. Input order is preserved.
///
/// With no active predicate every row is kept in either mode.
pub fn apply<'a>(
    rows: &'a [AggregatedRow],
    selection: &FilterSelection,
    mode: CombinationMode,
) -> FilteredView<'a> {
    let preds = selection.active_predicates();
    let keep = |row: &AggregatedRow| {
        if preds.is_empty() {
            return true;
        }
        match mode {
            CombinationMode::All => preds.iter().all(|p| p.matches(row)),
            CombinationMode::Any => preds.iter().any(|p| p.matches(row)),
        }
    };
    FilteredView {
        rows: rows.iter().filter(|r| keep(*r)).collect(),
    }
}
