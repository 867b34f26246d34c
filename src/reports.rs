// Chart-ready tables built from a filtered view: one time series of the mean
// funding rate per funded day, and bar aggregates per categorical value.
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::filter::{Dimension, FilteredView};
use crate::types::{DailyRate, DimensionRate};
use crate::util::mean;

#[derive(Default)]
struct Acc {
    rates: Vec<f64>,
    rows: usize,
}

impl Acc {
    fn push(&mut self, rate: Option<f64>) {
        self.rows += 1;
        if let Some(r) = rate {
            self.rates.push(r);
        }
    }
}

/// Mean funding rate per value of `dimension`, sorted by value.
pub fn rate_by_dimension(view: &FilteredView<'_>, dimension: Dimension) -> Vec<DimensionRate> {
    let mut map: BTreeMap<String, Acc> = BTreeMap::new();
    for row in view.iter() {
        let value = dimension.value(row).map(|v| v.into_owned()).unwrap_or_default();
        map.entry(value).or_default().push(row.funding_rate);
    }
    map.into_iter()
        .map(|(value, acc)| DimensionRate {
            value,
            rows: acc.rows,
            mean_funding_rate: mean(acc.rates),
        })
        .collect()
}

/// Mean funding rate per funded day, in date order. Rows without a funded
/// date have no place on a time axis and are skipped.
pub fn rate_by_day(view: &FilteredView<'_>) -> Vec<DailyRate> {
    let mut map: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for row in view.iter() {
        if let Some(date) = row.funded_date() {
            map.entry(date).or_default().push(row.funding_rate);
        }
    }
    map.into_iter()
        .map(|(date, acc)| DailyRate {
            date,
            rows: acc.rows,
            mean_funding_rate: mean(acc.rates),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AggregatedRow;

    fn row(sector: &str, rate: Option<f64>, day: Option<u32>) -> AggregatedRow {
        AggregatedRow {
            id: Some(1),
            region: "X".into(),
            country: "Y".into(),
            sector: sector.into(),
            borrower_genders: "female".into(),
            funded_time: day.and_then(|d| {
                NaiveDate::from_ymd_opt(2017, 3, d).and_then(|d| d.and_hms_opt(8, 30, 0))
            }),
            funding_rate: rate,
            loan_amount: 10.0,
            source_rows: 1,
        }
    }

    #[test]
    fn bars_per_sector() {
        let rows = vec![
            row("Food", Some(0.5), Some(1)),
            row("Retail", None, Some(1)),
            row("Food", Some(1.0), Some(2)),
        ];
        let view = FilteredView { rows: rows.iter().collect() };
        let bars = rate_by_dimension(&view, Dimension::Sector);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].value, "Food");
        assert_eq!(bars[0].rows, 2);
        assert_eq!(bars[0].mean_funding_rate, Some(0.75));
        assert_eq!(bars[1].value, "Retail");
        assert_eq!(bars[1].mean_funding_rate, None);
    }

    #[test]
    fn series_per_day_skips_undated() {
        let rows = vec![
            row("Food", Some(0.5), Some(2)),
            row("Food", Some(1.0), Some(1)),
            row("Food", Some(0.1), None),
        ];
        let view = FilteredView { rows: rows.iter().collect() };
        let series = rate_by_day(&view);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2017, 3, 1).unwrap());
        assert_eq!(series[0].mean_funding_rate, Some(1.0));
        assert_eq!(series[1].mean_funding_rate, Some(0.5));
    }
}
