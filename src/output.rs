use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::filter::FilteredView;
use crate::quality::QualityReport;
use crate::types::{AggregatedRow, KpiSummary};
use crate::util::{format_int, format_number, format_rate};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Filtered view as CSV. An empty view still gets a header row.
pub fn write_view_csv<P: AsRef<Path>>(path: P, view: &FilteredView<'_>) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record([
        "id",
        "region",
        "country",
        "sector",
        "borrower_genders",
        "funded_time",
        "funding_rate",
        "loan_amount",
        "source_rows",
    ])?;
    for r in view.iter() {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table.
pub fn preview_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

#[derive(Tabled, Clone)]
struct ViewRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Sector")]
    sector: String,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "FundedTime")]
    funded_time: String,
    #[tabled(rename = "FundingRate")]
    funding_rate: String,
}

impl From<&AggregatedRow> for ViewRow {
    fn from(r: &AggregatedRow) -> Self {
        Self {
            id: r.id.map(|v| v.to_string()).unwrap_or_default(),
            region: r.region.clone(),
            country: r.country.clone(),
            sector: r.sector.clone(),
            gender: r.borrower_genders.clone(),
            funded_time: r.funded_time.map(|t| t.to_string()).unwrap_or_else(|| "-".into()),
            funding_rate: format_rate(r.funding_rate),
        }
    }
}

pub fn preview_view(view: &FilteredView<'_>, max_rows: usize) -> String {
    let rows: Vec<ViewRow> = view.iter().take(max_rows).map(ViewRow::from).collect();
    preview_table(&rows, max_rows)
}

/// The three KPI lines, with the rate placeholder when it is undefined.
pub fn format_kpis(kpis: &KpiSummary) -> String {
    format!(
        "Total Loans: {}\nTotal Funding: {}\nAverage Funding Rate: {}",
        format_int(kpis.loan_count),
        format_number(kpis.total_funding, 2),
        format_rate(kpis.avg_funding_rate)
    )
}

/// One note per kind of data problem actually present in `q`.
pub fn quality_notes(q: &QualityReport) -> Vec<String> {
    let mut notes = Vec::new();
    if q.undefined_rates() > 0 {
        notes.push(format!(
            "Note: {} rows with undefined funding rate ({} missing amount, {} zero loan amount, {} negative amount).",
            format_int(q.undefined_rates()),
            format_int(q.missing_amount),
            format_int(q.zero_loan_amount),
            format_int(q.negative_amount)
        ));
    }
    if q.unparsable_funded_time > 0 {
        notes.push(format!(
            "Note: {} rows with unparsable funded_time left out of aggregation.",
            format_int(q.unparsable_funded_time)
        ));
    }
    if q.missing_id > 0 || q.missing_category > 0 {
        notes.push(format!(
            "Note: {} rows without id, {} rows with a blank category.",
            format_int(q.missing_id),
            format_int(q.missing_category)
        ));
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn agg(rate: Option<f64>) -> AggregatedRow {
        AggregatedRow {
            id: Some(42),
            region: "Lahore".into(),
            country: "Pakistan".into(),
            sector: "Food".into(),
            borrower_genders: "female".into(),
            funded_time: None,
            funding_rate: rate,
            loan_amount: 300.0,
            source_rows: 1,
        }
    }

    #[test]
    fn kpis_show_placeholder_for_undefined_rate() {
        let text = format_kpis(&KpiSummary {
            loan_count: 12_345,
            total_funding: 1_000_000.0,
            avg_funding_rate: None,
        });
        assert!(text.contains("Total Loans: 12,345"));
        assert!(text.contains("Total Funding: 1,000,000.00"));
        assert!(text.contains("Average Funding Rate: n/a"));
    }

    #[test]
    fn view_csv_has_header_even_when_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.csv");
        write_view_csv(&path, &FilteredView::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,region,country,sector,borrower_genders,funded_time"));
    }

    #[test]
    fn view_csv_keeps_sentinel_blank() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.csv");
        let rows = vec![agg(None), agg(Some(0.5))];
        write_view_csv(&path, &FilteredView { rows: rows.iter().collect() }).unwrap();
        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rates: Vec<String> = rdr
            .records()
            .map(|r| r.unwrap().get(6).unwrap().to_string())
            .collect();
        assert_eq!(rates, vec!["".to_string(), "0.5".to_string()]);
    }

    #[test]
    fn quality_notes_only_mention_present_problems() {
        let ids_only = QualityReport {
            total_records: 10,
            missing_id: 2,
            ..Default::default()
        };
        let notes = quality_notes(&ids_only);
        assert_eq!(notes, vec!["Note: 2 rows without id, 0 rows with a blank category."]);
        assert!(!notes.iter().any(|n| n.contains("undefined funding rate")));

        let zero_loans = QualityReport {
            zero_loan_amount: 3,
            ..Default::default()
        };
        let notes = quality_notes(&zero_loans);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].starts_with("Note: 3 rows with undefined funding rate"));
        assert!(quality_notes(&QualityReport::default()).is_empty());
    }

    #[test]
    fn preview_of_nothing() {
        assert_eq!(preview_view(&FilteredView::default(), 5), "(no rows)");
        let rows = vec![agg(Some(1.0))];
        let text = preview_view(&FilteredView { rows: rows.iter().collect() }, 5);
        assert!(text.contains("| Lahore"));
        assert!(text.contains("100.00%"));
    }
}
