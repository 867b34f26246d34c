use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::types::{LoanRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{clean_text, parse_f64_safe, parse_funded_time, parse_u64_safe};

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows the CSV reader could not decode at all (e.g. invalid UTF-8).
    pub malformed_rows: usize,
}

pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<(Vec<LoanRecord>, LoadReport), LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading loans");
    read_loans(file)
}

/// Read loans from any CSV source. The header row is validated before a single
/// data row is decoded.
pub fn read_loans<R: Read>(reader: R) -> Result<(Vec<LoanRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    check_columns(rdr.headers()?)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        match result {
            Ok(row) => records.push(clean_row(row)),
            Err(e) => {
                report.malformed_rows += 1;
                warn!(row = report.total_rows, error = %e, "skipping malformed row");
            }
        }
    }
    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        malformed = report.malformed_rows,
        "loans loaded"
    );
    Ok((records, report))
}

fn check_columns(headers: &csv::StringRecord) -> Result<(), LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }
    let duplicated: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| headers.iter().filter(|h| h == *col).count() > 1)
        .map(|col| col.to_string())
        .collect();
    if duplicated.is_empty() {
        Ok(())
    } else {
        Err(LoadError::DuplicateColumns { duplicated })
    }
}

pub fn clean_row(row: RawRow) -> LoanRecord {
    LoanRecord {
        id: parse_u64_safe(row.id.as_deref()),
        region: clean_text(row.region),
        country: clean_text(row.country),
        sector: clean_text(row.sector),
        borrower_genders: clean_text(row.borrower_genders),
        funded_time: parse_funded_time(row.funded_time.as_deref()),
        funded_amount: parse_f64_safe(row.funded_amount.as_deref()),
        loan_amount: parse_f64_safe(row.loan_amount.as_deref()),
    }
}
