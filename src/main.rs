// Command-line front end for the funding-rate engine.
//
// One run = one recomputation: load the CSV, aggregate once, apply the
// selection given by flags, then print KPIs and table previews and optionally
// export everything a chart layer needs.
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use kiva_funding::aggregate::KeyMode;
use kiva_funding::loader::{self, LoadReport};
use kiva_funding::logging::{init_logging, LogFormat};
use kiva_funding::metrics::describe_rates;
use kiva_funding::output;
use kiva_funding::types::RateDescription;
use kiva_funding::util::{format_int, format_rate};
use kiva_funding::{
    CombinationMode, Dashboard, DateRange, Dimension, EngineConfig, FilterSelection, KpiSummary,
    QualityReport, TotalFundingScope,
};

#[derive(Parser, Debug)]
#[command(
    name = "kiva-dashboard",
    version,
    about = "Funding-rate KPIs and chart tables for a microloan CSV"
)]
struct Cli {
    /// Loan CSV with id, region, country, sector, borrower_genders,
    /// funded_time, funded_amount and loan_amount columns.
    #[arg(long)]
    csv: PathBuf,
    /// TOML file with engine switches; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep rows from this region (repeatable).
    #[arg(long = "region")]
    regions: Vec<String>,
    #[arg(long = "country")]
    countries: Vec<String>,
    #[arg(long = "sector")]
    sectors: Vec<String>,
    /// Borrower gender token exactly as in the data, e.g. "female, male".
    #[arg(long = "gender")]
    genders: Vec<String>,
    #[arg(long = "id")]
    ids: Vec<u64>,
    /// First funded day to keep (YYYY-MM-DD, inclusive).
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last funded day to keep (YYYY-MM-DD, inclusive).
    #[arg(long)]
    end: Option<NaiveDate>,
    /// How filters combine.
    #[arg(long, value_enum)]
    mode: Option<CombinationMode>,
    /// Rows the funding total is summed over.
    #[arg(long, value_enum)]
    total_scope: Option<TotalFundingScope>,
    #[arg(long, value_enum)]
    key: Option<KeyMode>,
    /// Write filtered_view.csv, chart tables and summary.json here.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Rows shown per preview table.
    #[arg(long, default_value_t = 5)]
    preview: usize,
    /// Emit logs as JSON.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    load: &'a LoadReport,
    quality: &'a QualityReport,
    funding_rate: &'a RateDescription,
    config: EngineConfig,
    selection: &'a FilterSelection,
    kpis: &'a KpiSummary,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut cfg = match &self.config {
            Some(path) => EngineConfig::from_toml_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(mode) = self.mode {
            cfg.combination_mode = mode;
        }
        if let Some(scope) = self.total_scope {
            cfg.total_funding_scope = scope;
        }
        if let Some(key) = self.key {
            cfg.key_mode = key;
        }
        Ok(cfg)
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection::unrestricted()
            .with_values(Dimension::Region, self.regions.iter().cloned())
            .with_values(Dimension::Country, self.countries.iter().cloned())
            .with_values(Dimension::Sector, self.sectors.iter().cloned())
            .with_values(Dimension::Gender, self.genders.iter().cloned())
            .with_values(Dimension::Id, self.ids.iter().map(u64::to_string))
            .with_dates(DateRange {
                start: self.start,
                end: self.end,
            })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.json_logs { LogFormat::Json } else { LogFormat::Pretty });

    let config = cli.engine_config()?;
    let (records, load_report) = loader::load_loans(&cli.csv)
        .with_context(|| format!("failed to load {}", cli.csv.display()))?;
    println!(
        "Processing dataset... ({} rows loaded, {} malformed)",
        format_int(load_report.loaded_rows),
        format_int(load_report.malformed_rows)
    );

    let rates = describe_rates(&records);
    let dashboard = Dashboard::new(records, config);
    print_quality(dashboard.quality());

    let selection = cli.selection();
    let out = dashboard.recompute(&selection);
    info!(rows = out.rows.len(), "filtered view ready");

    println!("Kiva Impact and Reach\n");
    println!("{}\n", output::format_kpis(&out.kpis));
    println!(
        "Funding rate across all loans: mean {}, median {} ({} undefined)\n",
        format_rate(rates.mean),
        format_rate(rates.median),
        format_int(rates.undefined)
    );

    println!("Filtered view ({} rows)\n", format_int(out.rows.len()));
    println!("{}\n", output::preview_view(&out.rows, cli.preview));
    let by_day = out.rate_by_day();
    println!("Funding Rate by Time\n");
    println!("{}\n", output::preview_table(&by_day, cli.preview));
    for (title, dim) in [
        ("Funding Rate by Sector", Dimension::Sector),
        ("Funding Rate by Region", Dimension::Region),
        ("Funding Rate by Gender", Dimension::Gender),
    ] {
        println!("{title}\n");
        println!("{}\n", output::preview_table(&out.rate_by(dim), cli.preview));
    }

    if let Some(dir) = &cli.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        output::write_view_csv(dir.join("filtered_view.csv"), &out.rows)?;
        output::write_csv(dir.join("rate_by_day.csv"), &by_day)?;
        for dim in [Dimension::Sector, Dimension::Region, Dimension::Country, Dimension::Gender] {
            output::write_csv(dir.join(format!("rate_by_{dim}.csv")), &out.rate_by(dim))?;
        }
        let summary = Summary {
            load: &load_report,
            quality: dashboard.quality(),
            funding_rate: &rates,
            config: dashboard.config(),
            selection: &selection,
            kpis: &out.kpis,
        };
        output::write_json(dir.join("summary.json"), &summary)?;
        println!("Outputs saved to {}", dir.display());
    }
    Ok(())
}

fn print_quality(q: &QualityReport) {
    let notes = output::quality_notes(q);
    if notes.is_empty() {
        return;
    }
    for note in notes {
        println!("{note}");
    }
    println!();
}
