//! kiva_funding
//!
//! Funding-rate engine behind the microloan impact dashboard: per-loan
//! funding ratios, a grouped funding-rate table, multi-select filtering of
//! that table and the headline KPIs. Rendering is left to the caller.
//!
//! ### Example
//! ```no_run
//! use kiva_funding::{Dashboard, Dimension, EngineConfig, FilterSelection};
//!
//! let (records, _) = kiva_funding::loader::load_loans("kiva_loans.csv")?;
//! let dashboard = Dashboard::new(records, EngineConfig::default());
//! let selection = FilterSelection::unrestricted().with_values(Dimension::Region, ["Lahore"]);
//! let out = dashboard.recompute(&selection);
//! println!("{} loans, avg rate {:?}", out.kpis.loan_count, out.kpis.avg_funding_rate);
//! # Ok::<(), kiva_funding::LoadError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod quality;
pub mod ratio;
pub mod reports;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, KeyMode};
pub use config::EngineConfig;
pub use context::{Dashboard, DashboardView, FilterOptions};
pub use error::{ConfigError, LoadError};
pub use filter::{CategoricalFilter, CombinationMode, DateRange, Dimension, FilterSelection, FilteredView, Selection};
pub use metrics::{summarize, TotalFundingScope};
pub use quality::QualityReport;
pub use ratio::{funding_rate, RateIssue};
pub use types::{AggregatedRow, FundedTime, KpiSummary, LoanRecord};
