use std::path::PathBuf;

/// Fatal problems reading the input table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    /// The header row lacks one or more required columns.
    #[error("input is missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
    /// A required column appears more than once, so no row can be decoded.
    #[error("input has duplicated column(s): {}", duplicated.join(", "))]
    DuplicateColumns { duplicated: Vec<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
