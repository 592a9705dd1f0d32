//! Command-line arguments.

use clap::Parser;
use compass_lib::ApiMode;
use simplelog::LevelFilter;

/// Browse compliance frameworks and their control items.
#[derive(Debug, Clone, Parser)]
#[command(name = "compass", version, about)]
pub struct Args {
    /// Base URL of the REST service.
    #[arg(long)]
    pub service_base: Option<String>,

    /// Directory holding `frameworks.json` and `<id>.json` fallbacks.
    #[arg(long)]
    pub json_base: Option<String>,

    /// Data source: service, json or auto.
    #[arg(long)]
    pub mode: Option<ApiMode>,

    /// Rows per table page.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Log level written to the log file.
    #[arg(long, default_value = "debug")]
    pub log_level: LevelFilter,

    /// Route to open on start, e.g. `/framework/iso27001`.
    pub route: Option<String>,
}
