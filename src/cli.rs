use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricArg {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    All,
    Mobile,
    Desktop,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Optional path to config file (YAML)
    #[arg(long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every URL, write results, update history and the dashboard
    Run(RunArgs),
    /// Send a standalone chat notification
    Notify(NotifyArgs),
    /// Print trend selectors and chart series from the history files as JSON
    Trends(TrendArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Input CSV with `url,strategy` columns
    #[arg(long, alias = "csv")]
    pub input: Option<PathBuf>,

    /// Tabular results output
    #[arg(long)]
    pub out_csv: Option<PathBuf>,

    /// Structured results output
    #[arg(long)]
    pub out_json: Option<PathBuf>,

    /// Dashboard page output
    #[arg(long)]
    pub out_html: Option<PathBuf>,

    /// Directory holding history.json and history/YYYY-MM.json
    #[arg(long)]
    pub history_dir: Option<PathBuf>,

    /// Delay between API calls, in seconds
    #[arg(long)]
    pub sleep: Option<f64>,

    /// Maintainer name shown in the dashboard footer
    #[arg(long)]
    pub maintainer_name: Option<String>,

    /// Maintainer link shown in the dashboard footer
    #[arg(long)]
    pub maintainer_link: Option<String>,

    /// Skip the chat notification
    #[arg(long)]
    pub no_notify: bool,
}

#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Run status to report (e.g. SUCCESS, FAILED)
    #[arg(long, default_value = "SUCCESS")]
    pub status: String,

    /// Run start instant (RFC 3339)
    #[arg(long)]
    pub started_at: Option<String>,

    /// Run end instant (RFC 3339)
    #[arg(long)]
    pub finished_at: Option<String>,
}

#[derive(Args, Debug)]
pub struct TrendArgs {
    /// Directory holding history.json and history/YYYY-MM.json
    #[arg(long)]
    pub history_dir: Option<PathBuf>,

    /// Only this URL (exact match)
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, value_enum, default_value_t = MetricArg::Performance)]
    pub metric: MetricArg,

    #[arg(long, value_enum, default_value_t = StrategyArg::All)]
    pub strategy: StrategyArg,

    /// Only records whose timestamp starts with this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Only records whose timestamp starts with this month (YYYY-MM)
    #[arg(long)]
    pub month: Option<String>,

    /// Reference day for the archive lookback (defaults to today, UTC)
    #[arg(long)]
    pub today: Option<chrono::NaiveDate>,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
