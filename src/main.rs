use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use psiwatch::{
    cli::{self, Command, NotifyArgs, RunArgs, TrendArgs},
    config::{self, Config},
    history::HEAD_FILE,
    logging,
    notify::{Notifier, RunNotice},
    pipeline::{self, RunPaths, RunStatus},
    scoring::psi::PsiClient,
    trends::{self, TrendQuery},
    util,
};

fn main() -> Result<()> {
    let cli_opts = cli::parse();
    logging::init_logging(cli_opts.log_json);

    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let mut cfg = loaded.config;
    cfg.apply_env(|key| std::env::var(key).ok());

    match cli_opts.command {
        None => run(&mut cfg, &loaded.config_hash, RunArgs::default()),
        Some(Command::Run(args)) => run(&mut cfg, &loaded.config_hash, args),
        Some(Command::Notify(args)) => notify(&cfg, args),
        Some(Command::Trends(args)) => trends(&cfg, args),
    }
}

fn run(cfg: &mut Config, config_hash: &str, args: RunArgs) -> Result<()> {
    if let Some(secs) = args.sleep {
        if !secs.is_finite() || secs < 0.0 {
            bail!("--sleep must be a non-negative number of seconds");
        }
        cfg.request_delay_secs = secs;
    }
    if let Some(name) = args.maintainer_name {
        cfg.dashboard.maintainer_name = name;
    }
    if let Some(link) = args.maintainer_link {
        cfg.dashboard.maintainer_link = link;
    }

    let mut paths = RunPaths::from_config(cfg);
    if let Some(p) = args.input {
        paths.input = p;
    }
    if let Some(p) = args.out_csv {
        paths.out_csv = p;
    }
    if let Some(p) = args.out_json {
        paths.out_json = p;
    }
    if let Some(p) = args.out_html {
        paths.out_html = p;
    }
    if let Some(p) = args.history_dir {
        paths.history_dir = p;
    }

    info!(
        "starting run input={} history={} delay_s={} locale={} config_hash={}",
        paths.input.display(),
        paths.history_dir.display(),
        cfg.request_delay_secs,
        cfg.locale,
        config_hash
    );
    if cfg.api_key.is_empty() {
        info!("no API key configured; using the unauthenticated quota");
    }

    let client = PsiClient::new(
        &cfg.api_key,
        &cfg.locale,
        Duration::from_secs(cfg.request_timeout_secs),
    )?
    .with_endpoint(&cfg.psi_endpoint);
    let notifier = if args.no_notify {
        None
    } else {
        Some(Notifier::from_config(&cfg.notify)?)
    };

    let report = pipeline::run_monitor(cfg, config_hash, &paths, &client, notifier.as_ref())?;
    if report.status == RunStatus::Failed {
        warn!("every check failed; see the error column in {}", paths.out_csv.display());
    }
    info!(
        "{} updated ({} records); dashboard at {}",
        paths.history_dir.join(HEAD_FILE).display(),
        report.history.head_count,
        paths.out_html.display()
    );
    Ok(())
}

fn parse_instant(raw: Option<&str>, flag: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("{flag} must be an RFC 3339 instant, got {s:?}"))
    })
    .transpose()
}

fn notify(cfg: &Config, args: NotifyArgs) -> Result<()> {
    let started_at = parse_instant(args.started_at.as_deref(), "--started-at")?;
    let finished_at = parse_instant(args.finished_at.as_deref(), "--finished-at")?;

    let notifier = Notifier::from_config(&cfg.notify)?;
    let notice = RunNotice::new(&args.status).with_window(started_at, finished_at);
    if !notifier.notify(&notice) {
        warn!("notification not delivered");
    }
    Ok(())
}

fn trends(cfg: &Config, args: TrendArgs) -> Result<()> {
    let dir = args.history_dir.unwrap_or_else(|| cfg.history.dir.clone());
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());

    let records = trends::load_history(&dir, today);
    info!("loaded {} history records from {}", records.len(), dir.display());

    let query = TrendQuery {
        url: args.url,
        metric: util::metric_from_cli(args.metric),
        strategy: util::strategy_from_cli(args.strategy),
        date: args.date,
        month: args.month,
    };
    let out = serde_json::json!({
        "selectors": trends::selectors(&records),
        "chart": trends::build_chart(&records, &query),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
