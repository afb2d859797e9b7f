//! Command-line entry point for the outcome atlas store.
//!
//! # Responsibility
//! - Read configuration from the environment and open the SQLite store.
//! - Expose seeding, dashboard/brief rendering, export, check-ins and raw
//!   endpoint submissions.
//! - Route dashboards and check-ins through the local cache when
//!   `OUTCOME_ATLAS_CACHE_PATH` is set, reconciling into the store.
//! - Keep output deterministic for a fixed `--today`.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{error, info};
use outcome_atlas_core::metrics::Dashboard;
use outcome_atlas_core::{
    init_logging_from_config, open_db, ApiRequest, AtlasApi, AtlasConfig, AtlasService, CheckIn,
    EndpointRemote, Momentum, Outcome, OutcomeFilter, RemoteStore, SortKey, SyncSession,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "outcome-atlas")]
#[command(about = "Outcome tracking dashboard over a local SQLite store")]
struct Cli {
    /// Day the derived metrics are computed against (defaults to local today)
    #[arg(long, global = true, env = "OUTCOME_ATLAS_TODAY")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upsert the demo dataset
    Seed,
    /// Print the derived dashboard for a filter selection
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the plain-text executive brief
    Brief {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Write stored outcomes as pretty JSON
    Export {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Record a check-in and move its outcome
    Checkin {
        #[arg(long)]
        outcome: Uuid,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        delta: i32,
        /// Up, Steady or Down
        #[arg(long, default_value = "Steady")]
        momentum: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        next_step: Option<String>,
    },
    /// POST a JSON body to an endpoint such as `/api/outcomes`
    Submit {
        path: String,
        /// JSON body; `-` reads it from stdin
        #[arg(default_value = "{}")]
        body: String,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    category: String,
    #[arg(long, default_value = "all")]
    status: String,
    /// confidence or recency
    #[arg(long, default_value = "confidence")]
    sort: SortKey,
}

impl FilterArgs {
    fn to_filter(&self) -> OutcomeFilter {
        OutcomeFilter::from_selectors(&self.search, &self.category, &self.status, self.sort)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = AtlasConfig::from_env()?;
    init_logging_from_config(&config)?;

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    match cli.command {
        Command::Seed => {
            let mut conn = open_db(&config.db_path)?;
            let summary = AtlasService::new(&mut conn).seed_demo()?;
            println!(
                "seeded outcomes={} checkins={} story_beats={}",
                summary.outcomes, summary.checkins, summary.story_beats
            );
        }
        Command::Dashboard { filter } => {
            let dashboard = dashboard(&config, &filter.to_filter(), today)?;
            print_dashboard(&dashboard);
        }
        Command::Brief { filter } => {
            let dashboard = dashboard(&config, &filter.to_filter(), today)?;
            println!("{}", dashboard.brief);
        }
        Command::Export { out } => {
            let mut conn = open_db(&config.db_path)?;
            let json = AtlasService::new(&mut conn).export_json()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Checkin {
            outcome,
            delta,
            momentum,
            date,
            note,
            next_step,
        } => {
            let momentum = Momentum::parse(&momentum)
                .ok_or_else(|| format!("unsupported momentum `{momentum}`"))?;
            let mut checkin = CheckIn::new(outcome, delta, momentum);
            checkin.update_date = Some(date.unwrap_or(today));
            checkin.note = note;
            checkin.next_step = next_step;

            let updated = record_checkin(&config, checkin)?;
            println!(
                "{} confidence={} date={}",
                updated.title,
                updated.confidence,
                updated
                    .last_updated
                    .map(|day| day.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        Command::Submit { path, body } => submit(&config, &path, &body)?,
    }

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

/// Local-first session over the cache file, reconciling into the store.
/// `None` when no cache path is configured.
fn open_session(config: &AtlasConfig) -> Result<Option<SyncSession>, Box<dyn Error>> {
    let Some(cache_path) = config.cache_path.clone() else {
        return Ok(None);
    };

    let api = AtlasApi::new(open_db(&config.db_path)?);
    let remote: Arc<dyn RemoteStore> = Arc::new(EndpointRemote::new(api));
    let session = SyncSession::initialize(Some(cache_path), Some(remote))?;
    info!(
        "event=cli_session module=cli status=ok sync=\"{}\"",
        session.indicator().label()
    );
    Ok(Some(session))
}

fn dashboard(
    config: &AtlasConfig,
    filter: &OutcomeFilter,
    today: NaiveDate,
) -> Result<Dashboard, Box<dyn Error>> {
    if let Some(session) = open_session(config)? {
        return Ok(session.state().dashboard(filter, today));
    }

    let mut conn = open_db(&config.db_path)?;
    Ok(AtlasService::new(&mut conn).dashboard(filter, today)?)
}

fn record_checkin(config: &AtlasConfig, checkin: CheckIn) -> Result<Outcome, Box<dyn Error>> {
    if let Some(mut session) = open_session(config)? {
        let updated = session.commit_checkin(checkin)?;
        session.reconcile();
        println!("{}", session.indicator().label());
        return Ok(updated);
    }

    let mut conn = open_db(&config.db_path)?;
    let receipt = AtlasService::new(&mut conn).record_checkin(&checkin)?;
    Ok(receipt.outcome)
}

fn submit(config: &AtlasConfig, path: &str, body: &str) -> Result<(), Box<dyn Error>> {
    let body = if body == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        body.to_string()
    };

    let api = AtlasApi::new(open_db(&config.db_path)?);
    let response = api.handle_path(path, &ApiRequest::post(body));
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        return Err(format!("request failed with status {}", response.status).into());
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let pulse = &dashboard.pulse;
    println!(
        "Pulse: {} outcomes, {} on track, {} need lift, avg confidence {:.0}%",
        pulse.total, pulse.on_track, pulse.needs_lift, pulse.average_confidence
    );

    let health = &dashboard.health.stats;
    println!(
        "Health: {}% evidence coverage, {} stale, {} low confidence",
        health.coverage_percent, health.stale, health.low_confidence
    );
    for item in &dashboard.health.queue {
        println!("  [{}] {} ({})", item.tag.as_str(), item.title, item.owner);
    }

    let cadence = &dashboard.cadence;
    println!(
        "Cadence: {} overdue, {} due this week, {} due this month",
        cadence.overdue, cadence.due_within_week, cadence.due_within_month
    );
    for entry in &cadence.entries {
        println!(
            "  {} due {} ({})",
            entry.title,
            entry.due_date,
            entry.cadence_label()
        );
    }

    println!(
        "Owners: {} owners, {} with risk",
        dashboard.owner_load.owner_count, dashboard.owner_load.owners_at_risk
    );
    for entry in &dashboard.owner_load.entries {
        println!(
            "  {} total={} at_risk={} avg={}%",
            entry.owner, entry.total, entry.at_risk, entry.average_confidence
        );
    }

    println!("Momentum: {} tracked", dashboard.momentum.tracked);
    for signal in &dashboard.momentum.signals {
        println!(
            "  {} net={:+} up={} down={}",
            signal.title, signal.net_delta, signal.up, signal.down
        );
    }

    println!("Risk: {} flagged", dashboard.risk.flagged);
    for entry in &dashboard.risk.entries {
        println!(
            "  {} score={} [{}]",
            entry.title,
            entry.score,
            entry.flag_labels().join(", ")
        );
    }
}
