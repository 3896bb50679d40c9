use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use importer::{
    ApiConfig, AttendeeApi, EventsApiClient, ExistingRecordIndex, Health, ImportBatchJob,
    ImportReport, IndexSource, RetryPolicy, RowValidator, SubmitConfig, ValidationOutcome,
    config::{
        DEFAULT_BASE_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_INDEX_PAGE_SIZE,
        DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS,
    },
    spreadsheet,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "import")]
#[command(about = "Bulk attendee import for the events backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "EVENTS_API_URL")]
    api_url: String,

    #[arg(long, env = "EVENTS_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the events attendees can be imported into
    Events,
    /// Parse and validate a file without writing anything
    Check {
        file: PathBuf,

        #[arg(long)]
        event: i64,

        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Validate a file, then create every valid attendee
    Run {
        file: PathBuf,

        #[arg(long)]
        event: i64,

        #[command(flatten)]
        submit: SubmitArgs,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SubmitArgs {
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_BASE_DELAY_MS)]
    base_delay_ms: u64,
}

impl From<SubmitArgs> for SubmitConfig {
    fn from(args: SubmitArgs) -> Self {
        SubmitConfig {
            batch_size: args.batch_size,
            concurrency: args.concurrency,
            retry: RetryPolicy::new(args.max_attempts, Duration::from_millis(args.base_delay_ms)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("import={},importer={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_config = ApiConfig::new(cli.api_url, Duration::from_secs(cli.timeout_secs));
    let client = EventsApiClient::new(&api_config)?;

    match cli.command {
        Commands::Events => {
            handle_events(&client).await?;
        }
        Commands::Check {
            file,
            event,
            report,
        } => {
            handle_check(&client, &file, event, report.as_deref()).await?;
        }
        Commands::Run {
            file,
            event,
            submit,
            yes,
            report,
        } => {
            handle_run(&client, &file, event, submit.into(), yes, report.as_deref()).await?;
        }
    }

    Ok(())
}

async fn handle_events(api: &dyn AttendeeApi) -> Result<(), Box<dyn std::error::Error>> {
    let events = api.list_events().await?;

    if events.is_empty() {
        tracing::warn!("No events found");
        return Ok(());
    }

    tracing::info!("Available events:");
    for event in events {
        tracing::info!("  - {} {}", event.id_event, event.name);
    }

    Ok(())
}

/// Reads the file and validates it against what is registered for `event_id`.
async fn load_and_validate(
    api: &dyn AttendeeApi,
    file: &Path,
    event_id: i64,
) -> Result<ValidationOutcome, Box<dyn std::error::Error>> {
    tracing::info!("Loading attendees from: {}", file.display());
    let sheet = spreadsheet::read_path(file).await?;
    tracing::info!(
        "Read {} column(s) and {} data line(s)",
        sheet.headers.len(),
        sheet.rows.len()
    );

    let index = ExistingRecordIndex::fetch(api, event_id, DEFAULT_INDEX_PAGE_SIZE).await;
    if index.source() == IndexSource::Unavailable {
        tracing::warn!("Continuing without checking attendees already registered for the event");
    }

    let outcome = RowValidator::new(&index).validate_sheet(&sheet);
    log_summary(&outcome);
    outcome.log_issues();

    Ok(outcome)
}

fn log_summary(outcome: &ValidationOutcome) {
    let stats = &outcome.stats;
    tracing::info!(
        "Validation {}: {} row(s), {} valid, {} with errors ({} repeated in file, {} already registered)",
        outcome.health,
        stats.total,
        stats.ok,
        stats.fail,
        stats.in_file_duplicates,
        stats.already_registered
    );
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn handle_check(
    api: &dyn AttendeeApi,
    file: &Path,
    event_id: i64,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = load_and_validate(api, file, event_id).await?;

    if let Some(path) = report_path {
        ImportReport::new(Uuid::new_v4(), file_name(file), &outcome)
            .write_to(path)
            .await?;
    }

    if outcome.health == Health::Err {
        return Err(format!(
            "missing required column(s): {}",
            outcome.stats.missing_headers.join(", ")
        )
        .into());
    }

    tracing::info!("✓ {} row(s) ready to import", outcome.stats.ok);
    Ok(())
}

async fn handle_run(
    api: &dyn AttendeeApi,
    file: &Path,
    event_id: i64,
    config: SubmitConfig,
    yes: bool,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = load_and_validate(api, file, event_id).await?;
    let items = outcome.job_items()?;

    if items.is_empty() {
        tracing::warn!("Nothing to import: no valid rows");
        return Ok(());
    }

    let job = ImportBatchJob::new(items, config)?;
    let mut report = ImportReport::new(job.id(), file_name(file), &outcome);

    if !yes {
        let prompt = format!("Create {} attendee(s) in event {}?", job.len(), event_id);
        let confirmed = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact()
        })
        .await??;
        if !confirmed {
            tracing::info!("Import aborted");
            return Ok(());
        }
    }

    let cancel = job.cancel_flag();
    let signal_watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancelling: waiting for requests in flight to finish...");
            cancel.cancel();
        }
    });

    let mut last_logged = 0;
    let summary = job
        .run(api, |progress| {
            let percent = progress.percent();
            if percent >= last_logged + 10 || progress.done == progress.total {
                last_logged = percent;
                tracing::info!(
                    "[batch {}/{}] {}/{} ({}%) ok={} fail={}",
                    progress.batch,
                    progress.batches,
                    progress.done,
                    progress.total,
                    percent,
                    progress.ok,
                    progress.fail
                );
            }
        })
        .await;
    signal_watcher.abort();

    if summary.any_success() {
        let index = ExistingRecordIndex::fetch(api, event_id, DEFAULT_INDEX_PAGE_SIZE).await;
        tracing::info!(
            "Event {} now has {} registered email(s)",
            event_id,
            index.email_count()
        );
    }

    let complete = summary.is_complete_success();
    let failed = summary.failed;
    report = report.with_submission(summary);
    if let Some(path) = report_path {
        report.write_to(path).await?;
    }

    if failed > 0 {
        return Err(format!("{} attendee(s) could not be created", failed).into());
    }
    if complete {
        tracing::info!("✓ Import completed successfully!");
    }

    Ok(())
}
