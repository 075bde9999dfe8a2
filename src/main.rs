use analytics::AggregationSpec;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{LogLevel, Settings};
use core_types::Platform;
use database::{InMemorySnapshotStore, PgSnapshotStore, SnapshotStore};
use std::path::PathBuf;
use uuid::Uuid;

mod render;

/// Platforms a goal can read from: commerce and analytics for the metric, ads for spend.
const GOAL_PLATFORMS: [Platform; 3] = [
    Platform::WooCommerce,
    Platform::GoogleAnalytics,
    Platform::FacebookAds,
];

/// The main entry point for the Pulse reporting tool.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file when present
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        settings.logging.level = level;
    }
    if let Some(fixture) = &cli.fixture {
        settings.store.fixture = Some(fixture.clone());
    }

    let _guard = configuration::init_tracing(&settings.logging)?;
    let store = open_store(&settings).await?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, store.as_ref(), &settings).await,
        Commands::Goals(args) => handle_goals(args, store.as_ref()).await,
        Commands::Export(args) => handle_export(args, store.as_ref(), &settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Cross-platform marketing and commerce reporting from integration snapshots.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to read instead of `config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve snapshots from a JSON fixture instead of the database.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Overrides the configured log level.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print period totals, efficiency ratios and top products.
    Report(ReportArgs),
    /// Print progress and pacing for every goal of a client.
    Goals(GoalsArgs),
    /// Write one month of the daily series as CSV.
    Export(ExportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    #[arg(long)]
    client: Uuid,

    /// First day of the period (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the period, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Adds a today-against-yesterday comparison anchored on this day.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Parser)]
struct GoalsArgs {
    #[arg(long)]
    client: Uuid,

    /// Evaluation day; defaults to the local date.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Parser)]
struct ExportArgs {
    #[arg(long)]
    client: Uuid,

    /// The month to export (format: YYYY-MM).
    #[arg(long, value_parser = parse_month)]
    month: (i32, u32),

    /// Destination file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{value}'"))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year in '{value}'"))?;
    let month: u32 = month.parse().map_err(|_| format!("invalid month in '{value}'"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be between 01 and 12, got '{value}'"));
    }
    Ok((year, month))
}

async fn open_store(settings: &Settings) -> Result<Box<dyn SnapshotStore>> {
    match &settings.store.fixture {
        Some(path) => {
            let store = InMemorySnapshotStore::load(path)
                .await
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Ok(Box::new(store))
        }
        None => {
            let pool = database::connect().await.context("Failed to connect to the database")?;
            Ok(Box::new(PgSnapshotStore::new(pool)))
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_report(
    args: ReportArgs,
    store: &dyn SnapshotStore,
    settings: &Settings,
) -> Result<()> {
    tracing::info!(
        client = %args.client,
        from = %args.from,
        to = %args.to,
        "Building period report"
    );

    let snapshots = store.query_snapshots(args.client, args.from, args.to, None).await?;
    let reconciled = analytics::reconcile(&snapshots);
    // Every platform goes into the series so ratios see spend and revenue even when
    // the report itself shows fewer platforms.
    let series = analytics::build_daily_series(&reconciled, args.from, args.to, &Platform::ALL)?;

    let spec = AggregationSpec {
        platforms: settings.report.platforms.clone(),
        top_products: Some(settings.report.top_products),
        today: args.today,
    };
    let report = analytics::aggregate_period(&series, &spec);

    println!("Period {} .. {} ({} days)", report.start, report.end, report.days);
    println!("{}", render::period_table(&report, &spec.platforms));
    println!("\nEfficiency");
    println!("{}", render::ratios_table(&report.ratios));

    if report.top_products.is_empty() {
        println!("\nNo product sales in this period.");
    } else {
        println!("\nTop products");
        println!("{}", render::products_table(&report.top_products));
    }

    if let (Some(today), Some(yesterday)) = (&report.today, &report.yesterday) {
        println!("\nDay over day");
        println!("{}", render::day_over_day_table(today, yesterday, &spec.platforms));
    }

    Ok(())
}

async fn handle_goals(args: GoalsArgs, store: &dyn SnapshotStore) -> Result<()> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let goals = store.get_goals(args.client).await?;
    if goals.is_empty() {
        println!("No goals defined for client {}.", args.client);
        return Ok(());
    }
    let monthly_expenses = store.get_monthly_expenses(args.client).await?;

    let mut rows = Vec::with_capacity(goals.len());
    for goal in &goals {
        let snapshots = store
            .query_snapshots(args.client, goal.start_date, goal.end_date, Some(&GOAL_PLATFORMS[..]))
            .await?;
        let reconciled = analytics::reconcile(&snapshots);
        let series = match analytics::build_daily_series(
            &reconciled,
            goal.start_date,
            goal.end_date,
            &GOAL_PLATFORMS,
        ) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(goal = %goal.id, error = %e, "Skipping goal");
                continue;
            }
        };
        let facebook = series.restrict_to(Platform::FacebookAds);

        match analytics::compute_goal_progress(goal, &series, &facebook, monthly_expenses, today) {
            Ok(progress) => rows.push((goal, progress)),
            Err(e) => tracing::warn!(goal = %goal.id, error = %e, "Skipping goal"),
        }
    }

    println!("Goals as of {today}");
    println!("{}", render::goals_table(&rows));
    Ok(())
}

async fn handle_export(
    args: ExportArgs,
    store: &dyn SnapshotStore,
    settings: &Settings,
) -> Result<()> {
    let (year, month) = args.month;
    let (start, end) = analytics::month_range(year, month)?;
    let platforms = &settings.report.platforms;

    let snapshots = store
        .query_snapshots(args.client, start, end, Some(platforms.as_slice()))
        .await?;
    let reconciled = analytics::reconcile(&snapshots);
    let series = analytics::build_daily_series(&reconciled, start, end, platforms)?;
    let csv = render::csv(&series.table())?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, csv)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), days = series.len(), "Exported daily series");
        }
        None => print!("{csv}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_argument_parses() {
        assert_eq!(parse_month("2025-02"), Ok((2025, 2)));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("202502").is_err());
        assert!(parse_month("2025-xx").is_err());
    }

    #[test]
    fn cli_accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pulse",
            "export",
            "--client",
            "7b0e7f9e-3c57-4a53-9d55-0d7f3a1b2c01",
            "--month",
            "2025-01",
            "--fixture",
            "fixtures/demo.json",
        ])
        .unwrap();
        assert!(cli.fixture.is_some());
        assert!(matches!(cli.command, Commands::Export(ExportArgs { month: (2025, 1), .. })));
    }
}
