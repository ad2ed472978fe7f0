use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use groupscholar_student_deadlines::deadlines::{self, AggregatorOptions, CompletedView};
use groupscholar_student_deadlines::snapshot::{self, Snapshot};
use groupscholar_student_deadlines::models::DeadlineItem;
use groupscholar_student_deadlines::{db, report};

const PAST_EVENT_LOOKBACK_DAYS: i64 = 30;

#[derive(Parser)]
#[command(name = "student-deadlines")]
#[command(about = "Student dashboard todo list for Group Scholar", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import assignments or events from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: db::ImportKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// List the current worklist for a student
    #[command(group(
        ArgGroup::new("source")
            .args(["email", "snapshot"])
            .required(true)
            .multiple(false)
    ))]
    Deadlines {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        show_completed: bool,
        #[arg(long)]
        admit_all_past: bool,
        /// Evaluate as of this RFC 3339 timestamp instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i64).range(1..))]
        event_limit: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print the first `--limit` items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("source")
            .args(["email", "snapshot"])
            .required(true)
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        show_completed: bool,
        #[arg(long)]
        admit_all_past: bool,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i64).range(1..))]
        event_limit: i64,
        #[arg(long, default_value = "deadlines.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, kind, &csv).await?;
            println!("Inserted {inserted} rows from {}.", csv.display());
        }
        Commands::Deadlines {
            email,
            snapshot,
            show_completed,
            admit_all_past,
            at,
            event_limit,
            limit,
            json,
        } => {
            let now = at.unwrap_or_else(Utc::now);
            let inputs = load_inputs(
                email.as_deref(),
                snapshot.as_deref(),
                show_completed,
                now,
                event_limit,
            )
            .await?;
            let items = deadlines::compute_deadlines_with(
                &inputs.assignments,
                &inputs.events,
                &inputs.submissions,
                show_completed,
                now,
                &aggregator_options(admit_all_past),
            );
            info!(items = items.len(), show_completed, "worklist computed");
            let shown = first_items(&items, limit);

            if json {
                println!("{}", serde_json::to_string_pretty(shown)?);
                return Ok(());
            }

            if shown.is_empty() {
                println!("Nothing due in this window.");
                return Ok(());
            }

            println!("Upcoming deadlines:");
            for item in shown {
                println!("- {}", report::format_item(item));
            }
        }
        Commands::Report {
            email,
            snapshot,
            show_completed,
            admit_all_past,
            at,
            event_limit,
            out,
        } => {
            let now = at.unwrap_or_else(Utc::now);
            let inputs = load_inputs(
                email.as_deref(),
                snapshot.as_deref(),
                show_completed,
                now,
                event_limit,
            )
            .await?;
            let items = deadlines::compute_deadlines_with(
                &inputs.assignments,
                &inputs.events,
                &inputs.submissions,
                show_completed,
                now,
                &aggregator_options(admit_all_past),
            );
            let report = report::build_report(email.as_deref(), show_completed, now, &items);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")?;
    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn aggregator_options(admit_all_past: bool) -> AggregatorOptions {
    AggregatorOptions {
        completed_view: if admit_all_past {
            CompletedView::AdmitAllPast
        } else {
            CompletedView::Reference
        },
        ..AggregatorOptions::default()
    }
}

async fn load_inputs(
    email: Option<&str>,
    snapshot_path: Option<&Path>,
    show_completed: bool,
    now: DateTime<Utc>,
    event_limit: i64,
) -> anyhow::Result<Snapshot> {
    if let Some(path) = snapshot_path {
        info!(path = %path.display(), "loading snapshot");
        return snapshot::load_snapshot(path);
    }

    let email = email.context("either --email or --snapshot is required")?;
    let pool = connect().await?;
    let student_id = db::find_student_id(&pool, email).await?;
    let windows = EventWindows::new(now, show_completed, &AggregatorOptions::default());

    Ok(fetch_inputs(&pool, student_id, &windows, event_limit).await)
}

fn first_items(items: &[DeadlineItem], limit: usize) -> &[DeadlineItem] {
    &items[..items.len().min(limit)]
}

/// Time bands queried for events. The upcoming band is the same in both views
/// and carries its own limit, so past events never crowd it out.
#[derive(Debug, Clone, PartialEq)]
struct EventWindows {
    upcoming: (DateTime<Utc>, DateTime<Utc>),
    past: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl EventWindows {
    fn new(now: DateTime<Utc>, show_completed: bool, options: &AggregatorOptions) -> Self {
        Self {
            upcoming: (now, now + options.event_window),
            past: show_completed.then(|| (now - Duration::days(PAST_EVENT_LOOKBACK_DAYS), now)),
        }
    }
}

/// Fetches all collections at once; a failed fetch degrades to an empty list.
async fn fetch_inputs(
    pool: &PgPool,
    student_id: Uuid,
    windows: &EventWindows,
    event_limit: i64,
) -> Snapshot {
    let (from, until) = windows.upcoming;
    let past_events = async {
        match windows.past {
            Some((since, until)) => db::fetch_past_events(pool, since, until, event_limit).await,
            None => Ok(Vec::new()),
        }
    };

    let (assignments, upcoming, past, submissions) = tokio::join!(
        db::fetch_active_assignments(pool),
        db::fetch_upcoming_events(pool, from, until, event_limit),
        past_events,
        db::fetch_my_submissions(pool, student_id),
    );

    let mut events = or_empty("upcoming events", upcoming);
    events.extend(or_empty("past events", past));

    Snapshot {
        assignments: or_empty("assignments", assignments),
        events,
        submissions: or_empty("submissions", submissions),
    }
}

fn or_empty<T>(collection: &str, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(values) => {
            debug!(collection, count = values.len(), "fetched");
            values
        }
        Err(err) => {
            warn!(collection, error = %err, "fetch failed, continuing without it");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deadlines_requires_a_single_source() {
        assert!(Cli::try_parse_from(["student-deadlines", "deadlines"]).is_err());
        assert!(Cli::try_parse_from([
            "student-deadlines",
            "deadlines",
            "--email",
            "avery.lee@groupscholar.com",
            "--snapshot",
            "dash.json",
        ])
        .is_err());
    }

    #[test]
    fn at_parses_rfc3339() {
        let cli = Cli::try_parse_from([
            "student-deadlines",
            "deadlines",
            "--snapshot",
            "dash.json",
            "--at",
            "2026-03-02T12:00:00Z",
            "--show-completed",
        ])
        .unwrap();
        match cli.command {
            Commands::Deadlines {
                at, show_completed, ..
            } => {
                assert_eq!(at, Some("2026-03-02T12:00:00Z".parse().unwrap()));
                assert!(show_completed);
            }
            _ => panic!("expected deadlines command"),
        }
    }

    #[test]
    fn failed_fetch_degrades_to_empty() {
        let failed: anyhow::Result<Vec<i64>> = Err(anyhow::anyhow!("connection reset"));
        assert!(or_empty("events", failed).is_empty());
        assert_eq!(or_empty("events", Ok(vec![1, 2])), vec![1, 2]);
    }

    #[test]
    fn showing_completed_keeps_the_upcoming_event_band() {
        let now: DateTime<Utc> = "2026-03-02T12:00:00Z".parse().unwrap();
        let options = AggregatorOptions::default();

        let current = EventWindows::new(now, false, &options);
        let completed = EventWindows::new(now, true, &options);

        assert_eq!(current.upcoming, (now, now + Duration::days(7)));
        assert_eq!(completed.upcoming, current.upcoming);
        assert_eq!(current.past, None);
        assert_eq!(completed.past, Some((now - Duration::days(30), now)));
    }

    #[test]
    fn event_limit_must_be_positive() {
        for limit in ["0", "-3"] {
            assert!(Cli::try_parse_from([
                "student-deadlines",
                "deadlines",
                "--snapshot",
                "dash.json",
                "--event-limit",
                limit,
            ])
            .is_err());
        }
        assert!(Cli::try_parse_from([
            "student-deadlines",
            "report",
            "--snapshot",
            "dash.json",
            "--event-limit",
            "1",
        ])
        .is_ok());
    }

    #[test]
    fn listing_is_capped_at_limit() {
        let now: DateTime<Utc> = "2026-03-02T12:00:00Z".parse().unwrap();
        let items: Vec<DeadlineItem> = (1..=3)
            .map(|id| DeadlineItem::Event {
                id: format!("event-{id}"),
                title: format!("Session {id}"),
                date: now + Duration::days(id),
                description: String::new(),
                event_id: id,
                event_type: groupscholar_student_deadlines::models::EventType::Class,
                is_online: true,
                location: None,
            })
            .collect();

        assert_eq!(first_items(&items, 2).len(), 2);
        assert_eq!(first_items(&items, 10).len(), 3);
        assert!(first_items(&items, 0).is_empty());
    }

    #[test]
    fn admit_all_past_flag_selects_policy() {
        assert_eq!(
            aggregator_options(true).completed_view,
            CompletedView::AdmitAllPast
        );
        assert_eq!(
            aggregator_options(false).completed_view,
            CompletedView::Reference
        );
    }
}
