mod args;
mod practice;

use std::sync::Arc;

use services::{
    AnalyticsConfig, ApiConfig, AppServices, Clock, HistoryPage, StaticTokenProvider,
    TokenProvider,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use args::{Args, Command, prepare_sqlite_file, print_usage};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // The saved-interview store is opened here so the library crates never touch the filesystem.
    prepare_sqlite_file(&parsed.db_url)?;

    let api = parsed
        .api_url
        .map_or_else(ApiConfig::from_env, ApiConfig::new);
    let tokens: Arc<dyn TokenProvider> = match parsed.token {
        Some(token) => Arc::new(StaticTokenProvider::new(Some(token))),
        None => Arc::new(StaticTokenProvider::from_env()),
    };
    info!(api = %api.base_url, db = %parsed.db_url, "starting");
    if parsed.command != Command::Saved && !tokens.is_authenticated() {
        warn!("no API token configured; set INTERVIEW_API_TOKEN or pass --token");
    }

    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::default_clock(),
        api,
        tokens,
        AnalyticsConfig::from_env(),
    )
    .await?;
    let interviews = services.interviews();

    match parsed.command {
        Command::Practice => {
            practice::run(&interviews, &services.analytics(), parsed.draft).await
        }
        Command::History => {
            print_history(&interviews.history().await?);
            Ok(())
        }
        Command::Saved => {
            let records = interviews.saved_interviews().await?;
            if records.is_empty() {
                println!("No saved interviews.");
            }
            for record in records {
                println!(
                    "{}  {}  {}  score {:.1}  ({} questions, {} min)",
                    record.completed_at.format("%Y-%m-%d %H:%M"),
                    record.session_id,
                    record.company_name,
                    record.feedback.overall_score,
                    record.questions.len(),
                    record.duration
                );
            }
            Ok(())
        }
    }
}

fn print_history(page: &HistoryPage) {
    println!("{} interviews", page.count);
    for entry in &page.history {
        let created = entry
            .created_at_utc()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let score = entry
            .overall_score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{created}  {}  {}  {}/{}  {}  score {score}",
            entry.session_id,
            entry.company_name,
            entry.interview_type,
            entry.difficulty,
            entry.status
        );
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
