use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, instrument, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, Layer};

mod error_log;
mod handlers;
mod router;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "mp4-meta-server")]
struct Args {
    /// Port to listen on, all interfaces.
    #[arg(short, long, default_value_t = 4000)]
    port: u16,
    /// Log verbosity for the tracing subscriber.
    #[arg(short, long, default_value = "info")]
    log_level: LogLevel,
    /// Append-only log file for failed requests.
    #[arg(long, default_value = "logs/errors.log")]
    error_log: PathBuf,
}

/// Stdout layer at the CLI-selected level, plus a second layer writing only
/// `ERROR`-level spans/events to the append-only error log — so every
/// failed request lands there, not just the ones the handler explicitly
/// writes out.
#[instrument(skip_all)]
fn init_tracing(log_level: LogLevel, error_file: std::fs::File) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(match log_level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        });

    let error_file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(move || error_file.try_clone().expect("error log handle"))
        .with_filter(LevelFilter::ERROR);

    let subscriber = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(error_file_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set global default subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let error_file = error_log::open(&args.error_log)?;
    init_tracing(args.log_level, error_file);
    info!(?args, "starting mp4-meta-server");

    let app = router::create_router();

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind to {addr}: {e}"))?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
