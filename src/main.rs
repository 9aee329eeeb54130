mod engine;
mod models;
mod storage;
mod types;

use std::fs::File;
use std::io::{stderr, stdout, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::{UploadError, UploadService};
use crate::models::UploadResult;
use crate::storage::{load_accounts, AccountStorage};

const CANCELED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: meter-reading-ingest [accounts].csv [readings].csv [log_level:optional] > [result].json");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let accounts_path = &args[1];
    let readings_path = &args[2];
    let log_level = args.get(3)
        .map(|s| parse_log_level(s)).unwrap_or_else(|| LevelFilter::ERROR);

    setup_logging(log_level);

    let storage = Arc::new(AccountStorage::new());
    let accounts_file = File::open(accounts_path)
        .with_context(|| format!("Error opening accounts CSV at path: {accounts_path}"))?;
    load_accounts(&storage, BufReader::new(accounts_file))?;

    let readings_file = File::open(readings_path)
        .with_context(|| format!("Error opening readings CSV at path: {readings_path}"))?;
    let file_name = Path::new(readings_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| readings_path.clone());

    let cancellation = CancellationToken::new();
    spawn_interrupt_listener(cancellation.clone());

    let service = UploadService::new(Arc::new(storage.unit_of_work()));

    let timer = Instant::now();
    let outcome = service.process_upload(BufReader::new(readings_file), &file_name, &cancellation).await;
    let duration = timer.elapsed();

    info!("Processed upload in: {duration:?}");

    match outcome {
        Ok(result) => write_result_to_stdout(&result)?,
        Err(UploadError::Canceled { file_name }) => {
            eprintln!("Upload of [{file_name}] was canceled, nothing was saved");
            exit(CANCELED_EXIT_CODE);
        }
        Err(error) => return Err(error.into())
    }

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the upload result, logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn spawn_interrupt_listener(cancellation: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, canceling upload");
            cancellation.cancel();
        }
    });
}

fn write_result_to_stdout(result: &UploadResult) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    serde_json::to_writer_pretty(&mut output, result)?;
    writeln!(output)?;

    output.flush()?;

    Ok(())
}
