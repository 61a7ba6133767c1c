//! money_transfer - Concurrent account transfer replay
//!
//! Loads accounts and a batch of transfers from CSV, replays the batch on a
//! pool of worker threads against one shared engine, then checks
//! conservation and writes the final balances.
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌────────────────┐    ┌──────────┐
//! │  Config  │───▶│ AccountStore │───▶│ TransferEngine │───▶│  Output  │
//! │  (YAML)  │    │    (CSV)     │    │ (N threads)    │    │ CSV/JSON │
//! └──────────┘    └──────────────┘    └────────────────┘    └──────────┘
//! ```
//!
//! Flags: `--env <name>` (config/<name>.yaml), `--input <dir>` (fixture
//! directory), `--threads <n>` (worker override).

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use money_transfer::account::{AccountStore, InMemoryAccountStore};
use money_transfer::config::AppConfig;
use money_transfer::csv_io::{self, BALANCES_FINAL_CSV};
use money_transfer::notification::{FanoutNotifier, LogNotifier, Notifier, QueueNotifier};
use money_transfer::replay_runner::run_replay;
use money_transfer::transfer::TransferEngine;

// ============================================================
// COMMAND LINE
// ============================================================

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn get_env() -> String {
    get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Fixture directory override: replaces the directory part of both CSV paths
fn get_input_dir() -> Option<String> {
    get_arg(&["--input"])
}

fn get_threads_override() -> Option<usize> {
    get_arg(&["--threads"]).and_then(|v| v.parse().ok())
}

fn in_dir(dir: &str, configured: &str) -> String {
    let file_name = Path::new(configured)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| configured.to_string());
    Path::new(dir).join(file_name).to_string_lossy().into_owned()
}

// ============================================================
// MAIN
// ============================================================

fn main() -> Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = money_transfer::logging::init_logging(&app_config);

    tracing::info!("Starting money_transfer replay in {} mode", env);

    let mut replay = app_config.replay.clone();
    if let Some(dir) = get_input_dir() {
        replay.accounts_csv = in_dir(&dir, &replay.accounts_csv);
        replay.transfers_csv = in_dir(&dir, &replay.transfers_csv);
    }
    if let Some(threads) = get_threads_override() {
        replay.worker_threads = threads.max(1);
    }

    // Seed the store
    let store = Arc::new(InMemoryAccountStore::new());
    let accounts = csv_io::load_accounts(&replay.accounts_csv)?;
    for account in accounts {
        store.insert(account)?;
    }
    let transfers = csv_io::load_transfers(&replay.transfers_csv)?;
    println!(
        "Loaded {} accounts from {}, {} transfers from {}",
        store.len(),
        replay.accounts_csv,
        transfers.len(),
        replay.transfers_csv
    );

    // Engine shares the store; notifications go to the log and a queue
    let queue = Arc::new(QueueNotifier::new(replay.notification_capacity));
    let notifier: Arc<dyn Notifier> = Arc::new(FanoutNotifier::new(vec![
        Arc::new(LogNotifier) as Arc<dyn Notifier>,
        queue.clone(),
    ]));
    let engine = TransferEngine::new(store.clone(), notifier);

    println!("Replaying on {} worker threads...", replay.worker_threads);
    let summary = run_replay(&engine, &store, &transfers, replay.worker_threads);

    println!("\n=== Replay Summary ===");
    println!("Submitted:   {}", summary.submitted);
    println!("Succeeded:   {}", summary.succeeded);
    let mut codes: Vec<_> = summary.rejected.iter().collect();
    codes.sort();
    for (code, count) in codes {
        println!("Rejected:    {} x {}", count, code);
    }
    println!(
        "Total:       {} -> {}",
        summary.total_before, summary.total_after
    );
    println!(
        "Notifications: {} queued, {} dropped",
        queue.len(),
        queue.dropped()
    );
    println!("Elapsed:     {} ms", summary.elapsed_ms);

    // Output
    fs::create_dir_all(&replay.output_dir)
        .with_context(|| format!("Failed to create {}", replay.output_dir))?;
    let balances_path = Path::new(&replay.output_dir).join(BALANCES_FINAL_CSV);
    csv_io::dump_balances(&store, &balances_path)?;
    let summary_path = Path::new(&replay.output_dir).join("summary.json");
    serde_json::to_writer_pretty(
        File::create(&summary_path)
            .with_context(|| format!("Failed to create {}", summary_path.display()))?,
        &summary,
    )?;
    println!("Final balances written to {}", balances_path.display());

    anyhow::ensure!(
        summary.is_conserved(),
        "Conservation violated: total {} -> {}",
        summary.total_before,
        summary.total_after
    );
    Ok(())
}
