//! CSV I/O - Load and save data from/to CSV files
//!
//! Input fixtures for the replay binary and the final balance dump.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::account::{Account, InMemoryAccountStore};
use crate::core_types::Amount;
use crate::transfer::TransferRequest;

// ============================================================
// Constants for file paths
// ============================================================

pub const ACCOUNTS_INIT_CSV: &str = "fixtures/accounts_init.csv";
pub const TRANSFERS_CSV: &str = "fixtures/transfers.csv";
pub const BALANCES_FINAL_CSV: &str = "balances_final.csv";

// ============================================================
// Loading
// ============================================================

/// Load accounts from CSV. Format: `account_id,balance` with a header row.
pub fn load_accounts(path: impl AsRef<Path>) -> Result<Vec<Account>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_accounts(BufReader::new(file))
}

/// Load transfer requests from CSV.
/// Format: `from_account_id,to_account_id,amount` with a header row.
pub fn load_transfers(path: impl AsRef<Path>) -> Result<Vec<TransferRequest>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_transfers(BufReader::new(file))
}

fn parse_accounts(reader: impl BufRead) -> Result<Vec<Account>> {
    let mut accounts = Vec::new();
    for (line_num, line) in reader.lines().skip(1).enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        anyhow::ensure!(
            parts.len() >= 2,
            "Expected account_id,balance at line {}",
            line_num + 2
        );
        let balance: Amount = parts[1]
            .parse()
            .with_context(|| format!("Invalid balance at line {}", line_num + 2))?;
        let account = Account::with_balance(parts[0], balance)
            .with_context(|| format!("Invalid account at line {}", line_num + 2))?;
        accounts.push(account);
    }
    Ok(accounts)
}

fn parse_transfers(reader: impl BufRead) -> Result<Vec<TransferRequest>> {
    let mut transfers = Vec::new();
    for (line_num, line) in reader.lines().skip(1).enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        anyhow::ensure!(
            parts.len() >= 3,
            "Expected from_account_id,to_account_id,amount at line {}",
            line_num + 2
        );
        let amount: Amount = parts[2]
            .parse()
            .with_context(|| format!("Invalid amount at line {}", line_num + 2))?;
        transfers.push(TransferRequest::new(parts[0], parts[1], amount));
    }
    Ok(transfers)
}

// ============================================================
// Output
// ============================================================

/// Write `account_id,balance` for every account, sorted by ID.
pub fn dump_balances(store: &InMemoryAccountStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_balances(store, BufWriter::new(file))
}

fn write_balances(store: &InMemoryAccountStore, mut out: impl Write) -> Result<()> {
    writeln!(out, "account_id,balance")?;
    for (account_id, balance) in store.snapshot() {
        writeln!(out, "{},{}", account_id, balance)?;
    }
    out.flush()?;
    Ok(())
}
