// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use arewa_ledger::{AccountId, Ledger, LedgerError, OrderId, Role, TransactionKind};
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Arewa Ledger - Replay wallet and order commands
///
/// Reads ledger commands from a CSV file and writes the resulting account
/// balances (or the transaction journal) to stdout. Logs go to stderr and
/// are filtered with the AREWA_LOG environment variable.
#[derive(Parser, Debug)]
#[command(name = "arewa-ledger")]
#[command(about = "Replays wallet and order commands through the settlement ledger", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: type,id,role,customer,vendor,rider,amount,fee
    /// Example: cargo run -- commands.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// What to write to stdout
    #[arg(long, value_enum, default_value_t = Output::Accounts)]
    output: Output,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// One row per account: account,role,balance
    Accounts,
    /// Every transaction, oldest first
    Transactions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_env("AREWA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.log_format);

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            error!(path = %args.input.display(), "error opening file: {e}");
            process::exit(1);
        }
    };

    let ledger = match process_commands(BufReader::new(file)) {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("error processing commands: {e}");
            process::exit(1);
        }
    };

    let written = match args.output {
        Output::Accounts => write_accounts(&ledger, std::io::stdout()),
        Output::Transactions => write_transactions(&ledger, std::io::stdout()),
    };
    if let Err(e) = written {
        error!("error writing output: {e}");
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, id, role, customer, vendor, rider, amount, fee`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    command: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    id: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    role: Option<Role>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    customer: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vendor: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    rider: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fee: Option<Decimal>,
}

/// A ledger operation decoded from one CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Account {
        id: AccountId,
        role: Role,
    },
    Wallet {
        id: AccountId,
        amount: Decimal,
        kind: TransactionKind,
    },
    Order {
        customer: AccountId,
        vendor: AccountId,
        rider: AccountId,
        amount: Decimal,
        fee: Decimal,
    },
    Settle(OrderId),
    Deliver(OrderId),
}

impl CsvRecord {
    /// Converts a CSV record into a command.
    ///
    /// Returns `None` for unknown command types or missing required fields.
    fn into_command(self) -> Option<Command> {
        match self.command.to_lowercase().as_str() {
            "account" => Some(Command::Account {
                id: AccountId(self.id?),
                role: self.role?,
            }),
            "credit" => Some(Command::Wallet {
                id: AccountId(self.id?),
                amount: self.amount?,
                kind: TransactionKind::Credit,
            }),
            "debit" => Some(Command::Wallet {
                id: AccountId(self.id?),
                amount: self.amount?,
                kind: TransactionKind::Debit,
            }),
            "order" => Some(Command::Order {
                customer: AccountId(self.customer?),
                vendor: AccountId(self.vendor?),
                rider: AccountId(self.rider?),
                amount: self.amount?,
                fee: self.fee.unwrap_or(Decimal::ZERO),
            }),
            "settle" => Some(Command::Settle(OrderId(self.id?))),
            "deliver" => Some(Command::Deliver(OrderId(self.id?))),
            _ => None,
        }
    }
}

impl Command {
    fn apply(self, ledger: &Ledger) -> Result<(), LedgerError> {
        match self {
            Command::Account { id, role } => ledger.register_account(id, role),
            Command::Wallet { id, amount, kind } => ledger
                .apply_wallet_transaction(id, amount, kind)
                .map(|_| ()),
            Command::Order {
                customer,
                vendor,
                rider,
                amount,
                fee,
            } => ledger
                .create_order(customer, vendor, rider, amount, fee)
                .map(|_| ()),
            Command::Settle(order) => ledger.settle_order(order).map(|_| ()),
            Command::Deliver(order) => ledger.confirm_delivery(order),
        }
    }
}

/// Replays commands from a CSV reader into a fresh ledger.
///
/// Rows are streamed, so input size is not bounded by memory. Malformed rows
/// and rejected commands are skipped with a warning.
///
/// # CSV Format
///
/// Expected columns: `type, id, role, customer, vendor, rider, amount, fee`
/// - `account`: register account `id` with `role` (customer, vendor, rider)
/// - `credit` / `debit`: manual wallet transaction on account `id`
/// - `order`: place an order; orders are numbered from 1 in placement order
/// - `settle` / `deliver`: settle or confirm delivery of order `id`
///
/// # Example
///
/// ```csv
/// type,id,role,customer,vendor,rider,amount,fee
/// account,1,customer,,,,,
/// account,2,vendor,,,,,
/// account,3,rider,,,,,
/// credit,3,,,,,100.00,
/// order,,,1,2,3,1000.00,200.00
/// settle,1,,,,,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader itself fails.
pub fn process_commands<R: Read>(reader: R) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        match result {
            Ok(record) => {
                let Some(command) = record.into_command() else {
                    warn!(row, "skipping invalid command record");
                    continue;
                };

                if let Err(e) = command.apply(&ledger) {
                    warn!(row, ?command, "skipping rejected command: {e}");
                }
            }
            Err(e) => {
                if e.is_io_error() {
                    return Err(e);
                }
                warn!(row, "skipping malformed row: {e}");
            }
        }
    }

    Ok(ledger)
}

/// Writes account balances as CSV.
///
/// Columns: `account, role, balance`, ordered by account id, 4 decimal places.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_accounts<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in ledger.accounts() {
        wtr.serialize(account.as_ref())?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the transaction journal as CSV, oldest first.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_transactions<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for transaction in ledger.transactions() {
        wtr.serialize(&transaction)?;
    }

    wtr.flush()?;
    Ok(())
}
