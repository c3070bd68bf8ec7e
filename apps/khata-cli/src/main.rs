//! # khata
//!
//! Command-line front end for Khata ERP.
//!
//! ## Commands
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  offline                         online (token + tenant)               │
//! │  ───────                         ───────────────────────               │
//! │  totals  <form.json>             fetch <kind> <id>                     │
//! │  print   <form.json>             list  <kind> [--page N]               │
//! │  words   <amount>                                                      │
//! │  eval    <expr> --var k=v                                              │
//! │  payslip <structure.toml> --basic <amount>                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Results go to stdout; logs go to stderr.

mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use khata_core::DocumentKind;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "khata", version, about = "Khata ERP from the command line")]
struct Cli {
    /// Config file (defaults to khata.toml in the platform config dir)
    #[arg(long, global = true, env = "KHATA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Credentials for backend calls.
#[derive(Debug, clap::Args)]
pub struct AuthArgs {
    /// Bearer token from login
    #[arg(long, env = "KHATA_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Tenant (company) id
    #[arg(long, env = "KHATA_TENANT")]
    pub tenant: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recalculate totals for a form payload (JSON)
    Totals {
        file: PathBuf,
        #[arg(long, default_value = "sales_invoice")]
        kind: DocumentKind,
        /// Print the totals as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print a document from a form payload (JSON)
    Print {
        file: PathBuf,
        #[arg(long, default_value = "sales_invoice")]
        kind: DocumentKind,
    },
    /// Spell an amount in words (Indian scale)
    Words {
        amount: String,
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Evaluate a salary formula
    Eval {
        expr: String,
        /// Variable binding, repeatable: --var basic=20000
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },
    /// Compute a payslip from a salary structure (TOML)
    Payslip {
        structure: PathBuf,
        #[arg(long)]
        basic: String,
    },
    /// Fetch one document from the backend and print it
    Fetch {
        kind: DocumentKind,
        id: uuid::Uuid,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// List documents of one kind
    List {
        kind: DocumentKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        auth: AuthArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Totals { file, kind, json } => commands::documents::totals(&config, &file, kind, json),
        Command::Print { file, kind } => commands::documents::print(&config, &file, kind),
        Command::Words {
            amount,
            suffix,
            currency,
        } => commands::tools::words(&config, &amount, suffix, currency),
        Command::Eval { expr, vars } => commands::tools::eval(&expr, &vars),
        Command::Payslip { structure, basic } => commands::payroll::payslip(&config, &structure, &basic),
        Command::Fetch { kind, id, auth } => runtime()?.block_on(commands::remote::fetch(&config, &auth, kind, id)),
        Command::List { kind, page, auth } => runtime()?.block_on(commands::remote::list(&config, &auth, kind, page)),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=khata=trace` - Show trace for khata crates only
/// - Default: `info,khata=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,khata=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
