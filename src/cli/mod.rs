//! Terminal front end: parses arguments, drives the `BudgetManager`, renders results.

pub mod render;

use std::{error::Error, path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::ConfigManager,
    core::{
        calendar::MonthLayout,
        time::{Clock, FixedClock, SystemClock},
        BudgetManager,
    },
    ledger::{parse_amount, parse_date, Recurring, TransactionDraft, TransactionId, TransactionKind},
    storage::JsonStateStorage,
    utils::{build_info, paths},
};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "budget_calendar")]
#[command(about = "Budget calendar: recurring income and expenses projected onto a running balance", long_about = None)]
pub struct Cli {
    /// Data directory (defaults to ~/.budget_calendar)
    #[arg(long, global = true, env = paths::HOME_ENV, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = date_arg, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a month grid with daily balances (default: current month)
    Month {
        /// Month to show (YYYY-MM)
        #[arg(value_name = "YYYY-MM")]
        month: Option<String>,
    },

    /// Show transactions and the balance for one day
    Day {
        #[arg(value_parser = date_arg, value_name = "DATE")]
        date: NaiveDate,
    },

    /// Show current, end-of-month and horizon balances
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every transaction rule
    List,

    /// Add a transaction
    Add(AddArgs),

    /// Edit an existing transaction
    Edit(EditArgs),

    /// Remove a transaction by id
    Remove {
        #[arg(value_name = "ID")]
        id: TransactionId,
    },

    /// Record the true balance as of a date (default: today)
    SetBalance {
        #[arg(allow_hyphen_values = true, value_parser = balance_arg)]
        amount: f64,
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },

    /// Print build information
    Version,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// income or expense
    #[arg(long = "type", value_parser = kind_arg)]
    pub kind: TransactionKind,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub amount: String,
    /// First occurrence (default: today)
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    /// once, weekly, biweekly or monthly
    #[arg(long, value_parser = recurring_arg, default_value = "once")]
    pub recurring: Recurring,
    /// Last possible occurrence for recurring rules
    #[arg(long, value_parser = date_arg)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(value_name = "ID")]
    pub id: TransactionId,
    #[arg(long = "type", value_parser = kind_arg)]
    pub kind: Option<TransactionKind>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long, value_parser = recurring_arg)]
    pub recurring: Option<Recurring>,
    #[arg(long, value_parser = date_arg, conflicts_with = "clear_end_date")]
    pub end_date: Option<NaiveDate>,
    /// Make the rule open-ended again
    #[arg(long)]
    pub clear_end_date: bool,
}

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|err| err.to_string())
}

fn kind_arg(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::parse(raw).map_err(|err| err.to_string())
}

fn recurring_arg(raw: &str) -> Result<Recurring, String> {
    Recurring::parse(raw).map_err(|err| err.to_string())
}

/// Balances may be negative (overdrawn), unlike transaction amounts.
fn balance_arg(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    match trimmed.strip_prefix('-') {
        Some(magnitude) => parse_amount(magnitude).map(|value| -value),
        None => parse_amount(trimmed),
    }
    .map_err(|err| err.to_string())
}

/// Parses process arguments and executes the selected command.
pub fn run() -> CliResult {
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> CliResult {
    if cli.no_color {
        colored::control::set_override(false);
    }
    let command = cli.command.unwrap_or(Commands::Month { month: None });
    if let Commands::Version = command {
        println!("{}", build_info::current().summary());
        return Ok(());
    }

    let home = cli.home.unwrap_or_else(paths::app_data_dir);
    let config = ConfigManager::with_base_dir(home.clone()).load()?;
    let data_path = config.data_path(&home);
    tracing::debug!(path = %data_path.display(), "using budget data file");
    let storage = Arc::new(JsonStateStorage::new(data_path));
    let clock: Box<dyn Clock> = match cli.today {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    };
    let mut manager = BudgetManager::open(storage, &config, clock);

    match command {
        Commands::Month { month } => {
            let layout = match month {
                Some(raw) => MonthLayout::parse(&raw)?,
                None => MonthLayout::containing(manager.today()),
            };
            let view = manager.month_view(layout);
            print!("{}", render::month(&view, manager.today()));
        }
        Commands::Day { date } => {
            let bucket = manager.day_view(date);
            print!("{}", render::day(date, &bucket));
        }
        Commands::Summary { json } => {
            let summary = manager.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render::summary(&summary));
            }
        }
        Commands::List => print!("{}", render::transactions(&manager.transactions())),
        Commands::Add(args) => {
            let mut draft = TransactionDraft::new(args.date.unwrap_or_else(|| manager.today()));
            draft.kind = args.kind;
            draft.name = args.name;
            draft.amount = args.amount;
            draft.recurring = args.recurring;
            draft.end_date = args.end_date;
            let id = manager.add_transaction(&draft)?;
            commit(&manager)?;
            println!("{}", render::success(&format!("Added transaction {id}")));
        }
        Commands::Edit(args) => {
            let existing = manager
                .state()
                .transaction(args.id)
                .ok_or(crate::errors::CalendarError::TransactionNotFound(args.id))?;
            let draft = apply_edits(TransactionDraft::from(existing), &args);
            manager.update_transaction(args.id, &draft)?;
            commit(&manager)?;
            println!("{}", render::success(&format!("Updated transaction {}", args.id)));
        }
        Commands::Remove { id } => {
            let removed = manager.remove_transaction(id)?;
            commit(&manager)?;
            println!(
                "{}",
                render::success(&format!("Removed transaction {id} ({})", removed.name))
            );
        }
        Commands::SetBalance { amount, date } => {
            manager.set_starting_balance(amount, date)?;
            commit(&manager)?;
            let anchor = manager.state().anchor(manager.today());
            println!(
                "{}",
                render::success(&format!(
                    "Balance set to {} as of {}",
                    crate::currency::format_currency(amount),
                    anchor
                ))
            );
        }
        Commands::Version => {}
    }
    Ok(())
}

fn apply_edits(mut draft: TransactionDraft, args: &EditArgs) -> TransactionDraft {
    if let Some(kind) = args.kind {
        draft.kind = kind;
    }
    if let Some(name) = &args.name {
        draft.name = name.clone();
    }
    if let Some(amount) = &args.amount {
        draft.amount = amount.clone();
    }
    if let Some(date) = args.date {
        draft.date = date;
    }
    if let Some(recurring) = args.recurring {
        draft.recurring = recurring;
    }
    if args.clear_end_date {
        draft.end_date = None;
    } else if let Some(end) = args.end_date {
        draft.end_date = Some(end);
    }
    draft
}

/// Writes pending changes now; a one-shot command must not exit with unsaved edits.
fn commit(manager: &BudgetManager) -> CliResult {
    let outcome = manager.flush();
    match outcome.error {
        None => Ok(()),
        Some(message) => Err(format!("failed to save budget data: {message}").into()),
    }
}
