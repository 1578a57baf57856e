use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use colored::Colorize;

use crate::{
    core::services::{HorizonSummary, MonthView},
    currency::{format_currency, format_signed},
    ledger::{DayBucket, Transaction, TransactionKind, DATE_FORMAT},
};

const CELL_WIDTH: usize = 12;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn success(message: &str) -> String {
    format!("{} {}", "✓".green(), message)
}

fn balance_text(balance: f64, width: usize) -> String {
    let text = format!("{:>width$}", format_currency(balance));
    if balance < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

/// Sunday-first month grid: a row of day numbers (`*` marks days with
/// transactions) above a row of end-of-day balances.
pub fn month(view: &MonthView, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.layout.title().bold());
    let header: String = WEEKDAYS
        .iter()
        .map(|name| format!("{:>CELL_WIDTH$}", name))
        .collect();
    let _ = writeln!(out, "{}", header.dimmed());

    let mut cells: Vec<Option<(NaiveDate, &DayBucket)>> =
        vec![None; view.layout.leading_blanks() as usize];
    cells.extend(view.month_days().map(|(date, bucket)| Some((*date, bucket))));

    for week in cells.chunks(7) {
        let mut days = String::new();
        let mut balances = String::new();
        for cell in week {
            match cell {
                Some((date, bucket)) => {
                    let marker = if bucket.transactions.is_empty() { " " } else { "*" };
                    let label = format!("{:>width$}{}", date.day(), marker, width = CELL_WIDTH - 1);
                    if *date == today {
                        days.push_str(&label.bold().underline().to_string());
                    } else {
                        days.push_str(&label);
                    }
                    match bucket.balance {
                        Some(balance) => balances.push_str(&balance_text(balance, CELL_WIDTH)),
                        None => balances.push_str(&format!("{:>CELL_WIDTH$}", "")),
                    }
                }
                None => {
                    days.push_str(&" ".repeat(CELL_WIDTH));
                    balances.push_str(&" ".repeat(CELL_WIDTH));
                }
            }
        }
        let _ = writeln!(out, "{}", days.trim_end());
        let _ = writeln!(out, "{}", balances.trim_end());
    }
    let _ = writeln!(
        out,
        "{}",
        format!(
            "Balances projected from {}",
            view.balance_date.format(DATE_FORMAT)
        )
        .dimmed()
    );
    let _ = writeln!(
        out,
        "{}",
        format!(
            "< {}    {} >",
            view.layout.previous().key(),
            view.layout.next().key()
        )
        .dimmed()
    );
    out
}

pub fn day(date: NaiveDate, bucket: &DayBucket) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A, %B %-d, %Y").to_string().bold());
    if bucket.transactions.is_empty() {
        let _ = writeln!(out, "  No transactions");
    }
    for txn in &bucket.transactions {
        let _ = writeln!(
            out,
            "  {:<24} {:>14}  {}",
            txn.name,
            amount_text(txn),
            txn.recurring.label().dimmed()
        );
    }
    match bucket.balance {
        Some(balance) => {
            let _ = writeln!(out, "Balance: {}", balance_text(balance, 0));
        }
        None => {
            let _ = writeln!(out, "Balance: {}", "not projected before the balance date".dimmed());
        }
    }
    out
}

pub fn summary(summary: &HorizonSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<28}{}",
        format!("Balance on {}", summary.balance_date.format(DATE_FORMAT)),
        balance_text(summary.current, 0)
    );
    let _ = writeln!(
        out,
        "{:<28}{}",
        "End of month",
        balance_text(summary.end_of_month, 0)
    );
    for horizon in &summary.horizons {
        let _ = writeln!(
            out,
            "{:<28}{}",
            format!("In {} days", horizon.days_out),
            balance_text(horizon.balance, 0)
        );
    }
    out
}

pub fn transactions(items: &[&Transaction]) -> String {
    if items.is_empty() {
        return "No transactions yet.\n".into();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:<14} {:<10} {:<24} {:>14}  {:<9} {}",
            "ID", "Date", "Name", "Amount", "Repeats", "Until"
        )
        .bold()
    );
    for txn in items {
        let until = match txn.end_date {
            Some(end) => end.format(DATE_FORMAT).to_string(),
            None if txn.is_recurring() => "open".into(),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "{:<14} {:<10} {:<24} {:>14}  {:<9} {}",
            txn.id,
            txn.date.format(DATE_FORMAT),
            txn.name,
            amount_text(txn),
            txn.recurring.label(),
            until
        );
    }
    out
}

fn amount_text(txn: &Transaction) -> String {
    let text = format_signed(txn.signed_amount());
    match txn.kind {
        TransactionKind::Income => text.green().to_string(),
        TransactionKind::Expense => text.red().to_string(),
    }
}
