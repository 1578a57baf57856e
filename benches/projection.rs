use budget_calendar::ledger::{
    future_balance, range_balances, BudgetState, Recurring, Transaction, TransactionKind,
};
use budget_calendar::storage::{JsonStateStorage, StateStorage};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

fn build_sample_state(txn_count: usize) -> BudgetState {
    let mut state = BudgetState::new(2500.0);
    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    state.balance_date = Some(start_date);

    for idx in 0..txn_count {
        let scheduled = start_date + Duration::days((idx % 365) as i64);
        let kind = if idx % 4 == 0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        let recurring = match idx % 4 {
            0 => Recurring::Once,
            1 => Recurring::Weekly,
            2 => Recurring::Biweekly,
            _ => Recurring::Monthly,
        };
        let txn = Transaction::new(
            idx as u64 + 1,
            kind,
            format!("Rule {idx}"),
            50.0 + (idx % 100) as f64,
            scheduled,
        )
        .with_recurring(recurring);
        state.add_transaction(txn);
    }
    state
}

fn bench_projection(c: &mut Criterion) {
    let state = build_sample_state(black_box(500));
    let anchor = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let month_start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let month_end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

    c.bench_function("range_balances_month_500", |b| {
        b.iter(|| {
            let days = range_balances(
                &state.transactions,
                state.starting_balance,
                anchor,
                month_start,
                month_end,
            );
            black_box(days);
        })
    });

    c.bench_function("future_balance_60d_500", |b| {
        b.iter(|| {
            black_box(future_balance(
                &state.transactions,
                state.starting_balance,
                anchor,
                month_start,
                60,
            ))
        })
    });
}

fn bench_state_io(c: &mut Criterion) {
    let state = build_sample_state(black_box(5_000));
    let dir = tempdir().expect("tempdir");
    let storage = JsonStateStorage::new(dir.path().join("budgetcal-data.json"));

    c.bench_function("state_save_5k", |b| {
        b.iter(|| storage.save(&state).expect("save state"))
    });

    storage.save(&state).expect("seed");

    c.bench_function("state_load_5k", |b| {
        b.iter(|| black_box(storage.load().expect("load state")))
    });
}

criterion_group!(benches, bench_projection, bench_state_io);
criterion_main!(benches);
