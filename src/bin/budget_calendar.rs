use std::process;

fn main() {
    budget_calendar::init();

    if let Err(err) = budget_calendar::cli::run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
