pub mod budget_manager;
pub mod calendar;
pub mod services;
pub mod time;

pub use budget_manager::BudgetManager;
