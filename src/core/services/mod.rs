pub mod projection_service;
pub mod transaction_service;

pub use projection_service::{Horizon, HorizonSummary, MonthView, ProjectionService};
pub use transaction_service::TransactionService;

use crate::errors::CalendarError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("{0}")]
    Invalid(String),
}
