//! Errors surfaced by [`ScheduleService`](crate::ScheduleService).

use shiftgrid_core::CoreError;
use shiftgrid_recurrence::RecurrenceError;

use crate::store::StoreError;

/// Every variant keeps the underlying error so callers can tell a bad
/// pattern from an illegal transition from an unreachable store.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
