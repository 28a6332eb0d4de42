use thiserror::Error;

use crate::entry::EntryId;
use crate::status::EntryStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition { from: EntryStatus, to: EntryStatus },

    #[error("entry {id} is {status} and can no longer be edited")]
    TerminalEntry { id: EntryId, status: EntryStatus },

    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
