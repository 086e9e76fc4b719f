use thiserror::Error;
use ustr::Ustr;

pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("This table has no identity field; rows cannot be selected or added")]
    NoIdentity,

    #[error("No row with identity {0}")]
    UnknownRow(Ustr),

    #[error("{0} is already being added")]
    Busy(Ustr),

    #[error("{0} has already been added")]
    AlreadyAdded(Ustr),

    #[error("Failed to add {identity}: {message}")]
    AddFailed { identity: Ustr, message: String },
}

impl TableError {
    pub fn add_failed(identity: Ustr, message: impl Into<String>) -> Self {
        Self::AddFailed {
            identity,
            message: message.into(),
        }
    }
}
