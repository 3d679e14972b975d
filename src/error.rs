use thiserror::Error;

use crate::management::AmqpError;

#[derive(Error, Debug)]
pub enum CbsError {
    #[error("Claims based security instance has not been opened")]
    NotOpen,
    #[error(transparent)]
    Management(#[from] ManagementError),
}

#[derive(Error, Debug)]
pub enum ManagementError {
    #[error("Management channel is closed")]
    Closed,
    #[error("Management operation cancelled")]
    Cancelled,
    #[error("Management link error: {0}")]
    Link(AmqpError),
}
