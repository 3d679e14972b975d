use std::fmt;

use crate::management::{ManagementOpenStatus, ManagementOperationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CbsTokenType {
    Jwt,
    SasToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CbsOpenResult {
    Invalid,
    Ok,
    Error,
    Cancelled,
}

impl CbsOpenResult {
    /// Maps a raw open status reported by an engine.
    ///
    /// # Panics
    ///
    /// Panics on a code outside [`ManagementOpenStatus`].
    pub fn from_raw(raw: u32) -> Self {
        match ManagementOpenStatus::try_from(raw) {
            Ok(status) => status.into(),
            Err(err) => unreachable!("{}", err),
        }
    }
}

impl From<ManagementOpenStatus> for CbsOpenResult {
    fn from(status: ManagementOpenStatus) -> Self {
        match status {
            ManagementOpenStatus::Invalid => CbsOpenResult::Invalid,
            ManagementOpenStatus::Ok => CbsOpenResult::Ok,
            ManagementOpenStatus::Error => CbsOpenResult::Error,
            ManagementOpenStatus::Cancelled => CbsOpenResult::Cancelled,
        }
    }
}

impl fmt::Display for CbsOpenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CbsOperationResult {
    Invalid,
    Ok,
    Error,
    /// The node rejected the token with a failure status code.
    Failed,
    InstanceClosed,
    Cancelled,
}

impl CbsOperationResult {
    /// Maps a raw operation status reported by an engine.
    ///
    /// # Panics
    ///
    /// Panics on a code outside [`ManagementOperationStatus`].
    pub fn from_raw(raw: u32) -> Self {
        match ManagementOperationStatus::try_from(raw) {
            Ok(status) => status.into(),
            Err(err) => unreachable!("{}", err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CbsOperationResult::Ok)
    }

    /// Only transport failures are worth retrying; a rejected token stays
    /// rejected.
    pub fn is_retriable(&self) -> bool {
        matches!(self, CbsOperationResult::Error)
    }
}

impl From<ManagementOperationStatus> for CbsOperationResult {
    fn from(status: ManagementOperationStatus) -> Self {
        match status {
            ManagementOperationStatus::Invalid => CbsOperationResult::Invalid,
            ManagementOperationStatus::Ok => CbsOperationResult::Ok,
            ManagementOperationStatus::Error => CbsOperationResult::Error,
            ManagementOperationStatus::FailedBadStatus => CbsOperationResult::Failed,
            ManagementOperationStatus::InstanceClosed => CbsOperationResult::InstanceClosed,
            ManagementOperationStatus::Cancelled => CbsOperationResult::Cancelled,
        }
    }
}

impl fmt::Display for CbsOperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a put-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CbsPutTokenResult {
    pub result: CbsOperationResult,
    pub status_code: u32,
    pub description: String,
}
