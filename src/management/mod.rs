//! Request/response channel to an AMQP management node.
//!
//! The transport behind a channel lives outside this crate; implementations
//! plug in through [`ManagementFactory`].

mod options;

use std::fmt;
use std::sync::Arc;

use amqp_message_protocol::AmqpMessage;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{context::Context, error::ManagementError};

pub use options::ManagementOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ManagementOpenStatus {
    Invalid = 0,
    Ok = 1,
    Error = 2,
    Cancelled = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ManagementOperationStatus {
    Invalid = 0,
    Ok = 1,
    Error = 2,
    /// The node answered with a status code outside the success range.
    FailedBadStatus = 3,
    InstanceClosed = 4,
    Cancelled = 5,
}

/// AMQP error condition reported by a peer or a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmqpError {
    pub condition: String,
    pub description: String,
}

impl AmqpError {
    pub fn new(condition: impl Into<String>, description: impl Into<String>) -> Self {
        AmqpError {
            condition: condition.into(),
            description: description.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_empty() && self.description.is_empty()
    }
}

impl fmt::Display for AmqpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        write!(f, "{}: {}", self.condition, self.description)
    }
}

#[derive(Debug, Clone)]
pub struct ManagementOperationResult {
    pub status: ManagementOperationStatus,
    pub status_code: u32,
    pub error: AmqpError,
    /// Response message, when the node sent one back.
    pub message: Option<AmqpMessage>,
}

impl ManagementOperationResult {
    pub fn new(status: ManagementOperationStatus, status_code: u32) -> Self {
        ManagementOperationResult {
            status,
            status_code,
            error: AmqpError::default(),
            message: None,
        }
    }

    pub fn with_error(mut self, error: AmqpError) -> Self {
        self.error = error;
        self
    }

    pub fn with_message(mut self, message: AmqpMessage) -> Self {
        self.message = Some(message);
        self
    }
}

#[async_trait::async_trait]
pub trait ManagementChannel: Send {
    async fn open(&mut self, context: &Context) -> ManagementOpenStatus;

    async fn close(&mut self, context: &Context) -> Result<(), ManagementError>;

    async fn execute_operation(
        &mut self,
        operation: &str,
        operation_type: &str,
        locales: &str,
        message: AmqpMessage,
        context: &Context,
    ) -> ManagementOperationResult;
}

/// Receives errors raised asynchronously by a management channel.
pub trait ManagementEvents: Send + Sync {
    fn on_error(&self, error: &AmqpError);
}

pub trait ManagementFactory {
    type Channel: ManagementChannel;

    fn create(&self, options: ManagementOptions, events: Arc<dyn ManagementEvents>)
        -> Self::Channel;
}
