//! Claims-based security (CBS) for AMQP 1.0.
//!
//! Token negotiation runs over a generic request/response
//! [`ManagementChannel`](crate::management::ManagementChannel). The message
//! format itself lives in the `amqp-message-protocol` crate.

mod cbs;
mod context;
pub mod error;
pub mod management;
mod session;

pub type CbsResult<T> = Result<T, error::CbsError>;

pub use crate::cbs::{CbsOptions, ClaimsBasedSecurity};
pub use crate::context::Context;
pub use crate::session::Session;

pub mod types {
    pub use crate::cbs::{CbsOpenResult, CbsOperationResult, CbsPutTokenResult, CbsTokenType};
    pub use crate::management::{
        AmqpError, ManagementOpenStatus, ManagementOperationResult, ManagementOperationStatus,
    };
    pub use amqp_message_protocol::AmqpMessage;
}
