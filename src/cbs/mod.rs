mod options;
mod types;

use std::sync::Arc;

use amqp_message_protocol::{AmqpMessage, MessageBody, Value};
use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use crate::{
    context::Context,
    error::CbsError,
    management::{
        AmqpError, ManagementChannel, ManagementEvents, ManagementFactory, ManagementOptions,
        ManagementOperationStatus,
    },
    session::Session,
    CbsResult,
};

pub use options::CbsOptions;
pub use types::{CbsOpenResult, CbsOperationResult, CbsPutTokenResult, CbsTokenType};

const PUT_TOKEN_OPERATION: &str = "put-token";

/// Logs errors raised on the CBS management link.
struct CbsEvents;

impl ManagementEvents for CbsEvents {
    fn on_error(&self, error: &AmqpError) {
        warn!(%error, "AMQP error processing claims based security");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CbsState {
    Unopened,
    Open,
    Closed,
}

/// Claims-based security negotiation bound to one session.
///
/// The management channel is created on the first [`open`](Self::open) and
/// kept for the lifetime of the instance, even after
/// [`close`](Self::close).
pub struct ClaimsBasedSecurity<F: ManagementFactory> {
    factory: F,
    enable_trace: bool,
    options: CbsOptions,
    management: Option<F::Channel>,
    state: CbsState,
}

impl<F: ManagementFactory> ClaimsBasedSecurity<F> {
    pub fn new<S: Session<Factory = F>>(session: &S) -> Self {
        Self::with_options(session, CbsOptions::default())
    }

    pub fn with_options<S: Session<Factory = F>>(session: &S, options: CbsOptions) -> Self {
        ClaimsBasedSecurity {
            factory: session.management_factory(),
            enable_trace: session.is_trace_enabled(),
            options,
            management: None,
            state: CbsState::Unopened,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == CbsState::Open
    }

    /// Creates and opens the CBS management channel.
    ///
    /// Returns [`CbsOpenResult::Error`] without touching the existing channel
    /// when called more than once.
    pub async fn open(&mut self, context: &Context) -> CbsOpenResult {
        if self.management.is_some() {
            debug!("Claims based security already opened");
            return CbsOpenResult::Error;
        }

        let options = ManagementOptions::default()
            .with_node_name(self.options.node_name.clone())
            .with_status_code_key(self.options.status_code_key.clone())
            .with_status_description_key(self.options.status_description_key.clone())
            .with_trace(self.enable_trace);

        trace!(node = %self.options.node_name, "Creating CBS management channel");
        let management = self
            .management
            .insert(self.factory.create(options, Arc::new(CbsEvents)));

        let result = CbsOpenResult::from(management.open(context).await);
        debug!(%result, "CBS management channel open");
        if result == CbsOpenResult::Ok {
            self.state = CbsState::Open;
        }
        result
    }

    pub async fn close(&mut self, context: &Context) -> CbsResult<()> {
        let management = self.management.as_mut().ok_or(CbsError::NotOpen)?;

        trace!("Closing CBS management channel");
        management.close(context).await?;
        self.state = CbsState::Closed;
        Ok(())
    }

    /// Sends `token` for `audience` to the CBS node.
    ///
    /// Transport outcomes are reported through [`CbsPutTokenResult`]; only a
    /// missing [`open`](Self::open) is an error.
    pub async fn put_token(
        &mut self,
        token_type: CbsTokenType,
        audience: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        context: &Context,
    ) -> CbsResult<CbsPutTokenResult> {
        let management = self.management.as_mut().ok_or(CbsError::NotOpen)?;

        let mut request = AmqpMessage {
            body: MessageBody::Value(Value::from(token)),
            ..Default::default()
        };
        request
            .application_properties
            .insert("name".to_owned(), Value::from(audience));
        request
            .application_properties
            .insert("expiration".to_owned(), Value::from(expires_at.timestamp()));

        let operation_type = self.options.token_type_name(token_type);
        trace!(audience, operation_type, "Sending CBS put-token");

        let response = management
            .execute_operation(PUT_TOKEN_OPERATION, operation_type, "", request, context)
            .await;

        let result = CbsOperationResult::from(response.status);
        if response.status != ManagementOperationStatus::Ok {
            info!(
                %result,
                status_code = response.status_code,
                error = %response.error,
                "CBS put-token failed"
            );
        }

        Ok(CbsPutTokenResult {
            result,
            status_code: response.status_code,
            description: response.error.description,
        })
    }

    pub fn on_error(&self, error: &AmqpError) {
        CbsEvents.on_error(error);
    }
}
