#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use amqp_cbs::{
    error::ManagementError,
    management::{
        AmqpError, ManagementChannel, ManagementEvents, ManagementFactory, ManagementOpenStatus,
        ManagementOperationResult, ManagementOperationStatus, ManagementOptions,
    },
    Context, Session,
};
use amqp_message_protocol::AmqpMessage;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// A request seen by the mock management node.
#[derive(Debug, Clone)]
pub struct RecordedOperation {
    pub operation: String,
    pub operation_type: String,
    pub locales: String,
    pub message: AmqpMessage,
}

pub struct MockState {
    pub open_status: ManagementOpenStatus,
    pub response: ManagementOperationResult,
    /// Operations never complete unless the context cancels them.
    pub hang: bool,
    /// Error returned by the next close, leaving the channel open.
    pub close_error: Option<ManagementError>,
    pub created: Vec<ManagementOptions>,
    pub open_calls: usize,
    pub close_calls: usize,
    pub operations: Vec<RecordedOperation>,
    pub events: Option<Arc<dyn ManagementEvents>>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            open_status: ManagementOpenStatus::Ok,
            response: ManagementOperationResult::new(ManagementOperationStatus::Ok, 202),
            hang: false,
            close_error: None,
            created: Vec::new(),
            open_calls: 0,
            close_calls: 0,
            operations: Vec::new(),
            events: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockNode(pub Arc<Mutex<MockState>>);

impl MockNode {
    pub fn with_state(state: MockState) -> Self {
        MockNode(Arc::new(Mutex::new(state)))
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.0.lock().unwrap()
    }

    /// Raises a link error through the sink the channel was created with.
    pub fn raise(&self, error: &AmqpError) {
        let events = self.state().events.clone();
        if let Some(events) = events {
            events.on_error(error);
        }
    }
}

pub struct MockChannel {
    node: MockNode,
    closed: bool,
}

#[async_trait::async_trait]
impl ManagementChannel for MockChannel {
    async fn open(&mut self, context: &Context) -> ManagementOpenStatus {
        let mut state = self.node.state();
        state.open_calls += 1;
        if context.is_cancelled() {
            return ManagementOpenStatus::Cancelled;
        }
        state.open_status
    }

    async fn close(&mut self, _context: &Context) -> Result<(), ManagementError> {
        let mut state = self.node.state();
        state.close_calls += 1;
        if let Some(error) = state.close_error.take() {
            return Err(error);
        }
        if self.closed {
            return Err(ManagementError::Closed);
        }
        self.closed = true;
        Ok(())
    }

    async fn execute_operation(
        &mut self,
        operation: &str,
        operation_type: &str,
        locales: &str,
        message: AmqpMessage,
        context: &Context,
    ) -> ManagementOperationResult {
        let (response, hang) = {
            let mut state = self.node.state();
            state.operations.push(RecordedOperation {
                operation: operation.to_owned(),
                operation_type: operation_type.to_owned(),
                locales: locales.to_owned(),
                message,
            });
            (state.response.clone(), state.hang)
        };

        if self.closed {
            return ManagementOperationResult::new(ManagementOperationStatus::InstanceClosed, 0);
        }

        let outcome = if hang {
            context
                .run(std::future::pending::<ManagementOperationResult>())
                .await
        } else {
            context.run(async { response }).await
        };

        outcome.unwrap_or_else(|| {
            ManagementOperationResult::new(ManagementOperationStatus::Cancelled, 0)
        })
    }
}

impl ManagementFactory for MockNode {
    type Channel = MockChannel;

    fn create(
        &self,
        options: ManagementOptions,
        events: Arc<dyn ManagementEvents>,
    ) -> MockChannel {
        let mut state = self.state();
        state.created.push(options);
        state.events = Some(events);
        MockChannel {
            node: self.clone(),
            closed: false,
        }
    }
}

pub struct MockSession {
    pub node: MockNode,
    pub trace: bool,
}

impl MockSession {
    pub fn new(node: MockNode) -> Self {
        MockSession { node, trace: false }
    }
}

impl Session for MockSession {
    type Factory = MockNode;

    fn is_trace_enabled(&self) -> bool {
        self.trace
    }

    fn management_factory(&self) -> MockNode {
        self.node.clone()
    }
}
