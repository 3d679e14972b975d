use crate::management::ManagementFactory;

/// The AMQP session a CBS instance runs on.
pub trait Session {
    type Factory: ManagementFactory;

    fn is_trace_enabled(&self) -> bool;

    /// Factory for management channels attached to this session.
    fn management_factory(&self) -> Self::Factory;
}
