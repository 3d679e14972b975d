//! Negotiates a token against an in-process CBS node that accepts every
//! token whose audience starts with `sb://`.

use std::sync::Arc;

use amqp_cbs::{
    error::ManagementError,
    management::{
        AmqpError, ManagementChannel, ManagementEvents, ManagementFactory, ManagementOpenStatus,
        ManagementOperationResult, ManagementOperationStatus, ManagementOptions,
    },
    types::CbsTokenType,
    ClaimsBasedSecurity, Context, Session,
};
use amqp_message_protocol::AmqpMessage;
use chrono::{Duration, Utc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

struct LoopbackChannel {
    options: ManagementOptions,
}

#[async_trait::async_trait]
impl ManagementChannel for LoopbackChannel {
    async fn open(&mut self, _context: &Context) -> ManagementOpenStatus {
        info!(node = self.options.node_name(), "Loopback management node attached");
        ManagementOpenStatus::Ok
    }

    async fn close(&mut self, _context: &Context) -> Result<(), ManagementError> {
        Ok(())
    }

    async fn execute_operation(
        &mut self,
        operation: &str,
        operation_type: &str,
        _locales: &str,
        message: AmqpMessage,
        context: &Context,
    ) -> ManagementOperationResult {
        // round trip through the wire format like a real link would
        let request = match message
            .serialize()
            .map_err(|err| err.to_string())
            .and_then(|bytes| AmqpMessage::deserialize(&bytes).map_err(|err| err.to_string()))
        {
            Ok(request) => request,
            Err(err) => {
                return ManagementOperationResult::new(ManagementOperationStatus::Error, 500)
                    .with_error(AmqpError::new("amqp:internal-error", err))
            }
        };
        info!(operation, operation_type, %request, "Loopback node received request");

        let accepted = request
            .application_properties
            .get("name")
            .and_then(|name| name.as_string().ok())
            .is_some_and(|name| name.starts_with("sb://"));

        let response = if accepted {
            ManagementOperationResult::new(ManagementOperationStatus::Ok, 202)
        } else {
            ManagementOperationResult::new(ManagementOperationStatus::FailedBadStatus, 401)
                .with_error(AmqpError::new("amqp:unauthorized-access", "unknown audience"))
        };

        context.run(async { response }).await.unwrap_or_else(|| {
            ManagementOperationResult::new(ManagementOperationStatus::Cancelled, 0)
        })
    }
}

#[derive(Clone)]
struct LoopbackFactory;

impl ManagementFactory for LoopbackFactory {
    type Channel = LoopbackChannel;

    fn create(
        &self,
        options: ManagementOptions,
        _events: Arc<dyn ManagementEvents>,
    ) -> LoopbackChannel {
        LoopbackChannel { options }
    }
}

struct LoopbackSession;

impl Session for LoopbackSession {
    type Factory = LoopbackFactory;

    fn is_trace_enabled(&self) -> bool {
        true
    }

    fn management_factory(&self) -> LoopbackFactory {
        LoopbackFactory
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let context = Context::new().with_timeout(std::time::Duration::from_secs(5));
    let mut cbs = ClaimsBasedSecurity::new(&LoopbackSession);

    let opened = cbs.open(&context).await;
    println!("CBS open: {}", opened);

    let expires_at = Utc::now() + Duration::hours(1);
    for audience in ["sb://example.servicebus.windows.net/queue", "amqp://elsewhere"] {
        let result = cbs
            .put_token(
                CbsTokenType::SasToken,
                audience,
                "SharedAccessSignature sr=demo",
                expires_at,
                &context,
            )
            .await?;
        println!(
            "put-token {} -> {} ({}) {}",
            audience, result.result, result.status_code, result.description
        );
    }

    cbs.close(&context).await?;
    Ok(())
}
