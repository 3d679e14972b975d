use std::marker::PhantomData;

use super::{
    check_convertible, from_native, AdapterError, EngineCall, EngineError, MessageAdapter,
    NativeMessage,
};
use crate::{
    message::{AmqpMessage, Header, MessageBody, Properties},
    types::{Binary, List, Value},
};

/// An immutable native builder. Every call yields the next builder and
/// [`MessageBuilder::build`] consumes it once.
///
/// Builders carry neither a message format nor a delivery tag.
pub trait MessageBuilder: Sized {
    type Message: NativeMessage;

    fn create() -> Result<Self, EngineError>;

    fn header(self, header: Header) -> Result<Self, EngineError>;
    fn properties(self, properties: Properties) -> Result<Self, EngineError>;
    fn delivery_annotations(self, annotations: Value) -> Result<Self, EngineError>;
    fn message_annotations(self, annotations: Value) -> Result<Self, EngineError>;
    fn application_properties(self, properties: Value) -> Result<Self, EngineError>;
    fn footer(self, footer: Value) -> Result<Self, EngineError>;
    fn body_data(self, data: Binary) -> Result<Self, EngineError>;
    fn body_sequence(self, sequence: List) -> Result<Self, EngineError>;
    fn body_value(self, value: Value) -> Result<Self, EngineError>;

    fn build(self) -> Result<Self::Message, EngineError>;
}

/// Adapter for engines that assemble messages through a builder.
#[derive(Debug)]
pub struct BuilderAdapter<B> {
    _engine: PhantomData<fn() -> B>,
}

impl<B> BuilderAdapter<B> {
    pub fn new() -> Self {
        BuilderAdapter {
            _engine: PhantomData,
        }
    }
}

impl<B> Default for BuilderAdapter<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MessageBuilder> MessageAdapter for BuilderAdapter<B> {
    type Handle = B::Message;

    fn to_implementation(&self, message: &AmqpMessage) -> Result<B::Message, AdapterError> {
        check_convertible(message)?;

        let mut builder = B::create()
            .engine_call("create")?
            .header(message.header.clone())
            .engine_call("header")?
            .properties(message.properties.clone())
            .engine_call("properties")?;

        if !message.delivery_annotations.is_empty() {
            builder = builder
                .delivery_annotations(message.delivery_annotations.to_value())
                .engine_call("delivery_annotations")?;
        }
        if !message.message_annotations.is_empty() {
            builder = builder
                .message_annotations(message.message_annotations.to_value())
                .engine_call("message_annotations")?;
        }
        if !message.application_properties.is_empty() {
            builder = builder
                .application_properties(message.application_properties.to_value())
                .engine_call("application_properties")?;
        }
        if !message.footer.is_empty() {
            builder = builder
                .footer(message.footer.to_value())
                .engine_call("footer")?;
        }

        builder = match &message.body {
            MessageBody::None => builder,
            MessageBody::Data(chunks) => chunks.iter().try_fold(builder, |builder, chunk| {
                builder.body_data(chunk.clone()).engine_call("body_data")
            })?,
            MessageBody::Sequence(lists) => lists.iter().try_fold(builder, |builder, list| {
                builder
                    .body_sequence(list.clone())
                    .engine_call("body_sequence")
            })?,
            MessageBody::Value(value) => builder
                .body_value(value.clone())
                .engine_call("body_value")?,
            MessageBody::Invalid => return Err(AdapterError::InvalidBody),
        };

        builder.build().engine_call("build")
    }

    fn from_implementation(&self, handle: &B::Message) -> Result<AmqpMessage, AdapterError> {
        from_native(handle)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{BuilderAdapter, MessageBuilder};
    use crate::{
        backend::{
            tests::{engine_result, fail_next, RecordedMessage},
            AdapterError, EngineError, MessageAdapter, RawBodyType,
        },
        message::{AmqpMessage, Header, MessageBody, Properties},
        types::{AnnotationKey, Binary, List, Value},
    };

    struct RecordingBuilder(RecordedMessage);

    impl MessageBuilder for RecordingBuilder {
        type Message = RecordedMessage;

        fn create() -> Result<Self, EngineError> {
            engine_result("create")?;
            Ok(RecordingBuilder(RecordedMessage::default()))
        }
        fn header(mut self, header: Header) -> Result<Self, EngineError> {
            engine_result("header")?;
            self.0.header = Some(header);
            Ok(self)
        }
        fn properties(mut self, properties: Properties) -> Result<Self, EngineError> {
            engine_result("properties")?;
            self.0.properties = Some(properties);
            Ok(self)
        }
        fn delivery_annotations(mut self, annotations: Value) -> Result<Self, EngineError> {
            engine_result("delivery_annotations")?;
            self.0.delivery_annotations = Some(annotations);
            Ok(self)
        }
        fn message_annotations(mut self, annotations: Value) -> Result<Self, EngineError> {
            engine_result("message_annotations")?;
            self.0.message_annotations = Some(annotations);
            Ok(self)
        }
        fn application_properties(mut self, properties: Value) -> Result<Self, EngineError> {
            engine_result("application_properties")?;
            self.0.application_properties = Some(properties);
            Ok(self)
        }
        fn footer(mut self, footer: Value) -> Result<Self, EngineError> {
            engine_result("footer")?;
            self.0.footer = Some(footer);
            Ok(self)
        }
        fn body_data(mut self, data: Binary) -> Result<Self, EngineError> {
            engine_result("body_data")?;
            self.0.set_body_type(RawBodyType::Data);
            self.0.body_data.push(data);
            Ok(self)
        }
        fn body_sequence(mut self, sequence: List) -> Result<Self, EngineError> {
            engine_result("body_sequence")?;
            self.0.set_body_type(RawBodyType::Sequence);
            self.0.body_sequence.push(sequence);
            Ok(self)
        }
        fn body_value(mut self, value: Value) -> Result<Self, EngineError> {
            engine_result("body_value")?;
            self.0.set_body_type(RawBodyType::Value);
            self.0.body_value = Some(value);
            Ok(self)
        }
        fn build(self) -> Result<RecordedMessage, EngineError> {
            engine_result("build")?;
            Ok(self.0)
        }
    }

    fn sample_message() -> AmqpMessage {
        let mut message = AmqpMessage {
            message_format: 3,
            delivery_tag: Some(Value::from(9u32)),
            ..Default::default()
        };
        message.header.priority = 8;
        message.properties.message_id = Some("id-1".into());
        message.delivery_annotations.put("x-opt-lock-token", 1u64);
        message.footer.put(42u64, "checksum");
        message
            .application_properties
            .insert("count".into(), Value::from(3i64));
        message.body = MessageBody::Value(Value::from("payload"));
        message
    }

    #[test]
    fn builder_round_trip_drops_transfer_fields() {
        let adapter = BuilderAdapter::<RecordingBuilder>::new();
        let message = sample_message();

        let handle = adapter.to_implementation(&message).unwrap();
        let back = adapter.from_implementation(&handle).unwrap();

        assert_eq!(back, message);
        assert_eq!(back.message_format, 0);
        assert_eq!(back.delivery_tag, None);
        assert_eq!(
            back.footer.get(&AnnotationKey::ULong(42)),
            Some(&Value::from("checksum"))
        );
    }

    #[test]
    fn builder_data_chunks_keep_order() {
        let adapter = BuilderAdapter::<RecordingBuilder>::new();
        let message = AmqpMessage {
            body: MessageBody::Data(vec![b"AB".to_vec(), b"CD".to_vec()]),
            ..Default::default()
        };

        let handle = adapter.to_implementation(&message).unwrap();

        assert_eq!(handle.body_data, vec![b"AB".to_vec(), b"CD".to_vec()]);
        assert_eq!(adapter.from_implementation(&handle).unwrap(), message);
    }

    #[test]
    fn failing_build_is_reported() {
        let adapter = BuilderAdapter::<RecordingBuilder>::new();
        fail_next("build");

        assert!(matches!(
            adapter.to_implementation(&sample_message()),
            Err(AdapterError::Engine {
                operation: "build",
                ..
            })
        ));
    }

    #[test]
    fn failing_body_call_stops_the_chain() {
        let adapter = BuilderAdapter::<RecordingBuilder>::new();
        let message = AmqpMessage {
            body: MessageBody::Sequence(vec![List(vec![]), List(vec![Value::from(true)])]),
            ..Default::default()
        };
        fail_next("body_sequence");

        assert!(matches!(
            adapter.to_implementation(&message),
            Err(AdapterError::Engine {
                operation: "body_sequence",
                ..
            })
        ));
    }
}
