use std::marker::PhantomData;

use super::{
    check_convertible, from_native, AdapterError, EngineCall, EngineError, MessageAdapter,
    NativeMessage,
};
use crate::{
    message::{AmqpMessage, Header, MessageBody, Properties},
    types::{Binary, List, Value},
};

/// A native handle created empty and filled in with fallible setters.
pub trait MutableMessage: NativeMessage + Sized {
    fn create() -> Result<Self, EngineError>;

    fn set_message_format(&mut self, format: u32) -> Result<(), EngineError>;
    fn set_header(&mut self, header: Header) -> Result<(), EngineError>;
    fn set_properties(&mut self, properties: Properties) -> Result<(), EngineError>;
    fn set_delivery_annotations(&mut self, annotations: Value) -> Result<(), EngineError>;
    fn set_message_annotations(&mut self, annotations: Value) -> Result<(), EngineError>;
    fn set_application_properties(&mut self, properties: Value) -> Result<(), EngineError>;
    fn set_delivery_tag(&mut self, tag: Value) -> Result<(), EngineError>;
    fn set_footer(&mut self, footer: Value) -> Result<(), EngineError>;
    fn add_body_data(&mut self, data: Binary) -> Result<(), EngineError>;
    fn add_body_sequence(&mut self, sequence: List) -> Result<(), EngineError>;
    fn set_body_value(&mut self, value: Value) -> Result<(), EngineError>;
}

/// Adapter for engines whose handles are mutated in place.
#[derive(Debug)]
pub struct InPlaceAdapter<M> {
    _engine: PhantomData<fn() -> M>,
}

impl<M> InPlaceAdapter<M> {
    pub fn new() -> Self {
        InPlaceAdapter {
            _engine: PhantomData,
        }
    }
}

impl<M> Default for InPlaceAdapter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MutableMessage> MessageAdapter for InPlaceAdapter<M> {
    type Handle = M;

    fn to_implementation(&self, message: &AmqpMessage) -> Result<M, AdapterError> {
        check_convertible(message)?;

        let mut handle = M::create().engine_call("create")?;

        handle
            .set_message_format(message.message_format)
            .engine_call("set_message_format")?;
        handle
            .set_header(message.header.clone())
            .engine_call("set_header")?;
        handle
            .set_properties(message.properties.clone())
            .engine_call("set_properties")?;

        if !message.delivery_annotations.is_empty() {
            handle
                .set_delivery_annotations(message.delivery_annotations.to_value())
                .engine_call("set_delivery_annotations")?;
        }
        if !message.message_annotations.is_empty() {
            handle
                .set_message_annotations(message.message_annotations.to_value())
                .engine_call("set_message_annotations")?;
        }
        if !message.application_properties.is_empty() {
            handle
                .set_application_properties(message.application_properties.to_value())
                .engine_call("set_application_properties")?;
        }
        if let Some(tag) = &message.delivery_tag {
            handle
                .set_delivery_tag(tag.clone())
                .engine_call("set_delivery_tag")?;
        }
        if !message.footer.is_empty() {
            handle
                .set_footer(message.footer.to_value())
                .engine_call("set_footer")?;
        }

        match &message.body {
            MessageBody::None => {}
            MessageBody::Data(chunks) => {
                for chunk in chunks {
                    handle
                        .add_body_data(chunk.clone())
                        .engine_call("add_body_data")?;
                }
            }
            MessageBody::Sequence(lists) => {
                for list in lists {
                    handle
                        .add_body_sequence(list.clone())
                        .engine_call("add_body_sequence")?;
                }
            }
            MessageBody::Value(value) => {
                handle
                    .set_body_value(value.clone())
                    .engine_call("set_body_value")?;
            }
            MessageBody::Invalid => return Err(AdapterError::InvalidBody),
        }

        Ok(handle)
    }

    fn from_implementation(&self, handle: &M) -> Result<AmqpMessage, AdapterError> {
        from_native(handle)
    }
}
