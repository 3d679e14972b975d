//! Binding of [`AmqpMessage`] to native message engines.
//!
//! Two engine styles are supported: handles that are created empty and
//! mutated field by field ([`MutableMessage`], adapted by [`InPlaceAdapter`])
//! and immutable builders consumed once ([`MessageBuilder`], adapted by
//! [`BuilderAdapter`]). Both read back through [`NativeMessage`].

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    error::{AmqpDecodeError, AmqpEncodeError},
    message::{AmqpMessage, BodyType, Header, MessageBody, Properties},
    types::{Annotations, ApplicationProperties, Binary, List, Value},
};

mod builder;
mod in_place;

pub use builder::{BuilderAdapter, MessageBuilder};
pub use in_place::{InPlaceAdapter, MutableMessage};

/// Failure reported by a native engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError(pub String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EngineError {}

#[derive(Debug)]
pub enum AdapterError {
    /// A native call failed; `operation` names the engine call.
    Engine {
        operation: &'static str,
        source: EngineError,
    },
    /// The engine reported a body type tag outside the known set.
    UnknownBodyType(u32),
    InvalidBody,
    Encode(AmqpEncodeError),
    Decode(AmqpDecodeError),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::Engine { operation, source } => {
                write!(f, "engine call {} failed: {}", operation, source)
            }
            AdapterError::UnknownBodyType(tag) => write!(f, "unknown native body type {}", tag),
            AdapterError::InvalidBody => write!(f, "message body is in the invalid state"),
            AdapterError::Encode(err) => fmt::Display::fmt(err, f),
            AdapterError::Decode(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdapterError::Engine { source, .. } => Some(source),
            AdapterError::Encode(err) => Some(err),
            AdapterError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AmqpDecodeError> for AdapterError {
    fn from(err: AmqpDecodeError) -> Self {
        AdapterError::Decode(err)
    }
}

impl From<AmqpEncodeError> for AdapterError {
    fn from(err: AmqpEncodeError) -> Self {
        AdapterError::Encode(err)
    }
}

/// Attaches the engine call name to a failed native result.
pub(crate) trait EngineCall<T> {
    fn engine_call(self, operation: &'static str) -> Result<T, AdapterError>;
}

impl<T> EngineCall<T> for Result<T, EngineError> {
    fn engine_call(self, operation: &'static str) -> Result<T, AdapterError> {
        self.map_err(|source| AdapterError::Engine { operation, source })
    }
}

/// Body type tags as reported by native engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum RawBodyType {
    None = 0,
    Data = 1,
    Sequence = 2,
    Value = 3,
    Invalid = 4,
}

impl From<BodyType> for RawBodyType {
    fn from(body_type: BodyType) -> Self {
        match body_type {
            BodyType::None => RawBodyType::None,
            BodyType::Data => RawBodyType::Data,
            BodyType::Sequence => RawBodyType::Sequence,
            BodyType::Value => RawBodyType::Value,
            BodyType::Invalid => RawBodyType::Invalid,
        }
    }
}

/// Read access to a native message handle.
///
/// Annotation maps, application properties and the footer are handed over as
/// generic map values, the way engines store them.
pub trait NativeMessage {
    fn message_format(&self) -> u32;
    fn header(&self) -> Option<Header>;
    fn properties(&self) -> Option<Properties>;
    fn delivery_annotations(&self) -> Option<Value>;
    fn message_annotations(&self) -> Option<Value>;
    fn application_properties(&self) -> Option<Value>;
    fn delivery_tag(&self) -> Option<Value> {
        None
    }
    fn footer(&self) -> Option<Value>;
    /// Raw body type tag, see [`RawBodyType`].
    fn body_type(&self) -> u32;
    fn body_data(&self) -> Vec<Binary>;
    fn body_sequence(&self) -> Vec<List>;
    fn body_value(&self) -> Option<Value>;
}

/// Converts between [`AmqpMessage`] and an engine's native handle.
pub trait MessageAdapter {
    type Handle;

    fn to_implementation(&self, message: &AmqpMessage) -> Result<Self::Handle, AdapterError>;
    fn from_implementation(&self, handle: &Self::Handle) -> Result<AmqpMessage, AdapterError>;
}

/// Checks a message before any engine sees it.
pub(crate) fn check_convertible(message: &AmqpMessage) -> Result<(), AdapterError> {
    if message.body_type() == BodyType::Invalid {
        return Err(AdapterError::InvalidBody);
    }
    message
        .application_properties
        .validate()
        .map_err(|err| AdapterError::Encode(err.into()))
}

/// Reads a native handle back into an [`AmqpMessage`].
pub fn from_native<N: NativeMessage + ?Sized>(native: &N) -> Result<AmqpMessage, AdapterError> {
    let mut message = AmqpMessage {
        message_format: native.message_format(),
        delivery_tag: native.delivery_tag(),
        ..Default::default()
    };

    if let Some(header) = native.header() {
        message.header = header;
    }
    if let Some(properties) = native.properties() {
        message.properties = properties;
    }
    if let Some(annotations) = native.delivery_annotations() {
        message.delivery_annotations = Annotations::try_from_value(&annotations)?;
    }
    if let Some(annotations) = native.message_annotations() {
        message.message_annotations = Annotations::try_from_value(&annotations)?;
    }
    if let Some(properties) = native.application_properties() {
        message.application_properties = ApplicationProperties::try_from_wire_value(properties)?;
    }
    if let Some(footer) = native.footer() {
        message.footer = Annotations::try_from_value(&footer)?;
    }

    let tag = native.body_type();
    message.body = match RawBodyType::try_from(tag) {
        Ok(RawBodyType::None) => MessageBody::None,
        Ok(RawBodyType::Data) => MessageBody::Data(native.body_data()),
        Ok(RawBodyType::Sequence) => MessageBody::Sequence(native.body_sequence()),
        Ok(RawBodyType::Value) => MessageBody::Value(native.body_value().unwrap_or_default()),
        Ok(RawBodyType::Invalid) => return Err(AdapterError::InvalidBody),
        Err(_) => return Err(AdapterError::UnknownBodyType(tag)),
    };

    Ok(message)
}
