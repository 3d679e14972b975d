use std::fmt;

use derive_more::{From, TryInto};

pub use annotations::{AnnotationKey, Annotations};
pub use descriptor::Descriptor;
pub use primitives::*;
pub use symbol::Symbol;

use crate::{
    codec::{
        constants::TypeCode,
        scalar::{scalar_codec, Payload, Scalar},
    },
    error::AmqpDecodeError,
};

mod annotations;
mod descriptor;
mod primitives;
mod symbol;

pub type Milliseconds = u32;
pub type SequenceNo = u32;
pub type Address = Str;

pub type DeliveryAnnotations = Annotations;
pub type MessageAnnotations = Annotations;
pub type Footer = Annotations;

/// Application properties: string keys, simple values only.
pub type ApplicationProperties = Map<Str, Value>;

/// Body of a sequence section.
pub type AmqpSequence = List;
/// Body of a value section.
pub type AmqpValue = Value;

/// Shape of a [`Value`], used for introspection and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmqpValueType {
    Null,
    Boolean,
    Ubyte,
    Ushort,
    Uint,
    Ulong,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Timestamp,
    Uuid,
    Binary,
    String,
    Symbol,
    List,
    Map,
    Array,
    Described,
}

impl fmt::Display for AmqpValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, From, TryInto)]
#[try_into(owned, ref, ref_mut)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum MessageId {
    ULong(ULong),
    Long(Long),
    Uuid(Uuid),
    Binary(Binary),
    String(Str),
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::String(id.to_string())
    }
}

impl From<MessageId> for Value {
    fn from(id: MessageId) -> Self {
        match id {
            MessageId::ULong(id) => id.into(),
            MessageId::Long(id) => id.into(),
            MessageId::Uuid(id) => id.into(),
            MessageId::Binary(id) => id.into(),
            MessageId::String(id) => id.into(),
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::ULong(id) => write!(f, "{}", id),
            MessageId::Long(id) => write!(f, "{}", id),
            MessageId::Uuid(id) => write!(f, "{}", id),
            MessageId::Binary(id) => write!(f, "<{} bytes>", id.len()),
            MessageId::String(id) => write!(f, "{:?}", id),
        }
    }
}

impl TryFrom<SimpleValue> for MessageId {
    type Error = AmqpDecodeError;

    fn try_from(value: SimpleValue) -> Result<Self, Self::Error> {
        match value {
            SimpleValue::Ulong(id) => Ok(MessageId::ULong(id)),
            SimpleValue::Long(id) => Ok(MessageId::Long(id)),
            SimpleValue::Uuid(id) => Ok(MessageId::Uuid(id)),
            SimpleValue::Binary(id) => Ok(MessageId::Binary(id)),
            SimpleValue::String(id) => Ok(MessageId::String(id)),
            other => Err(AmqpDecodeError::TypeMismatch {
                expected: AmqpValueType::String,
                actual: other.value_type(),
            }),
        }
    }
}

impl Scalar for MessageId {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match self {
            MessageId::ULong(id) => id.compact(),
            MessageId::Long(id) => id.compact(),
            MessageId::Uuid(id) => id.compact(),
            MessageId::Binary(id) => id.compact(),
            MessageId::String(id) => id.compact(),
        }
    }
}

scalar_codec!(MessageId);
