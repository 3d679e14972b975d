use std::fmt;

use crate::{
    codec::{
        constants::{MESSAGE_BODY_DATA, MESSAGE_BODY_SEQUENCE, MESSAGE_BODY_VALUE},
        AmqpEncoder,
    },
    error::AmqpEncodeError,
    types::{Binary, List, Value},
};

/// Which shape the body of a message has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    None,
    Data,
    Sequence,
    Value,
    Invalid,
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Message body: binary chunks, lists or a single value, never a mix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MessageBody {
    #[default]
    None,
    Data(Vec<Binary>),
    Sequence(Vec<List>),
    Value(Value),
    /// Produced by engines reporting a body they cannot represent. Never
    /// serializable.
    Invalid,
}

impl MessageBody {
    pub fn body_type(&self) -> BodyType {
        match self {
            MessageBody::None => BodyType::None,
            MessageBody::Data(_) => BodyType::Data,
            MessageBody::Sequence(_) => BodyType::Sequence,
            MessageBody::Value(_) => BodyType::Value,
            MessageBody::Invalid => BodyType::Invalid,
        }
    }

    pub fn data(&self) -> Option<&[Binary]> {
        match self {
            MessageBody::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn sequence(&self) -> Option<&[List]> {
        match self {
            MessageBody::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            MessageBody::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Appends a data chunk, replacing any body of another shape.
    pub fn push_data(&mut self, data: impl Into<Binary>) -> &mut Self {
        match self {
            MessageBody::Data(chunks) => chunks.push(data.into()),
            _ => *self = MessageBody::Data(vec![data.into()]),
        }
        self
    }

    /// Appends a sequence section, replacing any body of another shape.
    pub fn push_sequence(&mut self, list: List) -> &mut Self {
        match self {
            MessageBody::Sequence(lists) => lists.push(list),
            _ => *self = MessageBody::Sequence(vec![list]),
        }
        self
    }

    pub fn set_data(&mut self, data: impl Into<Binary>) -> &mut Self {
        *self = MessageBody::Data(vec![data.into()]);
        self
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        *self = MessageBody::Value(value.into());
        self
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageBody::None => write!(f, "none"),
            MessageBody::Data(chunks) => {
                let sizes: Vec<String> = chunks.iter().map(|chunk| chunk.len().to_string()).collect();
                write!(f, "data[{}]", sizes.join(", "))
            }
            MessageBody::Sequence(lists) => {
                let lists: Vec<String> = lists.iter().map(List::to_string).collect();
                write!(f, "sequence[{}]", lists.join(", "))
            }
            MessageBody::Value(value) => write!(f, "value({})", value),
            MessageBody::Invalid => write!(f, "invalid"),
        }
    }
}

impl AmqpEncoder for MessageBody {
    fn encoded_size(&self) -> u32 {
        match self {
            MessageBody::Data(chunks) => chunks.iter().fold(0, |acc, chunk| {
                acc + MESSAGE_BODY_DATA.encoded_size() + chunk.encoded_size()
            }),
            MessageBody::Sequence(lists) => lists.iter().fold(0, |acc, list| {
                acc + MESSAGE_BODY_SEQUENCE.encoded_size() + list.encoded_size()
            }),
            MessageBody::Value(value) => MESSAGE_BODY_VALUE.encoded_size() + value.encoded_size(),
            MessageBody::None | MessageBody::Invalid => 0,
        }
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        match self {
            MessageBody::None => {}
            MessageBody::Data(chunks) => {
                for chunk in chunks {
                    MESSAGE_BODY_DATA.encode(writer)?;
                    chunk.encode(writer)?;
                }
            }
            MessageBody::Sequence(lists) => {
                for list in lists {
                    MESSAGE_BODY_SEQUENCE.encode(writer)?;
                    list.encode(writer)?;
                }
            }
            MessageBody::Value(value) => {
                MESSAGE_BODY_VALUE.encode(writer)?;
                value.encode(writer)?;
            }
            MessageBody::Invalid => return Err(AmqpEncodeError::InvalidBody),
        }
        Ok(())
    }
}
