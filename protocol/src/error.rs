use std::{fmt, string::FromUtf8Error};

use crate::{
    codec::constants::TypeCode,
    message::SectionKind,
    types::{AmqpValueType, Descriptor},
};

/// Not enough input: the decoder needed at least this many bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteError(pub usize);

/// Violation of the application-properties typing rule: keys are strings and
/// values are simple (no list, map, array or described value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationPropertyError {
    NonStringKey(AmqpValueType),
    NonSimpleValue {
        key: String,
        value_type: AmqpValueType,
    },
}

impl fmt::Display for ApplicationPropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationPropertyError::NonStringKey(key_type) => {
                write!(f, "application property key must be a string, got {}", key_type)
            }
            ApplicationPropertyError::NonSimpleValue { key, value_type } => write!(
                f,
                "application property {:?} must be a simple value, got {}",
                key, value_type
            ),
        }
    }
}

#[derive(Debug)]
pub enum AmqpEncodeError {
    Io(std::io::Error),
    InvalidApplicationProperty(ApplicationPropertyError),
    InvalidBody,
    HeterogeneousArray {
        expected: AmqpValueType,
        found: AmqpValueType,
    },
    NullArrayElement,
}

impl fmt::Display for AmqpEncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmqpEncodeError::Io(err) => write!(f, "io error: {}", err),
            AmqpEncodeError::InvalidApplicationProperty(err) => fmt::Display::fmt(err, f),
            AmqpEncodeError::InvalidBody => write!(f, "message body is in the invalid state"),
            AmqpEncodeError::HeterogeneousArray { expected, found } => write!(
                f,
                "array elements must share one type: expected {}, found {}",
                expected, found
            ),
            AmqpEncodeError::NullArrayElement => write!(f, "array elements cannot be null"),
        }
    }
}

impl std::error::Error for AmqpEncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmqpEncodeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AmqpEncodeError {
    fn from(err: std::io::Error) -> Self {
        AmqpEncodeError::Io(err)
    }
}

impl From<ApplicationPropertyError> for AmqpEncodeError {
    fn from(err: ApplicationPropertyError) -> Self {
        AmqpEncodeError::InvalidApplicationProperty(err)
    }
}

#[derive(Debug)]
pub enum AmqpDecodeError {
    InvalidTypeCode(u8),
    InvalidTypeCodeFor {
        target: String,
        code: TypeCode,
    },
    MessageParse(String),
    Incomplete(IncompleteError),
    Utf8Error(FromUtf8Error),
    UuidError(uuid::Error),
    TypeMismatch {
        expected: AmqpValueType,
        actual: AmqpValueType,
    },
    UnknownSection(Descriptor),
    SectionOrder {
        section: SectionKind,
        previous: SectionKind,
    },
    InvalidApplicationProperty(ApplicationPropertyError),
}

impl AmqpDecodeError {
    pub fn parse_error(msg: impl Into<String>) -> AmqpDecodeError {
        AmqpDecodeError::MessageParse(msg.into())
    }
}

impl fmt::Display for AmqpDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmqpDecodeError::InvalidTypeCode(code) => write!(f, "invalid type code {:#04x}", code),
            AmqpDecodeError::InvalidTypeCodeFor { target, code } => {
                write!(f, "invalid type code {:?} for {}", code, target)
            }
            AmqpDecodeError::MessageParse(msg) => write!(f, "message parse error: {}", msg),
            AmqpDecodeError::Incomplete(IncompleteError(needed)) => {
                write!(f, "incomplete input, needed {} bytes", needed)
            }
            AmqpDecodeError::Utf8Error(err) => write!(f, "invalid utf-8: {}", err),
            AmqpDecodeError::UuidError(err) => write!(f, "invalid uuid: {}", err),
            AmqpDecodeError::TypeMismatch { expected, actual } => {
                write!(f, "expected {} value, got {}", expected, actual)
            }
            AmqpDecodeError::UnknownSection(descriptor) => {
                write!(f, "unknown message section {:?}", descriptor)
            }
            AmqpDecodeError::SectionOrder { section, previous } => write!(
                f,
                "message section {} is not allowed after {}",
                section, previous
            ),
            AmqpDecodeError::InvalidApplicationProperty(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for AmqpDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmqpDecodeError::Utf8Error(err) => Some(err),
            AmqpDecodeError::UuidError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IncompleteError> for AmqpDecodeError {
    fn from(err: IncompleteError) -> Self {
        AmqpDecodeError::Incomplete(err)
    }
}

impl From<FromUtf8Error> for AmqpDecodeError {
    fn from(err: FromUtf8Error) -> Self {
        AmqpDecodeError::Utf8Error(err)
    }
}

impl From<uuid::Error> for AmqpDecodeError {
    fn from(err: uuid::Error) -> Self {
        AmqpDecodeError::UuidError(err)
    }
}

impl From<ApplicationPropertyError> for AmqpDecodeError {
    fn from(err: ApplicationPropertyError) -> Self {
        AmqpDecodeError::InvalidApplicationProperty(err)
    }
}
