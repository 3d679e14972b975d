use std::fmt;

use super::primitives::SimpleValue;
use super::symbol::Symbol;
use crate::codec::constants::TypeCode;
use crate::codec::{AmqpDecoder, AmqpEncoder};
use crate::error::{AmqpDecodeError, AmqpEncodeError};

/// Descriptor of a described value: a numeric code or a symbolic name.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum Descriptor {
    Ulong(u64),
    Symbol(Symbol),
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Ulong(code) => write!(f, "{:#x}", code),
            Descriptor::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}

impl From<u64> for Descriptor {
    fn from(code: u64) -> Self {
        Descriptor::Ulong(code)
    }
}

impl From<Symbol> for Descriptor {
    fn from(symbol: Symbol) -> Self {
        Descriptor::Symbol(symbol)
    }
}

/// Encodes the described-type constructor (`0x00`) followed by the descriptor.
impl AmqpEncoder for Descriptor {
    fn encoded_size(&self) -> u32 {
        match *self {
            Descriptor::Ulong(v) => 1 + v.encoded_size(),
            Descriptor::Symbol(ref v) => 1 + v.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        TypeCode::Described.encode(writer)?;
        match *self {
            Descriptor::Ulong(v) => v.encode(writer),
            Descriptor::Symbol(ref v) => v.encode(writer),
        }
    }
}

impl AmqpDecoder for Descriptor {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, code) = TypeCode::decode(input)?;
        if code != TypeCode::Described {
            return Err(Self::invalid_type_code(code));
        }

        let (_, code) = TypeCode::decode(input)?;
        match SimpleValue::decode(input) {
            Ok((input, SimpleValue::Ulong(number))) => Ok((input, Descriptor::Ulong(number))),
            Ok((input, SimpleValue::Symbol(name))) => Ok((input, Descriptor::Symbol(name))),
            Ok(_) | Err(AmqpDecodeError::InvalidTypeCodeFor { .. }) => {
                Err(Self::invalid_type_code(code))
            }
            Err(err) => Err(err),
        }
    }
}
