use std::{any::type_name, io::Write};

use self::constants::TypeCode;

use crate::error::{AmqpDecodeError, AmqpEncodeError};

pub mod constants;
pub mod decoder;
pub(crate) mod scalar;

/// Deepest nesting of described values and compounds accepted on decode.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Writes a value in its AMQP 1.0 wire form.
pub trait AmqpEncoder {
    /// Exact number of bytes `encode` will write.
    fn encoded_size(&self) -> u32;
    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError>;
}

/// Reads a value from its AMQP 1.0 wire form, returning the unread input.
pub trait AmqpDecoder
where
    Self: Sized,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError>;

    /// Decodes a value sitting `depth` described values or compounds deep.
    /// Types that can contain other values override this to enforce
    /// [`MAX_NESTING_DEPTH`].
    fn decode_nested(input: &[u8], _depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode(input)
    }

    fn invalid_type_code(code: TypeCode) -> AmqpDecodeError {
        AmqpDecodeError::InvalidTypeCodeFor {
            target: type_name::<Self>().to_string(),
            code,
        }
    }
}
