use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use super::constants::TypeCode;
use crate::error::AmqpEncodeError;

/// Bytes written after a scalar's constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Payload<'a> {
    Empty,
    Fixed1(u8),
    Fixed2(u16),
    Fixed4(u32),
    Fixed8(u64),
    Fixed16(&'a [u8; 16]),
    /// One byte length prefix.
    Short(&'a [u8]),
    /// Four byte length prefix.
    Long(&'a [u8]),
}

impl Payload<'_> {
    pub(crate) fn size(&self) -> u32 {
        match self {
            Payload::Empty => 0,
            Payload::Fixed1(_) => 1,
            Payload::Fixed2(_) => 2,
            Payload::Fixed4(_) => 4,
            Payload::Fixed8(_) => 8,
            Payload::Fixed16(_) => 16,
            Payload::Short(bytes) => 1 + bytes.len() as u32,
            Payload::Long(bytes) => 4 + bytes.len() as u32,
        }
    }

    pub(crate) fn write(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        match self {
            Payload::Empty => {}
            Payload::Fixed1(byte) => writer.write_u8(*byte)?,
            Payload::Fixed2(value) => writer.write_u16::<BigEndian>(*value)?,
            Payload::Fixed4(value) => writer.write_u32::<BigEndian>(*value)?,
            Payload::Fixed8(value) => writer.write_u64::<BigEndian>(*value)?,
            Payload::Fixed16(bytes) => writer.write_all(bytes.as_slice())?,
            Payload::Short(bytes) => {
                writer.write_u8(bytes.len() as u8)?;
                writer.write_all(bytes)?;
            }
            Payload::Long(bytes) => {
                writer.write_u32::<BigEndian>(bytes.len() as u32)?;
                writer.write_all(bytes)?;
            }
        }
        Ok(())
    }
}

/// A value written as one constructor followed by its payload.
pub(crate) trait Scalar {
    /// Smallest encoding of the value.
    fn compact(&self) -> (TypeCode, Payload<'_>);

    /// Encoding inside arrays, where one constructor has to fit every element.
    fn wide(&self) -> (TypeCode, Payload<'_>) {
        self.compact()
    }
}

/// Picks the one or four byte length prefix for a variable width payload.
pub(crate) fn variable<'a>(bytes: &'a [u8], short: TypeCode, long: TypeCode) -> (TypeCode, Payload<'a>) {
    if bytes.len() > u8::MAX as usize {
        (long, Payload::Long(bytes))
    } else {
        (short, Payload::Short(bytes))
    }
}

/// Implements the codec traits for scalar types.
///
/// Encoding goes through [`Scalar::compact`]. Decoding reads any primitive and
/// converts it, so a type accepts each of its wire forms.
macro_rules! scalar_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::codec::AmqpEncoder for $ty {
                fn encoded_size(&self) -> u32 {
                    1 + $crate::codec::scalar::Scalar::compact(self).1.size()
                }

                fn encode(
                    &self,
                    writer: &mut impl std::io::Write,
                ) -> Result<(), $crate::error::AmqpEncodeError> {
                    let (code, payload) = $crate::codec::scalar::Scalar::compact(self);
                    $crate::codec::AmqpEncoder::encode(&code, writer)?;
                    payload.write(writer)
                }
            }

            impl $crate::codec::AmqpDecoder for $ty {
                fn decode(input: &[u8]) -> Result<(&[u8], Self), $crate::error::AmqpDecodeError> {
                    let (input, code) =
                        <$crate::codec::constants::TypeCode as $crate::codec::AmqpDecoder>::decode(input)?;
                    if !code.is_primitive() {
                        return Err(<Self as $crate::codec::AmqpDecoder>::invalid_type_code(code));
                    }
                    let (input, value) = $crate::types::SimpleValue::read_payload(code, input)?;
                    <$ty>::try_from(value)
                        .map(|value| (input, value))
                        .map_err(|_| <Self as $crate::codec::AmqpDecoder>::invalid_type_code(code))
                }
            }
        )*
    };
}

pub(crate) use scalar_codec;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{variable, Payload};
    use crate::codec::constants::TypeCode;

    #[test]
    fn payload_size_counts_length_prefix() {
        assert_eq!(Payload::Empty.size(), 0);
        assert_eq!(Payload::Short(b"abc").size(), 4);
        assert_eq!(Payload::Long(b"abc").size(), 7);
    }

    #[test]
    fn variable_switches_prefix_past_255_bytes() {
        let short = vec![0u8; 255];
        let long = vec![0u8; 256];

        assert_eq!(
            variable(&short, TypeCode::Binary8, TypeCode::Binary32).0,
            TypeCode::Binary8
        );
        assert_eq!(
            variable(&long, TypeCode::Binary8, TypeCode::Binary32).0,
            TypeCode::Binary32
        );
    }

    #[test]
    fn payload_writes_big_endian() {
        let mut buffer = vec![];
        Payload::Fixed4(0x0102_0304).write(&mut buffer).unwrap();
        Payload::Short(b"z").write(&mut buffer).unwrap();
        assert_eq!(buffer, vec![1, 2, 3, 4, 1, b'z']);
    }
}
