use byteorder::WriteBytesExt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::{AmqpDecoder, AmqpEncoder};
use crate::{
    codec::decoder::read_u8,
    error::{AmqpDecodeError, AmqpEncodeError},
    types::Descriptor,
};

macro_rules! section_descriptors {
    ($($name:ident = $code:literal),* $(,)?) => {
        $(pub const $name: Descriptor = Descriptor::Ulong($code);)*
    };
}

// Numeric descriptors of the bare and annotated message sections.
section_descriptors! {
    MESSAGE_HEADER = 0x70,
    MESSAGE_DELIVERY_ANNOTATIONS = 0x71,
    MESSAGE_ANNOTATIONS = 0x72,
    MESSAGE_PROPERTIES = 0x73,
    MESSAGE_APPLICATION_PROPERTIES = 0x74,
    MESSAGE_BODY_DATA = 0x75,
    MESSAGE_BODY_SEQUENCE = 0x76,
    MESSAGE_BODY_VALUE = 0x77,
    MESSAGE_FOOTER = 0x78,
}

/// Constructor byte that opens every encoded value.
#[derive(Debug, TryFromPrimitive, Clone, Copy, IntoPrimitive, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    Described = 0x00,

    // no payload
    Null = 0x40,
    BooleanTrue = 0x41,
    BooleanFalse = 0x42,
    UInt0 = 0x43,
    ULong0 = 0x44,
    List0 = 0x45,

    // one byte
    UByte = 0x50,
    Byte = 0x51,
    UIntSmall = 0x52,
    ULongSmall = 0x53,
    IntSmall = 0x54,
    LongSmall = 0x55,
    Boolean = 0x56,

    // two bytes
    UShort = 0x60,
    Short = 0x61,

    // four bytes
    UInt = 0x70,
    Int = 0x71,
    Float = 0x72,
    Char = 0x73,

    // eight bytes
    ULong = 0x80,
    Long = 0x81,
    Double = 0x82,
    Timestamp = 0x83,

    Uuid = 0x98,

    // one byte length prefix
    Binary8 = 0xa0,
    String8 = 0xa1,
    Symbol8 = 0xa3,

    // four byte length prefix
    Binary32 = 0xb0,
    String32 = 0xb1,
    Symbol32 = 0xb3,

    // sized compounds
    List8 = 0xc0,
    Map8 = 0xc1,
    List32 = 0xd0,
    Map32 = 0xd1,
    Array8 = 0xe0,
    Array32 = 0xf0,
}

impl TypeCode {
    /// List, map and array constructors, the ones that frame other values.
    pub fn is_compound(self) -> bool {
        matches!(
            self,
            TypeCode::List0
                | TypeCode::List8
                | TypeCode::List32
                | TypeCode::Map8
                | TypeCode::Map32
                | TypeCode::Array8
                | TypeCode::Array32
        )
    }

    /// Constructors of a single scalar value.
    pub fn is_primitive(self) -> bool {
        self != TypeCode::Described && !self.is_compound()
    }
}

impl AmqpEncoder for TypeCode {
    fn encoded_size(&self) -> u32 {
        1
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        writer.write_u8(u8::from(*self))?;
        Ok(())
    }
}

impl AmqpDecoder for TypeCode {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, byte) = read_u8(input)?;
        let code = TypeCode::try_from(byte).map_err(|_| AmqpDecodeError::InvalidTypeCode(byte))?;
        Ok((input, code))
    }
}
