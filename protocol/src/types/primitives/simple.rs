use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use derive_more::{From, TryInto};
use ordered_float::OrderedFloat;

use crate::{
    codec::{
        constants::TypeCode,
        decoder::{
            read_exact, read_i16, read_i32, read_i64, read_i8, read_sized, read_u16, read_u32,
            read_u64, read_u8, MapDecoded,
        },
        scalar::{scalar_codec, variable, Payload, Scalar},
        AmqpDecoder,
    },
    error::AmqpDecodeError,
    types::{AmqpValueType, Symbol},
};

pub type Boolean = bool;
pub type UByte = u8;
pub type UShort = u16;
pub type UInt = u32;
pub type ULong = u64;
pub type Byte = i8;
pub type Short = i16;
pub type Int = i32;
pub type Long = i64;
pub type Char = char;
pub type Uuid = uuid::Uuid;
pub type Binary = Vec<u8>;
pub type Str = String;

/// Primitive AMQP 1.0 data type
#[derive(Debug, Eq, PartialEq, Hash, Clone, From, TryInto)]
#[try_into(owned, ref, ref_mut)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum SimpleValue {
    Null,
    Boolean(Boolean),
    Ubyte(UByte),
    Ushort(UShort),
    Uint(UInt),
    Ulong(ULong),
    Byte(Byte),
    Short(Short),
    Int(Int),
    Long(Long),
    Float(Float),
    Double(Double),
    Char(Char),
    Timestamp(Timestamp),
    Uuid(Uuid),
    Binary(Binary),
    String(Str),
    Symbol(Symbol),
}

impl From<&str> for SimpleValue {
    fn from(string: &str) -> Self {
        SimpleValue::String(string.into())
    }
}

/// Runs `$body` with `$inner` bound to the payload of any non-null variant.
macro_rules! with_inner {
    ($value:expr, $null:expr, |$inner:ident| $body:expr) => {
        match $value {
            SimpleValue::Null => $null,
            SimpleValue::Boolean($inner) => $body,
            SimpleValue::Ubyte($inner) => $body,
            SimpleValue::Ushort($inner) => $body,
            SimpleValue::Uint($inner) => $body,
            SimpleValue::Ulong($inner) => $body,
            SimpleValue::Byte($inner) => $body,
            SimpleValue::Short($inner) => $body,
            SimpleValue::Int($inner) => $body,
            SimpleValue::Long($inner) => $body,
            SimpleValue::Float($inner) => $body,
            SimpleValue::Double($inner) => $body,
            SimpleValue::Char($inner) => $body,
            SimpleValue::Timestamp($inner) => $body,
            SimpleValue::Uuid($inner) => $body,
            SimpleValue::Binary($inner) => $body,
            SimpleValue::String($inner) => $body,
            SimpleValue::Symbol($inner) => $body,
        }
    };
}

impl SimpleValue {
    pub fn value_type(&self) -> AmqpValueType {
        match self {
            SimpleValue::Null => AmqpValueType::Null,
            SimpleValue::Boolean(_) => AmqpValueType::Boolean,
            SimpleValue::Ubyte(_) => AmqpValueType::Ubyte,
            SimpleValue::Ushort(_) => AmqpValueType::Ushort,
            SimpleValue::Uint(_) => AmqpValueType::Uint,
            SimpleValue::Ulong(_) => AmqpValueType::Ulong,
            SimpleValue::Byte(_) => AmqpValueType::Byte,
            SimpleValue::Short(_) => AmqpValueType::Short,
            SimpleValue::Int(_) => AmqpValueType::Int,
            SimpleValue::Long(_) => AmqpValueType::Long,
            SimpleValue::Float(_) => AmqpValueType::Float,
            SimpleValue::Double(_) => AmqpValueType::Double,
            SimpleValue::Char(_) => AmqpValueType::Char,
            SimpleValue::Timestamp(_) => AmqpValueType::Timestamp,
            SimpleValue::Uuid(_) => AmqpValueType::Uuid,
            SimpleValue::Binary(_) => AmqpValueType::Binary,
            SimpleValue::String(_) => AmqpValueType::String,
            SimpleValue::Symbol(_) => AmqpValueType::Symbol,
        }
    }

    /// Reads the payload that follows constructor `code`.
    pub(crate) fn read_payload(
        code: TypeCode,
        input: &[u8],
    ) -> Result<(&[u8], SimpleValue), AmqpDecodeError> {
        let wide = matches!(
            code,
            TypeCode::Binary32 | TypeCode::String32 | TypeCode::Symbol32
        );
        let value = match code {
            TypeCode::Null => (input, SimpleValue::Null),
            TypeCode::BooleanTrue => (input, SimpleValue::Boolean(true)),
            TypeCode::BooleanFalse => (input, SimpleValue::Boolean(false)),
            TypeCode::UInt0 => (input, SimpleValue::Uint(0)),
            TypeCode::ULong0 => (input, SimpleValue::Ulong(0)),
            TypeCode::Boolean => read_u8(input).map_decoded(|byte| SimpleValue::Boolean(byte != 0))?,
            TypeCode::UByte => read_u8(input).map_decoded(SimpleValue::Ubyte)?,
            TypeCode::UShort => read_u16(input).map_decoded(SimpleValue::Ushort)?,
            TypeCode::UIntSmall => read_u8(input).map_decoded(|small| SimpleValue::Uint(small.into()))?,
            TypeCode::UInt => read_u32(input).map_decoded(SimpleValue::Uint)?,
            TypeCode::ULongSmall => read_u8(input).map_decoded(|small| SimpleValue::Ulong(small.into()))?,
            TypeCode::ULong => read_u64(input).map_decoded(SimpleValue::Ulong)?,
            TypeCode::Byte => read_i8(input).map_decoded(SimpleValue::Byte)?,
            TypeCode::Short => read_i16(input).map_decoded(SimpleValue::Short)?,
            TypeCode::IntSmall => read_i8(input).map_decoded(|small| SimpleValue::Int(small.into()))?,
            TypeCode::Int => read_i32(input).map_decoded(SimpleValue::Int)?,
            TypeCode::LongSmall => read_i8(input).map_decoded(|small| SimpleValue::Long(small.into()))?,
            TypeCode::Long => read_i64(input).map_decoded(SimpleValue::Long)?,
            TypeCode::Float => {
                read_u32(input).map_decoded(|bits| SimpleValue::Float(f32::from_bits(bits).into()))?
            }
            TypeCode::Double => {
                read_u64(input).map_decoded(|bits| SimpleValue::Double(f64::from_bits(bits).into()))?
            }
            TypeCode::Char => {
                let (input, raw) = read_u32(input)?;
                let ch = char::from_u32(raw)
                    .ok_or_else(|| AmqpDecodeError::parse_error(format!("invalid char {:#x}", raw)))?;
                (input, SimpleValue::Char(ch))
            }
            TypeCode::Timestamp => {
                let (input, millis) = read_i64(input)?;
                (input, SimpleValue::Timestamp(Timestamp::from_millis(millis)?))
            }
            TypeCode::Uuid => {
                let (input, bytes) = read_exact(input, 16)?;
                (input, SimpleValue::Uuid(Uuid::from_slice(bytes)?))
            }
            TypeCode::Binary8 | TypeCode::Binary32 => {
                read_sized(input, wide).map_decoded(|bytes| SimpleValue::Binary(bytes.to_vec()))?
            }
            TypeCode::String8 | TypeCode::String32 => {
                let (input, bytes) = read_sized(input, wide)?;
                (input, SimpleValue::String(String::from_utf8(bytes.to_vec())?))
            }
            TypeCode::Symbol8 | TypeCode::Symbol32 => {
                let (input, bytes) = read_sized(input, wide)?;
                let name = String::from_utf8(bytes.to_vec())?;
                (input, SimpleValue::Symbol(Symbol::from(name)))
            }
            _ => return Err(SimpleValue::invalid_type_code(code)),
        };
        Ok(value)
    }
}

impl fmt::Display for SimpleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleValue::Null => write!(f, "null"),
            SimpleValue::Boolean(value) => fmt::Display::fmt(value, f),
            SimpleValue::Ubyte(value) => fmt::Display::fmt(value, f),
            SimpleValue::Ushort(value) => fmt::Display::fmt(value, f),
            SimpleValue::Uint(value) => fmt::Display::fmt(value, f),
            SimpleValue::Ulong(value) => fmt::Display::fmt(value, f),
            SimpleValue::Byte(value) => fmt::Display::fmt(value, f),
            SimpleValue::Short(value) => fmt::Display::fmt(value, f),
            SimpleValue::Int(value) => fmt::Display::fmt(value, f),
            SimpleValue::Long(value) => fmt::Display::fmt(value, f),
            SimpleValue::Float(value) => fmt::Display::fmt(&value.value(), f),
            SimpleValue::Double(value) => fmt::Display::fmt(&value.value(), f),
            SimpleValue::Char(value) => write!(f, "{:?}", value),
            SimpleValue::Timestamp(value) => f.write_str(&value.as_datetime().to_rfc3339()),
            SimpleValue::Uuid(value) => fmt::Display::fmt(value, f),
            SimpleValue::Binary(value) => write!(f, "<{} bytes>", value.len()),
            SimpleValue::String(value) => write!(f, "{:?}", value),
            SimpleValue::Symbol(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl Scalar for SimpleValue {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        with_inner!(self, (TypeCode::Null, Payload::Empty), |inner| inner.compact())
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        with_inner!(self, (TypeCode::Null, Payload::Empty), |inner| inner.wide())
    }
}

impl Scalar for bool {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        let code = if *self {
            TypeCode::BooleanTrue
        } else {
            TypeCode::BooleanFalse
        };
        (code, Payload::Empty)
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Boolean, Payload::Fixed1(u8::from(*self)))
    }
}

impl Scalar for u8 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::UByte, Payload::Fixed1(*self))
    }
}

impl Scalar for u16 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::UShort, Payload::Fixed2(*self))
    }
}

impl Scalar for u32 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match *self {
            0 => (TypeCode::UInt0, Payload::Empty),
            small @ 1..=0xff => (TypeCode::UIntSmall, Payload::Fixed1(small as u8)),
            _ => self.wide(),
        }
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::UInt, Payload::Fixed4(*self))
    }
}

impl Scalar for u64 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match *self {
            0 => (TypeCode::ULong0, Payload::Empty),
            small @ 1..=0xff => (TypeCode::ULongSmall, Payload::Fixed1(small as u8)),
            _ => self.wide(),
        }
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::ULong, Payload::Fixed8(*self))
    }
}

impl Scalar for i8 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Byte, Payload::Fixed1(*self as u8))
    }
}

impl Scalar for i16 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Short, Payload::Fixed2(*self as u16))
    }
}

impl Scalar for i32 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match i8::try_from(*self) {
            Ok(small) => (TypeCode::IntSmall, Payload::Fixed1(small as u8)),
            Err(_) => self.wide(),
        }
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Int, Payload::Fixed4(*self as u32))
    }
}

impl Scalar for i64 {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match i8::try_from(*self) {
            Ok(small) => (TypeCode::LongSmall, Payload::Fixed1(small as u8)),
            Err(_) => self.wide(),
        }
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Long, Payload::Fixed8(*self as u64))
    }
}

impl Scalar for char {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Char, Payload::Fixed4(u32::from(*self)))
    }
}

impl Scalar for Uuid {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Uuid, Payload::Fixed16(self.as_bytes()))
    }
}

impl Scalar for Binary {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        variable(self, TypeCode::Binary8, TypeCode::Binary32)
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Binary32, Payload::Long(self))
    }
}

impl Scalar for Str {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        variable(self.as_bytes(), TypeCode::String8, TypeCode::String32)
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::String32, Payload::Long(self.as_bytes()))
    }
}

impl Scalar for Symbol {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        variable(self.as_str().as_bytes(), TypeCode::Symbol8, TypeCode::Symbol32)
    }

    fn wide(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Symbol32, Payload::Long(self.as_str().as_bytes()))
    }
}

/// 32-bit float with a total order, so values can be compared and hashed.
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub struct Float(OrderedFloat<f32>);

impl Float {
    pub fn value(&self) -> f32 {
        self.0.into_inner()
    }
}

impl From<f32> for Float {
    fn from(float: f32) -> Self {
        Float(OrderedFloat(float))
    }
}

impl Scalar for Float {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Float, Payload::Fixed4(self.value().to_bits()))
    }
}

/// 64-bit counterpart of [`Float`].
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub struct Double(OrderedFloat<f64>);

impl Double {
    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }
}

impl From<f64> for Double {
    fn from(double: f64) -> Self {
        Double(OrderedFloat(double))
    }
}

impl Scalar for Double {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Double, Payload::Fixed8(self.value().to_bits()))
    }
}

/// Point in time with millisecond precision.
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy, From)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Result<Self, AmqpDecodeError> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Timestamp)
            .ok_or_else(|| AmqpDecodeError::parse_error(format!("timestamp {} out of range", millis)))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.0
    }
}

impl Scalar for Timestamp {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        (TypeCode::Timestamp, Payload::Fixed8(self.millis() as u64))
    }
}

scalar_codec!(
    SimpleValue, Boolean, UByte, UShort, UInt, ULong, Byte, Short, Int, Long, Float, Double, Char,
    Timestamp, Uuid, Binary, Str, Symbol,
);
