use std::fmt;

use super::{
    Array, Binary, Boolean, Byte, Char, Double, Float, Int, List, Long, Map, Short, SimpleValue,
    Str, Timestamp, UByte, UInt, ULong, UShort, Uuid,
};
use crate::{
    codec::{
        constants::TypeCode, decoder::MapDecoded, AmqpDecoder, AmqpEncoder, MAX_NESTING_DEPTH,
    },
    error::{AmqpDecodeError, AmqpEncodeError},
    types::{AmqpValueType, Descriptor, Symbol},
};
use derive_more::From;

/// AMQP 1.0 data types
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub enum Value {
    Simple(SimpleValue),
    Collection(CollectionValue),
    Described(DescribedValue),
}

impl Default for Value {
    fn default() -> Self {
        Value::Simple(SimpleValue::Null)
    }
}

impl Value {
    pub fn value_type(&self) -> AmqpValueType {
        match self {
            Value::Simple(simple) => simple.value_type(),
            Value::Collection(CollectionValue::List(_)) => AmqpValueType::List,
            Value::Collection(CollectionValue::Map(_)) => AmqpValueType::Map,
            Value::Collection(CollectionValue::Array(_)) => AmqpValueType::Array,
            Value::Described(_) => AmqpValueType::Described,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Simple(SimpleValue::Null))
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, Value::Simple(_))
    }

    fn mismatch(&self, expected: AmqpValueType) -> AmqpDecodeError {
        AmqpDecodeError::TypeMismatch {
            expected,
            actual: self.value_type(),
        }
    }

    pub fn as_simple(&self) -> Result<&SimpleValue, AmqpDecodeError> {
        match self {
            Value::Simple(simple) => Ok(simple),
            _ => Err(self.mismatch(AmqpValueType::Null)),
        }
    }

    pub fn as_map(&self) -> Result<&Map<Value, Value>, AmqpDecodeError> {
        match self {
            Value::Collection(CollectionValue::Map(map)) => Ok(map),
            _ => Err(self.mismatch(AmqpValueType::Map)),
        }
    }

    pub fn as_list(&self) -> Result<&List, AmqpDecodeError> {
        match self {
            Value::Collection(CollectionValue::List(list)) => Ok(list),
            _ => Err(self.mismatch(AmqpValueType::List)),
        }
    }

    pub fn as_array(&self) -> Result<&Array, AmqpDecodeError> {
        match self {
            Value::Collection(CollectionValue::Array(array)) => Ok(array),
            _ => Err(self.mismatch(AmqpValueType::Array)),
        }
    }

    pub fn as_described(&self) -> Result<&DescribedValue, AmqpDecodeError> {
        match self {
            Value::Described(described) => Ok(described),
            _ => Err(self.mismatch(AmqpValueType::Described)),
        }
    }

    pub fn as_binary(&self) -> Result<&Binary, AmqpDecodeError> {
        match self {
            Value::Simple(SimpleValue::Binary(binary)) => Ok(binary),
            _ => Err(self.mismatch(AmqpValueType::Binary)),
        }
    }

    pub fn as_string(&self) -> Result<&str, AmqpDecodeError> {
        match self {
            Value::Simple(SimpleValue::String(string)) => Ok(string),
            _ => Err(self.mismatch(AmqpValueType::String)),
        }
    }

    pub fn into_map(self) -> Result<Map<Value, Value>, AmqpDecodeError> {
        match self {
            Value::Collection(CollectionValue::Map(map)) => Ok(map),
            other => Err(other.mismatch(AmqpValueType::Map)),
        }
    }

    pub fn into_list(self) -> Result<List, AmqpDecodeError> {
        match self {
            Value::Collection(CollectionValue::List(list)) => Ok(list),
            other => Err(other.mismatch(AmqpValueType::List)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Simple(simple) => fmt::Display::fmt(simple, f),
            Value::Collection(CollectionValue::List(list)) => fmt::Display::fmt(list, f),
            Value::Collection(CollectionValue::Map(map)) => fmt::Display::fmt(map, f),
            Value::Collection(CollectionValue::Array(array)) => fmt::Display::fmt(array, f),
            Value::Described(described) => fmt::Display::fmt(described, f),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub struct DescribedValue {
    descriptor: Descriptor,
    value: Box<Value>,
}

impl DescribedValue {
    pub fn new(descriptor: impl Into<Descriptor>, value: impl Into<Value>) -> Self {
        Self {
            descriptor: descriptor.into(),
            value: Box::new(value.into()),
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        *self.value
    }
}

impl fmt::Display for DescribedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.descriptor, self.value)
    }
}

impl AmqpEncoder for DescribedValue {
    fn encoded_size(&self) -> u32 {
        self.descriptor.encoded_size() + self.value.encoded_size()
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        self.descriptor.encode(writer)?;
        self.value.encode(writer)?;
        Ok(())
    }
}

impl AmqpDecoder for DescribedValue {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode_nested(input, 0)
    }

    fn decode_nested(input: &[u8], depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, descriptor) = Descriptor::decode(input)?;
        let (input, value) = Value::decode_nested(input, depth + 1)?;
        Ok((
            input,
            DescribedValue {
                descriptor,
                value: Box::new(value),
            },
        ))
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone, From)]
pub enum CollectionValue {
    List(List),
    Map(Map<Value, Value>),
    Array(Array),
}

impl AmqpDecoder for CollectionValue {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode_nested(input, 0)
    }

    fn decode_nested(input: &[u8], depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (_, code) = TypeCode::decode(input)?;

        match code {
            TypeCode::List0 | TypeCode::List8 | TypeCode::List32 => {
                List::decode_nested(input, depth).map_decoded(CollectionValue::List)
            }
            TypeCode::Map8 | TypeCode::Map32 => {
                Map::decode_nested(input, depth).map_decoded(CollectionValue::Map)
            }
            TypeCode::Array8 | TypeCode::Array32 => {
                Array::decode(input).map_decoded(CollectionValue::Array)
            }
            _ => Err(Self::invalid_type_code(code)),
        }
    }
}

impl AmqpEncoder for CollectionValue {
    fn encoded_size(&self) -> u32 {
        match self {
            CollectionValue::List(list) => list.encoded_size(),
            CollectionValue::Map(map) => map.encoded_size(),
            CollectionValue::Array(array) => array.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        match self {
            CollectionValue::List(list) => list.encode(writer),
            CollectionValue::Map(map) => map.encode(writer),
            CollectionValue::Array(array) => array.encode(writer),
        }
    }
}

impl AmqpDecoder for Value {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode_nested(input, 0)
    }

    fn decode_nested(input: &[u8], depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (_, code) = TypeCode::decode(input)?;

        if code.is_primitive() {
            return SimpleValue::decode(input).map_decoded(Value::Simple);
        }
        if depth >= MAX_NESTING_DEPTH {
            return Err(AmqpDecodeError::parse_error(format!(
                "value nested more than {} levels deep",
                MAX_NESTING_DEPTH
            )));
        }

        if code == TypeCode::Described {
            DescribedValue::decode_nested(input, depth).map_decoded(Value::Described)
        } else {
            CollectionValue::decode_nested(input, depth).map_decoded(Value::Collection)
        }
    }
}

impl AmqpEncoder for Value {
    fn encoded_size(&self) -> u32 {
        match self {
            Value::Simple(simple) => simple.encoded_size(),
            Value::Collection(collection) => collection.encoded_size(),
            Value::Described(described) => described.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        match self {
            Value::Simple(simple) => simple.encode(writer),
            Value::Collection(collection) => collection.encode(writer),
            Value::Described(described) => described.encode(writer),
        }
    }
}

impl From<SimpleValue> for Value {
    fn from(value: SimpleValue) -> Self {
        Value::Simple(value)
    }
}

impl From<CollectionValue> for Value {
    fn from(value: CollectionValue) -> Self {
        Value::Collection(value)
    }
}

impl From<DescribedValue> for Value {
    fn from(value: DescribedValue) -> Self {
        Value::Described(value)
    }
}

macro_rules! impl_simple_value {
    ($type:ty) => {
        impl From<$type> for Value {
            fn from(value: $type) -> Value {
                Value::Simple(value.into())
            }
        }
    };
}
macro_rules! impl_collection_value {
    ($type:ty) => {
        impl From<$type> for Value {
            fn from(value: $type) -> Value {
                Value::Collection(value.into())
            }
        }
    };
}

macro_rules! impl_try_from_simple_value_ref {
    ($type:ty, $variant:ident) => {
        impl<'a> TryFrom<&'a Value> for &'a $type {
            type Error = AmqpDecodeError;

            fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
                match value {
                    Value::Simple(SimpleValue::$variant(inner)) => Ok(inner),
                    _ => Err(value.mismatch(AmqpValueType::$variant)),
                }
            }
        }
    };
}

impl_try_from_simple_value_ref!(Boolean, Boolean);
impl_try_from_simple_value_ref!(UByte, Ubyte);
impl_try_from_simple_value_ref!(UShort, Ushort);
impl_try_from_simple_value_ref!(UInt, Uint);
impl_try_from_simple_value_ref!(ULong, Ulong);
impl_try_from_simple_value_ref!(Byte, Byte);
impl_try_from_simple_value_ref!(Short, Short);
impl_try_from_simple_value_ref!(Int, Int);
impl_try_from_simple_value_ref!(Long, Long);
impl_try_from_simple_value_ref!(Float, Float);
impl_try_from_simple_value_ref!(Double, Double);
impl_try_from_simple_value_ref!(Char, Char);
impl_try_from_simple_value_ref!(Timestamp, Timestamp);
impl_try_from_simple_value_ref!(Uuid, Uuid);
impl_try_from_simple_value_ref!(Binary, Binary);
impl_try_from_simple_value_ref!(Str, String);
impl_try_from_simple_value_ref!(Symbol, Symbol);

impl_simple_value!(Boolean);
impl_simple_value!(UByte);
impl_simple_value!(UShort);
impl_simple_value!(UInt);
impl_simple_value!(ULong);
impl_simple_value!(Byte);
impl_simple_value!(Short);
impl_simple_value!(Int);
impl_simple_value!(Long);
impl_simple_value!(Float);
impl_simple_value!(Double);
impl_simple_value!(Char);
impl_simple_value!(Timestamp);
impl_simple_value!(Uuid);
impl_simple_value!(Binary);
impl_simple_value!(Str);
impl_simple_value!(Symbol);
impl_simple_value!(&str);

impl_collection_value!(List);
impl_collection_value!(Map<Value, Value>);
impl_collection_value!(Array);

#[cfg(test)]
mod tests {
    use fake::{Dummy, Fake, Faker};
    use pretty_assertions::assert_eq;

    use super::{CollectionValue, DescribedValue, Value};
    use crate::{
        codec::{AmqpDecoder, MAX_NESTING_DEPTH},
        error::AmqpDecodeError,
        tests::{encode_to_vec, type_encode_decode_test_fuzzy},
        types::{AmqpValueType, Array, Descriptor, List, Map, SimpleValue, Symbol},
    };

    impl Dummy<Faker> for Value {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            match (0..3).fake_with_rng::<u8, _>(rng) {
                0 => Value::Collection(CollectionValue::List(config.fake_with_rng(rng))),
                1 => Value::Described(DescribedValue::new(
                    config.fake_with_rng::<Descriptor, _>(rng),
                    config.fake_with_rng::<SimpleValue, _>(rng),
                )),
                _ => Value::Simple(config.fake_with_rng(rng)),
            }
        }
    }

    #[test]
    fn value_encode_decode_test() {
        type_encode_decode_test_fuzzy::<Value>()
    }

    #[test]
    fn described_value_has_single_constructor() {
        let described = DescribedValue::new(Symbol::from("x"), 1u32);
        assert_eq!(
            encode_to_vec(&described),
            vec![0x00, 0xa3, 0x01, b'x', 0x52, 0x01]
        );
    }

    #[test]
    fn nested_collections_round_trip() {
        let mut map = Map::<Value, Value>::new();
        map.insert("list".into(), List(vec![1i64.into(), "two".into()]).into());
        map.insert(
            Symbol::from("array").into(),
            Array::try_from_vec(vec![SimpleValue::Int(1), SimpleValue::Int(-2)])
                .unwrap()
                .into(),
        );
        let value = Value::from(map);

        let buffer = encode_to_vec(&value);
        let (remaining, decoded) = Value::decode(&buffer).unwrap();

        assert!(remaining.is_empty());
        assert_eq!(decoded, value);
    }

    #[test]
    fn accessors_report_type_mismatch() {
        let value = Value::from(42i32);

        assert_eq!(value.value_type(), AmqpValueType::Int);
        assert!(matches!(
            value.as_map(),
            Err(AmqpDecodeError::TypeMismatch {
                expected: AmqpValueType::Map,
                actual: AmqpValueType::Int
            })
        ));
        assert_eq!(<&i32>::try_from(&value).unwrap(), &42);
        assert!(<&String>::try_from(&value).is_err());
    }

    #[test]
    fn nesting_up_to_the_limit_decodes() {
        let mut value = Value::from(1u8);
        for _ in 0..MAX_NESTING_DEPTH {
            value = DescribedValue::new(0x77u64, value).into();
        }
        let buffer = encode_to_vec(&value);

        let (remaining, decoded) = Value::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, value);
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        let mut buffer = vec![];
        for _ in 0..=MAX_NESTING_DEPTH {
            buffer.extend_from_slice(&[0x00, 0x53, 0x77]);
        }
        buffer.push(0x40);

        let err = Value::decode(&buffer).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn nested_lists_count_towards_the_limit() {
        let mut value = Value::from(List::new());
        for _ in 0..=MAX_NESTING_DEPTH {
            value = List(vec![value]).into();
        }
        let buffer = encode_to_vec(&value);

        let err = Value::decode(&buffer).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn value_display() {
        let value = Value::from(List(vec!["a".into(), 1u8.into(), Value::default()]));
        assert_eq!(value.to_string(), r#"["a", 1, null]"#);
    }
}
