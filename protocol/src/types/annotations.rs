use std::fmt;

use crate::{
    codec::{
        constants::TypeCode,
        scalar::{scalar_codec, Payload, Scalar},
    },
    error::AmqpDecodeError,
};

use super::{AmqpValueType, Map, SimpleValue, Symbol, ULong, Value};

/// Annotation keys are restricted to symbols and unsigned longs.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum AnnotationKey {
    Symbol(Symbol),
    ULong(ULong),
}

pub type Annotations = Map<AnnotationKey, Value>;

impl Annotations {
    pub fn put<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<AnnotationKey>,
        V: Into<Value>,
    {
        self.insert(key.into(), value.into())
    }

    /// Reads annotations out of a generic map value, as native engines hand
    /// them over.
    pub fn try_from_value(value: &Value) -> Result<Annotations, AmqpDecodeError> {
        value
            .as_map()?
            .iter()
            .map(|(key, value)| Ok((AnnotationKey::try_from(key)?, value.clone())))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        self.iter()
            .map(|(key, value)| (Value::from(key.clone()), value.clone()))
            .collect::<Map<Value, Value>>()
            .into()
    }
}

impl fmt::Display for AnnotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationKey::Symbol(symbol) => fmt::Display::fmt(symbol, f),
            AnnotationKey::ULong(code) => write!(f, "{}", code),
        }
    }
}

impl From<&str> for AnnotationKey {
    fn from(string: &str) -> Self {
        AnnotationKey::Symbol(Symbol::from(string))
    }
}

impl From<String> for AnnotationKey {
    fn from(string: String) -> Self {
        AnnotationKey::Symbol(Symbol::from(string))
    }
}

impl From<Symbol> for AnnotationKey {
    fn from(symbol: Symbol) -> Self {
        AnnotationKey::Symbol(symbol)
    }
}

impl From<u64> for AnnotationKey {
    fn from(number: u64) -> Self {
        AnnotationKey::ULong(number)
    }
}

impl From<AnnotationKey> for Value {
    fn from(key: AnnotationKey) -> Self {
        match key {
            AnnotationKey::Symbol(symbol) => symbol.into(),
            AnnotationKey::ULong(code) => code.into(),
        }
    }
}

impl TryFrom<&Value> for AnnotationKey {
    type Error = AmqpDecodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Simple(SimpleValue::Symbol(symbol)) => Ok(AnnotationKey::Symbol(symbol.clone())),
            Value::Simple(SimpleValue::Ulong(code)) => Ok(AnnotationKey::ULong(*code)),
            other => Err(AmqpDecodeError::TypeMismatch {
                expected: AmqpValueType::Symbol,
                actual: other.value_type(),
            }),
        }
    }
}

impl TryFrom<SimpleValue> for AnnotationKey {
    type Error = AmqpDecodeError;

    fn try_from(value: SimpleValue) -> Result<Self, Self::Error> {
        match value {
            SimpleValue::Symbol(symbol) => Ok(AnnotationKey::Symbol(symbol)),
            SimpleValue::Ulong(code) => Ok(AnnotationKey::ULong(code)),
            other => Err(AmqpDecodeError::TypeMismatch {
                expected: AmqpValueType::Symbol,
                actual: other.value_type(),
            }),
        }
    }
}

impl Scalar for AnnotationKey {
    fn compact(&self) -> (TypeCode, Payload<'_>) {
        match self {
            AnnotationKey::Symbol(symbol) => symbol.compact(),
            AnnotationKey::ULong(code) => code.compact(),
        }
    }
}

scalar_codec!(AnnotationKey);
