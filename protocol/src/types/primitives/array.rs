use std::fmt;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    codec::{
        constants::TypeCode,
        decoder::{end_of_compound, read_compound, within_compound},
        scalar::Scalar,
        AmqpDecoder, AmqpEncoder,
    },
    error::{AmqpDecodeError, AmqpEncodeError},
    types::AmqpValueType,
};

use super::SimpleValue;

/// Homogeneous sequence of simple values sharing one element constructor.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
pub struct Array(pub(crate) Vec<SimpleValue>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an array, rejecting elements whose type differs from the first.
    pub fn try_from_vec(elements: Vec<SimpleValue>) -> Result<Self, AmqpEncodeError> {
        let array = Array(elements);
        array.check_elements()?;
        Ok(array)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimpleValue> {
        self.0.iter()
    }

    pub fn element_type(&self) -> Option<AmqpValueType> {
        self.0.first().map(SimpleValue::value_type)
    }

    /// Elements must share one type and take at least one byte each, which
    /// rules out null.
    fn check_elements(&self) -> Result<(), AmqpEncodeError> {
        let Some(expected) = self.element_type() else {
            return Ok(());
        };
        if expected == AmqpValueType::Null {
            return Err(AmqpEncodeError::NullArrayElement);
        }
        match self.0.iter().find(|element| element.value_type() != expected) {
            Some(element) => Err(AmqpEncodeError::HeterogeneousArray {
                expected,
                found: element.value_type(),
            }),
            None => Ok(()),
        }
    }

    fn constructor(&self) -> TypeCode {
        self.0
            .first()
            .map_or(TypeCode::Null, |element| element.wide().0)
    }

    fn content_size(&self) -> u32 {
        self.0
            .iter()
            .fold(1, |acc, element| acc + element.wide().1.size())
    }

    fn is_compact(&self, content_size: u32) -> bool {
        content_size + 1 <= u8::MAX as u32 && self.0.len() <= u8::MAX as usize
    }
}

impl From<Array> for Vec<SimpleValue> {
    fn from(array: Array) -> Self {
        array.0
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@[")?;
        for (idx, element) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

impl AmqpEncoder for Array {
    fn encoded_size(&self) -> u32 {
        let content_size = self.content_size();

        let header = if self.is_compact(content_size) { 3 } else { 9 };

        header + content_size
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        self.check_elements()?;
        let content_size = self.content_size();

        if self.is_compact(content_size) {
            TypeCode::Array8.encode(writer)?;
            writer.write_u8((content_size + 1) as u8)?;
            writer.write_u8(self.0.len() as u8)?;
        } else {
            TypeCode::Array32.encode(writer)?;
            writer.write_u32::<BigEndian>(content_size + 4)?;
            writer.write_u32::<BigEndian>(self.0.len() as u32)?;
        }

        self.constructor().encode(writer)?;
        for element in &self.0 {
            element.wide().1.write(writer)?;
        }
        Ok(())
    }
}

impl AmqpDecoder for Array {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, code) = TypeCode::decode(input)?;

        let wide = match code {
            TypeCode::Array8 => false,
            TypeCode::Array32 => true,
            _ => return Err(Self::invalid_type_code(code)),
        };

        let (input, count, body) = read_compound(input, wide)?;
        let (mut body, constructor) = TypeCode::decode(body).map_err(within_compound)?;
        if !constructor.is_primitive() {
            return Err(Self::invalid_type_code(constructor));
        }

        let mut array = Array(Vec::with_capacity(count as usize));
        for _ in 0..count {
            let (rest, element) =
                SimpleValue::read_payload(constructor, body).map_err(within_compound)?;
            array.0.push(element);
            body = rest;
        }
        end_of_compound(body)?;
        Ok((input, array))
    }
}
