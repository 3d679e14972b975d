use std::{any::type_name, fmt};

use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    codec::{
        constants::TypeCode,
        decoder::{end_of_compound, read_compound, within_compound},
        AmqpDecoder, AmqpEncoder,
    },
    error::{AmqpDecodeError, AmqpEncodeError},
};

use super::{SimpleValue, Value};

#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
pub struct List(pub Vec<Value>);

impl List {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn push(&mut self, elem: impl Into<Value>) {
        self.0.push(elem.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    fn content_size(&self) -> u32 {
        self.0.iter().fold(0, |acc, item| acc + item.encoded_size())
    }

    fn is_compact(&self, content_size: u32) -> bool {
        content_size + 1 <= u8::MAX as u32 && self.0.len() <= u8::MAX as usize
    }
}

impl<T: Into<Value>> FromIterator<T> for List {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, item) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }
}

impl AmqpEncoder for List {
    fn encoded_size(&self) -> u32 {
        if self.0.is_empty() {
            return 1;
        }
        let content_size = self.content_size();

        let header = if self.is_compact(content_size) { 3 } else { 9 };

        header + content_size
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        if self.0.is_empty() {
            return TypeCode::List0.encode(writer);
        }
        let content_size = self.content_size();

        if self.is_compact(content_size) {
            TypeCode::List8.encode(writer)?;
            writer.write_u8((content_size + 1) as u8)?;
            writer.write_u8(self.0.len() as u8)?;
        } else {
            TypeCode::List32.encode(writer)?;
            writer.write_u32::<BigEndian>(content_size + 4)?;
            writer.write_u32::<BigEndian>(self.0.len() as u32)?;
        }

        for item in &self.0 {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl AmqpDecoder for List {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode_nested(input, 0)
    }

    fn decode_nested(input: &[u8], depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        List::decode_with_fields(
            input,
            |input, _, list: &mut List| {
                let (input, elem) = Value::decode_nested(input, depth + 1)?;
                list.0.push(elem);
                Ok(input)
            },
            List::new(),
        )
    }
}

impl List {
    /// Walks the elements of an encoded list, handing each one to `f` along
    /// with its index. Composite types use this to decode their fields.
    pub fn decode_with_fields<'a, T, F>(
        input: &'a [u8],
        f: F,
        mut dest: T,
    ) -> Result<(&'a [u8], T), AmqpDecodeError>
    where
        F: Fn(&'a [u8], u32, &mut T) -> Result<&'a [u8], AmqpDecodeError>,
    {
        let (input, code) = TypeCode::decode(input)?;

        let wide = match code {
            TypeCode::List0 => return Ok((input, dest)),
            TypeCode::List8 => false,
            TypeCode::List32 => true,
            _ => {
                return Err(AmqpDecodeError::MessageParse(format!(
                    "Invalid type code {:?} for list",
                    code
                )))
            }
        };

        let (input, count, mut body) = read_compound(input, wide)?;
        for idx in 0..count {
            body = f(body, idx, &mut dest).map_err(within_compound)?;
        }
        end_of_compound(body)?;
        Ok((input, dest))
    }

    /// Decodes one field of a composite type; null means absent.
    #[doc(hidden)]
    pub fn decode_field<T>(input: &[u8]) -> Result<(&[u8], Option<T>), AmqpDecodeError>
    where
        T: TryFrom<SimpleValue>,
    {
        let (input, value) = SimpleValue::decode(input)?;
        if value == SimpleValue::Null {
            return Ok((input, None));
        }

        let found = value.value_type();
        match T::try_from(value) {
            Ok(field) => Ok((input, Some(field))),
            Err(_) => Err(AmqpDecodeError::parse_error(format!(
                "{} value in a field of type {}",
                found,
                type_name::<T>()
            ))),
        }
    }
}

/// Generates a field decoder for [`List::decode_with_fields`].
///
/// `{ field, Type, default }` stores the default when the element is null,
/// `{ field, Type, default, optional }` stores the decoded `Option`. Indexes
/// without an entry are skipped.
#[macro_export(local_inner_macros)]
macro_rules! list_decoder {
    (@field $dest:ident, $input:ident, { $name:ident, $dt:ty, $def:expr }) => {{
        let (input, value) = $crate::types::List::decode_field::<$dt>($input)?;
        $dest.$name = value.unwrap_or($def);
        Ok(input)
    }};
    (@field $dest:ident, $input:ident, { $name:ident, $dt:ty, $def:expr, $optional:expr }) => {{
        let (input, value) = $crate::types::List::decode_field::<$dt>($input)?;
        $dest.$name = value;
        Ok(input)
    }};
    ($ty:ty, $fname:ident, { $($key:expr => $b:tt),* }) => {
        fn $fname<'a>(
            input: &'a [u8],
            idx: u32,
            dest: &mut $ty,
        ) -> Result<&'a [u8], $crate::error::AmqpDecodeError> {
            match idx {
                 $($key => {
                      list_decoder!(@field dest, input, $b)
                 })*
                _ => {
                    let (input, _) =
                        <$crate::types::Value as $crate::codec::AmqpDecoder>::decode(input)?;
                    Ok(input)
                }
            }
        }
    };
}

pub use list_decoder;

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use fake::{Dummy, Fake, Faker};
    use pretty_assertions::assert_eq;

    use crate::{
        codec::AmqpDecoder,
        error::AmqpDecodeError,
        tests::{encode_to_vec, type_encode_decode_test_fuzzy},
        types::{SimpleValue, Value},
    };

    use super::List;
    const DEFAULT_LEN_RANGE: Range<usize> = 0..10;

    impl Dummy<Faker> for List {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            let len: usize = DEFAULT_LEN_RANGE.fake_with_rng(rng);
            let mut m = List::new();

            for _ in 0..len {
                let simple: SimpleValue = config.fake_with_rng(rng);

                m.0.push(Value::Simple(simple));
            }
            m
        }
    }

    #[test]
    fn list_encode_decode_test() {
        type_encode_decode_test_fuzzy::<List>()
    }

    #[test]
    fn empty_list_is_list0() {
        assert_eq!(encode_to_vec(&List::new()), vec![0x45]);
    }

    #[test]
    fn short_list_is_list8() {
        let list: List = vec![Value::from(true), Value::Simple(SimpleValue::Null)]
            .into_iter()
            .collect();
        assert_eq!(encode_to_vec(&list), vec![0xc0, 0x03, 0x02, 0x41, 0x40]);
    }

    #[test]
    fn large_list_is_list32() {
        let list: List = (0..300u32).map(|_| Value::from(true)).collect();
        let buffer = encode_to_vec(&list);

        assert_eq!(&buffer[..9], &[0xd0, 0, 0, 0x01, 0x30, 0, 0, 0x01, 0x2c]);
        assert_eq!(buffer.len(), 9 + 300);

        let (remaining, decoded) = List::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, list);
    }

    #[test]
    fn list_count_larger_than_size_is_rejected() {
        let err = List::decode(&[0xc0, 0x02, 0x05, 0x41]).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn list_size_must_match_its_elements() {
        // size covers three element bytes but the single element uses one
        let err = List::decode(&[0xc0, 0x04, 0x01, 0x41, 0x41, 0x41]).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));

        // element overruns the declared size
        let err = List::decode(&[0xc0, 0x02, 0x01, 0x52, 0x07]).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn list_stops_at_its_size() {
        let (remaining, list) = List::decode(&[0xc0, 0x02, 0x01, 0x41, 0x42]).unwrap();
        assert_eq!(list, List(vec![Value::from(true)]));
        assert_eq!(remaining, &[0x42]);
    }

    #[test]
    fn field_rejects_wrong_type() {
        let (remaining, field) = List::decode_field::<u32>(&[0x40]).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(field, None);

        let err = List::decode_field::<u32>(&[0xa1, 0x01, b'x']).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }
}
