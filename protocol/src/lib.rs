//! AMQP 1.0 message codec.
//!
//! Encodes and decodes the sections of an AMQP 1.0 application message and
//! adapts [`AmqpMessage`] to native message engines through the
//! [`backend`] traits.

pub mod backend;
pub mod codec;
pub mod error;
pub mod message;
pub mod types;

pub use codec::{AmqpDecoder, AmqpEncoder};
pub use error::{AmqpDecodeError, AmqpEncodeError, ApplicationPropertyError};
pub use message::{
    AmqpMessage, BodyType, Header, MessageBody, Properties, SectionKind,
    AMQP_DEFAULT_MESSAGE_FORMAT,
};
pub use types::{
    AmqpValueType, AnnotationKey, Annotations, ApplicationProperties, Array, Binary,
    CollectionValue, DescribedValue, Descriptor, List, Map, MessageId, SimpleValue, Symbol,
    Timestamp, Value,
};

#[cfg(test)]
mod tests {

    use std::fmt::Debug;

    use pretty_assertions::assert_eq;

    use fake::{Dummy, Fake, Faker};

    use super::{AmqpDecoder, AmqpEncoder};

    const FUZZY_ROUNDS: usize = 10;

    pub(crate) fn type_encode_decode_test<T>()
    where
        T: Dummy<Faker> + AmqpDecoder + AmqpEncoder + Debug + PartialEq,
    {
        let mut buffer = vec![];

        let value: T = Faker.fake();

        value.encode(&mut buffer).unwrap();

        let (remaining, decoded) = T::decode(&buffer).unwrap();

        assert_eq!(value, decoded);

        assert!(remaining.is_empty());

        assert_eq!(buffer.len() as u32, value.encoded_size(), "{:#?}", value);
    }

    pub(crate) fn type_encode_decode_test_fuzzy<T>()
    where
        T: Dummy<Faker> + AmqpDecoder + AmqpEncoder + Debug + PartialEq,
    {
        for _ in 0..FUZZY_ROUNDS {
            type_encode_decode_test::<T>()
        }
    }

    pub(crate) fn encode_to_vec(value: &impl AmqpEncoder) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(value.encoded_size() as usize);
        value.encode(&mut buffer).unwrap();
        buffer
    }
}
