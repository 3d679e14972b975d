use std::fmt;

use crate::{
    codec::{
        constants::{
            MESSAGE_ANNOTATIONS, MESSAGE_APPLICATION_PROPERTIES, MESSAGE_DELIVERY_ANNOTATIONS,
            MESSAGE_FOOTER,
        },
        AmqpDecoder, AmqpEncoder,
    },
    error::{AmqpDecodeError, AmqpEncodeError},
    types::{
        ApplicationProperties, DeliveryAnnotations, Descriptor, Footer, MessageAnnotations, Value,
    },
};

mod body;
mod header;
mod properties;
mod section;

pub use body::{BodyType, MessageBody};
pub use header::Header;
pub use properties::Properties;
pub use section::{MessageSection, SectionKind};

use section::SectionOrder;

pub const AMQP_DEFAULT_MESSAGE_FORMAT: u32 = 0;

/// AMQP 1.0 application message.
///
/// `message_format` and `delivery_tag` travel outside the encoded sections and
/// are not part of equality.
#[derive(Debug, Clone, Default)]
pub struct AmqpMessage {
    pub message_format: u32,
    pub header: Header,
    pub delivery_annotations: DeliveryAnnotations,
    pub message_annotations: MessageAnnotations,
    pub properties: Properties,
    pub application_properties: ApplicationProperties,
    pub delivery_tag: Option<Value>,
    pub footer: Footer,
    pub body: MessageBody,
}

impl PartialEq for AmqpMessage {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.delivery_annotations == other.delivery_annotations
            && self.message_annotations == other.message_annotations
            && self.properties == other.properties
            && self.application_properties == other.application_properties
            && self.footer == other.footer
            && self.body == other.body
    }
}

impl Eq for AmqpMessage {}

impl AmqpMessage {
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn body_type(&self) -> BodyType {
        self.body.body_type()
    }

    pub fn set_body<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut MessageBody),
    {
        f(&mut self.body);
        self
    }

    pub fn with_header<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Header),
    {
        f(&mut self.header);
        self
    }

    pub fn with_properties<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Properties),
    {
        f(&mut self.properties);
        self
    }

    pub fn with_application_properties<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut ApplicationProperties),
    {
        f(&mut self.application_properties);
        self
    }

    pub fn with_footer<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Footer),
    {
        f(&mut self.footer);
        self
    }

    /// Encodes the message into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>, AmqpEncodeError> {
        let mut buffer = Vec::with_capacity(self.encoded_size() as usize);
        self.encode(&mut buffer)?;
        Ok(buffer)
    }

    /// Decodes a message from the concatenation of its sections.
    ///
    /// The whole input must be consumed; sections out of canonical order are
    /// rejected and no partial message is returned.
    pub fn deserialize(input: &[u8]) -> Result<AmqpMessage, AmqpDecodeError> {
        let (_, message) = AmqpMessage::decode(input)?;
        Ok(message)
    }
}

impl AmqpDecoder for AmqpMessage {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let mut message = AmqpMessage::default();
        let mut order = SectionOrder::default();
        let mut input = input;

        while !input.is_empty() {
            let (_, descriptor) = Descriptor::decode(input)?;
            let kind = SectionKind::try_from(&descriptor)?;
            order.accept(kind)?;

            let (remaining, section) = MessageSection::decode_kind(kind, input)?;
            input = remaining;

            match section {
                MessageSection::Header(header) => message.header = header,
                MessageSection::DeliveryAnnotations(annotations) => {
                    message.delivery_annotations = annotations
                }
                MessageSection::MessageAnnotations(annotations) => {
                    message.message_annotations = annotations
                }
                MessageSection::Properties(properties) => message.properties = properties,
                MessageSection::ApplicationProperties(properties) => {
                    message.application_properties = properties
                }
                MessageSection::Data(data) => {
                    message.body.push_data(data);
                }
                MessageSection::AmqpSequence(list) => {
                    message.body.push_sequence(list);
                }
                MessageSection::AmqpValue(value) => message.body = MessageBody::Value(value),
                MessageSection::Footer(footer) => message.footer = footer,
            }
        }
        Ok((input, message))
    }
}

impl AmqpEncoder for AmqpMessage {
    fn encoded_size(&self) -> u32 {
        let mut size = self.body.encoded_size();

        if self.header.should_serialize() {
            size += self.header.encoded_size();
        }
        if !self.delivery_annotations.is_empty() {
            size += MESSAGE_DELIVERY_ANNOTATIONS.encoded_size()
                + self.delivery_annotations.encoded_size();
        }
        if !self.message_annotations.is_empty() {
            size += MESSAGE_ANNOTATIONS.encoded_size() + self.message_annotations.encoded_size();
        }
        if self.properties.should_serialize() {
            size += self.properties.encoded_size();
        }
        if !self.application_properties.is_empty() {
            size += MESSAGE_APPLICATION_PROPERTIES.encoded_size()
                + self.application_properties.encoded_size();
        }
        if !self.footer.is_empty() {
            size += MESSAGE_FOOTER.encoded_size() + self.footer.encoded_size();
        }

        size
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        if self.body.body_type() == BodyType::Invalid {
            return Err(AmqpEncodeError::InvalidBody);
        }
        self.application_properties.validate()?;

        if self.header.should_serialize() {
            self.header.encode(writer)?;
        }
        if !self.delivery_annotations.is_empty() {
            MESSAGE_DELIVERY_ANNOTATIONS.encode(writer)?;
            self.delivery_annotations.encode(writer)?;
        }
        if !self.message_annotations.is_empty() {
            MESSAGE_ANNOTATIONS.encode(writer)?;
            self.message_annotations.encode(writer)?;
        }
        if self.properties.should_serialize() {
            self.properties.encode(writer)?;
        }
        if !self.application_properties.is_empty() {
            MESSAGE_APPLICATION_PROPERTIES.encode(writer)?;
            self.application_properties.encode(writer)?;
        }

        self.body.encode(writer)?;

        if !self.footer.is_empty() {
            MESSAGE_FOOTER.encode(writer)?;
            self.footer.encode(writer)?;
        }

        Ok(())
    }
}

impl fmt::Display for AmqpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message{{")?;
        if self.message_format != AMQP_DEFAULT_MESSAGE_FORMAT {
            write!(f, "format: {}, ", self.message_format)?;
        }
        if self.header.should_serialize() {
            write!(f, "{}, ", self.header)?;
        }
        if !self.delivery_annotations.is_empty() {
            write!(f, "delivery_annotations: {}, ", self.delivery_annotations)?;
        }
        if !self.message_annotations.is_empty() {
            write!(f, "message_annotations: {}, ", self.message_annotations)?;
        }
        if self.properties.should_serialize() {
            write!(f, "{}, ", self.properties)?;
        }
        if !self.application_properties.is_empty() {
            write!(f, "application_properties: {}, ", self.application_properties)?;
        }
        if let Some(tag) = &self.delivery_tag {
            write!(f, "delivery_tag: {}, ", tag)?;
        }
        if !self.footer.is_empty() {
            write!(f, "footer: {}, ", self.footer)?;
        }
        write!(f, "body: {}}}", self.body)
    }
}

#[cfg(test)]
mod tests {
    use fake::{Dummy, Fake, Faker};
    use pretty_assertions::assert_eq;

    use super::{AmqpMessage, BodyType, MessageBody, SectionKind};
    use crate::{
        codec::{
            constants::{
                MESSAGE_APPLICATION_PROPERTIES, MESSAGE_BODY_DATA, MESSAGE_BODY_VALUE,
                MESSAGE_FOOTER, MESSAGE_HEADER,
            },
            AmqpEncoder,
        },
        error::{AmqpDecodeError, AmqpEncodeError, ApplicationPropertyError},
        tests::{encode_to_vec, type_encode_decode_test_fuzzy},
        types::{
            AmqpValueType, ApplicationProperties, Binary, DescribedValue, Descriptor, List, Map,
            SimpleValue, Symbol, Value,
        },
    };

    impl Dummy<Faker> for AmqpMessage {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            let mut application_properties = ApplicationProperties::new();
            for _ in 0..(0usize..5).fake_with_rng::<usize, _>(rng) {
                let key: String = config.fake_with_rng(rng);
                let value: SimpleValue = config.fake_with_rng(rng);
                application_properties.insert(key, value.into());
            }

            let body = match (0u8..4).fake_with_rng::<u8, _>(rng) {
                0 => MessageBody::None,
                1 => MessageBody::Data(vec![
                    config.fake_with_rng::<Binary, _>(rng),
                    config.fake_with_rng::<Binary, _>(rng),
                ]),
                2 => MessageBody::Sequence(vec![
                    config.fake_with_rng(rng),
                    config.fake_with_rng(rng),
                ]),
                _ => MessageBody::Value(config.fake_with_rng(rng)),
            };

            AmqpMessage {
                header: config.fake_with_rng(rng),
                delivery_annotations: config.fake_with_rng(rng),
                message_annotations: config.fake_with_rng(rng),
                properties: config.fake_with_rng(rng),
                application_properties,
                footer: config.fake_with_rng(rng),
                body,
                ..Default::default()
            }
        }
    }

    fn check_message_encode_decode(message: &AmqpMessage) {
        let buf = message.serialize().unwrap();
        assert_eq!(buf.len() as u32, message.encoded_size());

        let decoded = match AmqpMessage::deserialize(&buf) {
            Ok(result) => result,
            Err(err) => panic!(
                "Failed to decode message {:#?} with error : {:?}",
                message, err
            ),
        };

        assert_eq!(message, &decoded);
    }

    #[test]
    fn test_message_encode_decode() {
        type_encode_decode_test_fuzzy::<AmqpMessage>()
    }

    #[test]
    fn empty_message_encodes_to_nothing() {
        let message = AmqpMessage::default();

        assert!(message.serialize().unwrap().is_empty());
        assert_eq!(AmqpMessage::deserialize(&[]).unwrap(), message);
    }

    #[test]
    fn message_with_header_test() {
        let mut message = AmqpMessage::default();
        message
            .set_body(|body| {
                body.set_data(b"test:w".to_vec());
            })
            .with_header(|header| {
                header.ttl = Some(3000);
                header.delivery_count = 32;
                header.first_acquirer = true;
            });

        check_message_encode_decode(&message);
    }

    #[test]
    fn message_with_footer_test() {
        let mut message = AmqpMessage::default();
        message
            .set_body(|body| {
                body.set_value("hello");
            })
            .with_footer(|footer| {
                let mut list = List::new();

                list.push(1);
                list.push("test");
                footer.put("test", 1);
                footer.put(
                    (0..300).map(|idx| format!("{}", idx)).collect::<String>(),
                    1,
                );
                footer.put(1u64, "test");
                footer.put(1000u64, "test");
                footer.put("list", list);
            });

        check_message_encode_decode(&message);
    }

    #[test]
    fn data_chunks_are_separate_sections() {
        let mut message = AmqpMessage::default();
        message.set_body(|body| {
            body.push_data(b"AB".to_vec()).push_data(b"CD".to_vec());
        });

        let buffer = message.serialize().unwrap();
        assert_eq!(
            buffer,
            vec![0x00, 0x53, 0x75, 0xa0, 0x02, b'A', b'B', 0x00, 0x53, 0x75, 0xa0, 0x02, b'C', b'D']
        );

        let decoded = AmqpMessage::deserialize(&buffer).unwrap();
        assert_eq!(decoded.body_type(), BodyType::Data);
        assert_eq!(
            decoded.body().data().unwrap(),
            &[b"AB".to_vec(), b"CD".to_vec()][..]
        );
    }

    #[test]
    fn sequence_body_round_trips() {
        let mut message = AmqpMessage::default();
        message.set_body(|body| {
            body.push_sequence(List(vec![1i32.into(), "a".into()]))
                .push_sequence(List(vec![Value::from(true)]));
        });

        check_message_encode_decode(&message);
    }

    #[test]
    fn footer_then_header_fails() {
        let mut buffer = vec![];
        MESSAGE_FOOTER.encode(&mut buffer).unwrap();
        Map::<Value, Value>::new().encode(&mut buffer).unwrap();
        buffer.extend(encode_to_vec(&super::Header {
            durable: true,
            ..Default::default()
        }));

        let err = AmqpMessage::deserialize(&buffer).unwrap_err();
        assert!(matches!(
            err,
            AmqpDecodeError::SectionOrder {
                section: SectionKind::Header,
                previous: SectionKind::Footer
            }
        ));
    }

    #[test]
    fn data_after_value_fails() {
        let mut buffer = vec![];
        MESSAGE_BODY_VALUE.encode(&mut buffer).unwrap();
        Value::from(1i32).encode(&mut buffer).unwrap();
        MESSAGE_BODY_DATA.encode(&mut buffer).unwrap();
        b"AB".to_vec().encode(&mut buffer).unwrap();

        let err = AmqpMessage::deserialize(&buffer).unwrap_err();
        assert!(matches!(
            err,
            AmqpDecodeError::SectionOrder {
                section: SectionKind::DataBinary,
                previous: SectionKind::DataAmqpValue
            }
        ));
    }

    #[test]
    fn unknown_section_fails() {
        let mut buffer = vec![];
        Descriptor::Ulong(0x79).encode(&mut buffer).unwrap();
        Value::from(1i32).encode(&mut buffer).unwrap();

        let err = AmqpMessage::deserialize(&buffer).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::UnknownSection(Descriptor::Ulong(0x79))));
    }

    #[test]
    fn undescribed_section_fails() {
        let err = AmqpMessage::deserialize(&[0x41]).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::InvalidTypeCodeFor { .. }));
    }

    #[test]
    fn truncated_message_fails() {
        let mut message = AmqpMessage::default();
        message.set_body(|body| {
            body.set_value("truncated");
        });
        let buffer = message.serialize().unwrap();

        let err = AmqpMessage::deserialize(&buffer[..buffer.len() - 2]).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::Incomplete(_)));
    }

    fn value_section(value: &[u8]) -> Vec<u8> {
        let mut buffer = vec![0x00, 0x53, 0x77];
        buffer.extend_from_slice(value);
        buffer
    }

    #[test]
    fn deeply_described_body_fails() {
        let mut value = [0x00, 0x53, 0x77].repeat(200_000);
        value.push(0x40);

        let err = AmqpMessage::deserialize(&value_section(&value)).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn deeply_nested_lists_fail() {
        // list32 of one element, each wrapping the next
        let mut nested = vec![0x45];
        for _ in 0..1_000 {
            let mut outer = vec![0xd0];
            outer.extend_from_slice(&(nested.len() as u32 + 4).to_be_bytes());
            outer.extend_from_slice(&1u32.to_be_bytes());
            outer.extend_from_slice(&nested);
            nested = outer;
        }

        let err = AmqpMessage::deserialize(&value_section(&nested)).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn array_count_beyond_its_size_fails() {
        let value = [0xf0, 0x00, 0x00, 0x00, 0x05, 0x7f, 0xff, 0xff, 0xff, 0x40];

        let err = AmqpMessage::deserialize(&value_section(&value)).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn huge_application_properties_count_fails() {
        let buffer = [0x00, 0x53, 0x74, 0xd1, 0x00, 0x00, 0x00, 0x04, 0xff, 0xff, 0xff, 0xff];

        let err = AmqpMessage::deserialize(&buffer).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn list_count_beyond_its_size_fails() {
        let err = AmqpMessage::deserialize(&value_section(&[0xc0, 0x02, 0x03, 0x41])).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn element_past_the_end_of_its_list_fails() {
        let value = [0xc0, 0x02, 0x01, 0xa1, 0x05, b'h', b'e', b'l', b'l', b'o'];

        let err = AmqpMessage::deserialize(&value_section(&value)).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn map_size_larger_than_its_entries_fails() {
        let value = [0xc1, 0x04, 0x02, 0x41, 0x42, 0x40];

        let err = AmqpMessage::deserialize(&value_section(&value)).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn list_size_beyond_the_input_is_incomplete() {
        let err = AmqpMessage::deserialize(&value_section(&[0xc0, 0x10, 0x01, 0x41])).unwrap_err();
        assert!(matches!(err, AmqpDecodeError::Incomplete(_)));
    }

    #[test]
    fn invalid_body_is_not_serialized() {
        let message = AmqpMessage {
            body: MessageBody::Invalid,
            ..Default::default()
        };

        assert!(matches!(
            message.serialize(),
            Err(AmqpEncodeError::InvalidBody)
        ));
    }

    #[test]
    fn non_simple_application_property_is_not_serialized() {
        let mut message = AmqpMessage::default();
        message.with_application_properties(|properties| {
            properties.insert("list".to_string(), List::new().into());
        });

        match message.serialize() {
            Err(AmqpEncodeError::InvalidApplicationProperty(
                ApplicationPropertyError::NonSimpleValue { key, value_type },
            )) => {
                assert_eq!(key, "list");
                assert_eq!(value_type, AmqpValueType::List);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn application_properties_section(value: Value) -> Vec<u8> {
        let mut buffer = vec![];
        MESSAGE_APPLICATION_PROPERTIES.encode(&mut buffer).unwrap();
        value.encode(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn non_simple_application_property_is_not_decoded() {
        let mut map = Map::<Value, Value>::new();
        map.insert("nested".into(), Map::<Value, Value>::new().into());

        let err = AmqpMessage::deserialize(&application_properties_section(map.into())).unwrap_err();

        assert!(matches!(
            err,
            AmqpDecodeError::InvalidApplicationProperty(ApplicationPropertyError::NonSimpleValue {
                value_type: AmqpValueType::Map,
                ..
            })
        ));
    }

    #[test]
    fn non_string_application_property_key_is_not_decoded() {
        let mut map = Map::<Value, Value>::new();
        map.insert(Symbol::from("key").into(), 1i32.into());

        let err = AmqpMessage::deserialize(&application_properties_section(map.into())).unwrap_err();

        assert!(matches!(
            err,
            AmqpDecodeError::InvalidApplicationProperty(ApplicationPropertyError::NonStringKey(
                AmqpValueType::Symbol
            ))
        ));
    }

    #[test]
    fn wrapped_application_properties_decode_like_bare_ones() {
        let mut map = Map::<Value, Value>::new();
        map.insert("k".into(), 7i64.into());
        let bare: Value = map.into();
        let wrapped: Value = DescribedValue::new(MESSAGE_APPLICATION_PROPERTIES, bare.clone()).into();

        let from_bare = AmqpMessage::deserialize(&application_properties_section(bare)).unwrap();
        let from_wrapped =
            AmqpMessage::deserialize(&application_properties_section(wrapped)).unwrap();

        assert_eq!(from_bare, from_wrapped);
        assert_eq!(
            from_bare.application_properties.get("k"),
            Some(&Value::from(7i64))
        );
    }

    #[test]
    fn foreign_wrapper_on_application_properties_fails() {
        let wrapped: Value = DescribedValue::new(MESSAGE_HEADER, Map::<Value, Value>::new()).into();

        let err = AmqpMessage::deserialize(&application_properties_section(wrapped)).unwrap_err();

        assert!(matches!(err, AmqpDecodeError::MessageParse(_)));
    }

    #[test]
    fn equality_ignores_transfer_fields() {
        let first = AmqpMessage {
            message_format: 7,
            delivery_tag: Some(Value::from(b"tag".to_vec())),
            ..Default::default()
        };

        assert_eq!(first, AmqpMessage::default());
    }

    #[test]
    fn message_display() {
        let mut message = AmqpMessage::default();
        message
            .with_header(|header| header.durable = true)
            .set_body(|body| {
                body.set_value(5u32);
            });

        assert_eq!(
            message.to_string(),
            "Message{Header{durable: true, priority: 4, ttl: none, first_acquirer: false, delivery_count: 0}, body: value(5)}"
        );
    }
}
