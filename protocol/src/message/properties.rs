use std::fmt;

use crate::{
    codec::{constants::MESSAGE_PROPERTIES, AmqpDecoder, AmqpEncoder},
    error::{AmqpDecodeError, AmqpEncodeError},
    types::{
        list_decoder, Address, Binary, Descriptor, List, MessageId, SequenceNo, Str, Symbol,
        Timestamp, Value,
    },
};

use super::header::trim_trailing_nulls;

/// Properties of the message
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Properties {
    pub message_id: Option<MessageId>,
    pub user_id: Option<Binary>,
    pub to: Option<Address>,
    pub subject: Option<String>,
    pub reply_to: Option<Address>,
    pub correlation_id: Option<MessageId>,
    pub content_type: Option<Symbol>,
    pub content_encoding: Option<Symbol>,
    pub absolute_expiry_time: Option<Timestamp>,
    pub creation_time: Option<Timestamp>,
    pub group_id: Option<String>,
    pub group_sequence: Option<SequenceNo>,
    pub reply_to_group_id: Option<String>,
}

impl Properties {
    /// True when at least one property is set.
    pub fn should_serialize(&self) -> bool {
        *self != Properties::default()
    }

    fn fields(&self) -> List {
        let mut fields = vec![
            self.message_id.clone().map(Value::from),
            self.user_id.clone().map(Value::from),
            self.to.clone().map(Value::from),
            self.subject.clone().map(Value::from),
            self.reply_to.clone().map(Value::from),
            self.correlation_id.clone().map(Value::from),
            self.content_type.clone().map(Value::from),
            self.content_encoding.clone().map(Value::from),
            self.absolute_expiry_time.map(Value::from),
            self.creation_time.map(Value::from),
            self.group_id.clone().map(Value::from),
            self.group_sequence.map(Value::from),
            self.reply_to_group_id.clone().map(Value::from),
        ];
        trim_trailing_nulls(&mut fields);
        List(fields.into_iter().map(Option::unwrap_or_default).collect())
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(id) = &self.message_id {
            parts.push(format!("message_id: {}", id));
        }
        if let Some(user_id) = &self.user_id {
            parts.push(format!("user_id: <{} bytes>", user_id.len()));
        }
        if let Some(to) = &self.to {
            parts.push(format!("to: {}", to));
        }
        if let Some(subject) = &self.subject {
            parts.push(format!("subject: {}", subject));
        }
        if let Some(reply_to) = &self.reply_to {
            parts.push(format!("reply_to: {}", reply_to));
        }
        if let Some(id) = &self.correlation_id {
            parts.push(format!("correlation_id: {}", id));
        }
        if let Some(content_type) = &self.content_type {
            parts.push(format!("content_type: {}", content_type));
        }
        if let Some(content_encoding) = &self.content_encoding {
            parts.push(format!("content_encoding: {}", content_encoding));
        }
        if let Some(time) = &self.absolute_expiry_time {
            parts.push(format!("absolute_expiry_time: {}", time.as_datetime().to_rfc3339()));
        }
        if let Some(time) = &self.creation_time {
            parts.push(format!("creation_time: {}", time.as_datetime().to_rfc3339()));
        }
        if let Some(group_id) = &self.group_id {
            parts.push(format!("group_id: {}", group_id));
        }
        if let Some(sequence) = &self.group_sequence {
            parts.push(format!("group_sequence: {}", sequence));
        }
        if let Some(group_id) = &self.reply_to_group_id {
            parts.push(format!("reply_to_group_id: {}", group_id));
        }
        write!(f, "Properties{{{}}}", parts.join(", "))
    }
}

impl AmqpEncoder for Properties {
    fn encoded_size(&self) -> u32 {
        MESSAGE_PROPERTIES.encoded_size() + self.fields().encoded_size()
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        MESSAGE_PROPERTIES.encode(writer)?;
        self.fields().encode(writer)
    }
}

impl AmqpDecoder for Properties {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match Descriptor::decode(input)? {
            (input, MESSAGE_PROPERTIES) => {
                let properties = Properties::default();
                List::decode_with_fields(input, list_decoder_properties, properties)
            }
            (_, descriptor) => Err(AmqpDecodeError::MessageParse(format!(
                "Invalid descriptor for properties {:?}",
                descriptor
            ))),
        }
    }
}

list_decoder!(Properties, list_decoder_properties,
    {
     0 => { message_id, MessageId, None, true},
     1 => { user_id, Binary, None, true},
     2 => { to, Address, None, true},
     3 => { subject, Str, None, true},
     4 => { reply_to, Address, None, true},
     5 => { correlation_id, MessageId, None, true},
     6 => { content_type, Symbol, None, true},
     7 => { content_encoding, Symbol, None, true},
     8 => { absolute_expiry_time, Timestamp, None, true},
     9 => { creation_time, Timestamp, None, true},
     10 => { group_id, Str, None, true},
     11 => { group_sequence, SequenceNo, None, true},
     12 => { reply_to_group_id, Str, None, true}
    }
);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Properties;
    use crate::{
        codec::AmqpDecoder,
        tests::{encode_to_vec, type_encode_decode_test_fuzzy},
        types::{MessageId, Symbol},
    };

    #[test]
    fn test_properties_encode_decode() {
        type_encode_decode_test_fuzzy::<Properties>()
    }

    #[test]
    fn properties_trim_trailing_nulls() {
        let properties = Properties {
            to: Some("q".to_string()),
            ..Default::default()
        };

        assert_eq!(
            encode_to_vec(&properties),
            vec![0x00, 0x53, 0x73, 0xc0, 0x06, 0x03, 0x40, 0x40, 0xa1, 0x01, b'q']
        );
    }

    #[test]
    fn properties_round_trip_selected_fields() {
        let properties = Properties {
            message_id: Some(MessageId::ULong(7)),
            content_type: Some(Symbol::from("application/json")),
            group_sequence: Some(3),
            ..Default::default()
        };

        let buffer = encode_to_vec(&properties);
        let (remaining, decoded) = Properties::decode(&buffer).unwrap();

        assert!(remaining.is_empty());
        assert_eq!(decoded, properties);
        assert!(decoded.should_serialize());
        assert!(!Properties::default().should_serialize());
    }

    #[test]
    fn properties_display_lists_set_fields() {
        let properties = Properties {
            subject: Some("greeting".to_string()),
            group_sequence: Some(3),
            ..Default::default()
        };

        assert_eq!(
            properties.to_string(),
            "Properties{subject: greeting, group_sequence: 3}"
        );
    }
}
