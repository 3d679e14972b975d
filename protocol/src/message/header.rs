use std::fmt;

use crate::{
    codec::{constants::MESSAGE_HEADER, AmqpDecoder, AmqpEncoder},
    error::{AmqpDecodeError, AmqpEncodeError},
    types::{list_decoder, Boolean, Descriptor, List, Milliseconds, UInt, Value},
};

pub const DEFAULT_PRIORITY: u8 = 4;

/// Transport header of a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Header {
    pub durable: bool,
    pub priority: u8,
    pub ttl: Option<Milliseconds>,
    pub first_acquirer: bool,
    pub delivery_count: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            durable: false,
            priority: DEFAULT_PRIORITY,
            ttl: None,
            first_acquirer: false,
            delivery_count: 0,
        }
    }
}

impl Header {
    /// True when any field differs from its default, i.e. the section has to
    /// be written.
    pub fn should_serialize(&self) -> bool {
        *self != Header::default()
    }

    /// Composite field list in canonical form: defaults are written as null
    /// and trailing nulls are dropped.
    fn fields(&self) -> List {
        let defaults = Header::default();
        let mut fields = vec![
            (self.durable != defaults.durable).then(|| Value::from(self.durable)),
            (self.priority != defaults.priority).then(|| Value::from(self.priority)),
            self.ttl.map(Value::from),
            (self.first_acquirer != defaults.first_acquirer).then(|| Value::from(self.first_acquirer)),
            (self.delivery_count != defaults.delivery_count).then(|| Value::from(self.delivery_count)),
        ];
        trim_trailing_nulls(&mut fields);
        List(fields.into_iter().map(Option::unwrap_or_default).collect())
    }
}

pub(crate) fn trim_trailing_nulls(fields: &mut Vec<Option<Value>>) {
    while matches!(fields.last(), Some(None)) {
        fields.pop();
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header{{durable: {}, priority: {}, ttl: ",
            self.durable, self.priority
        )?;
        match self.ttl {
            Some(ttl) => write!(f, "{}ms", ttl)?,
            None => write!(f, "none")?,
        }
        write!(
            f,
            ", first_acquirer: {}, delivery_count: {}}}",
            self.first_acquirer, self.delivery_count
        )
    }
}

impl AmqpEncoder for Header {
    fn encoded_size(&self) -> u32 {
        MESSAGE_HEADER.encoded_size() + self.fields().encoded_size()
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        MESSAGE_HEADER.encode(writer)?;
        self.fields().encode(writer)
    }
}

impl AmqpDecoder for Header {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match Descriptor::decode(input)? {
            (input, MESSAGE_HEADER) => {
                let header = Header::default();
                List::decode_with_fields(input, list_decoder_header, header)
            }
            (_, descriptor) => Err(AmqpDecodeError::MessageParse(format!(
                "Invalid descriptor for header {:?}",
                descriptor
            ))),
        }
    }
}

list_decoder!(Header, list_decoder_header,
    {
     0 => { durable, Boolean, false},
     1 => { priority, u8, DEFAULT_PRIORITY},
     2 => { ttl, u32, None, true},
     3 => { first_acquirer, Boolean, false},
     4 => { delivery_count, UInt, 0}
    }
);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Header;
    use crate::{
        codec::AmqpDecoder,
        tests::{encode_to_vec, type_encode_decode_test_fuzzy},
    };

    #[test]
    fn test_header_encode_decode() {
        type_encode_decode_test_fuzzy::<Header>()
    }

    fn check_header_bytes(header: Header, expected: &[u8]) {
        let buffer = encode_to_vec(&header);
        assert_eq!(buffer, expected);

        let (remaining, decoded) = Header::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(decoded, header);
    }

    #[test]
    fn header_durable_bytes() {
        check_header_bytes(
            Header {
                durable: true,
                ..Default::default()
            },
            &[0x00, 0x53, 0x70, 0xc0, 0x02, 0x01, 0x41],
        );
    }

    #[test]
    fn header_priority_bytes() {
        check_header_bytes(
            Header {
                priority: 8,
                ..Default::default()
            },
            &[0x00, 0x53, 0x70, 0xc0, 0x04, 0x02, 0x40, 0x50, 0x08],
        );
    }

    #[test]
    fn header_ttl_bytes() {
        check_header_bytes(
            Header {
                ttl: Some(12345),
                ..Default::default()
            },
            &[
                0x00, 0x53, 0x70, 0xc0, 0x08, 0x03, 0x40, 0x40, 0x70, 0x00, 0x00, 0x30, 0x39,
            ],
        );
    }

    #[test]
    fn header_first_acquirer_bytes() {
        check_header_bytes(
            Header {
                first_acquirer: true,
                ..Default::default()
            },
            &[0x00, 0x53, 0x70, 0xc0, 0x05, 0x04, 0x40, 0x40, 0x40, 0x41],
        );
    }

    #[test]
    fn header_delivery_count_bytes() {
        check_header_bytes(
            Header {
                delivery_count: 157,
                ..Default::default()
            },
            &[0x00, 0x53, 0x70, 0xc0, 0x07, 0x05, 0x40, 0x40, 0x40, 0x40, 0x52, 0x9d],
        );
    }

    #[test]
    fn default_header_is_not_serialized() {
        assert!(!Header::default().should_serialize());
        assert!(Header {
            ttl: Some(0),
            ..Default::default()
        }
        .should_serialize());
    }

    #[test]
    fn header_decodes_explicit_fields() {
        // durable, priority 100, ttl 0, first-acquirer, delivery-count 300
        let input = [
            0x00, 0x53, 0x70, 0xc0, 0x0b, 0x05, 0x41, 0x50, 0x64, 0x43, 0x41, 0x70, 0x00, 0x00,
            0x01, 0x2c,
        ];
        let (_, header) = Header::decode(&input).unwrap();

        assert_eq!(
            header,
            Header {
                durable: true,
                priority: 100,
                ttl: Some(0),
                first_acquirer: true,
                delivery_count: 300,
            }
        );
    }
}
