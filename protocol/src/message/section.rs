use std::fmt;

use crate::{
    codec::{
        constants::{
            MESSAGE_ANNOTATIONS, MESSAGE_APPLICATION_PROPERTIES, MESSAGE_BODY_DATA,
            MESSAGE_BODY_SEQUENCE, MESSAGE_BODY_VALUE, MESSAGE_DELIVERY_ANNOTATIONS,
            MESSAGE_FOOTER, MESSAGE_HEADER, MESSAGE_PROPERTIES,
        },
        decoder::MapDecoded,
        AmqpDecoder,
    },
    error::{AmqpDecodeError, ApplicationPropertyError},
    types::{
        AmqpSequence, AmqpValue, ApplicationProperties, Binary, DeliveryAnnotations, Descriptor,
        Footer, Map, MessageAnnotations, SimpleValue, Value,
    },
};

use super::{header::Header, properties::Properties};

/// The nine top-level sections of an AMQP message, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    DeliveryAnnotations,
    MessageAnnotations,
    Properties,
    ApplicationProperties,
    DataBinary,
    DataAmqpSequence,
    DataAmqpValue,
    Footer,
}

impl SectionKind {
    pub fn descriptor(&self) -> Descriptor {
        match self {
            SectionKind::Header => MESSAGE_HEADER,
            SectionKind::DeliveryAnnotations => MESSAGE_DELIVERY_ANNOTATIONS,
            SectionKind::MessageAnnotations => MESSAGE_ANNOTATIONS,
            SectionKind::Properties => MESSAGE_PROPERTIES,
            SectionKind::ApplicationProperties => MESSAGE_APPLICATION_PROPERTIES,
            SectionKind::DataBinary => MESSAGE_BODY_DATA,
            SectionKind::DataAmqpSequence => MESSAGE_BODY_SEQUENCE,
            SectionKind::DataAmqpValue => MESSAGE_BODY_VALUE,
            SectionKind::Footer => MESSAGE_FOOTER,
        }
    }

    /// Position in the canonical order. The three body kinds share a slot.
    fn precedence(&self) -> u8 {
        match self {
            SectionKind::Header => 0,
            SectionKind::DeliveryAnnotations => 1,
            SectionKind::MessageAnnotations => 2,
            SectionKind::Properties => 3,
            SectionKind::ApplicationProperties => 4,
            SectionKind::DataBinary | SectionKind::DataAmqpSequence | SectionKind::DataAmqpValue => 5,
            SectionKind::Footer => 6,
        }
    }

    /// Body kinds that may appear several times in a row.
    fn is_repeatable(&self) -> bool {
        matches!(self, SectionKind::DataBinary | SectionKind::DataAmqpSequence)
    }
}

impl TryFrom<&Descriptor> for SectionKind {
    type Error = AmqpDecodeError;

    fn try_from(descriptor: &Descriptor) -> Result<Self, Self::Error> {
        match *descriptor {
            MESSAGE_HEADER => Ok(SectionKind::Header),
            MESSAGE_DELIVERY_ANNOTATIONS => Ok(SectionKind::DeliveryAnnotations),
            MESSAGE_ANNOTATIONS => Ok(SectionKind::MessageAnnotations),
            MESSAGE_PROPERTIES => Ok(SectionKind::Properties),
            MESSAGE_APPLICATION_PROPERTIES => Ok(SectionKind::ApplicationProperties),
            MESSAGE_BODY_DATA => Ok(SectionKind::DataBinary),
            MESSAGE_BODY_SEQUENCE => Ok(SectionKind::DataAmqpSequence),
            MESSAGE_BODY_VALUE => Ok(SectionKind::DataAmqpValue),
            MESSAGE_FOOTER => Ok(SectionKind::Footer),
            _ => Err(AmqpDecodeError::UnknownSection(descriptor.clone())),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks which sections have been read so far.
///
/// A section is accepted when it comes strictly after the last accepted one,
/// or when it repeats the data or sequence body kind already chosen.
#[derive(Debug, Default)]
pub(crate) struct SectionOrder {
    last: Option<SectionKind>,
}

impl SectionOrder {
    pub(crate) fn accept(&mut self, section: SectionKind) -> Result<(), AmqpDecodeError> {
        if let Some(previous) = self.last {
            let advances = section.precedence() > previous.precedence();
            let repeats = section == previous && section.is_repeatable();
            if !advances && !repeats {
                return Err(AmqpDecodeError::SectionOrder { section, previous });
            }
        }
        self.last = Some(section);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum MessageSection {
    Header(Header),
    DeliveryAnnotations(DeliveryAnnotations),
    MessageAnnotations(MessageAnnotations),
    Properties(Properties),
    ApplicationProperties(ApplicationProperties),
    Data(Binary),
    AmqpSequence(AmqpSequence),
    AmqpValue(AmqpValue),
    Footer(Footer),
}

impl MessageSection {
    /// Decodes the section starting at `input`, whose kind has already been
    /// read from its descriptor.
    pub(crate) fn decode_kind(
        kind: SectionKind,
        input: &[u8],
    ) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (remaining, _) = Descriptor::decode(input)?;

        match kind {
            SectionKind::Header => Header::decode(input).map_decoded(MessageSection::Header),
            SectionKind::DeliveryAnnotations => DeliveryAnnotations::decode(remaining)
                .map_decoded(MessageSection::DeliveryAnnotations),
            SectionKind::MessageAnnotations => {
                MessageAnnotations::decode(remaining).map_decoded(MessageSection::MessageAnnotations)
            }
            SectionKind::Properties => {
                Properties::decode(input).map_decoded(MessageSection::Properties)
            }
            SectionKind::ApplicationProperties => {
                let (remaining, value) = Value::decode(remaining)?;
                Ok((
                    remaining,
                    MessageSection::ApplicationProperties(
                        ApplicationProperties::try_from_wire_value(value)?,
                    ),
                ))
            }
            SectionKind::DataBinary => Binary::decode(remaining).map_decoded(MessageSection::Data),
            SectionKind::DataAmqpSequence => {
                AmqpSequence::decode(remaining).map_decoded(MessageSection::AmqpSequence)
            }
            SectionKind::DataAmqpValue => {
                Value::decode(remaining).map_decoded(MessageSection::AmqpValue)
            }
            SectionKind::Footer => Footer::decode(remaining).map_decoded(MessageSection::Footer),
        }
    }
}

impl AmqpDecoder for MessageSection {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (_, descriptor) = Descriptor::decode(input)?;
        let kind = SectionKind::try_from(&descriptor)?;
        MessageSection::decode_kind(kind, input)
    }
}

impl ApplicationProperties {
    /// Checks the application-properties typing rule for one entry.
    pub fn check_entry(key: &str, value: &Value) -> Result<(), ApplicationPropertyError> {
        if value.is_simple() {
            Ok(())
        } else {
            Err(ApplicationPropertyError::NonSimpleValue {
                key: key.to_string(),
                value_type: value.value_type(),
            })
        }
    }

    pub fn validate(&self) -> Result<(), ApplicationPropertyError> {
        self.iter()
            .try_for_each(|(key, value)| ApplicationProperties::check_entry(key, value))
    }

    /// Reads application properties from their wire value.
    ///
    /// The map is accepted bare or wrapped once more in a described value
    /// carrying the application-properties descriptor, since peers emit both.
    pub fn try_from_wire_value(value: Value) -> Result<ApplicationProperties, AmqpDecodeError> {
        let value = match value {
            Value::Described(described) => {
                if *described.descriptor() != MESSAGE_APPLICATION_PROPERTIES {
                    return Err(AmqpDecodeError::parse_error(format!(
                        "application properties wrapped in descriptor {}",
                        described.descriptor()
                    )));
                }
                described.into_value()
            }
            value => value,
        };

        // keys of the source map are already distinct
        let entries = value
            .into_map()?
            .into_iter()
            .map(|(key, value)| {
                let key = match key {
                    Value::Simple(SimpleValue::String(key)) => key,
                    other => return Err(ApplicationPropertyError::NonStringKey(other.value_type())),
                };
                ApplicationProperties::check_entry(&key, &value)?;
                Ok((key, value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Map(entries))
    }

    pub fn to_value(&self) -> Value {
        self.iter()
            .map(|(key, value)| (Value::from(key.clone()), value.clone()))
            .collect::<Map<Value, Value>>()
            .into()
    }
}
