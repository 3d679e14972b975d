use std::{
    borrow::Borrow,
    collections::HashSet,
    fmt,
    hash::Hash,
};

use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    codec::{
        constants::TypeCode,
        decoder::{end_of_compound, read_compound, within_compound},
        AmqpDecoder, AmqpEncoder,
    },
    error::{AmqpDecodeError, AmqpEncodeError},
};

/// Insertion-ordered AMQP map.
///
/// Entries are kept in the order they were first inserted and encoded in that
/// order, so equality is order sensitive. Inserting an existing key replaces
/// its value in place.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct Map<K, V>(pub(crate) Vec<(K, V)>);

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<K, V> Map<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, value)| value)
    }
}

impl<K: PartialEq, V> Map<K, V> {
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.0
            .iter()
            .find(|(existing, _)| K::borrow(existing) == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.get(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let idx = self.0.iter().position(|(existing, _)| K::borrow(existing) == key)?;
        Some(self.0.remove(idx).1)
    }
}

fn has_distinct_keys<K: Hash + Eq, V>(entries: &[(K, V)]) -> bool {
    let mut seen = HashSet::with_capacity(entries.len());
    entries.iter().all(|(key, _)| seen.insert(key))
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let entries: Vec<(K, V)> = iter.into_iter().collect();
        if has_distinct_keys(&entries) {
            return Map(entries);
        }

        let mut map = Map::new();
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }
}

impl<K, V> IntoIterator for Map<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (key, value)) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl<K, V> Map<K, V>
where
    K: AmqpEncoder,
    V: AmqpEncoder,
{
    fn content_size(&self) -> u32 {
        self.0
            .iter()
            .fold(0, |acc, (k, v)| acc + k.encoded_size() + v.encoded_size())
    }

    fn is_compact(&self, content_size: u32) -> bool {
        content_size + 1 <= u8::MAX as u32 && self.0.len() * 2 <= u8::MAX as usize
    }
}

impl<K, V> AmqpDecoder for Map<K, V>
where
    K: Hash + Eq + AmqpDecoder,
    V: AmqpDecoder,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        Self::decode_nested(input, 0)
    }

    /// Duplicate keys are rejected rather than merged, so decoding stays
    /// linear in the number of entries.
    fn decode_nested(input: &[u8], depth: usize) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, code) = TypeCode::decode(input)?;

        let wide = match code {
            TypeCode::Map8 => false,
            TypeCode::Map32 => true,
            _ => return Err(Self::invalid_type_code(code)),
        };

        let (input, count, mut body) = read_compound(input, wide)?;
        if count % 2 != 0 {
            return Err(AmqpDecodeError::parse_error(format!(
                "map with odd element count {}",
                count
            )));
        }

        let mut entries = Vec::with_capacity(count as usize / 2);
        for _ in 0..count / 2 {
            let (rest, key) = K::decode_nested(body, depth + 1).map_err(within_compound)?;
            let (rest, value) = V::decode_nested(rest, depth + 1).map_err(within_compound)?;
            entries.push((key, value));
            body = rest;
        }
        end_of_compound(body)?;

        if !has_distinct_keys(&entries) {
            return Err(AmqpDecodeError::parse_error("map with duplicate key"));
        }

        Ok((input, Map(entries)))
    }
}

impl<K, V> AmqpEncoder for Map<K, V>
where
    K: AmqpEncoder,
    V: AmqpEncoder,
{
    fn encoded_size(&self) -> u32 {
        let content_size = self.content_size();

        let type_size = if self.is_compact(content_size) { 3 } else { 9 };

        content_size + type_size
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), AmqpEncodeError> {
        let count = self.0.len() * 2;
        let content_size = self.content_size();

        if self.is_compact(content_size) {
            TypeCode::Map8.encode(writer)?;
            writer.write_u8((content_size + 1) as u8)?;
            writer.write_u8(count as u8)?;
        } else {
            TypeCode::Map32.encode(writer)?;
            writer.write_u32::<BigEndian>(content_size + 4)?;
            writer.write_u32::<BigEndian>(count as u32)?;
        }

        for (k, v) in &self.0 {
            k.encode(writer)?;
            v.encode(writer)?;
        }
        Ok(())
    }
}
