use byteorder::{BigEndian, ByteOrder};

use crate::error::{AmqpDecodeError, IncompleteError};

/// Applies `f` to the value of a `(remaining input, value)` decode result.
pub(crate) trait MapDecoded<'a, T, E> {
    fn map_decoded<U>(self, f: impl FnOnce(T) -> U) -> Result<(&'a [u8], U), E>;
}

impl<'a, T, E> MapDecoded<'a, T, E> for Result<(&'a [u8], T), E> {
    fn map_decoded<U>(self, f: impl FnOnce(T) -> U) -> Result<(&'a [u8], U), E> {
        self.map(|(input, value)| (input, f(value)))
    }
}

/// Splits `len` bytes off the front of `input`.
pub fn read_exact(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), IncompleteError> {
    if input.len() < len {
        return Err(IncompleteError(len));
    }
    let (bytes, input) = input.split_at(len);
    Ok((input, bytes))
}

macro_rules! readers {
    ($($name:ident: $ty:ty = $convert:expr;)*) => {
        $(
            #[allow(unused)]
            pub fn $name(input: &[u8]) -> Result<(&[u8], $ty), IncompleteError> {
                let (input, bytes) = read_exact(input, std::mem::size_of::<$ty>())?;
                Ok((input, $convert(bytes)))
            }
        )*
    };
}

readers! {
    read_u8: u8 = |bytes: &[u8]| bytes[0];
    read_i8: i8 = |bytes: &[u8]| bytes[0] as i8;
    read_u16: u16 = BigEndian::read_u16;
    read_i16: i16 = BigEndian::read_i16;
    read_u32: u32 = BigEndian::read_u32;
    read_i32: i32 = BigEndian::read_i32;
    read_u64: u64 = BigEndian::read_u64;
    read_i64: i64 = BigEndian::read_i64;
}

/// Reads a size or count field: one byte in the short forms, four otherwise.
fn read_width(input: &[u8], wide: bool) -> Result<(&[u8], u32), IncompleteError> {
    if wide {
        read_u32(input)
    } else {
        read_u8(input).map_decoded(u32::from)
    }
}

/// Reads a length prefixed payload (binary, string or symbol).
pub(crate) fn read_sized(input: &[u8], wide: bool) -> Result<(&[u8], &[u8]), IncompleteError> {
    let (input, len) = read_width(input, wide)?;
    read_exact(input, len as usize)
}

/// Reads the size and count of a list, map or array.
///
/// Returns the input after the whole compound, the element count and the
/// bytes holding the elements. The size must cover the count field and every
/// element takes at least one byte, so a count larger than the element bytes
/// is rejected before anything is decoded.
pub(crate) fn read_compound(
    input: &[u8],
    wide: bool,
) -> Result<(&[u8], u32, &[u8]), AmqpDecodeError> {
    let (input, size) = read_width(input, wide)?;
    let (input, frame) = read_exact(input, size as usize)?;
    let (body, count) = read_width(frame, wide).map_err(|_| {
        AmqpDecodeError::parse_error(format!("compound size {} cannot hold its count", size))
    })?;

    if count as usize > body.len() {
        return Err(AmqpDecodeError::parse_error(format!(
            "compound of {} bytes cannot hold {} elements",
            body.len(),
            count
        )));
    }
    Ok((input, count, body))
}

/// Running out of bytes inside a compound means its declared size was wrong,
/// not that more input is on the way.
pub(crate) fn within_compound(err: AmqpDecodeError) -> AmqpDecodeError {
    match err {
        AmqpDecodeError::Incomplete(IncompleteError(needed)) => AmqpDecodeError::parse_error(
            format!("element needs {} bytes past the end of its compound", needed),
        ),
        other => other,
    }
}

/// Fails when elements did not use up every byte of their compound.
pub(crate) fn end_of_compound(body: &[u8]) -> Result<(), AmqpDecodeError> {
    if body.is_empty() {
        Ok(())
    } else {
        Err(AmqpDecodeError::parse_error(format!(
            "{} bytes left in compound after its last element",
            body.len()
        )))
    }
}
