use crate::encoding::{
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, Date, ObjectId, Time};
use crate::{DecodeError, EncodeError};

/// Writes `value` big-endian using the fewest bytes that represent it
/// exactly, returning the byte count (1..=4).
pub fn encode_unsigned(w: &mut Writer<'_>, value: u32) -> Result<usize, EncodeError> {
    let len = if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFF_FFFF {
        3
    } else {
        4
    };

    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    let mut value = 0u32;
    for _ in 0..len {
        value = (value << 8) | r.read_u8()? as u32;
    }
    Ok(value)
}

/// Writes `value` as minimal-width two's complement, returning the byte
/// count (1..=4).
pub fn encode_signed(w: &mut Writer<'_>, value: i32) -> Result<usize, EncodeError> {
    let len = if (-128..=127).contains(&value) {
        1
    } else if (-32768..=32767).contains(&value) {
        2
    } else if (-8_388_608..=8_388_607).contains(&value) {
        3
    } else {
        4
    };

    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }

    let bytes = r.read_exact(len)?;
    let mut out = [0u8; 4];
    out[4 - len..].copy_from_slice(bytes);
    if (bytes[0] & 0x80) != 0 {
        for b in &mut out[..4 - len] {
            *b = 0xFF;
        }
    }
    Ok(i32::from_be_bytes(out))
}

fn encode_app_unsigned_like(
    w: &mut Writer<'_>,
    tag: AppTag,
    value: u32,
) -> Result<(), EncodeError> {
    let mut scratch = [0u8; 4];
    let mut tw = Writer::new(&mut scratch);
    let len = encode_unsigned(&mut tw, value)? as u32;
    Tag::Application { tag, len }.encode(w)?;
    w.write_all(&scratch[..len as usize])
}

pub fn encode_app_null(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Null,
        len: 0,
    }
    .encode(w)
}

pub fn encode_app_boolean(w: &mut Writer<'_>, value: bool) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Boolean,
        len: value as u32,
    }
    .encode(w)
}

pub fn encode_app_unsigned(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    encode_app_unsigned_like(w, AppTag::UnsignedInt, value)
}

pub fn encode_app_enumerated(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    encode_app_unsigned_like(w, AppTag::Enumerated, value)
}

pub fn encode_app_signed(w: &mut Writer<'_>, value: i32) -> Result<(), EncodeError> {
    let mut scratch = [0u8; 4];
    let mut tw = Writer::new(&mut scratch);
    let len = encode_signed(&mut tw, value)? as u32;
    Tag::Application {
        tag: AppTag::SignedInt,
        len,
    }
    .encode(w)?;
    w.write_all(&scratch[..len as usize])
}

pub fn encode_app_real(w: &mut Writer<'_>, value: f32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Real,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_app_double(w: &mut Writer<'_>, value: f64) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Double,
        len: 8,
    }
    .encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_app_octet_string(w: &mut Writer<'_>, value: &[u8]) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::OctetString,
        len: u32_len(value.len())?,
    }
    .encode(w)?;
    w.write_all(value)
}

pub fn encode_app_character_string(w: &mut Writer<'_>, value: &str) -> Result<(), EncodeError> {
    let bytes = value.as_bytes();
    Tag::Application {
        tag: AppTag::CharacterString,
        len: u32_len(bytes.len().saturating_add(1))?,
    }
    .encode(w)?;
    // Character set octet 0 = UTF-8 / ANSI X3.4 in this baseline.
    w.write_u8(0)?;
    w.write_all(bytes)
}

pub fn encode_app_bit_string(w: &mut Writer<'_>, value: BitString<'_>) -> Result<(), EncodeError> {
    if value.unused_bits > 7 {
        return Err(EncodeError::ValueOutOfRange);
    }
    Tag::Application {
        tag: AppTag::BitString,
        len: u32_len(value.data.len().saturating_add(1))?,
    }
    .encode(w)?;
    w.write_u8(value.unused_bits)?;
    w.write_all(value.data)
}

pub fn encode_app_date(w: &mut Writer<'_>, value: Date) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Date,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&[value.year_since_1900, value.month, value.day, value.weekday])
}

pub fn encode_app_time(w: &mut Writer<'_>, value: Time) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Time,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&[value.hour, value.minute, value.second, value.hundredths])
}

pub fn encode_app_object_id(w: &mut Writer<'_>, object_id: ObjectId) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::ObjectId,
        len: 4,
    }
    .encode(w)?;
    w.write_be_u32(object_id.raw())
}

pub fn decode_app_unsigned(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    let len = Tag::expect_application(r, AppTag::UnsignedInt)?;
    decode_unsigned(r, len as usize)
}

pub fn decode_app_enumerated(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    let len = Tag::expect_application(r, AppTag::Enumerated)?;
    decode_unsigned(r, len as usize)
}

pub fn decode_app_signed(r: &mut Reader<'_>) -> Result<i32, DecodeError> {
    let len = Tag::expect_application(r, AppTag::SignedInt)?;
    decode_signed(r, len as usize)
}

pub fn decode_app_boolean(r: &mut Reader<'_>) -> Result<bool, DecodeError> {
    let len = Tag::expect_application(r, AppTag::Boolean)?;
    match len {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidValue),
    }
}

pub fn decode_app_real(r: &mut Reader<'_>) -> Result<f32, DecodeError> {
    match Tag::expect_application(r, AppTag::Real)? {
        4 => {
            let b = r.read_exact(4)?;
            Ok(f32::from_bits(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
        }
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_object_id(r: &mut Reader<'_>) -> Result<ObjectId, DecodeError> {
    match Tag::expect_application(r, AppTag::ObjectId)? {
        4 => Ok(ObjectId::from_raw(r.read_be_u32()?)),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_character_string<'a>(r: &mut Reader<'a>) -> Result<&'a str, DecodeError> {
    let len = Tag::expect_application(r, AppTag::CharacterString)?;
    decode_character_string_payload(r, len as usize)
}

/// Decodes a character-string payload of `len` bytes: one charset octet
/// followed by the text. Only charset 0 (UTF-8) is supported.
pub fn decode_character_string_payload<'a>(
    r: &mut Reader<'a>,
    len: usize,
) -> Result<&'a str, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    if raw[0] != 0 {
        return Err(DecodeError::Unsupported);
    }
    core::str::from_utf8(&raw[1..]).map_err(|_| DecodeError::InvalidValue)
}

pub fn encode_ctx_unsigned(w: &mut Writer<'_>, tag_num: u8, value: u32) -> Result<(), EncodeError> {
    let mut scratch = [0u8; 4];
    let mut tw = Writer::new(&mut scratch);
    let len = encode_unsigned(&mut tw, value)? as u32;
    Tag::Context { tag_num, len }.encode(w)?;
    w.write_all(&scratch[..len as usize])
}

pub fn encode_ctx_object_id(
    w: &mut Writer<'_>,
    tag_num: u8,
    object_id: ObjectId,
) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(object_id.raw())
}

pub fn encode_opening_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

fn u32_len(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::ValueOutOfRange)
}
