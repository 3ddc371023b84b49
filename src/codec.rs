//! Tagged binary codec for cached session data
//!
//! Cookie jars and the namespace table are persisted as a flat stream of
//! tagged values: `Int32` as a big-endian quad, `String` as little-endian
//! UTF-16 code units terminated by a zero unit, and `ByteArray` as an
//! `Int32` length followed by the raw bytes. Each value is preceded by a
//! one-byte tag. The layout is fixed; cache files written by older
//! deployments must keep loading.

use crate::error::CodecError;

const TAG_INT32: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_BYTE_ARRAY: u8 = 3;

/// Writer for the tagged value stream
#[derive(Debug, Default)]
pub struct Serializer {
    body: Vec<u8>,
}

impl Serializer {
    /// New empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tagged big-endian 32-bit integer
    pub fn put_i32(&mut self, value: i32) {
        self.body.push(TAG_INT32);
        self.body.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a tagged zero-terminated UTF-16LE string
    pub fn put_str(&mut self, value: &str) {
        self.body.push(TAG_STRING);
        for unit in value.encode_utf16() {
            self.body.extend_from_slice(&unit.to_le_bytes());
        }
        self.body.extend_from_slice(&[0, 0]);
    }

    /// Append a tagged length-prefixed byte array
    pub fn put_bytes(&mut self, value: &[u8]) {
        self.body.push(TAG_BYTE_ARRAY);
        self.put_i32(value.len() as i32);
        self.body.extend_from_slice(value);
    }

    /// Consume the serializer and return the encoded stream
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

/// Reader for the tagged value stream
#[derive(Debug)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    /// Read from an encoded stream
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_byte(&mut self) -> Result<u8, CodecError> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect_tag(&mut self, tag: u8, expected: &'static str) -> Result<(), CodecError> {
        let found = self.next_byte()?;
        if found != tag {
            return Err(CodecError::WrongTag { expected, found });
        }
        Ok(())
    }

    /// Read a tagged big-endian 32-bit integer
    pub fn get_i32(&mut self) -> Result<i32, CodecError> {
        self.expect_tag(TAG_INT32, "Int32")?;
        let mut quad = [0u8; 4];
        for byte in &mut quad {
            *byte = self.next_byte()?;
        }
        Ok(i32::from_be_bytes(quad))
    }

    /// Read a tagged zero-terminated UTF-16LE string
    pub fn get_str(&mut self) -> Result<String, CodecError> {
        self.expect_tag(TAG_STRING, "String")?;
        let mut units = Vec::new();
        loop {
            let lo = self.next_byte()?;
            let hi = self.next_byte()?;
            let unit = u16::from_le_bytes([lo, hi]);
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Read a tagged length-prefixed byte array
    pub fn get_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        self.expect_tag(TAG_BYTE_ARRAY, "ByteArray")?;
        let length = self.get_i32()?;
        let length = usize::try_from(length).map_err(|_| CodecError::UnexpectedEnd)?;
        let end = self
            .pos
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or(CodecError::UnexpectedEnd)?;
        let bytes = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }
}
