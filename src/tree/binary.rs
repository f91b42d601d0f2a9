//! Binary syntax decoder.
//!
//! Layout: a 23-byte magic, a `u32` version, then a list of node records.
//! Each record starts with end-offset, property-count and property-list-length
//! (`u32` before version 7500, `u64` from 7500 on) and a `u8`-length name. A
//! record whose end-offset is zero terminates the enclosing list.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use crate::errors::{FbxError, Result};
use crate::tree::{Attribute, Element, MAX_DEPTH};

/// Magic plus the `\0\x1a\0` trailer.
pub const HEADER: &[u8; 23] = b"Kaydara FBX Binary  \x00\x1a\x00";

/// First version that uses 64-bit record offsets.
const WIDE_OFFSETS_VERSION: u32 = 7500;

/// Decodes a complete binary document into a nameless root element.
pub fn decode(data: &[u8]) -> Result<Element> {
    let mut reader = Reader::new(data);

    let header = reader.take(HEADER.len())?;
    if header != HEADER {
        return Err(reader.error_at(0, "invalid FBX header magic"));
    }
    let version = reader.u32()?;
    reader.wide = version >= WIDE_OFFSETS_VERSION;

    let mut root = Element::new("");
    while reader.remaining() >= reader.null_record_len() {
        match reader.read_element(0)? {
            Some(element) => root.children.push(element),
            None => break,
        }
    }

    Ok(root)
}

/// Returns the version stored right after the magic, if the header is intact.
#[must_use]
pub fn version(data: &[u8]) -> Option<u32> {
    let bytes = data.get(HEADER.len()..HEADER.len() + 4)?;
    (data.starts_with(HEADER)).then(|| LittleEndian::read_u32(bytes))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    wide: bool,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            wide: false,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn null_record_len(&self) -> usize {
        if self.wide { 25 } else { 13 }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> FbxError {
        FbxError::InvalidBinary {
            offset: offset as u64,
            message: message.into(),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                self.error_at(self.pos, format!("unexpected end of data, need {n} more bytes"))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn offset(&mut self) -> Result<u64> {
        if self.wide {
            Ok(LittleEndian::read_u64(self.take(8)?))
        } else {
            Ok(u64::from(self.u32()?))
        }
    }

    fn read_element(&mut self, depth: usize) -> Result<Option<Element>> {
        let start = self.pos;
        if depth > MAX_DEPTH {
            return Err(self.error_at(start, format!("records nested deeper than {MAX_DEPTH} levels")));
        }
        let end_offset = self.offset()?;
        let property_count = self.offset()?;
        let _property_list_len = self.offset()?;
        let name_len = usize::from(self.u8()?);

        if end_offset == 0 {
            return Ok(None);
        }

        let end = usize::try_from(end_offset)
            .ok()
            .filter(|&end| end <= self.data.len() && end > start)
            .ok_or_else(|| self.error_at(start, format!("record end offset {end_offset} out of range")))?;

        let name = String::from_utf8_lossy(self.take(name_len)?).into_owned();
        let mut element = Element::new(name);

        for _ in 0..property_count {
            element.attributes.push(self.read_attribute()?);
        }

        while self.pos < end {
            match self.read_element(depth + 1)? {
                Some(child) => element.children.push(child),
                None => break,
            }
        }

        if self.pos > end {
            return Err(self.error_at(start, format!("record '{}' overruns its end offset", element.name)));
        }
        self.pos = end;

        Ok(Some(element))
    }

    fn read_attribute(&mut self) -> Result<Attribute> {
        let at = self.pos;
        let attribute = match self.u8()? {
            b'C' => Attribute::Bool(self.u8()? != 0),
            b'Y' => Attribute::I16(LittleEndian::read_i16(self.take(2)?)),
            b'I' => Attribute::I32(LittleEndian::read_i32(self.take(4)?)),
            b'L' => Attribute::I64(LittleEndian::read_i64(self.take(8)?)),
            b'F' => Attribute::F32(LittleEndian::read_f32(self.take(4)?)),
            b'D' => Attribute::F64(LittleEndian::read_f64(self.take(8)?)),
            b'S' => {
                let len = self.u32()? as usize;
                Attribute::String(String::from_utf8_lossy(self.take(len)?).into_owned())
            }
            b'R' => {
                let len = self.u32()? as usize;
                Attribute::Raw(self.take(len)?.to_vec())
            }
            b'b' => Attribute::BoolArray(self.read_array(1, |b| b[0] != 0)?),
            b'c' => Attribute::I32Array(self.read_array(1, |b| i32::from(b[0] as i8))?),
            b'i' => Attribute::I32Array(self.read_array(4, LittleEndian::read_i32)?),
            b'l' => Attribute::I64Array(self.read_array(8, LittleEndian::read_i64)?),
            b'f' => Attribute::F32Array(self.read_array(4, LittleEndian::read_f32)?),
            b'd' => Attribute::F64Array(self.read_array(8, LittleEndian::read_f64)?),
            other => {
                return Err(self.error_at(at, format!("invalid property type marker 0x{other:02x}")));
            }
        };
        Ok(attribute)
    }

    fn read_array<T>(&mut self, item_size: usize, convert: impl Fn(&[u8]) -> T) -> Result<Vec<T>> {
        let at = self.pos;
        let length = self.u32()? as usize;
        let encoding = self.u32()?;
        let compressed_length = self.u32()? as usize;

        let byte_len = length
            .checked_mul(item_size)
            .ok_or_else(|| self.error_at(at, "array length overflow"))?;

        let decompressed;
        let bytes: &[u8] = match encoding {
            0 => self.take(byte_len)?,
            1 => {
                let compressed = self.take(compressed_length)?;
                // The declared length is untrusted; let the buffer grow with the inflated data.
                let mut out = Vec::new();
                ZlibDecoder::new(compressed)
                    .take(byte_len as u64)
                    .read_to_end(&mut out)
                    .map_err(|e| self.error_at(at, format!("failed to inflate array: {e}")))?;
                decompressed = out;
                &decompressed
            }
            other => {
                return Err(self.error_at(at, format!("unknown array encoding {other}")));
            }
        };

        if bytes.len() != byte_len {
            return Err(self.error_at(
                at,
                format!("array holds {} bytes, expected {byte_len}", bytes.len()),
            ));
        }

        Ok(bytes.chunks_exact(item_size).map(convert).collect())
    }
}
