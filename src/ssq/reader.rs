//! SSQ container reader

use super::chunk::{Chunk, CHUNK_HEADER_SIZE};
use crate::error::{Error, Result};

/// Little-endian cursor over SSQ data
///
/// Used both for the container itself and for the payload of a single
/// chunk. `context` names what is being read in truncation errors.
pub struct SsqReader<'a> {
    data: &'a [u8],
    pos: usize,
    context: String,
}

impl<'a> SsqReader<'a> {
    /// Create a reader over a whole container
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_context(data, "container")
    }

    /// Create a reader over a chunk payload
    pub fn for_chunk(chunk: &'a Chunk) -> Self {
        Self::with_context(&chunk.payload, chunk.describe())
    }

    pub fn with_context(data: &'a [u8], context: impl Into<String>) -> Self {
        Self {
            data,
            pos: 0,
            context: context.into(),
        }
    }

    /// Check if we've reached the end of data
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Seek to a position
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Advance to the next multiple of `align`
    pub fn align(&mut self, align: usize) {
        let rem = self.pos % align;
        if rem != 0 {
            self.pos += align - rem;
        }
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::TruncatedRecord {
            context: self.context.clone(),
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or_else(|| self.truncated(1))?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a 16-bit little-endian value
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a 32-bit little-endian value
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.truncated(len));
        }
        let data = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read bytes into a buffer
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_slice(len).map(<[u8]>::to_vec)
    }

    /// Read `count` consecutive u32 values
    pub fn read_u32_array(&mut self, count: usize) -> Result<Vec<u32>> {
        if count * 4 > self.remaining() {
            return Err(self.truncated(count * 4));
        }
        (0..count).map(|_| self.read_u32_le()).collect()
    }

    /// Parse every chunk up to the terminator or end of data
    ///
    /// A zero length or fewer than 12 remaining bytes ends the container
    /// cleanly.
    pub fn parse_chunks(&mut self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        while self.remaining() >= CHUNK_HEADER_SIZE {
            // Read chunk header
            let start = self.pos;
            let length = self.read_u32_le()?;
            let kind = self.read_u16_le()?;
            let param = self.read_u16_le()?;
            let count = self.read_u16_le()?;
            let flags = self.read_u16_le()?;

            // Zero length terminates the container
            if length == 0 {
                break;
            }

            let length_usize = length as usize;
            if length_usize < CHUNK_HEADER_SIZE {
                return Err(Error::TruncatedRecord {
                    context: format!("header of chunk kind {kind}"),
                    offset: start,
                    needed: CHUNK_HEADER_SIZE,
                    available: length_usize,
                });
            }

            let payload_len = length_usize - CHUNK_HEADER_SIZE;
            if payload_len > self.remaining() {
                return Err(Error::TruncatedRecord {
                    context: format!("payload of chunk kind {kind}"),
                    offset: self.pos,
                    needed: payload_len,
                    available: self.remaining(),
                });
            }
            let payload = self.read_bytes(payload_len)?;

            // Padding may be missing at the very end of the file
            let padding = (4 - length_usize % 4) % 4;
            self.pos += padding.min(self.remaining());

            log::debug!(
                "chunk at {start:#x}: kind {kind}, param {param:#06x}, count {count}, \
                 {payload_len} payload bytes"
            );

            chunks.push(Chunk {
                length,
                kind,
                param,
                count,
                flags,
                payload,
            });
        }

        Ok(chunks)
    }
}

/// Parse a whole SSQ container
pub fn parse_chunks(data: &[u8]) -> Result<Vec<Chunk>> {
    SsqReader::new(data).parse_chunks()
}
