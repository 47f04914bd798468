//! Wire format of a single uploaded chunk.
//!
//! Every chunk body starts with a fixed 9-byte big-endian header:
//!
//! ```text
//! +----------------+----------------+----------+-----------------+
//! | start (u32 BE) |  end (u32 BE)  | checksum |  payload ...    |
//! +----------------+----------------+----------+-----------------+
//! ```
//!
//! `start` and `end` are inclusive offsets inside the final file. Only `start` is
//! used as a key; `end` is carried for reporting. `checksum` is the sum of the
//! payload bytes modulo 256.

use crate::error::AppError;

/// Size of the fixed chunk header in bytes.
pub const CHUNK_HEADER_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub start: u32,
    pub end: u32,
    pub checksum: u8,
}

impl ChunkHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, AppError> {
        let header: &[u8; CHUNK_HEADER_SIZE] = buf
            .get(..CHUNK_HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or(AppError::InvalidHeader)?;
        Ok(ChunkHeader {
            start: u32::from_be_bytes([header[0], header[1], header[2], header[3]]),
            end: u32::from_be_bytes([header[4], header[5], header[6], header[7]]),
            checksum: header[8],
        })
    }

    pub fn encode(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut out = [0u8; CHUNK_HEADER_SIZE];
        out[..4].copy_from_slice(&self.start.to_be_bytes());
        out[4..8].copy_from_slice(&self.end.to_be_bytes());
        out[8] = self.checksum;
        out
    }
}

/// A decoded chunk borrowing its payload from the request body.
#[derive(Debug)]
pub struct Chunk<'a> {
    pub header: ChunkHeader,
    pub payload: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Splits a raw request body into header and payload and verifies the checksum.
    ///
    /// A body that is not strictly longer than the header is rejected, so an empty
    /// payload never reaches the staging area.
    pub fn parse(raw: &'a [u8]) -> Result<Self, AppError> {
        if raw.len() <= CHUNK_HEADER_SIZE {
            return Err(AppError::ChunkTooSmall);
        }
        let header = ChunkHeader::decode(raw)?;
        let payload = &raw[CHUNK_HEADER_SIZE..];

        let calculated = checksum(payload);
        if calculated != header.checksum {
            return Err(AppError::ChecksumMismatch {
                start: header.start,
                end: header.end,
                declared: header.checksum,
                calculated,
            });
        }
        Ok(Chunk { header, payload })
    }

    pub fn start(&self) -> u32 {
        self.header.start
    }

    pub fn end(&self) -> u32 {
        self.header.end
    }
}

/// Sum of all bytes modulo 256.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Builds a wire-ready chunk body. Used by clients and tests.
pub fn frame(start: u32, end: u32, payload: &[u8]) -> Vec<u8> {
    let header = ChunkHeader {
        start,
        end,
        checksum: checksum(payload),
    };
    let mut body = Vec::with_capacity(CHUNK_HEADER_SIZE + payload.len());
    body.extend_from_slice(&header.encode());
    body.extend_from_slice(payload);
    body
}
