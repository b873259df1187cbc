//! Utility types for wire serialization.
//!
//! Provides CompactSize encoding/decoding and the `ByteReader` /
//! `ByteWriter` cursor types used when reading and writing Bitcoin Cash
//! protocol binary data.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// CompactSize
// ---------------------------------------------------------------------------

/// A Bitcoin protocol variable-length integer (CompactSize).
///
/// Used in transaction data to indicate the number of upcoming fields or
/// the length of an upcoming field. The encoding uses 1, 3, 5, or 9 bytes
/// depending on the magnitude of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSize(pub u64);

impl CompactSize {
    /// Return the wire-format byte length of this CompactSize.
    ///
    /// # Returns
    /// 1, 3, 5, or 9 depending on the value.
    pub fn encoded_len(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode the CompactSize into a new byte vector.
    ///
    /// # Returns
    /// A `Vec<u8>` of 1, 3, 5, or 9 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        match self.encoded_len() {
            1 => vec![v as u8],
            3 => {
                let mut buf = vec![0xfd];
                buf.extend_from_slice(&(v as u16).to_le_bytes());
                buf
            }
            5 => {
                let mut buf = vec![0xfe];
                buf.extend_from_slice(&(v as u32).to_le_bytes());
                buf
            }
            _ => {
                let mut buf = vec![0xff];
                buf.extend_from_slice(&v.to_le_bytes());
                buf
            }
        }
    }

    /// Return the underlying u64 value.
    ///
    /// # Returns
    /// The integer value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for CompactSize {
    fn from(v: u64) -> Self {
        CompactSize(v)
    }
}

impl From<usize> for CompactSize {
    fn from(v: usize) -> Self {
        CompactSize(v as u64)
    }
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for protocol binary data.
///
/// Wraps a byte slice and maintains a read position, providing methods
/// to read fixed-size little-endian integers and CompactSize values.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader over the given byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from.
    ///
    /// # Returns
    /// A `ByteReader` positioned at the start of the data.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.data.len() - self.pos {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read all remaining bytes and advance to the end.
    ///
    /// # Returns
    /// A byte slice of whatever data is left (possibly empty).
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    /// Read a single byte and advance the position.
    ///
    /// # Returns
    /// The byte value, or an error if no data remains.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u16 and advance the position by 2 bytes.
    ///
    /// # Returns
    /// The decoded u16, or an error if insufficient data.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32 and advance the position by 4 bytes.
    ///
    /// # Returns
    /// The decoded u32, or an error if insufficient data.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian u64 and advance the position by 8 bytes.
    ///
    /// # Returns
    /// The decoded u64, or an error if insufficient data.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a CompactSize and advance the position accordingly.
    ///
    /// # Returns
    /// The decoded `CompactSize`, or an error if insufficient data.
    pub fn read_compact_size(&mut self) -> Result<CompactSize, PrimitivesError> {
        match self.read_u8()? {
            0xff => Ok(CompactSize(self.read_u64_le()?)),
            0xfe => Ok(CompactSize(self.read_u32_le()? as u64)),
            0xfd => Ok(CompactSize(self.read_u16_le()? as u64)),
            b => Ok(CompactSize(b as u64)),
        }
    }

    /// Return the number of bytes remaining.
    ///
    /// # Returns
    /// The count of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer for protocol binary data.
///
/// Wraps a `Vec<u8>` and provides methods to append fixed-size
/// little-endian integers and CompactSize values.
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    ///
    /// # Returns
    /// A `ByteWriter` with an empty internal buffer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    ///
    /// # Returns
    /// A `ByteWriter` with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes to the buffer.
    ///
    /// # Arguments
    /// * `bytes` - The bytes to append.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte to the buffer.
    ///
    /// # Arguments
    /// * `val` - The byte value.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u32 (4 bytes) to the buffer.
    ///
    /// # Arguments
    /// * `val` - The u32 value.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64 (8 bytes) to the buffer.
    ///
    /// # Arguments
    /// * `val` - The u64 value.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a CompactSize to the buffer.
    ///
    /// # Arguments
    /// * `size` - The CompactSize value to encode and append.
    pub fn write_compact_size(&mut self, size: CompactSize) {
        self.buf.extend_from_slice(&size.to_bytes());
    }

    /// Consume the writer and return the accumulated bytes.
    ///
    /// # Returns
    /// The internal byte buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    ///
    /// # Returns
    /// A byte slice of the written data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    ///
    /// # Returns
    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    ///
    /// # Returns
    /// `true` if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
