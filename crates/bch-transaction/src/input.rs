//! Transaction input referencing a previous output.
//!
//! Carries the outpoint (source transaction ID and output index), the
//! unlocking bytecode, and the sequence number. An empty unlocking
//! bytecode marks the input as unsigned; the finalizer fills it in and
//! never touches a non-empty one.

use bch_primitives::util::{ByteReader, ByteWriter, CompactSize};

use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a BCH transaction.
///
/// Each input references an output from a previous transaction by its
/// transaction ID (`outpoint_txid`, internal byte order) and output
/// index (`outpoint_index`). The `unlocking_bytecode` supplies the data
/// required to satisfy the referenced output's locking bytecode; an
/// empty value means the input has not yet been signed.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | outpoint_txid      | 32 bytes (LE)    |
/// | outpoint_index     | 4 bytes (LE)     |
/// | bytecode length    | CompactSize      |
/// | unlocking_bytecode | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// The 32-byte transaction ID of the output being spent, in internal
    /// (little-endian) byte order.
    pub outpoint_txid: [u8; 32],

    /// Index of the output within the source transaction.
    pub outpoint_index: u32,

    /// Sequence number. Defaults to `0xFFFFFFFF` (finalized).
    pub sequence_number: u32,

    /// The unlocking bytecode proving authorization to spend.
    /// Empty when the input has not yet been signed.
    pub unlocking_bytecode: Vec<u8>,
}

impl TransactionInput {
    /// Create a new unsigned `TransactionInput` with default values.
    ///
    /// # Returns
    /// An input with a zeroed outpoint, finalized sequence number, and
    /// empty unlocking bytecode.
    pub fn new() -> Self {
        TransactionInput {
            outpoint_txid: [0u8; 32],
            outpoint_index: 0,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_bytecode: Vec::new(),
        }
    }

    /// Check whether this input carries unlocking bytecode.
    ///
    /// # Returns
    /// `true` if the unlocking bytecode is non-empty.
    pub fn is_signed(&self) -> bool {
        !self.unlocking_bytecode.is_empty()
    }

    /// Deserialize a `TransactionInput` from a `ByteReader`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// `Ok(TransactionInput)` on success, or a `TransactionError` if the
    /// data is truncated or malformed.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid_bytes = reader.read_bytes(32).map_err(|e| {
            TransactionError::SerializationError(format!("reading outpoint txid: {}", e))
        })?;
        let mut outpoint_txid = [0u8; 32];
        outpoint_txid.copy_from_slice(txid_bytes);

        let outpoint_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading outpoint index: {}", e))
        })?;

        let bytecode_len = reader.read_compact_size().map_err(|e| {
            TransactionError::SerializationError(format!("reading bytecode length: {}", e))
        })?;

        let unlocking_bytecode = reader
            .read_bytes(bytecode_len.value() as usize)
            .map_err(|e| {
                TransactionError::SerializationError(format!("reading unlocking bytecode: {}", e))
            })?
            .to_vec();

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            outpoint_txid,
            outpoint_index,
            sequence_number,
            unlocking_bytecode,
        })
    }

    /// Serialize this `TransactionInput` into a `ByteWriter`.
    ///
    /// # Arguments
    /// * `writer` - The writer to append serialized bytes to.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.outpoint_txid);
        writer.write_u32_le(self.outpoint_index);
        writer.write_compact_size(CompactSize::from(self.unlocking_bytecode.len()));
        writer.write_bytes(&self.unlocking_bytecode);
        writer.write_u32_le(self.sequence_number);
    }
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self::new()
    }
}
