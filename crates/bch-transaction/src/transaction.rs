//! The `Transaction` type and its wire serialization.

use bch_primitives::hash::sha256d;
use bch_primitives::util::{ByteReader, ByteWriter, CompactSize};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// A Bitcoin Cash transaction.
///
/// # Wire format
///
/// | Field     | Size                      |
/// |-----------|---------------------------|
/// | version   | 4 bytes (LE)              |
/// | n inputs  | CompactSize               |
/// | inputs    | variable                  |
/// | n outputs | CompactSize               |
/// | outputs   | variable                  |
/// | lock_time | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// The inputs spending previous outputs.
    pub inputs: Vec<TransactionInput>,
    /// The outputs created by this transaction.
    pub outputs: Vec<TransactionOutput>,
    /// Earliest time or block height at which the transaction is valid.
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new empty `Transaction` with version 2 and no lock time.
    ///
    /// # Returns
    /// A `Transaction` with no inputs or outputs.
    pub fn new() -> Self {
        Transaction {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Deserialize a `Transaction` from raw bytes.
    ///
    /// Trailing bytes after the encoded transaction are rejected.
    ///
    /// # Arguments
    /// * `bytes` - The complete wire-format transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the data
    /// is truncated, malformed, or has trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "{} trailing byte(s) after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a `Transaction` from a hex string.
    ///
    /// # Arguments
    /// * `hex_str` - Hex encoding of the wire-format transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the hex
    /// or the encoded transaction is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Deserialize a `Transaction` from a `ByteReader`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded
    ///   transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `TransactionError` if the data
    /// is truncated or malformed.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = reader.read_compact_size().map_err(|e| {
            TransactionError::SerializationError(format!("reading input count: {}", e))
        })?;
        let mut inputs = Vec::with_capacity(input_count.value() as usize);
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_compact_size().map_err(|e| {
            TransactionError::SerializationError(format!("reading output count: {}", e))
        })?;
        let mut outputs = Vec::with_capacity(output_count.value() as usize);
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Serialize this `Transaction` to wire-format bytes.
    ///
    /// # Returns
    /// The encoded transaction, or a `TransactionError` if an output's
    /// token data cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(self.version);
        writer.write_compact_size(CompactSize::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }
        writer.write_compact_size(CompactSize::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer)?;
        }
        writer.write_u32_le(self.lock_time);
        Ok(writer.into_bytes())
    }

    /// Serialize this `Transaction` to a lowercase hex string.
    ///
    /// # Returns
    /// The hex encoding, or a `TransactionError` if serialization fails.
    pub fn to_hex(&self) -> Result<String, TransactionError> {
        Ok(hex::encode(self.to_bytes()?))
    }

    /// Compute the transaction ID.
    ///
    /// The ID is the double SHA-256 of the serialized transaction, in
    /// internal (little-endian) byte order.
    ///
    /// # Returns
    /// The 32-byte transaction ID, or a `TransactionError` if
    /// serialization fails.
    pub fn tx_id(&self) -> Result<[u8; 32], TransactionError> {
        Ok(sha256d(&self.to_bytes()?))
    }

    /// Compute the transaction ID as a hex string in display
    /// (big-endian) byte order.
    ///
    /// # Returns
    /// The 64-character hex ID, or a `TransactionError` if serialization
    /// fails.
    pub fn tx_id_hex(&self) -> Result<String, TransactionError> {
        let mut id = self.tx_id()?;
        id.reverse();
        Ok(hex::encode(id))
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
