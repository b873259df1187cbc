//! Transaction outputs and source outputs.
//!
//! `TransactionOutput` is the on-wire shape: satoshi value, locking
//! bytecode, and optional token data serialized as a prefix inside the
//! bytecode field. `SourceOutput` is the signing context an input needs:
//! the value and token data of the output it spends, plus an optional
//! derived address.

use bch_primitives::util::{ByteReader, ByteWriter, CompactSize};

use crate::token::{TokenData, PREFIX_TOKEN};
use crate::TransactionError;

/// A single output in a BCH transaction.
///
/// # Wire format
///
/// | Field            | Size                               |
/// |------------------|------------------------------------|
/// | value_satoshis   | 8 bytes (LE)                       |
/// | bytecode length  | CompactSize (prefix + bytecode)    |
/// | token prefix     | variable, present iff token is set |
/// | locking_bytecode | variable                           |
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TransactionOutput {
    /// The number of satoshis locked by this output.
    pub value_satoshis: u64,

    /// The locking bytecode defining the spending conditions.
    pub locking_bytecode: Vec<u8>,

    /// Optional CashTokens data, serialized as a prefix on the wire.
    pub token: Option<TokenData>,
}

impl TransactionOutput {
    /// Create a new `TransactionOutput` with zero satoshis, empty
    /// bytecode, and no token.
    ///
    /// # Returns
    /// A default `TransactionOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialize a `TransactionOutput` from a `ByteReader`.
    ///
    /// Reads the 8-byte LE value and the length-prefixed bytecode field;
    /// when the field starts with `PREFIX_TOKEN`, the token prefix is
    /// parsed and the remainder becomes the locking bytecode.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded output.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)` on success, or a `TransactionError` if the
    /// data is truncated or the token prefix is malformed.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value_satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshi value: {}", e))
        })?;

        let field_len = reader.read_compact_size().map_err(|e| {
            TransactionError::SerializationError(format!("reading bytecode length: {}", e))
        })?;

        let field = reader.read_bytes(field_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading bytecode field: {}", e))
        })?;

        let (token, locking_bytecode) = if field.first() == Some(&PREFIX_TOKEN) {
            let mut sub = ByteReader::new(&field[1..]);
            let token = TokenData::read_from(&mut sub)?;
            (Some(token), sub.read_remaining().to_vec())
        } else {
            (None, field.to_vec())
        };

        Ok(TransactionOutput {
            value_satoshis,
            locking_bytecode,
            token,
        })
    }

    /// Serialize this `TransactionOutput` into a `ByteWriter`.
    ///
    /// # Arguments
    /// * `writer` - The writer to append serialized bytes to.
    ///
    /// # Returns
    /// `Ok(())` on success, or a `TransactionError` if the token data
    /// cannot be encoded.
    pub fn write_to(&self, writer: &mut ByteWriter) -> Result<(), TransactionError> {
        writer.write_u64_le(self.value_satoshis);

        let prefix = match &self.token {
            Some(token) => token.to_prefix_bytes()?,
            None => Vec::new(),
        };
        writer.write_compact_size(CompactSize::from(
            prefix.len() + self.locking_bytecode.len(),
        ));
        writer.write_bytes(&prefix);
        writer.write_bytes(&self.locking_bytecode);
        Ok(())
    }

    /// Serialize this output to a byte vector.
    ///
    /// # Returns
    /// The wire-format bytes, or a `TransactionError` if the token data
    /// cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut writer = ByteWriter::new();
        self.write_to(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

/// The context required to sign or interpret a transaction input:
/// the output it spends.
///
/// Source outputs are indexed positionally; position `i` describes the
/// output spent by input `i`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SourceOutput {
    /// Satoshi value of the spent output.
    pub value_satoshis: u64,

    /// Human-readable address derived from the spent output's locking
    /// bytecode. Informational only; never authoritative.
    pub cash_address: Option<String>,

    /// Token data carried by the spent output, if any.
    pub token: Option<TokenData>,
}

impl SourceOutput {
    /// Serialize the spent output's token prefix, if present.
    ///
    /// Used by signature hash computation, which commits to the spent
    /// output's token data.
    ///
    /// # Returns
    /// The prefix bytes (empty when no token), or a `TransactionError`
    /// if the token data cannot be encoded.
    pub fn token_prefix_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        match &self.token {
            Some(token) => token.to_prefix_bytes(),
            None => Ok(Vec::new()),
        }
    }
}
