//! CashTokens data and its wire prefix encoding.
//!
//! Token data rides inside an output's bytecode field: when the first
//! byte after the length prefix is `PREFIX_TOKEN` (0xef), a token prefix
//! precedes the locking bytecode. The prefix carries a 32-byte category,
//! a structure bitfield, an optional NFT commitment, and an optional
//! fungible amount.
//!
//! See <https://github.com/cashtokens/cashtokens>

use bch_primitives::util::{ByteReader, ByteWriter, CompactSize};

use crate::TransactionError;

/// Marker byte introducing a token prefix in an output's bytecode field.
pub const PREFIX_TOKEN: u8 = 0xef;

/// Maximum fungible token amount (2^63 - 1).
pub const MAX_FUNGIBLE_AMOUNT: u64 = 0x7fff_ffff_ffff_ffff;

// Structure bitfield flags (high nibble).
const STRUCTURE_RESERVED: u8 = 0x80;
const STRUCTURE_HAS_COMMITMENT: u8 = 0x40;
const STRUCTURE_HAS_NFT: u8 = 0x20;
const STRUCTURE_HAS_AMOUNT: u8 = 0x10;

/// The spending capability of a non-fungible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NftCapability {
    /// An immutable NFT: commitment cannot change when spent.
    #[default]
    None,
    /// A mutable NFT: the spending transaction may alter the commitment.
    Mutable,
    /// A minting NFT: the spending transaction may create new NFTs of
    /// the same category.
    Minting,
}

impl NftCapability {
    /// Return the capability nibble used in the structure bitfield.
    pub fn to_bits(self) -> u8 {
        match self {
            NftCapability::None => 0,
            NftCapability::Mutable => 1,
            NftCapability::Minting => 2,
        }
    }

    /// Parse a capability from the low nibble of the structure bitfield.
    ///
    /// # Arguments
    /// * `bits` - The capability nibble (0, 1, or 2).
    ///
    /// # Returns
    /// The capability, or an error for reserved values.
    pub fn from_bits(bits: u8) -> Result<Self, TransactionError> {
        match bits {
            0 => Ok(NftCapability::None),
            1 => Ok(NftCapability::Mutable),
            2 => Ok(NftCapability::Minting),
            other => Err(TransactionError::InvalidTokenData(format!(
                "reserved capability value {}",
                other
            ))),
        }
    }

    /// Return the canonical name of this capability.
    ///
    /// # Returns
    /// `"none"`, `"mutable"`, or `"minting"`.
    pub fn as_str(self) -> &'static str {
        match self {
            NftCapability::None => "none",
            NftCapability::Mutable => "mutable",
            NftCapability::Minting => "minting",
        }
    }

    /// Parse a capability from its canonical name.
    ///
    /// # Arguments
    /// * `s` - One of `"none"`, `"mutable"`, `"minting"`.
    ///
    /// # Returns
    /// The capability, or an error for any other string.
    pub fn from_str(s: &str) -> Result<Self, TransactionError> {
        match s {
            "none" => Ok(NftCapability::None),
            "mutable" => Ok(NftCapability::Mutable),
            "minting" => Ok(NftCapability::Minting),
            other => Err(TransactionError::InvalidTokenData(format!(
                "unknown capability {:?}",
                other
            ))),
        }
    }
}

/// The non-fungible portion of a token: capability plus commitment bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftData {
    /// The NFT's spending capability.
    pub capability: NftCapability,
    /// Opaque commitment bytes. Equality is byte-exact. May be empty.
    pub commitment: Vec<u8>,
}

/// Token data attached to a transaction output.
///
/// Absence of `TokenData` on an output implies absence of any NFT; the
/// fungible `amount` is zero when the prefix carries only an NFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    /// Fungible token amount. Zero when the token is NFT-only; at most
    /// `MAX_FUNGIBLE_AMOUNT` on the wire.
    pub amount: u64,
    /// The 32-byte token category. Opaque; equality is byte-exact.
    pub category: [u8; 32],
    /// Optional non-fungible token data.
    pub nft: Option<NftData>,
}

impl TokenData {
    /// Deserialize token data from a reader positioned just after the
    /// `PREFIX_TOKEN` marker byte.
    ///
    /// Validates the structure bitfield: the reserved bit must be clear,
    /// the capability nibble must be known, NFT-only flags require the
    /// NFT bit, a declared commitment must be non-empty, and a declared
    /// amount must be in `1..=MAX_FUNGIBLE_AMOUNT`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the category bytes.
    ///
    /// # Returns
    /// `Ok(TokenData)` on success, or a `TransactionError` for malformed
    /// prefixes.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let category_bytes = reader.read_bytes(32).map_err(|e| {
            TransactionError::SerializationError(format!("reading token category: {}", e))
        })?;
        let mut category = [0u8; 32];
        category.copy_from_slice(category_bytes);

        let bitfield = reader.read_u8().map_err(|e| {
            TransactionError::SerializationError(format!("reading token bitfield: {}", e))
        })?;

        if bitfield & STRUCTURE_RESERVED != 0 {
            return Err(TransactionError::InvalidTokenData(
                "reserved structure bit set".to_string(),
            ));
        }

        let has_commitment = bitfield & STRUCTURE_HAS_COMMITMENT != 0;
        let has_nft = bitfield & STRUCTURE_HAS_NFT != 0;
        let has_amount = bitfield & STRUCTURE_HAS_AMOUNT != 0;
        let capability = NftCapability::from_bits(bitfield & 0x0f)?;

        if !has_nft && (has_commitment || capability != NftCapability::None) {
            return Err(TransactionError::InvalidTokenData(
                "NFT fields declared without the NFT bit".to_string(),
            ));
        }
        if !has_nft && !has_amount {
            return Err(TransactionError::InvalidTokenData(
                "prefix encodes neither an amount nor an NFT".to_string(),
            ));
        }

        let commitment = if has_commitment {
            let len = reader.read_compact_size().map_err(|e| {
                TransactionError::SerializationError(format!("reading commitment length: {}", e))
            })?;
            if len.value() == 0 {
                return Err(TransactionError::InvalidTokenData(
                    "declared commitment is empty".to_string(),
                ));
            }
            reader
                .read_bytes(len.value() as usize)
                .map_err(|e| {
                    TransactionError::SerializationError(format!("reading commitment: {}", e))
                })?
                .to_vec()
        } else {
            Vec::new()
        };

        let amount = if has_amount {
            let amount = reader
                .read_compact_size()
                .map_err(|e| {
                    TransactionError::SerializationError(format!("reading token amount: {}", e))
                })?
                .value();
            if amount == 0 || amount > MAX_FUNGIBLE_AMOUNT {
                return Err(TransactionError::InvalidTokenData(format!(
                    "token amount {} out of range",
                    amount
                )));
            }
            amount
        } else {
            0
        };

        let nft = if has_nft {
            Some(NftData {
                capability,
                commitment,
            })
        } else {
            None
        };

        Ok(TokenData {
            amount,
            category,
            nft,
        })
    }

    /// Serialize this token data as a complete prefix, including the
    /// leading `PREFIX_TOKEN` marker.
    ///
    /// # Returns
    /// The prefix bytes, or a `TransactionError` if the data cannot be
    /// represented (zero-content token or out-of-range amount).
    pub fn to_prefix_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        if self.amount > MAX_FUNGIBLE_AMOUNT {
            return Err(TransactionError::InvalidTokenData(format!(
                "token amount {} out of range",
                self.amount
            )));
        }
        if self.amount == 0 && self.nft.is_none() {
            return Err(TransactionError::InvalidTokenData(
                "token data has neither an amount nor an NFT".to_string(),
            ));
        }

        let mut bitfield = 0u8;
        if self.amount > 0 {
            bitfield |= STRUCTURE_HAS_AMOUNT;
        }
        if let Some(nft) = &self.nft {
            bitfield |= STRUCTURE_HAS_NFT;
            bitfield |= nft.capability.to_bits();
            if !nft.commitment.is_empty() {
                bitfield |= STRUCTURE_HAS_COMMITMENT;
            }
        }

        let mut writer = ByteWriter::with_capacity(34);
        writer.write_u8(PREFIX_TOKEN);
        writer.write_bytes(&self.category);
        writer.write_u8(bitfield);
        if let Some(nft) = &self.nft {
            if !nft.commitment.is_empty() {
                writer.write_compact_size(CompactSize::from(nft.commitment.len()));
                writer.write_bytes(&nft.commitment);
            }
        }
        if self.amount > 0 {
            writer.write_compact_size(CompactSize(self.amount));
        }
        Ok(writer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(token: &TokenData) -> TokenData {
        let bytes = token.to_prefix_bytes().unwrap();
        assert_eq!(bytes[0], PREFIX_TOKEN);
        let mut reader = ByteReader::new(&bytes[1..]);
        let decoded = TokenData::read_from(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 0);
        decoded
    }

    #[test]
    fn test_amount_only_prefix() {
        let token = TokenData {
            amount: 100,
            category: [0xaa; 32],
            nft: None,
        };
        let bytes = token.to_prefix_bytes().unwrap();
        // marker + category + bitfield(HAS_AMOUNT) + amount
        assert_eq!(bytes.len(), 1 + 32 + 1 + 1);
        assert_eq!(bytes[33], 0x10);
        assert_eq!(bytes[34], 100);
        assert_eq!(roundtrip(&token), token);
    }

    #[test]
    fn test_minting_nft_without_commitment() {
        let token = TokenData {
            amount: 0,
            category: [0x01; 32],
            nft: Some(NftData {
                capability: NftCapability::Minting,
                commitment: Vec::new(),
            }),
        };
        let bytes = token.to_prefix_bytes().unwrap();
        assert_eq!(bytes[33], 0x22);
        assert_eq!(roundtrip(&token), token);
    }

    #[test]
    fn test_mutable_nft_with_commitment_and_amount() {
        let token = TokenData {
            amount: MAX_FUNGIBLE_AMOUNT,
            category: [0xff; 32],
            nft: Some(NftData {
                capability: NftCapability::Mutable,
                commitment: vec![0x00, 0xff, 0x7f],
            }),
        };
        let bytes = token.to_prefix_bytes().unwrap();
        assert_eq!(bytes[33], 0x71);
        assert_eq!(roundtrip(&token), token);
    }

    #[test]
    fn test_empty_token_rejected() {
        let token = TokenData {
            amount: 0,
            category: [0; 32],
            nft: None,
        };
        assert!(token.to_prefix_bytes().is_err());
    }

    #[test]
    fn test_amount_out_of_range_rejected() {
        let token = TokenData {
            amount: MAX_FUNGIBLE_AMOUNT + 1,
            category: [0; 32],
            nft: None,
        };
        assert!(token.to_prefix_bytes().is_err());
    }

    #[test]
    fn test_reserved_bit_rejected() {
        let mut bytes = vec![0u8; 33];
        bytes[32] = 0x90; // reserved | amount
        let mut reader = ByteReader::new(&bytes);
        assert!(TokenData::read_from(&mut reader).is_err());
    }

    #[test]
    fn test_capability_without_nft_bit_rejected() {
        let mut bytes = vec![0u8; 34];
        bytes[32] = 0x11; // amount | capability=mutable, no NFT bit
        bytes[33] = 1;
        let mut reader = ByteReader::new(&bytes);
        assert!(TokenData::read_from(&mut reader).is_err());
    }

    #[test]
    fn test_capability_names() {
        for cap in [
            NftCapability::None,
            NftCapability::Mutable,
            NftCapability::Minting,
        ] {
            assert_eq!(NftCapability::from_str(cap.as_str()).unwrap(), cap);
        }
        assert!(NftCapability::from_str("sealed").is_err());
    }
}
