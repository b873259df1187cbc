//! secp256k1 public key.
//!
//! Wraps a k256 verifying key and provides SEC1 serialization, Hash160
//! computation, CashAddr derivation, and signature verification.

use k256::ecdsa::VerifyingKey;

use crate::cashaddr::{self, AddressType, Network};
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key encoding.
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key encoding.
const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a public key from SEC1 bytes (compressed or uncompressed).
    ///
    /// # Arguments
    /// * `bytes` - A 33-byte compressed or 65-byte uncompressed encoding.
    ///
    /// # Returns
    /// `Ok(PublicKey)` if the bytes encode a point on the curve, or an
    /// error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPRESSED_LEN && bytes.len() != UNCOMPRESSED_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "invalid encoding length {}",
                bytes.len()
            )));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a public key from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - Hex encoding of a compressed or uncompressed key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error for invalid hex or point.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize as a 33-byte compressed SEC1 encoding.
    ///
    /// # Returns
    /// The compressed public key bytes.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize as a 65-byte uncompressed SEC1 encoding.
    ///
    /// # Returns
    /// The uncompressed public key bytes.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the compressed encoding as a lowercase hex string.
    ///
    /// # Returns
    /// A 66-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Compute the Hash160 of the compressed encoding.
    ///
    /// This is the public key hash committed to by P2PKH locking bytecode.
    ///
    /// # Returns
    /// A 20-byte Hash160 digest.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Derive the P2PKH CashAddr for this public key.
    ///
    /// # Arguments
    /// * `network` - The network selecting the address prefix.
    ///
    /// # Returns
    /// The CashAddr string, or an error if encoding fails.
    pub fn to_address(&self, network: Network) -> Result<String, PrimitivesError> {
        cashaddr::encode(network, AddressType::P2pkh, &self.hash160())
    }

    /// Verify an ECDSA signature over a message hash.
    ///
    /// # Arguments
    /// * `hash` - The message hash that was signed.
    /// * `sig` - The signature to verify.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    /// Construct from a k256 `VerifyingKey`.
    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        PublicKey { inner: *key }
    }

    /// Access the underlying k256 `VerifyingKey`.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compressed encoding of the secp256k1 generator point.
    const GENERATOR_HEX: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[test]
    fn test_parse_and_serialize() {
        let key = PublicKey::from_hex(GENERATOR_HEX).unwrap();
        assert_eq!(key.to_hex(), GENERATOR_HEX);

        let uncompressed = key.to_uncompressed();
        let reparsed = PublicKey::from_bytes(&uncompressed).unwrap();
        assert_eq!(key, reparsed);
    }

    #[test]
    fn test_hash160() {
        let key = PublicKey::from_hex(GENERATOR_HEX).unwrap();
        assert_eq!(
            hex::encode(key.hash160()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }

    #[test]
    fn test_address_prefix_per_network() {
        let key = PublicKey::from_hex(GENERATOR_HEX).unwrap();
        assert!(key
            .to_address(Network::Mainnet)
            .unwrap()
            .starts_with("bitcoincash:q"));
        assert!(key
            .to_address(Network::Testnet)
            .unwrap()
            .starts_with("bchtest:q"));
    }

    #[test]
    fn test_invalid_encodings_rejected() {
        assert!(PublicKey::from_bytes(&[0u8; 33]).is_err());
        assert!(PublicKey::from_bytes(&[2u8; 10]).is_err());
        assert!(PublicKey::from_hex("02zz").is_err());
    }
}
