//! secp256k1 private key with Bitcoin Cash specific functionality.
//!
//! Wraps a k256 signing key and adds WIF encoding for the BCH networks,
//! hex-secret derivation, and ECDSA signing.

use k256::ecdsa::SigningKey;
use num_bigint::BigUint;
use rand::rngs::OsRng;

use crate::base58;
use crate::cashaddr::Network;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::hash::sha256;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// Hex-secret reduction modulus: one less than the secp256k1 group order.
const SECRET_MODULUS_HEX: &[u8] =
    b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364140";

/// A secp256k1 private key for signing transaction inputs.
///
/// Wraps a k256 `SigningKey` and provides WIF serialization for the BCH
/// networks, address derivation, and deterministic ECDSA signing.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    ///
    /// # Returns
    /// A new randomly generated `PrivateKey`.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid non-zero scalar on
    /// secp256k1, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the hex or scalar is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Derive a private key from an arbitrary hex-encoded secret.
    ///
    /// Hashes the decoded secret with SHA-256 and reduces the digest
    /// modulo `n - 1` (where `n` is the secp256k1 group order), yielding
    /// a stable scalar for any input secret.
    ///
    /// # Arguments
    /// * `secret_hex` - Hex-encoded secret material.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the hex is invalid or
    /// the reduced scalar is zero.
    pub fn from_hex_secret(secret_hex: &str) -> Result<Self, PrimitivesError> {
        let secret = hex::decode(secret_hex)?;
        let digest = sha256(&secret);

        let modulus = BigUint::parse_bytes(SECRET_MODULUS_HEX, 16)
            .expect("modulus constant is valid hex");
        let scalar = BigUint::from_bytes_be(&digest) % modulus;

        let scalar_bytes = scalar.to_bytes_be();
        let mut key = [0u8; PRIVATE_KEY_BYTES_LEN];
        key[PRIVATE_KEY_BYTES_LEN - scalar_bytes.len()..].copy_from_slice(&scalar_bytes);
        Self::from_bytes(&key)
    }

    /// Create a private key from a WIF (Wallet Import Format) string.
    ///
    /// Decodes the Base58Check-encoded string, validates the checksum,
    /// and extracts the 32-byte private key scalar.
    ///
    /// # Arguments
    /// * `wif` - A Base58Check-encoded WIF string (compressed or uncompressed).
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the WIF is malformed
    /// or the checksum fails.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let decoded = base58::check_decode(wif)
            .map_err(|e| PrimitivesError::InvalidWif(e.to_string()))?;

        // 1 byte prefix + 32 byte key [+ 1 byte compression flag]
        match decoded.len() {
            34 => {
                if decoded[33] != COMPRESS_MAGIC {
                    return Err(PrimitivesError::InvalidWif(
                        "invalid compression flag".to_string(),
                    ));
                }
            }
            33 => {}
            other => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    other
                )));
            }
        }

        Self::from_bytes(&decoded[1..1 + PRIVATE_KEY_BYTES_LEN])
    }

    /// Encode the private key as a WIF string for the given network.
    ///
    /// Always encodes for compressed public key format.
    ///
    /// # Arguments
    /// * `network` - The network selecting the WIF version byte.
    ///
    /// # Returns
    /// A Base58Check-encoded WIF string.
    pub fn to_wif(&self, network: Network) -> String {
        let key_bytes = self.to_bytes();
        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN + 1);
        payload.push(network.wif_prefix());
        payload.extend_from_slice(&key_bytes);
        payload.push(COMPRESS_MAGIC);
        base58::check_encode(&payload)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    ///
    /// # Returns
    /// A 32-byte array containing the private key scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    ///
    /// # Returns
    /// A 64-character hex string representing the 32-byte scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key for this private key.
    ///
    /// # Returns
    /// The `PublicKey` corresponding to this private key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.inner.verifying_key())
    }

    /// Sign a message hash using deterministic RFC6979 nonces.
    ///
    /// The input should be a pre-computed 32-byte hash. Produces a low-S
    /// normalized signature.
    ///
    /// # Arguments
    /// * `hash` - The message hash to sign.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Access the underlying k256 `SigningKey`.
    ///
    /// # Returns
    /// A reference to the inner `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        // Overwrite the scalar's byte representation with zeros.
        let mut bytes = self.inner.to_bytes();
        bytes.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}
