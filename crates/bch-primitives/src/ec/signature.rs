//! ECDSA signatures over secp256k1.
//!
//! Signing uses deterministic RFC6979 nonces and normalizes to low-S
//! form. DER serialization is what transaction unlocking bytecode
//! carries (with a trailing sighash byte appended by the caller).

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: k256::ecdsa::Signature,
}

impl Signature {
    /// Sign a message hash with the given private key.
    ///
    /// Uses deterministic RFC6979 nonces so the same key and hash always
    /// produce the same signature. The result is normalized to low-S form.
    ///
    /// # Arguments
    /// * `hash` - The pre-computed message hash (typically 32 bytes).
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let sig: k256::ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(Signature { inner: sig })
    }

    /// Parse a signature from DER bytes.
    ///
    /// # Arguments
    /// * `bytes` - A DER-encoded ECDSA signature.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error for malformed DER.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = k256::ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Serialize the signature as DER bytes.
    ///
    /// # Returns
    /// The DER encoding (70-72 bytes for low-S signatures).
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    /// Verify this signature over a message hash.
    ///
    /// # Arguments
    /// * `hash` - The message hash that was signed.
    /// * `pub_key` - The public key to verify against.
    ///
    /// # Returns
    /// `true` if the signature is valid.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        pub_key
            .verifying_key()
            .verify_prehash(hash, &self.inner)
            .is_ok()
    }
}
