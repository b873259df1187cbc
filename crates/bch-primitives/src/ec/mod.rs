//! Elliptic curve operations on secp256k1.
//!
//! Provides private keys, public keys, and ECDSA signatures built on the
//! k256 crate.

mod private_key;
mod public_key;
mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
