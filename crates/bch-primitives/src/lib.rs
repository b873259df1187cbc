//! BCH SDK primitives - keys, hashes, and encodings.
//!
//! Provides secp256k1 key handling, the hash functions used by the
//! Bitcoin Cash protocol, Base58Check/WIF, CashAddr encoding, and the
//! byte reader/writer used for wire serialization.

pub mod base58;
pub mod cashaddr;
pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
