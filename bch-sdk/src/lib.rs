#![deny(missing_docs)]

//! BCH SDK - Complete SDK.
//!
//! Re-exports all BCH SDK components for convenient single-crate usage.

pub use bch_codec as codec;
pub use bch_primitives as primitives;
pub use bch_transaction as transaction;
