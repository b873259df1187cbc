//! BCH SDK - Transaction building, template signing, and serialization.
//!
//! Provides the Transaction type with CashTokens-aware inputs and
//! outputs, signature hash computation, the P2PKH unlocking template,
//! and the finalizer that resolves unsigned inputs of a transaction
//! skeleton into broadcast-ready bytes.

pub mod finalize;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod token;
pub mod transaction;

mod error;
pub use error::TransactionError;
pub use finalize::{extract_source_outputs, finalize_transaction};
pub use input::TransactionInput;
pub use output::{SourceOutput, TransactionOutput};
pub use token::{NftCapability, NftData, TokenData};
pub use transaction::Transaction;

#[cfg(test)]
mod tests;
