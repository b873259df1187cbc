//! Unlocking templates for common output types.
//!
//! Provides the `UnlockingTemplate` trait and a P2PKH implementation
//! used by the finalizer to resolve the unlocking bytecode of unsigned
//! inputs.

pub mod p2pkh;

use std::fmt;

use crate::output::SourceOutput;
use crate::transaction::Transaction;

/// A diagnostic produced when a template cannot resolve an input.
///
/// Diagnostics are collected per failing input so that a finalization
/// attempt reports every problem at once instead of the first one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDiagnostic {
    /// Index of the input that could not be resolved.
    pub input_index: usize,
    /// Human-readable description of the failure.
    pub message: String,
}

impl fmt::Display for TemplateDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input {}: {}", self.input_index, self.message)
    }
}

/// Trait for templates that produce unlocking bytecode.
///
/// Any signing strategy (P2PKH, custom contracts) should implement this
/// trait.  The `sign` method receives the full transaction, the input
/// index, and the output being spent; it computes the appropriate
/// signature hash, signs it, and returns the unlocking bytecode.
pub trait UnlockingTemplate {
    /// Produce unlocking bytecode for the given input.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed.
    /// * `input_index` - The index of the input to sign.
    /// * `source` - The output being spent by this input.
    ///
    /// # Returns
    /// `Ok(Vec<u8>)` containing the unlocking bytecode, or a
    /// `TemplateDiagnostic` describing why the input could not be
    /// resolved.
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        source: &SourceOutput,
    ) -> Result<Vec<u8>, TemplateDiagnostic>;

    /// Estimate the byte length of the unlocking bytecode.
    ///
    /// Used for fee calculation before the actual signature is computed.
    ///
    /// # Returns
    /// The estimated byte length.
    fn estimate_length(&self) -> usize;
}

/// Append a minimally-encoded data push to `bytecode`.
///
/// Uses a direct push for data up to 75 bytes, then `OP_PUSHDATA1`,
/// `OP_PUSHDATA2`, and `OP_PUSHDATA4` as the length grows.
///
/// # Arguments
/// * `bytecode` - The bytecode buffer to append to.
/// * `data` - The bytes to push.
pub fn append_push_data(bytecode: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=75 => {
            bytecode.push(data.len() as u8);
        }
        76..=255 => {
            bytecode.push(0x4c); // OP_PUSHDATA1
            bytecode.push(data.len() as u8);
        }
        256..=65535 => {
            bytecode.push(0x4d); // OP_PUSHDATA2
            bytecode.extend_from_slice(&(data.len() as u16).to_le_bytes());
        }
        _ => {
            bytecode.push(0x4e); // OP_PUSHDATA4
            bytecode.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
    }
    bytecode.extend_from_slice(data);
}
