//! Transaction finalization.
//!
//! Takes a transaction skeleton in which some inputs carry unlocking
//! bytecode and others are empty, resolves every empty input with the
//! P2PKH unlocking template for a single signing key, and returns the
//! broadcast-ready bytes.  The operation is pure (the skeleton is never
//! mutated) and atomic: if any input fails to resolve, no result is
//! produced and every failure is reported.

use bch_primitives::cashaddr::{self, AddressType, Network};
use bch_primitives::ec::PrivateKey;

use crate::output::SourceOutput;
use crate::template::p2pkh;
use crate::template::UnlockingTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Resolve all unsigned inputs of a transaction skeleton and serialize
/// the result.
///
/// Inputs that already carry unlocking bytecode are left byte-for-byte
/// untouched, so feeding a fully-signed transaction back through is a
/// no-op on its inputs.  Empty inputs are resolved with the P2PKH
/// template for `signing_key`; the signature commits to the matching
/// source output's value and token data.
///
/// # Arguments
/// * `tx` - The transaction skeleton. Not mutated.
/// * `sources` - The outputs spent by the inputs, positionally aligned:
///   `sources[i]` describes the output spent by input `i`.
/// * `signing_key` - The 32-byte secp256k1 private key to sign with.
///
/// # Returns
/// The serialized, fully-signed transaction bytes.
///
/// # Errors
/// * `ShapeMismatch` when `sources.len() != tx.inputs.len()`.
/// * `InvalidKey` when `signing_key` is not a valid scalar.
/// * `TemplateResolution` carrying one diagnostic per failing input
///   when any input cannot be resolved; no partial result is produced.
pub fn finalize_transaction(
    tx: &Transaction,
    sources: &[SourceOutput],
    signing_key: &[u8],
) -> Result<Vec<u8>, TransactionError> {
    if sources.len() != tx.inputs.len() {
        return Err(TransactionError::ShapeMismatch {
            inputs: tx.inputs.len(),
            sources: sources.len(),
        });
    }

    let private_key =
        PrivateKey::from_bytes(signing_key).map_err(|e| TransactionError::InvalidKey(e.to_string()))?;
    let unlocker = p2pkh::unlock(private_key, None);

    let mut signed = tx.clone();
    let mut diagnostics = Vec::new();

    for (index, input) in tx.inputs.iter().enumerate() {
        if input.is_signed() {
            continue;
        }
        match unlocker.sign(tx, index, &sources[index]) {
            Ok(bytecode) => signed.inputs[index].unlocking_bytecode = bytecode,
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    if !diagnostics.is_empty() {
        return Err(TransactionError::TemplateResolution(diagnostics));
    }

    signed.to_bytes()
}

/// Derive source outputs from a transaction's own outputs.
///
/// Convenience for chaining transactions: the outputs created by one
/// transaction become the source outputs of the next.  Addresses are
/// derived from standard P2PKH and P2SH locking bytecode patterns;
/// non-standard bytecode yields no address.
///
/// # Arguments
/// * `tx` - The transaction whose outputs to convert.
/// * `network` - The network used for address encoding.
///
/// # Returns
/// One `SourceOutput` per transaction output, in order.
pub fn extract_source_outputs(tx: &Transaction, network: Network) -> Vec<SourceOutput> {
    tx.outputs
        .iter()
        .map(|output| SourceOutput {
            value_satoshis: output.value_satoshis,
            cash_address: locking_bytecode_to_address(&output.locking_bytecode, network),
            token: output.token.clone(),
        })
        .collect()
}

/// Derive a CashAddr from standard locking bytecode.
///
/// Recognizes the 25-byte P2PKH pattern (`OP_DUP OP_HASH160 <20>
/// OP_EQUALVERIFY OP_CHECKSIG`) and the 23-byte P2SH pattern
/// (`OP_HASH160 <20> OP_EQUAL`).
///
/// # Arguments
/// * `bytecode` - The locking bytecode to inspect.
/// * `network` - The network used for address encoding.
///
/// # Returns
/// `Some(address)` for recognized patterns, `None` otherwise.
pub fn locking_bytecode_to_address(bytecode: &[u8], network: Network) -> Option<String> {
    let (addr_type, hash) = if bytecode.len() == 25
        && bytecode[0] == 0x76
        && bytecode[1] == 0xa9
        && bytecode[2] == 0x14
        && bytecode[23] == 0x88
        && bytecode[24] == 0xac
    {
        (AddressType::P2pkh, &bytecode[3..23])
    } else if bytecode.len() == 23
        && bytecode[0] == 0xa9
        && bytecode[1] == 0x14
        && bytecode[22] == 0x87
    {
        (AddressType::P2sh, &bytecode[2..22])
    } else {
        return None;
    };
    cashaddr::encode(network, addr_type, hash).ok()
}
