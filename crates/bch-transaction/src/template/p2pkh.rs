//! Pay-to-Public-Key-Hash (P2PKH) unlocking template.
//!
//! Creates standard P2PKH locking bytecode (`OP_DUP OP_HASH160 <hash>
//! OP_EQUALVERIFY OP_CHECKSIG`) and unlocking bytecode (`<sig> <pubkey>`).

use bch_primitives::ec::PrivateKey;

use crate::output::SourceOutput;
use crate::sighash::{signature_hash, SIGHASH_ALL_FORKID};
use crate::template::{append_push_data, TemplateDiagnostic, UnlockingTemplate};
use crate::transaction::Transaction;

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_DATA_20: u8 = 0x14;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

/// Create P2PKH locking bytecode from a 20-byte public key hash.
///
/// Produces: `OP_DUP OP_HASH160 <20-byte pubkey hash> OP_EQUALVERIFY OP_CHECKSIG`
///
/// # Arguments
/// * `public_key_hash` - The HASH160 of the public key to lock to.
///
/// # Returns
/// The 25-byte P2PKH locking bytecode.
pub fn lock(public_key_hash: &[u8; 20]) -> Vec<u8> {
    let mut bytecode = Vec::with_capacity(25);
    bytecode.push(OP_DUP);
    bytecode.push(OP_HASH160);
    bytecode.push(OP_DATA_20);
    bytecode.extend_from_slice(public_key_hash);
    bytecode.push(OP_EQUALVERIFY);
    bytecode.push(OP_CHECKSIG);
    bytecode
}

/// Create a P2PKH unlocker for signing transaction inputs.
///
/// # Arguments
/// * `private_key` - The private key used to sign.
/// * `sighash_flag` - Optional sighash flag. Defaults to `SIGHASH_ALL_FORKID` (0x41).
///
/// # Returns
/// A `P2pkhUnlocker` implementing `UnlockingTemplate`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2pkhUnlocker {
    P2pkhUnlocker {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL_FORKID),
    }
}

/// P2PKH signing template holding a private key and sighash flag.
///
/// Implements `UnlockingTemplate` to produce unlocking bytecode of the
/// form `<DER_signature + sighash_byte> <compressed_pubkey>`.
pub struct P2pkhUnlocker {
    /// The private key used for ECDSA signing.
    private_key: PrivateKey,

    /// The sighash flag to use (e.g. `SIGHASH_ALL_FORKID`).
    sighash_flag: u32,
}

impl UnlockingTemplate for P2pkhUnlocker {
    /// Sign the specified input and produce the unlocking bytecode.
    ///
    /// The covered bytecode is the P2PKH locking bytecode for this key's
    /// public key hash.  Computes the BIP-143-style signature hash
    /// (committing to the spent output's value and token data), signs it
    /// with RFC6979 deterministic ECDSA, and constructs the unlocking
    /// bytecode: `<DER_sig || sighash_byte> <compressed_pubkey>`.
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        source: &SourceOutput,
    ) -> Result<Vec<u8>, TemplateDiagnostic> {
        let diagnostic = |message: String| TemplateDiagnostic {
            input_index,
            message,
        };

        if input_index >= tx.inputs.len() {
            return Err(diagnostic(format!(
                "input index out of range (tx has {} inputs)",
                tx.inputs.len()
            )));
        }

        let public_key = self.private_key.pub_key();
        let covered_bytecode = lock(&public_key.hash160());

        let sig_hash = signature_hash(
            tx,
            input_index,
            &covered_bytecode,
            self.sighash_flag,
            source,
        )
        .map_err(|e| diagnostic(format!("signature hash: {}", e)))?;

        let signature = self
            .private_key
            .sign(&sig_hash)
            .map_err(|e| diagnostic(format!("signing: {}", e)))?;

        let der_sig = signature.to_der();
        let mut sig_buf = Vec::with_capacity(der_sig.len() + 1);
        sig_buf.extend_from_slice(&der_sig);
        sig_buf.push(self.sighash_flag as u8);

        let mut bytecode = Vec::with_capacity(sig_buf.len() + 35);
        append_push_data(&mut bytecode, &sig_buf);
        append_push_data(&mut bytecode, &public_key.to_compressed());

        Ok(bytecode)
    }

    /// Estimate the byte length of P2PKH unlocking bytecode.
    ///
    /// A typical P2PKH scriptSig is approximately 106 bytes:
    /// 1 (push len) + 71 (DER sig + sighash) + 1 (push len) + 33 (compressed pubkey)
    fn estimate_length(&self) -> usize {
        106
    }
}
