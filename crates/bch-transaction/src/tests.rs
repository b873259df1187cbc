//! Unit tests for transaction serialization, token prefixes, and
//! finalization.

use bch_primitives::cashaddr::Network;
use bch_primitives::ec::{PrivateKey, Signature};

use crate::finalize::{extract_source_outputs, finalize_transaction, locking_bytecode_to_address};
use crate::input::TransactionInput;
use crate::output::{SourceOutput, TransactionOutput};
use crate::sighash::{signature_hash, SIGHASH_ALL_FORKID};
use crate::template::p2pkh;
use crate::token::{NftCapability, NftData, TokenData, MAX_FUNGIBLE_AMOUNT};
use crate::transaction::Transaction;
use crate::TransactionError;

fn test_key() -> PrivateKey {
    let mut bytes = [0u8; 32];
    bytes[31] = 1;
    PrivateKey::from_bytes(&bytes).unwrap()
}

fn skeleton(input_count: usize) -> Transaction {
    let mut tx = Transaction::new();
    for i in 0..input_count {
        let mut input = TransactionInput::new();
        input.outpoint_txid = [i as u8 + 1; 32];
        input.outpoint_index = i as u32;
        tx.inputs.push(input);
    }
    tx.outputs.push(TransactionOutput {
        value_satoshis: 9_000,
        locking_bytecode: p2pkh::lock(&test_key().pub_key().hash160()),
        token: None,
    });
    tx
}

fn plain_sources(count: usize) -> Vec<SourceOutput> {
    (0..count)
        .map(|i| SourceOutput {
            value_satoshis: 10_000 + i as u64,
            cash_address: None,
            token: None,
        })
        .collect()
}

// -----------------------------------------------------------------------
// Wire format
// -----------------------------------------------------------------------

#[test]
fn test_serialize_minimal_transaction() {
    let mut tx = Transaction::new();
    let mut input = TransactionInput::new();
    input.outpoint_txid = [0xaa; 32];
    input.outpoint_index = 1;
    tx.inputs.push(input);
    tx.outputs.push(TransactionOutput {
        value_satoshis: 0x0102,
        locking_bytecode: vec![0x51],
        token: None,
    });

    let bytes = tx.to_bytes().unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&2u32.to_le_bytes()); // version
    expected.push(1); // input count
    expected.extend_from_slice(&[0xaa; 32]);
    expected.extend_from_slice(&1u32.to_le_bytes());
    expected.push(0); // empty unlocking bytecode
    expected.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    expected.push(1); // output count
    expected.extend_from_slice(&0x0102u64.to_le_bytes());
    expected.push(1); // bytecode length
    expected.push(0x51);
    expected.extend_from_slice(&0u32.to_le_bytes()); // lock time
    assert_eq!(bytes, expected);

    let decoded = Transaction::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, tx);
}

#[test]
fn test_transaction_rejects_trailing_bytes() {
    let mut bytes = skeleton(1).to_bytes().unwrap();
    bytes.push(0x00);
    assert!(matches!(
        Transaction::from_bytes(&bytes),
        Err(TransactionError::SerializationError(_))
    ));
}

#[test]
fn test_output_with_token_prefix_roundtrip() {
    let output = TransactionOutput {
        value_satoshis: 546,
        locking_bytecode: p2pkh::lock(&[0x11; 20]),
        token: Some(TokenData {
            amount: 100,
            category: [0x22; 32],
            nft: Some(NftData {
                capability: NftCapability::Minting,
                commitment: vec![0x01, 0x02],
            }),
        }),
    };

    let bytes = output.to_bytes().unwrap();
    // 8 (value) + 1 (field length) + 1 (0xef) + 32 (category)
    // + 1 (bitfield) + 1 + 2 (commitment) + 1 (amount) + 25 (bytecode)
    assert_eq!(bytes.len(), 8 + 1 + 1 + 32 + 1 + 3 + 1 + 25);
    assert_eq!(bytes[9], 0xef);

    let mut reader = bch_primitives::util::ByteReader::new(&bytes);
    let decoded = TransactionOutput::read_from(&mut reader).unwrap();
    assert_eq!(decoded, output);
    assert_eq!(reader.remaining(), 0);
}

#[test]
fn test_output_without_token_keeps_bytecode_intact() {
    // Locking bytecode that merely contains 0xef past the first byte
    // must not be mistaken for a token prefix.
    let output = TransactionOutput {
        value_satoshis: 1,
        locking_bytecode: vec![0x51, 0xef, 0x51],
        token: None,
    };
    let bytes = output.to_bytes().unwrap();
    let mut reader = bch_primitives::util::ByteReader::new(&bytes);
    let decoded = TransactionOutput::read_from(&mut reader).unwrap();
    assert_eq!(decoded, output);
}

#[test]
fn test_tx_id_is_display_order_hex() {
    let tx = skeleton(1);
    let id = tx.tx_id().unwrap();
    let mut reversed = id;
    reversed.reverse();
    assert_eq!(tx.tx_id_hex().unwrap(), hex::encode(reversed));
}

// -----------------------------------------------------------------------
// Finalization
// -----------------------------------------------------------------------

#[test]
fn test_finalize_signs_empty_inputs() {
    let tx = skeleton(1);
    let sources = plain_sources(1);
    let key = test_key();

    let bytes = finalize_transaction(&tx, &sources, &key.to_bytes()).unwrap();
    let signed = Transaction::from_bytes(&bytes).unwrap();

    assert!(signed.inputs[0].is_signed());
    // Skeleton is untouched.
    assert!(!tx.inputs[0].is_signed());

    // The unlocking bytecode is <push sig> <push pubkey>; verify the
    // signature against the recomputed sighash.
    let bytecode = &signed.inputs[0].unlocking_bytecode;
    let sig_len = bytecode[0] as usize;
    let sig_with_flag = &bytecode[1..1 + sig_len];
    assert_eq!(*sig_with_flag.last().unwrap() as u32, SIGHASH_ALL_FORKID);
    let pub_key_len = bytecode[1 + sig_len] as usize;
    assert_eq!(pub_key_len, 33);
    assert_eq!(
        &bytecode[2 + sig_len..],
        key.pub_key().to_compressed().as_slice()
    );

    let covered = p2pkh::lock(&key.pub_key().hash160());
    let hash = signature_hash(&tx, 0, &covered, SIGHASH_ALL_FORKID, &sources[0]).unwrap();
    let sig = Signature::from_der(&sig_with_flag[..sig_len - 1]).unwrap();
    assert!(key.pub_key().verify(&hash, &sig));
}

#[test]
fn test_finalize_is_idempotent() {
    let tx = skeleton(2);
    let sources = plain_sources(2);
    let key = test_key().to_bytes();

    let first = finalize_transaction(&tx, &sources, &key).unwrap();
    let signed = Transaction::from_bytes(&first).unwrap();
    let second = finalize_transaction(&signed, &sources, &key).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_finalize_preserves_presigned_inputs() {
    let mut tx = skeleton(2);
    tx.inputs[0].unlocking_bytecode = vec![0xde, 0xad];
    let sources = plain_sources(2);

    let bytes = finalize_transaction(&tx, &sources, &test_key().to_bytes()).unwrap();
    let signed = Transaction::from_bytes(&bytes).unwrap();

    assert_eq!(signed.inputs[0].unlocking_bytecode, vec![0xde, 0xad]);
    assert!(signed.inputs[1].is_signed());
}

#[test]
fn test_finalize_commits_to_source_token_data() {
    let tx = skeleton(1);
    let key = test_key().to_bytes();

    let plain = plain_sources(1);
    let mut token_sources = plain_sources(1);
    token_sources[0].token = Some(TokenData {
        amount: 5,
        category: [0x33; 32],
        nft: None,
    });

    let without = finalize_transaction(&tx, &plain, &key).unwrap();
    let with = finalize_transaction(&tx, &token_sources, &key).unwrap();
    assert_ne!(without, with);
}

#[test]
fn test_finalize_shape_mismatch() {
    let tx = skeleton(2);
    let sources = plain_sources(1);
    let err = finalize_transaction(&tx, &sources, &test_key().to_bytes()).unwrap_err();
    assert!(matches!(
        err,
        TransactionError::ShapeMismatch {
            inputs: 2,
            sources: 1
        }
    ));
}

#[test]
fn test_finalize_rejects_invalid_key() {
    let tx = skeleton(1);
    let sources = plain_sources(1);
    let err = finalize_transaction(&tx, &sources, &[0u8; 32]).unwrap_err();
    assert!(matches!(err, TransactionError::InvalidKey(_)));

    let err = finalize_transaction(&tx, &sources, &[1u8; 31]).unwrap_err();
    assert!(matches!(err, TransactionError::InvalidKey(_)));
}

#[test]
fn test_finalize_reports_all_failures_atomically() {
    let tx = skeleton(3);
    let mut sources = plain_sources(3);
    // Two sources carry token data the prefix encoding rejects; every
    // failing input must be reported and no bytes produced.
    sources[0].token = Some(TokenData {
        amount: MAX_FUNGIBLE_AMOUNT + 1,
        category: [0x44; 32],
        nft: None,
    });
    sources[2].token = Some(TokenData {
        amount: 0,
        category: [0x55; 32],
        nft: None,
    });

    let err = finalize_transaction(&tx, &sources, &test_key().to_bytes()).unwrap_err();
    match err {
        TransactionError::TemplateResolution(diagnostics) => {
            assert_eq!(diagnostics.len(), 2);
            assert_eq!(diagnostics[0].input_index, 0);
            assert_eq!(diagnostics[1].input_index, 2);
        }
        other => panic!("expected TemplateResolution, got {:?}", other),
    }
}

// -----------------------------------------------------------------------
// Source output extraction
// -----------------------------------------------------------------------

#[test]
fn test_extract_source_outputs() {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.outputs.push(TransactionOutput {
        value_satoshis: 1_234,
        locking_bytecode: p2pkh::lock(&key.pub_key().hash160()),
        token: Some(TokenData {
            amount: 7,
            category: [0x66; 32],
            nft: None,
        }),
    });
    tx.outputs.push(TransactionOutput {
        value_satoshis: 999,
        locking_bytecode: vec![0x6a, 0x01, 0x00], // OP_RETURN, no address
        token: None,
    });

    let sources = extract_source_outputs(&tx, Network::Mainnet);
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].value_satoshis, 1_234);
    assert_eq!(
        sources[0].cash_address,
        Some(key.pub_key().to_address(Network::Mainnet).unwrap())
    );
    assert_eq!(sources[0].token.as_ref().unwrap().amount, 7);
    assert_eq!(sources[1].cash_address, None);
}

#[test]
fn test_locking_bytecode_to_address_patterns() {
    let p2pkh_bytecode = p2pkh::lock(&[0x77; 20]);
    assert!(locking_bytecode_to_address(&p2pkh_bytecode, Network::Mainnet).is_some());

    let mut p2sh_bytecode = vec![0xa9, 0x14];
    p2sh_bytecode.extend_from_slice(&[0x77; 20]);
    p2sh_bytecode.push(0x87);
    let addr = locking_bytecode_to_address(&p2sh_bytecode, Network::Mainnet).unwrap();
    assert!(addr.starts_with("bitcoincash:p"));

    assert!(locking_bytecode_to_address(&[0x51], Network::Mainnet).is_none());
}
