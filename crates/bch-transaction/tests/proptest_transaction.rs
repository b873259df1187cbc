use proptest::prelude::*;

use bch_transaction::token::MAX_FUNGIBLE_AMOUNT;
use bch_transaction::{
    NftCapability, NftData, TokenData, Transaction, TransactionInput, TransactionOutput,
};

/// Strategy to generate valid token data (amount-only, NFT-only, or both).
fn arb_token() -> impl Strategy<Value = TokenData> {
    let arb_category = prop::array::uniform32(any::<u8>());
    let arb_capability = prop_oneof![
        Just(NftCapability::None),
        Just(NftCapability::Mutable),
        Just(NftCapability::Minting),
    ];
    let arb_nft = (arb_capability, prop::collection::vec(any::<u8>(), 0..40)).prop_map(
        |(capability, commitment)| NftData {
            capability,
            commitment,
        },
    );

    (
        arb_category,
        prop::option::of(arb_nft),
        1u64..=MAX_FUNGIBLE_AMOUNT,
        any::<bool>(),
    )
        .prop_map(|(category, nft, amount, amount_only)| {
            let amount = if nft.is_none() || amount_only { amount } else { 0 };
            TokenData {
                amount,
                category,
                nft,
            }
        })
}

/// Strategy to generate a valid random transaction, possibly with
/// token-bearing outputs.
fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()), // outpoint txid
        any::<u32>(),                        // outpoint index
        prop::collection::vec(any::<u8>(), 0..64), // unlocking bytecode
        any::<u32>(),                        // sequence
    )
        .prop_map(|(txid, idx, bytecode, seq)| {
            let mut input = TransactionInput::new();
            input.outpoint_txid = txid;
            input.outpoint_index = idx;
            input.unlocking_bytecode = bytecode;
            input.sequence_number = seq;
            input
        });

    let arb_output = (
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..64),
        prop::option::of(arb_token()),
    )
        .prop_map(|(satoshis, mut bytecode, token)| {
            // A leading 0xef would be parsed back as a token prefix.
            if bytecode.first() == Some(&0xef) {
                bytecode[0] = 0x51;
            }
            TransactionOutput {
                value_satoshis: satoshis,
                locking_bytecode: bytecode,
                token,
            }
        });

    (
        any::<u32>(), // version
        prop::collection::vec(arb_input, 1..4),
        prop::collection::vec(arb_output, 1..4),
        any::<u32>(), // locktime
    )
        .prop_map(|(version, inputs, outputs, locktime)| Transaction {
            version,
            inputs,
            outputs,
            lock_time: locktime,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transaction_serialize_deserialize_roundtrip(tx in arb_transaction()) {
        let bytes = tx.to_bytes().unwrap();
        let tx2 = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&tx, &tx2);
        prop_assert_eq!(bytes, tx2.to_bytes().unwrap());
    }

    #[test]
    fn transaction_hex_roundtrip(tx in arb_transaction()) {
        let hex_str = tx.to_hex().unwrap();
        let tx2 = Transaction::from_hex(&hex_str).unwrap();
        prop_assert_eq!(hex_str, tx2.to_hex().unwrap());
    }

    #[test]
    fn token_prefix_roundtrip_through_output(token in arb_token()) {
        let output = TransactionOutput {
            value_satoshis: 546,
            locking_bytecode: vec![0x51],
            token: Some(token),
        };
        let bytes = output.to_bytes().unwrap();
        let mut reader = bch_primitives::util::ByteReader::new(&bytes);
        let decoded = TransactionOutput::read_from(&mut reader).unwrap();
        prop_assert_eq!(output, decoded);
    }
}
