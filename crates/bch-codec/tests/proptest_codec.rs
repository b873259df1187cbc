use proptest::prelude::*;

use bch_codec::{pack, transaction_to_value, unpack, value_to_transaction, Value};
use bch_transaction::token::MAX_FUNGIBLE_AMOUNT;
use bch_transaction::{
    NftCapability, NftData, TokenData, Transaction, TransactionInput, TransactionOutput,
};

fn arb_token() -> impl Strategy<Value = TokenData> {
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
        prop::array::uniform32(any::<u8>()),
        prop::option::of(arb_nft),
        1u64..=MAX_FUNGIBLE_AMOUNT,
    )
        .prop_map(|(category, nft, amount)| TokenData {
            amount,
            category,
            nft,
        })
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u32>(),
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
        .prop_map(|(satoshis, bytecode, token)| TransactionOutput {
            value_satoshis: satoshis,
            locking_bytecode: bytecode,
            token,
        });

    (
        any::<u32>(),
        prop::collection::vec(arb_input, 1..4),
        prop::collection::vec(arb_output, 1..4),
        any::<u32>(),
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
    fn transaction_survives_codec_roundtrip(tx in arb_transaction()) {
        let token = pack(&transaction_to_value(&tx)).unwrap();
        let decoded = value_to_transaction(&unpack(&token).unwrap()).unwrap();
        prop_assert_eq!(decoded, tx);
    }

    #[test]
    fn byte_strings_survive_codec_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let tree = Value::Bytes(bytes);
        prop_assert_eq!(unpack(&pack(&tree).unwrap()).unwrap(), tree);
    }

    #[test]
    fn text_and_int_arrays_survive_codec_roundtrip(
        texts in prop::collection::vec("[a-z]{0,12}", 0..8),
        ints in prop::collection::vec(any::<i64>(), 0..8),
    ) {
        let tree = Value::Array(
            texts.into_iter().map(Value::Text)
                .chain(ints.into_iter().map(Value::Int))
                .collect(),
        );
        prop_assert_eq!(unpack(&pack(&tree).unwrap()).unwrap(), tree);
    }
}
