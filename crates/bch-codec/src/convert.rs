//! Conversion between transaction types and the codec value tree.
//!
//! Uses the field names common to BCH wallet tooling: transactions are
//! maps of `version`/`inputs`/`outputs`/`locktime`, inputs carry
//! `outpointTransactionHash` (display byte order), `outpointIndex`,
//! `sequenceNumber`, and `unlockingBytecode`, and outputs carry
//! `lockingBytecode`, `valueSatoshis`, and an optional `token` map.
//! Amount fields travel as arbitrary-precision integers.

use bch_transaction::{
    NftCapability, NftData, SourceOutput, TokenData, Transaction, TransactionInput,
    TransactionOutput,
};
use num_bigint::BigUint;

use crate::error::CodecError;
use crate::value::Value;

/// Convert a transaction into a value tree suitable for [`pack`](crate::pack).
///
/// Hashes are emitted in display (big-endian) byte order.
///
/// # Arguments
/// * `tx` - The transaction to convert.
///
/// # Returns
/// A map-shaped `Value` describing the transaction.
pub fn transaction_to_value(tx: &Transaction) -> Value {
    let inputs = tx
        .inputs
        .iter()
        .map(|input| {
            let mut hash = input.outpoint_txid;
            hash.reverse();
            Value::Map(vec![
                ("outpointIndex".to_string(), Value::from(input.outpoint_index)),
                ("outpointTransactionHash".to_string(), Value::from(hash.to_vec())),
                ("sequenceNumber".to_string(), Value::from(input.sequence_number)),
                (
                    "unlockingBytecode".to_string(),
                    Value::from(input.unlocking_bytecode.clone()),
                ),
            ])
        })
        .collect();

    let outputs = tx
        .outputs
        .iter()
        .map(|output| {
            let mut entries = vec![
                (
                    "lockingBytecode".to_string(),
                    Value::from(output.locking_bytecode.clone()),
                ),
                (
                    "valueSatoshis".to_string(),
                    Value::BigInt(BigUint::from(output.value_satoshis)),
                ),
            ];
            if let Some(token) = &output.token {
                entries.push(("token".to_string(), token_to_value(token)));
            }
            Value::Map(entries)
        })
        .collect();

    Value::Map(vec![
        ("version".to_string(), Value::from(tx.version)),
        ("inputs".to_string(), Value::Array(inputs)),
        ("outputs".to_string(), Value::Array(outputs)),
        ("locktime".to_string(), Value::from(tx.lock_time)),
    ])
}

/// Convert a value tree back into a transaction.
///
/// # Arguments
/// * `value` - A map-shaped tree as produced by [`transaction_to_value`].
///
/// # Returns
/// The transaction, or a `CodecError::InvalidTree` when a field is
/// missing or has the wrong type.
pub fn value_to_transaction(value: &Value) -> Result<Transaction, CodecError> {
    let version = expect_u32(value.get("version"), "version")?;
    let lock_time = expect_u32(value.get("locktime"), "locktime")?;

    let inputs = expect_array(value.get("inputs"), "inputs")?
        .iter()
        .map(|input| {
            let mut outpoint_txid = expect_hash32(
                input.get("outpointTransactionHash"),
                "outpointTransactionHash",
            )?;
            outpoint_txid.reverse();
            Ok(TransactionInput {
                outpoint_txid,
                outpoint_index: expect_u32(input.get("outpointIndex"), "outpointIndex")?,
                sequence_number: expect_u32(input.get("sequenceNumber"), "sequenceNumber")?,
                unlocking_bytecode: expect_bytes(
                    input.get("unlockingBytecode"),
                    "unlockingBytecode",
                )?,
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    let outputs = expect_array(value.get("outputs"), "outputs")?
        .iter()
        .map(|output| {
            Ok(TransactionOutput {
                value_satoshis: expect_amount(output.get("valueSatoshis"), "valueSatoshis")?,
                locking_bytecode: expect_bytes(output.get("lockingBytecode"), "lockingBytecode")?,
                token: output.get("token").map(value_to_token).transpose()?,
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

/// Convert source outputs into a value tree.
///
/// # Arguments
/// * `sources` - The source outputs, positionally aligned with the
///   inputs they fund.
///
/// # Returns
/// An array-shaped `Value`.
pub fn source_outputs_to_value(sources: &[SourceOutput]) -> Value {
    Value::Array(
        sources
            .iter()
            .map(|source| {
                let mut entries = vec![(
                    "valueSatoshis".to_string(),
                    Value::BigInt(BigUint::from(source.value_satoshis)),
                )];
                if let Some(address) = &source.cash_address {
                    entries.push(("cashAddress".to_string(), Value::from(address.clone())));
                }
                if let Some(token) = &source.token {
                    entries.push(("token".to_string(), token_to_value(token)));
                }
                Value::Map(entries)
            })
            .collect(),
    )
}

/// Convert a value tree back into source outputs.
///
/// # Arguments
/// * `value` - An array-shaped tree as produced by
///   [`source_outputs_to_value`].
///
/// # Returns
/// The source outputs, or a `CodecError::InvalidTree` when the shape is
/// wrong.
pub fn value_to_source_outputs(value: &Value) -> Result<Vec<SourceOutput>, CodecError> {
    expect_array(Some(value), "source outputs")?
        .iter()
        .map(|source| {
            let cash_address = match source.get("cashAddress") {
                None | Some(Value::Null) => None,
                Some(Value::Text(s)) => Some(s.clone()),
                Some(_) => {
                    return Err(CodecError::InvalidTree(
                        "cashAddress is not a string".to_string(),
                    ))
                }
            };
            Ok(SourceOutput {
                value_satoshis: expect_amount(source.get("valueSatoshis"), "valueSatoshis")?,
                cash_address,
                token: source.get("token").map(value_to_token).transpose()?,
            })
        })
        .collect()
}

// -----------------------------------------------------------------------
// Token data
// -----------------------------------------------------------------------

fn token_to_value(token: &TokenData) -> Value {
    let mut category = token.category;
    category.reverse();
    let mut entries = vec![
        (
            "amount".to_string(),
            Value::BigInt(BigUint::from(token.amount)),
        ),
        ("category".to_string(), Value::from(category.to_vec())),
    ];
    if let Some(nft) = &token.nft {
        entries.push((
            "nft".to_string(),
            Value::Map(vec![
                (
                    "capability".to_string(),
                    Value::from(nft.capability.as_str()),
                ),
                ("commitment".to_string(), Value::from(nft.commitment.clone())),
            ]),
        ));
    }
    Value::Map(entries)
}

fn value_to_token(value: &Value) -> Result<TokenData, CodecError> {
    let mut category = expect_hash32(value.get("category"), "category")?;
    category.reverse();

    let nft = match value.get("nft") {
        None | Some(Value::Null) => None,
        Some(nft) => {
            let capability = match nft.get("capability") {
                None | Some(Value::Null) => NftCapability::None,
                Some(Value::Text(s)) => NftCapability::from_str(s)
                    .map_err(|e| CodecError::InvalidTree(e.to_string()))?,
                Some(_) => {
                    return Err(CodecError::InvalidTree(
                        "capability is not a string".to_string(),
                    ))
                }
            };
            let commitment = match nft.get("commitment") {
                None | Some(Value::Null) => Vec::new(),
                Some(other) => expect_bytes(Some(other), "commitment")?,
            };
            Some(NftData {
                capability,
                commitment,
            })
        }
    };

    Ok(TokenData {
        amount: expect_amount(value.get("amount"), "amount")?,
        category,
        nft,
    })
}

// -----------------------------------------------------------------------
// Shape helpers
// -----------------------------------------------------------------------

fn missing(field: &str) -> CodecError {
    CodecError::InvalidTree(format!("missing field {:?}", field))
}

fn expect_array<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a [Value], CodecError> {
    match value {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(CodecError::InvalidTree(format!(
            "{} is not an array",
            field
        ))),
        None => Err(missing(field)),
    }
}

fn expect_bytes(value: Option<&Value>, field: &str) -> Result<Vec<u8>, CodecError> {
    match value {
        Some(Value::Bytes(bytes)) => Ok(bytes.clone()),
        Some(_) => Err(CodecError::InvalidTree(format!(
            "{} is not a byte string",
            field
        ))),
        None => Err(missing(field)),
    }
}

fn expect_hash32(value: Option<&Value>, field: &str) -> Result<[u8; 32], CodecError> {
    let bytes = expect_bytes(value, field)?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        CodecError::InvalidTree(format!("{} is not 32 bytes (got {})", field, bytes.len()))
    })
}

fn expect_u32(value: Option<&Value>, field: &str) -> Result<u32, CodecError> {
    match value {
        Some(Value::Int(n)) => u32::try_from(*n)
            .map_err(|_| CodecError::InvalidTree(format!("{} out of range: {}", field, n))),
        Some(_) => Err(CodecError::InvalidTree(format!(
            "{} is not an integer",
            field
        ))),
        None => Err(missing(field)),
    }
}

/// Accept either a plain or arbitrary-precision non-negative integer.
fn expect_amount(value: Option<&Value>, field: &str) -> Result<u64, CodecError> {
    match value {
        Some(Value::Int(n)) => u64::try_from(*n)
            .map_err(|_| CodecError::InvalidTree(format!("{} is negative: {}", field, n))),
        Some(Value::BigInt(big)) => u64::try_from(big)
            .map_err(|_| CodecError::InvalidTree(format!("{} exceeds 64 bits", field))),
        Some(_) => Err(CodecError::InvalidTree(format!(
            "{} is not an integer",
            field
        ))),
        None => Err(missing(field)),
    }
}
