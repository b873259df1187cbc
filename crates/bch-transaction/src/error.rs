use crate::template::TemplateDiagnostic;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The number of source outputs does not match the number of inputs.
    #[error("source outputs length {sources} does not match input count {inputs}")]
    ShapeMismatch { inputs: usize, sources: usize },
    /// The signing key is not a valid secp256k1 scalar.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    /// One or more inputs could not be resolved by the unlocking template.
    /// Carries a diagnostic per failed input; no input was signed.
    #[error("template resolution failed for {} input(s)", .0.len())]
    TemplateResolution(Vec<TemplateDiagnostic>),
    /// The transaction structure is invalid (e.g. an out-of-range index).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Token data violates the prefix encoding rules.
    #[error("invalid token data: {0}")]
    InvalidTokenData(String),
    /// An underlying primitives error (forwarded from `bch-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] bch_primitives::PrimitivesError),
}
