/// Error types for codec operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The transport token is not valid URL-safe base64.
    #[error("malformed transport token: {0}")]
    MalformedToken(String),
    /// The binary payload is not a valid msgpack document.
    #[error("invalid binary payload: {0}")]
    InvalidBinary(String),
    /// The value tree contains something msgpack cannot carry.
    #[error("unrepresentable value: {0}")]
    Unrepresentable(String),
    /// The value tree does not have the shape the conversion expects.
    #[error("invalid value tree: {0}")]
    InvalidTree(String),
}
