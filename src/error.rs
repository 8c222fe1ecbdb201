use thiserror::Error;

/// Failures surfaced by the content path codec.
///
/// None of these are retried internally: a path list or payload is either
/// well-formed or it is not.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The path list handed to the encoder cannot be encoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The payload handed to the decoder is truncated, garbled or inconsistent.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// The codec reached a state its own construction should rule out.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// A properties file could not be interpreted.
    #[error("invalid properties: {0}")]
    Properties(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
