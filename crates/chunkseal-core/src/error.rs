use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkSealError>;

/// Every failure a chunkseal operation can report.
///
/// `AuthenticationFailure` deliberately carries no detail: a tampered body,
/// a wrong key, a wrong nonce and a wrong chunk position all look the same.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkSealError {
    #[error("invalid key size: {actual} bytes (expected {expected})")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("invalid nonce size: {actual} bytes (expected {expected})")]
    InvalidNonceSize { expected: usize, actual: usize },

    #[error("chunk {index} too short: {len} bytes (minimum {min})")]
    InvalidCiphertextLength { index: u64, len: usize, min: usize },

    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("random source failure: {0}")]
    RandomSourceFailure(String),

    #[error("invalid output length: {requested} bytes (maximum {max})")]
    InvalidLength { requested: u64, max: u64 },

    #[error("config error: {0}")]
    Config(String),
}

impl ChunkSealError {
    /// Short stable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidKeySize { .. } => "invalid_key_size",
            Self::InvalidNonceSize { .. } => "invalid_nonce_size",
            Self::InvalidCiphertextLength { .. } => "invalid_ciphertext_length",
            Self::AuthenticationFailure => "authentication_failure",
            Self::RandomSourceFailure(_) => "random_source_failure",
            Self::InvalidLength { .. } => "invalid_length",
            Self::Config(_) => "config",
        }
    }
}
