use thiserror::Error;

/// The types of error which may occur whilst signing or verifying a message.
///
/// Authentication fails closed: none of these are ever recovered from inside
/// this crate, and the caller decides how to reject the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HmacError {
    /// The message lacks a required header, the `Authorization` header does not
    /// match the expected grammar, or the timestamp could not be parsed.
    #[error("{0}")]
    MalformedMessage(String),

    /// The caller supplied an invalid configuration or argument, such as an
    /// empty secret key.
    #[error("{0}")]
    InvalidArgument(String),

    /// The canonical message could not be built even though the required
    /// headers are present, for example because the body is not readable.
    #[error("{0}")]
    InvalidMessage(String),

    /// The digest carried by the message did not match the expected digest,
    /// or no key was known for the credential. Deliberately carries no detail.
    #[error("Signature verification failed")]
    VerificationFailed,
}

impl HmacError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        HmacError::MalformedMessage(reason.into())
    }
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        HmacError::InvalidArgument(reason.into())
    }
    pub(crate) fn invalid_message(reason: impl Into<String>) -> Self {
        HmacError::InvalidMessage(reason.into())
    }
}

/// Result type used throughout this crate.
pub type Result<T, E = HmacError> = std::result::Result<T, E>;
