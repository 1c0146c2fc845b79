//! Error types.

use thiserror::Error;

/// Ways a U2F authentication ceremony can fail. Every variant is terminal
/// for the attempt; the library never retries, and no partial success is
/// possible.
///
/// The variants are fine grained so server-side logs can record exactly
/// which check rejected an assertion. Anything shown to the requesting
/// client should go through [`U2fError::client_message`] instead.
#[derive(Debug, Error)]
pub enum U2fError {
    /// The client data `typ` was not the expected ceremony type.
    #[error("invalid client data type")]
    InvalidClientDataType,

    /// The client data challenge does not match the issued challenge.
    #[error("mismatched challenge")]
    MismatchedChallenge,

    /// The client data origin is missing from the allowed origin set, or
    /// could not be canonicalized at all.
    #[error("origin not recognised")]
    InvalidOrigin,

    /// The client data was not well formed JSON.
    #[error("json parsing failed: {0}")]
    ParseJSONFailure(#[from] serde_json::Error),

    /// The binary assertion was shorter than its fixed five byte prefix.
    #[error("insufficient bytes in signature data")]
    AssertionTooShort,

    /// The assertion carried no signature bytes after the prefix.
    #[error("signature bytes missing from assertion")]
    SignatureMissing,

    /// The user presence byte was not the single defined present bit.
    #[error("user presence invalid during authentication")]
    UserNotPresent,

    /// The reported counter was not strictly greater than the stored one.
    #[error("counter value smaller than expected")]
    CounterTooLow,

    /// The signature did not verify over the reconstructed signed bytes,
    /// or was not decodable at all.
    #[error("signature verification failed")]
    InvalidSignature,

    /// The credential's stored public key could not be decoded.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// An allowed origin supplied at challenge construction could not be
    /// parsed. This is a server misconfiguration, not a client failure.
    #[error("invalid configuration")]
    Configuration,

    /// The cryptographic provider reported an internal fault.
    #[error("openssl error: {0}")]
    OpenSSLError(#[from] openssl::error::ErrorStack),
}

impl U2fError {
    /// A message that is safe to return to the requesting client.
    ///
    /// Deliberately identical for every kind of failure so the far side
    /// cannot probe which check rejected the attempt.
    pub fn client_message(&self) -> &'static str {
        "authentication failed"
    }
}
