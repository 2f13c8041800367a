// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use thiserror::Error;

/// The error type for tlsign operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Path does not start with `/` or carries a query or fragment.
    MalformedPath,

    /// The same header name (case-insensitive) was included twice.
    DuplicateHeaderName,

    /// A header name is not a valid HTTP token, or its value is not a valid
    /// header value.
    InvalidHeaderName,

    /// The method is not a valid HTTP method token.
    InvalidMethod,

    /// Key material could not be parsed.
    InvalidKeyFormat,

    /// Key material belongs to an algorithm or curve that is not supported.
    UnsupportedAlgorithm,

    /// The key id used for signing differs from the key's declared id.
    KeyMismatch,

    /// The cryptographic backend failed to produce a signature.
    SigningBackendError,

    /// The signature token is not a valid detached compact JWS.
    MalformedToken,

    /// The key set has no key for the token's key id.
    UnknownKeyId,

    /// The token's algorithm does not match the resolved key.
    AlgorithmMismatch,

    /// A header covered by the signature is absent from the request.
    MissingRequiredHeader,

    /// A header the verifier requires is not covered by the signature.
    RequiredHeaderNotSigned,

    /// The signature does not match the reconstructed request.
    SignatureInvalid,

    /// Method or path was not set before signing or verifying.
    IncompleteRequest,

    /// Configuration error (missing fields, unreadable files)
    ConfigInvalid,

    /// Unexpected errors
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Check if this error was raised while verifying an incoming request.
    ///
    /// Services should answer all of these with one uniform response and keep the
    /// specific kind for their own logs.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MalformedToken
                | ErrorKind::UnknownKeyId
                | ErrorKind::AlgorithmMismatch
                | ErrorKind::MissingRequiredHeader
                | ErrorKind::RequiredHeaderNotSigned
                | ErrorKind::SignatureInvalid
        )
    }

    /// Check if this is a key material error
    pub fn is_key_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidKeyFormat | ErrorKind::UnsupportedAlgorithm | ErrorKind::KeyMismatch
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a malformed path error
    pub fn malformed_path(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPath, message)
    }

    /// Create a duplicate header name error
    pub fn duplicate_header_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateHeaderName, message)
    }

    /// Create an invalid header name error
    pub fn invalid_header_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidHeaderName, message)
    }

    /// Create an invalid method error
    pub fn invalid_method(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidMethod, message)
    }

    /// Create an invalid key format error
    pub fn invalid_key_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidKeyFormat, message)
    }

    /// Create an unsupported algorithm error
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedAlgorithm, message)
    }

    /// Create a key mismatch error
    pub fn key_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyMismatch, message)
    }

    /// Create a signing backend error
    pub fn signing_backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningBackendError, message)
    }

    /// Create a malformed token error
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Create an unknown key id error
    pub fn unknown_key_id(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownKeyId, message)
    }

    /// Create an algorithm mismatch error
    pub fn algorithm_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlgorithmMismatch, message)
    }

    /// Create a missing required header error
    pub fn missing_required_header(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRequiredHeader, message)
    }

    /// Create a required header not signed error
    pub fn required_header_not_signed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequiredHeaderNotSigned, message)
    }

    /// Create a signature invalid error
    pub fn signature_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SignatureInvalid, message)
    }

    /// Create an incomplete request error
    pub fn incomplete_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompleteRequest, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedPath => write!(f, "malformed path"),
            ErrorKind::DuplicateHeaderName => write!(f, "duplicate header name"),
            ErrorKind::InvalidHeaderName => write!(f, "invalid header name"),
            ErrorKind::InvalidMethod => write!(f, "invalid method"),
            ErrorKind::InvalidKeyFormat => write!(f, "invalid key format"),
            ErrorKind::UnsupportedAlgorithm => write!(f, "unsupported algorithm"),
            ErrorKind::KeyMismatch => write!(f, "key mismatch"),
            ErrorKind::SigningBackendError => write!(f, "signing backend error"),
            ErrorKind::MalformedToken => write!(f, "malformed token"),
            ErrorKind::UnknownKeyId => write!(f, "unknown key id"),
            ErrorKind::AlgorithmMismatch => write!(f, "algorithm mismatch"),
            ErrorKind::MissingRequiredHeader => write!(f, "missing required header"),
            ErrorKind::RequiredHeaderNotSigned => write!(f, "required header not signed"),
            ErrorKind::SignatureInvalid => write!(f, "invalid signature"),
            ErrorKind::IncompleteRequest => write!(f, "incomplete request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_kind() {
        let err = Error::malformed_path("path must start with '/'");
        assert_eq!(err.kind(), ErrorKind::MalformedPath);
        assert_eq!(
            err.to_string(),
            "malformed path: path must start with '/'"
        );
    }

    #[test]
    fn test_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::config_invalid("failed to read key file").with_source(io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_verification_failure_grouping() {
        assert!(Error::signature_invalid("x").is_verification_failure());
        assert!(Error::unknown_key_id("x").is_verification_failure());
        assert!(!Error::incomplete_request("x").is_verification_failure());
        assert!(Error::key_mismatch("x").is_key_error());
        assert!(!Error::malformed_token("x").is_key_error());
    }
}
