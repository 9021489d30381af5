//! Error types for email parsing.

use std::string::FromUtf8Error;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Email parsing error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header field that failed address or date grammar.
    #[error("Invalid header field: {0}")]
    InvalidHeader(String),

    /// Unparsable Content-Type or Content-Disposition value.
    #[error("Invalid media type: {0}")]
    InvalidMediaType(String),

    /// Unrecognized Content-Transfer-Encoding tag.
    #[error("Unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    /// Malformed quoted-printable or RFC 2047 encoded data.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// Multipart container without a boundary parameter.
    #[error("Missing boundary in multipart content type")]
    MissingBoundary,

    /// Malformed multipart boundary structure.
    #[error("Invalid multipart structure: {0}")]
    InvalidMultipart(String),

    /// multipart/mixed containers nested beyond the supported depth.
    #[error("Nested multipart/mixed above maximum depth")]
    NestingTooDeep,

    /// A part whose content type matches no classification rule.
    #[error("Cannot process multipart/{container} inner media type: {content_type}")]
    UnrecognizedPart {
        /// The container being resolved (mixed, alternative or related).
        container: &'static str,
        /// The content type that could not be classified.
        content_type: String,
    },
}
