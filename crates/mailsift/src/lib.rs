//! # mailsift
//!
//! RFC 5322 email parsing library with recursive MIME multipart resolution.
//!
//! ## Features
//!
//! - **Typed headers**: addresses, dates, message ids and subject decoded
//!   into typed fields, with RFC 2047 encoded-word support
//! - **Multipart resolution**: recursive descent over `multipart/mixed`,
//!   `multipart/alternative` and `multipart/related` trees of arbitrary
//!   shape, with a nesting-depth ceiling for mixed containers
//! - **Body extraction**: flattened plain-text and HTML bodies plus the
//!   ordered list of every text/HTML part
//! - **Attachments and embedded files**: disposition-based attachments and
//!   content-id referenced inline files, transfer-decoded
//! - **Encoding support**: Base64, quoted-printable and identity transfer
//!   encodings
//!
//! ## Quick Start
//!
//! ```ignore
//! let raw = "From: sender@example.com\r\n\
//!            To: recipient@example.com\r\n\
//!            Subject: Test\r\n\
//!            Content-Type: text/plain\r\n\
//!            \r\n\
//!            Hello, World!";
//!
//! let email = mailsift::parse(raw.as_bytes())?;
//! println!("Subject: {}", email.subject);
//! println!("Body: {}", email.text_body);
//! ```
//!
//! ## Multipart Messages
//!
//! ```ignore
//! let email = mailsift::parse(&raw_multipart_message)?;
//!
//! for body in &email.text_bodies {
//!     println!("text part ({} bytes)", body.body.data.len());
//! }
//! for attachment in &email.attachments {
//!     println!("attachment: {}", attachment.filename);
//! }
//! for embedded in &email.embedded_files {
//!     println!("inline file: cid {}", embedded.cid);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod email;
mod error;
mod header;
mod message;
mod multipart;
mod part;

pub mod encoding;

pub use address::Address;
pub use content_type::{ContentDisposition, ContentType};
pub use email::{Attachment, Body, Email, EmbeddedFile, HtmlBody, TextBody};
pub use error::{Error, Result};
pub use header::Headers;
pub use message::parse;
