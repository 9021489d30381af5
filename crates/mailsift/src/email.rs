//! Parsed email model and typed header resolution.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::address::{Address, parse_address, parse_address_list};
use crate::encoding::decode_mime_sentence;
use crate::error::{Error, Result};
use crate::header::Headers;

/// A decoded body part: normalized `type/subtype`, content-type parameters
/// and the transfer-decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    /// Normalized `type/subtype` string.
    pub content_type: String,
    /// Content-type parameters (charset etc.), keys lowercased.
    pub params: HashMap<String, String>,
    /// Transfer-decoded content.
    pub data: Vec<u8>,
}

/// A body that originated from a `text/plain` part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextBody {
    /// The underlying decoded body.
    pub body: Body,
}

/// A body that originated from a `text/html` part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HtmlBody {
    /// The underlying decoded body.
    pub body: Body,
}

/// A downloadable file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attachment {
    /// Filename from the disposition `filename` parameter, falling back to
    /// the content-type `name` parameter; MIME-decoded, possibly empty.
    pub filename: String,
    /// The raw Content-Type header value up to the first `;`.
    pub content_type: String,
    /// Transfer-decoded content.
    pub data: Vec<u8>,
}

/// Inline content referenced from the HTML body by content id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbeddedFile {
    /// Content-Id with surrounding angle brackets removed.
    pub cid: String,
    /// The full raw Content-Type header value, parameters included.
    pub content_type: String,
    /// Transfer-decoded content.
    pub data: Vec<u8>,
}

/// The result of parsing one RFC 5322 message.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Email {
    /// All headers with RFC 2047 encoded words resolved, for fields without
    /// a dedicated typed accessor.
    pub header: Headers,

    /// Decoded Subject.
    pub subject: String,
    /// Sender mailbox.
    pub sender: Option<Address>,
    /// From mailboxes.
    pub from: Vec<Address>,
    /// Reply-To mailboxes.
    pub reply_to: Vec<Address>,
    /// To mailboxes.
    pub to: Vec<Address>,
    /// Cc mailboxes.
    pub cc: Vec<Address>,
    /// Bcc mailboxes.
    pub bcc: Vec<Address>,
    /// Date header.
    pub date: Option<DateTime<FixedOffset>>,
    /// Message-ID with angle brackets removed.
    pub message_id: String,
    /// In-Reply-To message ids.
    pub in_reply_to: Vec<String>,
    /// References message ids.
    pub references: Vec<String>,

    /// Resent-From mailboxes.
    pub resent_from: Vec<Address>,
    /// Resent-Sender mailbox.
    pub resent_sender: Option<Address>,
    /// Resent-To mailboxes.
    pub resent_to: Vec<Address>,
    /// Resent-Date header.
    pub resent_date: Option<DateTime<FixedOffset>>,
    /// Resent-Cc mailboxes.
    pub resent_cc: Vec<Address>,
    /// Resent-Bcc mailboxes.
    pub resent_bcc: Vec<Address>,
    /// Resent-Message-ID with angle brackets removed.
    pub resent_message_id: String,

    /// The raw outer Content-Type header value.
    pub content_type: String,
    /// Decoded message content when the outer type is neither text nor
    /// multipart.
    pub content: Option<Vec<u8>>,

    /// All `text/html` leaf content concatenated in document order.
    pub html_body: String,
    /// All `text/plain` leaf content concatenated in document order.
    pub text_body: String,

    /// File attachments in first-encountered order.
    pub attachments: Vec<Attachment>,
    /// Embedded files in first-encountered order.
    pub embedded_files: Vec<EmbeddedFile>,

    /// Every `text/html` leaf as a decoded body, in document order.
    pub html_bodies: Vec<HtmlBody>,
    /// Every `text/plain` leaf as a decoded body, in document order.
    pub text_bodies: Vec<TextBody>,
}

impl Email {
    /// Resolves every typed header field from the raw header map.
    ///
    /// The first address or date grammar failure aborts with that single
    /// error; later fields are not parsed once a failure is latched.
    pub(crate) fn from_headers(headers: &Headers) -> Result<Self> {
        let mut hp = HeaderParser::default();

        let email = Self {
            subject: decode_mime_sentence(headers.get("subject").unwrap_or_default()),
            from: hp.address_list(headers.get("from")),
            sender: hp.address(headers.get("sender")),
            reply_to: hp.address_list(headers.get("reply-to")),
            to: hp.address_list(headers.get("to")),
            cc: hp.address_list(headers.get("cc")),
            bcc: hp.address_list(headers.get("bcc")),
            date: hp.date(headers.get("date")),
            resent_from: hp.address_list(headers.get("resent-from")),
            resent_sender: hp.address(headers.get("resent-sender")),
            resent_to: hp.address_list(headers.get("resent-to")),
            resent_cc: hp.address_list(headers.get("resent-cc")),
            resent_bcc: hp.address_list(headers.get("resent-bcc")),
            resent_message_id: hp.message_id(headers.get("resent-message-id")),
            message_id: hp.message_id(headers.get("message-id")),
            in_reply_to: hp.message_id_list(headers.get("in-reply-to")),
            references: hp.message_id_list(headers.get("references")),
            resent_date: hp.date(headers.get("resent-date")),
            header: headers.decode_values(),
            ..Self::default()
        };

        match hp.err {
            Some(err) => Err(err),
            None => Ok(email),
        }
    }
}

/// Fail-fast typed header field parser.
///
/// The first grammar failure is latched; every later call returns a zero
/// value without parsing, so exactly one error surfaces per message.
#[derive(Debug, Default)]
struct HeaderParser {
    err: Option<Error>,
}

impl HeaderParser {
    fn address(&mut self, raw: Option<&str>) -> Option<Address> {
        if self.err.is_some() {
            return None;
        }
        let raw = raw.unwrap_or_default();
        if raw.trim_matches([' ', '\n']).is_empty() {
            return None;
        }
        match parse_address(raw) {
            Ok(addr) => Some(addr),
            Err(err) => {
                self.err = Some(err);
                None
            }
        }
    }

    fn address_list(&mut self, raw: Option<&str>) -> Vec<Address> {
        if self.err.is_some() {
            return Vec::new();
        }
        let raw = raw.unwrap_or_default();
        if raw.trim_matches([' ', '\n']).is_empty() {
            return Vec::new();
        }
        match parse_address_list(raw) {
            Ok(addrs) => addrs,
            Err(err) => {
                self.err = Some(err);
                Vec::new()
            }
        }
    }

    fn date(&mut self, raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
        if self.err.is_some() {
            return None;
        }
        let raw = raw.unwrap_or_default();
        if raw.is_empty() {
            return None;
        }
        match parse_date(raw) {
            Ok(date) => Some(date),
            Err(err) => {
                self.err = Some(err);
                None
            }
        }
    }

    fn message_id(&mut self, raw: Option<&str>) -> String {
        if self.err.is_some() {
            return String::new();
        }
        strip_message_id(raw.unwrap_or_default())
    }

    fn message_id_list(&mut self, raw: Option<&str>) -> Vec<String> {
        if self.err.is_some() {
            return Vec::new();
        }
        raw.unwrap_or_default()
            .split_whitespace()
            .map(strip_message_id)
            .collect()
    }
}

fn strip_message_id(raw: &str) -> String {
    raw.trim_matches(['<', '>', ' ']).to_string()
}

/// Tries the supported RFC 1123-style timestamp layouts in order: numeric
/// zone with padded then unpadded day, then both again with one trailing
/// parenthetical zone comment removed (a comment is not expressible as a
/// chrono format item).
fn parse_date(raw: &str) -> Result<DateTime<FixedOffset>> {
    const FORMATS: [&str; 2] = ["%a, %d %b %Y %H:%M:%S %z", "%a, %e %b %Y %H:%M:%S %z"];

    for format in FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    if raw.ends_with(')') {
        if let Some(start) = raw.rfind('(') {
            let stripped = raw[..start].trim_end();
            for format in FORMATS {
                if let Ok(parsed) = DateTime::parse_from_str(stripped, format) {
                    return Ok(parsed);
                }
            }
        }
    }

    Err(Error::InvalidHeader(format!("unparsable date: {raw}")))
}
