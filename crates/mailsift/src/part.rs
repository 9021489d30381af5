//! Single MIME body part with eagerly parsed structural headers.

use std::borrow::Cow;

use crate::content_type::{ContentDisposition, ContentType};
use crate::email::Body;
use crate::encoding::decode_content;
use crate::error::Result;
use crate::header::Headers;

/// One multipart segment during resolution.
///
/// The raw body bytes are owned, so the same content can be read once as
/// text for body aggregation and independently decoded for attachment or
/// embedded-file payloads.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    headers: Headers,
    content_type: ContentType,
    disposition: Option<ContentDisposition>,
    transfer_encoding: String,
    body: Vec<u8>,
}

impl Part {
    /// Wraps a raw segment, parsing Content-Type and, when present,
    /// Content-Disposition. Either failing to parse is fatal for the whole
    /// resolution, not just this part.
    pub fn new(headers: Headers, body: Vec<u8>) -> Result<Self> {
        let content_type = ContentType::parse(headers.get("content-type").unwrap_or_default())?;
        let disposition = match headers.get("content-disposition") {
            Some(value) if !value.is_empty() => Some(ContentDisposition::parse(value)?),
            _ => None,
        };
        let transfer_encoding = headers
            .get("content-transfer-encoding")
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            headers,
            content_type,
            disposition,
            transfer_encoding,
            body,
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn transfer_encoding(&self) -> &str {
        &self.transfer_encoding
    }

    pub fn has_transfer_encoding(&self) -> bool {
        !self.transfer_encoding.is_empty()
    }

    /// The disposition filename parameter, or empty when absent.
    pub fn filename(&self) -> &str {
        self.disposition
            .as_ref()
            .and_then(ContentDisposition::filename)
            .unwrap_or_default()
    }

    /// Whether this part should short-circuit as a file attachment: a
    /// non-empty disposition filename, or a literal `attachment`
    /// disposition.
    pub fn is_attachment(&self) -> bool {
        !self.filename().is_empty()
            || self
                .disposition
                .as_ref()
                .is_some_and(|d| d.disposition == "attachment")
    }

    /// Raw (still transfer-encoded) content as text, for body aggregation.
    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Raw (still transfer-encoded) content bytes.
    pub fn raw(&self) -> &[u8] {
        &self.body
    }

    /// Decodes the content through this part's transfer encoding, yielding
    /// a [`Body`] carrying the part's type string and parameters.
    pub fn to_body(&self) -> Result<Body> {
        Ok(Body {
            content_type: self.content_type.essence(),
            params: self.content_type.parameters.clone(),
            data: decode_content(&self.body, &self.transfer_encoding)?,
        })
    }
}
