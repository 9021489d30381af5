//! Boundary-delimited multipart reading and recursive content resolution.
//!
//! This is the heart of the parser: one recursion shape shared by the
//! mixed, alternative and related container semantics, differing only in
//! which nested containers they enter and whether attachment
//! short-circuiting applies.

use crate::email::{Attachment, EmbeddedFile, HtmlBody, TextBody};
use crate::encoding::{decode_content, decode_mime_sentence};
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::part::Part;

/// Contiguous multipart/mixed nesting beyond this depth aborts resolution.
const MAX_MIXED_DEPTH: u32 = 3;

/// Which container semantics the current resolution level applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Mixed,
    Alternative,
    Related,
}

impl Container {
    fn label(self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::Alternative => "alternative",
            Self::Related => "related",
        }
    }
}

/// The six accumulation channels of one resolution level. Each recursive
/// call owns its accumulators and the caller merges them by concatenation,
/// preserving depth-first document order.
#[derive(Debug, Default)]
pub(crate) struct Resolved {
    pub text_body: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
    pub embedded_files: Vec<EmbeddedFile>,
    pub text_bodies: Vec<TextBody>,
    pub html_bodies: Vec<HtmlBody>,
}

impl Resolved {
    fn merge(&mut self, nested: Self) {
        self.text_body.push_str(&nested.text_body);
        self.html_body.push_str(&nested.html_body);
        self.attachments.extend(nested.attachments);
        self.embedded_files.extend(nested.embedded_files);
        self.text_bodies.extend(nested.text_bodies);
        self.html_bodies.extend(nested.html_bodies);
    }
}

/// Resolves one multipart container: pulls sibling parts from the boundary
/// reader, classifies each, recurses into nested containers and merges the
/// results. Any failure aborts the whole resolution; no partial results
/// survive an error.
pub(crate) fn resolve(
    data: &[u8],
    boundary: &str,
    kind: Container,
    depth: u32,
) -> Result<Resolved> {
    if kind == Container::Mixed && depth > MAX_MIXED_DEPTH {
        return Err(Error::NestingTooDeep);
    }

    let mut reader = MultipartReader::new(data, boundary);
    let mut out = Resolved::default();

    while let Some((headers, body)) = reader.next_part()? {
        let part = Part::new(headers, body)?;

        if kind == Container::Mixed && part.is_attachment() {
            out.attachments.push(decode_attachment(&part)?);
            continue;
        }

        let essence = part.content_type().essence();
        tracing::trace!(container = kind.label(), content_type = %essence, "classifying part");

        match essence.as_str() {
            "text/plain" => {
                push_stripped(&mut out.text_body, &part.raw_text());
                out.text_bodies.push(TextBody {
                    body: part.to_body()?,
                });
            }
            "text/html" => {
                push_stripped(&mut out.html_body, &part.raw_text());
                out.html_bodies.push(HtmlBody {
                    body: part.to_body()?,
                });
            }
            "text/calendar" => out.embedded_files.push(decode_embedded_file(&part)?),
            "multipart/alternative" => {
                let nested = resolve(part.raw(), &nested_boundary(&part)?, Container::Alternative, depth)?;
                out.merge(nested);
            }
            "multipart/related" if kind != Container::Related => {
                let nested = resolve(part.raw(), &nested_boundary(&part)?, Container::Related, depth)?;
                out.merge(nested);
            }
            "multipart/mixed" if kind == Container::Mixed => {
                let nested = resolve(part.raw(), &nested_boundary(&part)?, Container::Mixed, depth + 1)?;
                out.merge(nested);
            }
            "multipart/mixed" if kind == Container::Alternative => {
                // entered from an alternative container, mixed nesting
                // starts counting from scratch
                let nested = resolve(part.raw(), &nested_boundary(&part)?, Container::Mixed, 1)?;
                out.merge(nested);
            }
            "application/octet-stream" if kind == Container::Mixed => {
                out.attachments.push(decode_attachment(&part)?);
            }
            other => {
                if kind != Container::Mixed && other.starts_with("text/x-") {
                    continue;
                }
                if part.has_transfer_encoding() {
                    // heuristic: a transfer encoding on an otherwise
                    // unclassified leaf marks it as inline content, even
                    // without a Content-Id
                    tracing::debug!(
                        container = kind.label(),
                        content_type = other,
                        "treating unclassified encoded part as embedded file"
                    );
                    out.embedded_files.push(decode_embedded_file(&part)?);
                } else {
                    return Err(Error::UnrecognizedPart {
                        container: kind.label(),
                        content_type: other.to_string(),
                    });
                }
            }
        }
    }

    Ok(out)
}

/// Appends one leaf's raw text to an aggregate, stripping a single
/// trailing newline.
pub(crate) fn push_stripped(aggregate: &mut String, raw: &str) {
    aggregate.push_str(raw.strip_suffix('\n').unwrap_or(raw));
}

fn nested_boundary(part: &Part) -> Result<String> {
    part.content_type()
        .boundary()
        .map(str::to_string)
        .ok_or(Error::MissingBoundary)
}

fn decode_attachment(part: &Part) -> Result<Attachment> {
    let mut filename = decode_mime_sentence(part.filename());
    if filename.is_empty() {
        if let Some(name) = part.content_type().parameters.get("name") {
            filename = decode_mime_sentence(name);
        }
    }

    Ok(Attachment {
        filename,
        content_type: part
            .headers()
            .get("content-type")
            .unwrap_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string(),
        data: decode_content(part.raw(), part.transfer_encoding())?,
    })
}

fn decode_embedded_file(part: &Part) -> Result<EmbeddedFile> {
    let cid = decode_mime_sentence(part.headers().get("content-id").unwrap_or_default());

    Ok(EmbeddedFile {
        cid: cid.trim_matches(['<', '>']).to_string(),
        content_type: part
            .headers()
            .get("content-type")
            .unwrap_or_default()
            .to_string(),
        data: decode_content(part.raw(), part.transfer_encoding())?,
    })
}

/// Streaming reader over a boundary-delimited multipart body held in
/// memory. Yields one `(headers, body)` pair per part; the preamble before
/// the first delimiter and the epilogue after the terminal delimiter are
/// ignored. CRLF and bare LF line endings are both accepted.
pub(crate) struct MultipartReader<'a> {
    data: &'a [u8],
    delimiter: Vec<u8>,
    pos: usize,
    at_parts: bool,
    finished: bool,
}

#[derive(PartialEq)]
enum Delimiter {
    /// `--boundary`: a part follows.
    Open,
    /// `--boundary--`: end of this container.
    Close,
}

impl<'a> MultipartReader<'a> {
    pub fn new(data: &'a [u8], boundary: &str) -> Self {
        Self {
            data,
            delimiter: [b"--", boundary.as_bytes()].concat(),
            pos: 0,
            at_parts: false,
            finished: false,
        }
    }

    /// Pulls the next sibling part, or `None` when the terminal delimiter
    /// has been reached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMultipart`] when the opening or terminal
    /// delimiter is missing or a part's header block is truncated.
    pub fn next_part(&mut self) -> Result<Option<(Headers, Vec<u8>)>> {
        if self.finished {
            return Ok(None);
        }

        if !self.at_parts {
            loop {
                let Some(line) = self.next_line() else {
                    return Err(Error::InvalidMultipart(
                        "no opening boundary found".to_string(),
                    ));
                };
                match self.classify(line) {
                    Some(Delimiter::Open) => break,
                    Some(Delimiter::Close) => {
                        self.finished = true;
                        return Ok(None);
                    }
                    None => {}
                }
            }
            self.at_parts = true;
        }

        let header_start = self.pos;
        let header_end;
        loop {
            let line_start = self.pos;
            let Some(line) = self.next_line() else {
                return Err(Error::InvalidMultipart(
                    "truncated part header block".to_string(),
                ));
            };
            if strip_cr(line).is_empty() {
                header_end = line_start;
                break;
            }
        }

        let body_start = self.pos;
        loop {
            let line_start = self.pos;
            let Some(line) = self.next_line() else {
                return Err(Error::InvalidMultipart(
                    "missing terminal boundary".to_string(),
                ));
            };
            if let Some(which) = self.classify(line) {
                if which == Delimiter::Close {
                    self.finished = true;
                }
                let headers =
                    Headers::parse(&String::from_utf8_lossy(&self.data[header_start..header_end]));
                let body = self.data[body_start..body_end(self.data, body_start, line_start)].to_vec();
                return Ok(Some((headers, body)));
            }
        }
    }

    /// Returns the next line without its trailing `\n` and advances past
    /// it. The final line is returned even without a newline.
    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => {
                self.pos += nl + 1;
                Some(&rest[..nl])
            }
            None => {
                self.pos = self.data.len();
                Some(rest)
            }
        }
    }

    /// Classifies a line as an opening or closing delimiter, tolerating
    /// transport padding (trailing spaces and tabs).
    fn classify(&self, line: &[u8]) -> Option<Delimiter> {
        let line = strip_cr(line);
        let rest = line.strip_prefix(self.delimiter.as_slice())?;
        let rest = strip_padding(rest);
        if rest.is_empty() {
            return Some(Delimiter::Open);
        }
        if strip_padding(rest.strip_prefix(b"--")?).is_empty() {
            return Some(Delimiter::Close);
        }
        None
    }
}

/// The part body ends before the line break that precedes the delimiter.
fn body_end(data: &[u8], body_start: usize, delimiter_start: usize) -> usize {
    let mut end = delimiter_start;
    if end > body_start && data[end - 1] == b'\n' {
        end -= 1;
        if end > body_start && data[end - 1] == b'\r' {
            end -= 1;
        }
    }
    end
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn strip_padding(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |i| i + 1);
    &line[..end]
}
