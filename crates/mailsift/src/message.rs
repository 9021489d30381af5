//! Top-level message dispatch.

use std::collections::HashMap;

use crate::content_type::ContentType;
use crate::email::{Body, Email, HtmlBody, TextBody};
use crate::encoding::decode_content;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::multipart::{Container, Resolved, push_stripped, resolve};

/// Parses a raw RFC 5322 message into an [`Email`].
///
/// The outer Content-Type decides the route: `multipart/signed` and
/// `multipart/mixed` resolve as mixed, `multipart/alternative` and
/// `multipart/related` as their own container kinds, bare `text/plain` /
/// `text/html` become single-body messages, and anything else is decoded as
/// opaque content. An absent Content-Type means `text/plain`.
///
/// # Errors
///
/// Returns the first header grammar failure, or any media-type, transfer
/// encoding, multipart structure or classification error raised during
/// resolution. No partial result is returned on error.
pub fn parse(data: &[u8]) -> Result<Email> {
    let (headers, body) = read_message(data);

    let mut email = Email::from_headers(&headers)?;
    email.content_type = headers
        .get("content-type")
        .unwrap_or_default()
        .to_string();
    let (content_type, params) = parse_outer_content_type(&email.content_type)?;
    let transfer_encoding = headers
        .get("content-transfer-encoding")
        .unwrap_or_default()
        .to_string();

    tracing::trace!(content_type = %content_type, "dispatching message");

    match content_type.as_str() {
        "multipart/signed" | "multipart/mixed" => {
            apply(resolve(body, &boundary(&params)?, Container::Mixed, 1)?, &mut email);
        }
        "multipart/alternative" => {
            apply(
                resolve(body, &boundary(&params)?, Container::Alternative, 1)?,
                &mut email,
            );
        }
        "multipart/related" => {
            apply(resolve(body, &boundary(&params)?, Container::Related, 1)?, &mut email);
        }
        "text/plain" => {
            push_stripped(&mut email.text_body, &String::from_utf8_lossy(body));
            email.text_bodies = vec![TextBody {
                body: Body {
                    content_type,
                    params,
                    data: decode_content(body, &transfer_encoding)?,
                },
            }];
        }
        "text/html" => {
            push_stripped(&mut email.html_body, &String::from_utf8_lossy(body));
            email.html_bodies = vec![HtmlBody {
                body: Body {
                    content_type,
                    params,
                    data: decode_content(body, &transfer_encoding)?,
                },
            }];
        }
        _ => email.content = Some(decode_content(body, &transfer_encoding)?),
    }

    Ok(email)
}

/// An empty outer Content-Type defaults to `text/plain` with no parameters;
/// it is never an error.
fn parse_outer_content_type(raw: &str) -> Result<(String, HashMap<String, String>)> {
    if raw.is_empty() {
        return Ok(("text/plain".to_string(), HashMap::new()));
    }
    let ct = ContentType::parse(raw)?;
    Ok((ct.essence(), ct.parameters))
}

fn boundary(params: &HashMap<String, String>) -> Result<String> {
    params
        .get("boundary")
        .cloned()
        .ok_or(Error::MissingBoundary)
}

fn apply(resolved: Resolved, email: &mut Email) {
    email.text_body = resolved.text_body;
    email.html_body = resolved.html_body;
    email.attachments = resolved.attachments;
    email.embedded_files = resolved.embedded_files;
    email.text_bodies = resolved.text_bodies;
    email.html_bodies = resolved.html_bodies;
}

/// Splits a raw message into its header block and body at the first blank
/// line. A message without a separator is treated as all header.
fn read_message(data: &[u8]) -> (Headers, &[u8]) {
    let (header_bytes, body) = split_at_blank_line(data);
    (
        Headers::parse(&String::from_utf8_lossy(header_bytes)),
        body,
    )
}

fn split_at_blank_line(data: &[u8]) -> (&[u8], &[u8]) {
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'\n' {
            let rest = &data[i + 1..];
            if rest.starts_with(b"\r\n") {
                return (&data[..=i], &data[i + 3..]);
            }
            if rest.first() == Some(&b'\n') {
                return (&data[..=i], &data[i + 2..]);
            }
        }
        i += 1;
    }
    (data, &[])
}
