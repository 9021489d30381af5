//! Transfer-encoding and RFC 2047 header decoding.
//!
//! Supports quoted-printable, Base64 and the identity encodings for body
//! content, plus `=?charset?B|Q?text?=` encoded words for header values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Decodes a body according to its Content-Transfer-Encoding tag.
///
/// `7bit`, `8bit` and an empty tag pass the bytes through unchanged.
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncoding`] for an unrecognized tag, or the
/// underlying decode error for malformed quoted-printable/Base64 data.
pub fn decode_content(data: &[u8], encoding: &str) -> Result<Vec<u8>> {
    match encoding.to_ascii_lowercase().as_str() {
        "quoted-printable" => decode_quoted_printable(data),
        "base64" => decode_base64(data),
        "7bit" | "8bit" | "" => Ok(data.to_vec()),
        _ => Err(Error::UnsupportedEncoding(encoding.to_string())),
    }
}

/// Decodes Base64 data, tolerating the line wrapping mandated for bodies.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes quoted-printable data (RFC 2045).
///
/// Handles `=XY` hex escapes in either case and `=\r\n` / `=\n` soft line
/// breaks.
///
/// # Errors
///
/// Returns an error if the input contains a truncated or non-hex escape.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'=' => {
                let rest = &data[i + 1..];
                if rest.starts_with(b"\r\n") {
                    i += 3;
                } else if rest.first() == Some(&b'\n') {
                    i += 2;
                } else if rest.len() >= 2 {
                    out.push((hex_value(rest[0])? << 4) | hex_value(rest[1])?);
                    i += 3;
                } else {
                    return Err(Error::InvalidEncoding(
                        "truncated quoted-printable escape".to_string(),
                    ));
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn hex_value(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(Error::InvalidEncoding(format!(
            "invalid quoted-printable escape byte 0x{b:02x}"
        ))),
    }
}

/// Decodes exactly one RFC 2047 encoded word.
///
/// The whole input must be a single `=?charset?B|Q?text?=` token; anything
/// else fails so callers can fall back to the literal text. Charsets are
/// limited to `utf-8` and `us-ascii`.
///
/// # Errors
///
/// Returns an error for inputs that are not a well-formed encoded word, use
/// an unsupported charset or encoding letter, or carry malformed payloads.
pub fn decode_encoded_word(word: &str) -> Result<String> {
    let inner = word
        .strip_prefix("=?")
        .and_then(|w| w.strip_suffix("?="))
        .ok_or_else(|| Error::InvalidEncoding(format!("not an encoded word: {word}")))?;

    let fields: Vec<&str> = inner.split('?').collect();
    let [charset, encoding, text] = fields.as_slice() else {
        return Err(Error::InvalidEncoding(format!(
            "malformed encoded word: {word}"
        )));
    };

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return Err(Error::InvalidEncoding(format!(
            "unsupported encoded word charset: {charset}"
        )));
    }

    let decoded = match *encoding {
        "B" | "b" => decode_base64(text.as_bytes())?,
        "Q" | "q" => decode_quoted_printable(text.replace('_', " ").as_bytes())?,
        _ => {
            return Err(Error::InvalidEncoding(format!(
                "unknown encoded word encoding: {encoding}"
            )));
        }
    };

    String::from_utf8(decoded).map_err(Into::into)
}

/// Decodes a header value word by word.
///
/// The value is split on single spaces and each word is decoded as an RFC
/// 2047 encoded word. A word that fails to decode is emitted verbatim with
/// its leading space re-inserted (except for the very first word), so a
/// partially malformed value keeps its original spacing. Adjacent encoded
/// words concatenate without separating spaces.
#[must_use]
pub fn decode_mime_sentence(value: &str) -> String {
    let mut out = String::new();
    for (i, word) in value.split(' ').enumerate() {
        match decode_encoded_word(word) {
            Ok(decoded) => out.push_str(&decoded),
            Err(_) => {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(word);
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_decode_base64() {
        let decoded = decode_base64(b"SGVsbG8sIFdvcmxkIQ==").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_decode_base64_wrapped_lines() {
        let decoded = decode_base64(b"SGVsbG8s\r\nIFdvcmxk\r\nIQ==").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_decode_base64_malformed() {
        assert!(matches!(
            decode_base64(b"not!base64"),
            Err(Error::Base64Decode(_))
        ));
    }

    #[test]
    fn test_decode_quoted_printable() {
        let decoded = decode_quoted_printable(b"H=C3=A9llo").unwrap();
        assert_eq!(decoded, "Héllo".as_bytes());
    }

    #[test]
    fn test_decode_quoted_printable_lowercase_hex() {
        let decoded = decode_quoted_printable(b"=c3=a9").unwrap();
        assert_eq!(decoded, "é".as_bytes());
    }

    #[test]
    fn test_decode_quoted_printable_soft_breaks() {
        assert_eq!(decode_quoted_printable(b"Hello=\r\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello=\nWorld").unwrap(), b"HelloWorld");
    }

    #[test]
    fn test_decode_quoted_printable_invalid_escape() {
        assert!(matches!(
            decode_quoted_printable(b"bad=ZZescape"),
            Err(Error::InvalidEncoding(_))
        ));
        assert!(matches!(
            decode_quoted_printable(b"truncated="),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_decode_content_passthrough() {
        for tag in ["7bit", "8bit", "", "7BIT"] {
            assert_eq!(decode_content(b"as-is\xff", tag).unwrap(), b"as-is\xff");
        }
    }

    #[test]
    fn test_decode_content_dispatch() {
        assert_eq!(
            decode_content(b"SGk=", "Base64").unwrap(),
            b"Hi"
        );
        assert_eq!(
            decode_content(b"Hi=21", "Quoted-Printable").unwrap(),
            b"Hi!"
        );
    }

    #[test]
    fn test_decode_content_unknown_tag() {
        let err = decode_content(b"x", "uuencode").unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(tag) if tag == "uuencode"));
    }

    #[test]
    fn test_decode_encoded_word_b() {
        assert_eq!(decode_encoded_word("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
    }

    #[test]
    fn test_decode_encoded_word_q() {
        assert_eq!(
            decode_encoded_word("=?UTF-8?Q?Hello=2C_World?=").unwrap(),
            "Hello, World"
        );
    }

    #[test]
    fn test_decode_encoded_word_rejects_plain_text() {
        assert!(decode_encoded_word("Hello").is_err());
        assert!(decode_encoded_word("=?utf-8?B?SGk=?=trailing").is_err());
    }

    #[test]
    fn test_decode_encoded_word_unsupported_charset() {
        assert!(decode_encoded_word("=?iso-8859-1?Q?caf=E9?=").is_err());
    }

    #[test]
    fn test_decode_mime_sentence_plain() {
        assert_eq!(decode_mime_sentence("An example subject"), "An example subject");
    }

    #[test]
    fn test_decode_mime_sentence_single_word() {
        assert_eq!(
            decode_mime_sentence("=?UTF-8?Q?Hello=2C_World?="),
            "Hello, World"
        );
    }

    #[test]
    fn test_decode_mime_sentence_adjacent_encoded_words() {
        assert_eq!(
            decode_mime_sentence("=?utf-8?Q?gro=C3=9Fe?= =?utf-8?Q?_Freude?="),
            "große Freude"
        );
    }

    #[test]
    fn test_decode_mime_sentence_malformed_word_keeps_spacing() {
        // the malformed middle word comes through verbatim, surrounded by
        // the decoded neighbors with original spacing
        assert_eq!(
            decode_mime_sentence("plain =?utf-8?X?broken?= =?utf-8?Q?fine?="),
            "plain =?utf-8?X?broken?=fine"
        );
    }

    proptest! {
        #[test]
        fn prop_quoted_printable_decodes_escaped_bytes(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let encoded: String = data.iter().map(|b| format!("={b:02X}")).collect();
            let decoded = decode_quoted_printable(encoded.as_bytes()).unwrap();
            prop_assert_eq!(decoded, data);
        }

        #[test]
        fn prop_base64_decode_inverts_encode(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let encoded = STANDARD.encode(&data);
            let decoded = decode_base64(encoded.as_bytes()).unwrap();
            prop_assert_eq!(decoded, data);
        }
    }
}
