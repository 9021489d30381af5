//! Integration tests for the email parser.
//!
//! These tests feed complete raw messages through `mailsift::parse` and
//! check the resolved structure, without touching crate internals.

#![allow(clippy::unwrap_used)]

use mailsift::{Error, parse};

#[test]
fn test_multipart_mixed_with_alternative_and_attachment() {
    let message = concat!(
        "From: Alice <alice@example.com>\r\n",
        "To: Bob <bob@example.com>, Carol <carol@example.com>\r\n",
        "Subject: =?UTF-8?Q?Quarterly_report?=\r\n",
        "Date: Wed, 01 Aug 2018 20:11:48 +0000\r\n",
        "Message-ID: <report-1@example.com>\r\n",
        "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
        "\r\n",
        "--outer\r\n",
        "Content-Type: multipart/alternative; boundary=\"inner\"\r\n",
        "\r\n",
        "--inner\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "Numbers are up 10=25\n",
        "\r\n",
        "--inner\r\n",
        "Content-Type: text/html; charset=utf-8\r\n",
        "\r\n",
        "<p>Numbers are up 10%</p>\n",
        "\r\n",
        "--inner--\r\n",
        "--outer\r\n",
        "Content-Type: application/pdf\r\n",
        "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "JVBERg==\r\n",
        "--outer--\r\n"
    );

    let email = parse(message.as_bytes()).unwrap();

    assert_eq!(email.subject, "Quarterly report");
    assert_eq!(email.from.len(), 1);
    assert_eq!(email.from[0].name.as_deref(), Some("Alice"));
    assert_eq!(email.from[0].address, "alice@example.com");
    assert_eq!(email.to.len(), 2);
    assert_eq!(email.to[1].address, "carol@example.com");
    assert_eq!(email.date.unwrap().to_rfc3339(), "2018-08-01T20:11:48+00:00");
    assert_eq!(email.message_id, "report-1@example.com");

    // aggregates keep the raw leaf text; body lists carry the decoded view
    assert_eq!(email.text_body, "Numbers are up 10=25");
    assert_eq!(email.html_body, "<p>Numbers are up 10%</p>");
    assert_eq!(email.text_bodies.len(), 1);
    assert_eq!(email.text_bodies[0].body.data, b"Numbers are up 10%\n");
    assert_eq!(email.html_bodies.len(), 1);

    assert_eq!(email.attachments.len(), 1);
    assert_eq!(email.attachments[0].filename, "report.pdf");
    assert_eq!(email.attachments[0].content_type, "application/pdf");
    assert_eq!(email.attachments[0].data, b"%PDF");
    assert!(email.embedded_files.is_empty());
}

#[test]
fn test_multipart_related_with_inline_image() {
    let message = concat!(
        "From: alice@example.com\r\n",
        "Content-Type: multipart/related; boundary=\"rel\"\r\n",
        "\r\n",
        "--rel\r\n",
        "Content-Type: text/html\r\n",
        "\r\n",
        "<img src=\"cid:logo\">\n",
        "\r\n",
        "--rel\r\n",
        "Content-Type: image/png\r\n",
        "Content-Id: <logo@example.com>\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "iVBORw0KGgo=\r\n",
        "--rel--\r\n"
    );

    let email = parse(message.as_bytes()).unwrap();

    assert_eq!(email.html_bodies.len(), 1);
    assert_eq!(email.html_body, "<img src=\"cid:logo\">");
    assert_eq!(email.embedded_files.len(), 1);
    assert_eq!(email.embedded_files[0].cid, "logo@example.com");
    assert_eq!(email.embedded_files[0].content_type, "image/png");
    assert_eq!(email.embedded_files[0].data, b"\x89PNG\r\n\x1a\n");
    assert!(email.attachments.is_empty());
}

#[test]
fn test_calendar_invite_is_embedded() {
    let message = concat!(
        "Content-Type: multipart/mixed; boundary=\"cal\"\r\n",
        "\r\n",
        "--cal\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "See invite\r\n",
        "--cal\r\n",
        "Content-Type: text/calendar\r\n",
        "\r\n",
        "BEGIN:VCALENDAR\r\n",
        "END:VCALENDAR\r\n",
        "--cal--\r\n"
    );

    let email = parse(message.as_bytes()).unwrap();
    assert_eq!(email.text_body, "See invite");
    assert_eq!(email.embedded_files.len(), 1);
    assert!(email.embedded_files[0]
        .data
        .starts_with(b"BEGIN:VCALENDAR"));
    assert!(email.attachments.is_empty());
}

fn deep_mixed_message(levels: u32) -> String {
    let mut body = format!(
        "--m{levels}\r\nContent-Type: text/plain\r\n\r\ndeep\r\n--m{levels}--\r\n"
    );
    for level in (1..levels).rev() {
        body = format!(
            "--m{level}\r\nContent-Type: multipart/mixed; boundary=\"m{next}\"\r\n\r\n{body}\r\n--m{level}--\r\n",
            next = level + 1
        );
    }
    format!("Content-Type: multipart/mixed; boundary=\"m1\"\r\n\r\n{body}")
}

#[test]
fn test_mixed_nesting_depth_limit() {
    let email = parse(deep_mixed_message(3).as_bytes()).unwrap();
    assert_eq!(email.text_body, "deep");

    assert!(matches!(
        parse(deep_mixed_message(4).as_bytes()),
        Err(Error::NestingTooDeep)
    ));
}

#[test]
fn test_subject_with_malformed_encoded_word_keeps_spacing() {
    let message = concat!(
        "Subject: =?UTF-8?Q?ok?= =?broken?= tail\r\n",
        "\r\n",
        "body\n"
    );

    let email = parse(message.as_bytes()).unwrap();
    assert_eq!(email.subject, "ok =?broken?= tail");
}

#[test]
fn test_unrecognized_part_aborts_without_partial_result() {
    let message = concat!(
        "Content-Type: multipart/mixed; boundary=\"b\"\r\n",
        "\r\n",
        "--b\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "accumulated before the failure\r\n",
        "--b\r\n",
        "Content-Type: video/mp4\r\n",
        "\r\n",
        "frames\r\n",
        "--b--\r\n"
    );

    assert!(matches!(
        parse(message.as_bytes()),
        Err(Error::UnrecognizedPart { container: "mixed", .. })
    ));
}

#[test]
fn test_header_grammar_failure_is_fatal() {
    let message = concat!(
        "From: alice@example.com\r\n",
        "Date: some time last week\r\n",
        "\r\n",
        "body\n"
    );

    assert!(matches!(
        parse(message.as_bytes()),
        Err(Error::InvalidHeader(_))
    ));
}

#[test]
fn test_message_without_content_type_parses_as_plain() {
    let message = concat!(
        "From: alice@example.com\r\n",
        "Subject: hi\r\n",
        "\r\n",
        "just text\n"
    );

    let email = parse(message.as_bytes()).unwrap();
    assert_eq!(email.text_body, "just text");
    assert_eq!(email.content_type, "");
    assert_eq!(email.text_bodies.len(), 1);
    assert_eq!(email.text_bodies[0].body.content_type, "text/plain");
}

#[test]
fn test_extra_headers_are_decoded_in_header_map() {
    let message = concat!(
        "X-Custom: =?UTF-8?Q?decoded_value?=\r\n",
        "Subject: hi\r\n",
        "\r\n",
        "body\n"
    );

    let email = parse(message.as_bytes()).unwrap();
    assert_eq!(email.header.get("x-custom"), Some("decoded value"));
}
