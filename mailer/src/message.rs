//! RFC 2822 message assembly.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

use crate::digest::Digest;

const BOUNDARY: &str = "outdoor-jobs-digest-boundary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Digest addressed to `recipient`; the sending account is the recipient too.
    pub fn from_digest(digest: &Digest, recipient: &str) -> Self {
        Self {
            from: recipient.to_string(),
            to: recipient.to_string(),
            subject: digest.subject.clone(),
            html: digest.html.clone(),
        }
    }

    /// `multipart/alternative` message with a single base64 HTML part.
    pub fn to_rfc2822(&self) -> String {
        let body = STANDARD.encode(self.html.as_bytes());

        let mut out = String::new();
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str(&format!("Subject: {}\r\n", encode_header(&self.subject)));
        out.push_str(&format!("From: {}\r\n", self.from));
        out.push_str(&format!("To: {}\r\n", self.to));
        out.push_str(&format!(
            "Content-Type: multipart/alternative; boundary=\"{}\"\r\n\r\n",
            BOUNDARY
        ));
        out.push_str(&format!("--{}\r\n", BOUNDARY));
        out.push_str("Content-Type: text/html; charset=\"utf-8\"\r\n");
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        for line in body.as_bytes().chunks(76) {
            // base64 output is ASCII
            out.push_str(&String::from_utf8_lossy(line));
            out.push_str("\r\n");
        }
        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        out
    }

    /// URL-safe base64 of the whole message, as the Gmail `raw` field expects.
    pub fn to_raw(&self) -> String {
        URL_SAFE.encode(self.to_rfc2822().as_bytes())
    }
}

// RFC 2047 encoded-word for non-ASCII subjects
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?b?{}?=", STANDARD.encode(value.as_bytes()))
    }
}
