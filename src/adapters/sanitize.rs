//! Log sanitization for patient-supplied text and encoded image data.
//!
//! Questionnaire notes are free text and may contain contact details, and
//! preview `data:` URLs carry whole images. Every formatted log line passes
//! through [`SanitizingMakeWriter`], which redacts:
//! - inline `data:` URLs
//! - e-mail addresses and phone numbers
//! - bearer tokens and JWTs
//! - long base64 or hex runs
//!
//! Input longer than `DERMADETECT_SANITIZE_MAX_BYTES` (default 16 KiB) is
//! truncated before scanning.

use std::io::Write;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_MAX_BYTES: usize = 16 * 1024;

/// Rules applied in order; earlier rules win on overlapping text.
const RULES: &[(&str, &str)] = &[
    (
        r"data:[a-zA-Z]+/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/=]*",
        "[REDACTED-DATA-URL]",
    ),
    (
        r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b",
        "[REDACTED-JWT]",
    ),
    (r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]{16,}=*", "[REDACTED-TOKEN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b",
        "[REDACTED-PHONE]",
    ),
    (r"[A-Za-z0-9+/]{64,}={0,2}", "[REDACTED-BLOB]"),
    (r"\b[0-9a-fA-F]{32,}\b", "[REDACTED-HEX]"),
];

struct Patterns {
    any: RegexSet,
    each: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        any: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("valid sanitizer rules"),
        each: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("valid sanitizer rule"), *r))
            .collect(),
    })
}

fn max_bytes() -> usize {
    std::env::var("DERMADETECT_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&v: &usize| v > 0)
        .unwrap_or(DEFAULT_MAX_BYTES)
}

fn clip(input: &str, limit: usize) -> (&str, bool) {
    if input.len() <= limit {
        return (input, false);
    }
    let mut end = limit;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact sensitive fragments from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_bytes())
}

fn sanitize_with_limit(input: &str, limit: usize) -> String {
    let (text, clipped) = clip(input, limit);
    let p = patterns();

    let mut out = if p.any.is_match(text) {
        let hits: Vec<usize> = p.any.matches(text).into_iter().collect();
        hits.into_iter().fold(text.to_string(), |acc, i| {
            let (re, replacement) = &p.each[i];
            re.replace_all(&acc, *replacement).into_owned()
        })
    } else {
        text.to_string()
    };

    if clipped {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// Whether `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    patterns().any.is_match(clip(input, max_bytes()).0)
}

/// `MakeWriter` that sanitizes each formatted line before forwarding it.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            pending: Vec::new(),
        }
    }
}

/// Line-buffered writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> SanitizingWriter<W> {
    /// Sanitize one line. The terminator is written back after the body so
    /// truncation never swallows it.
    fn emit(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let (body, newline) = match bytes.strip_suffix(b"\n") {
            Some(body) => (body, true),
            None => (bytes, false),
        };
        let clean = sanitize(&String::from_utf8_lossy(body));
        self.inner.write_all(clean.as_bytes())?;
        if newline {
            self.inner.write_all(b"\n")?;
        }
        Ok(())
    }

    fn drain_lines(&mut self) -> std::io::Result<()> {
        while let Some(nl) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=nl).collect();
            self.emit(&line)?;
        }
        Ok(())
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);

        // A runaway line without newlines is flushed (and truncated) early.
        if self.pending.len() > max_bytes().saturating_mul(2) {
            let all = std::mem::take(&mut self.pending);
            self.emit(&all)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.drain_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.drain_lines()?;
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
