use crate::error::Result;
use crate::models::InboundMessage;
use chrono::{DateTime, FixedOffset};
use mailparse::MailHeaderMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const MESSAGE_EXTENSION: &str = "eml";

/// Pull the `Date` and `From` headers out of one raw message.
pub fn parse_message(source: &str, raw: &[u8]) -> Result<InboundMessage> {
    let (headers, _) = mailparse::parse_headers(raw)?;

    // Keep the From header undecoded; encoded words are handled per part later.
    let from = headers.get_first_header("From").map(|header| {
        String::from_utf8_lossy(header.get_value_raw())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    });

    let date = headers
        .get_first_value("Date")
        .and_then(|value| parse_email_date(source, &value));

    Ok(InboundMessage {
        source: source.to_string(),
        date,
        from,
    })
}

/// RFC 2822 date with its original offset; falls back to mailparse's more
/// lenient parser (in UTC) for dates chrono rejects.
pub fn parse_email_date(source: &str, value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date);
    }
    match mailparse::dateparse(value) {
        Ok(timestamp) => DateTime::from_timestamp(timestamp, 0).map(|date| date.fixed_offset()),
        Err(e) => {
            warn!("Error parsing date {:?} in {}: {}", value, source, e);
            None
        }
    }
}

/// Read every `.eml` file in `directory`, in file name order. Files that
/// cannot be read or parsed are logged and skipped.
pub fn read_mail_directory<P: AsRef<Path>>(directory: P) -> Result<Vec<InboundMessage>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(directory.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some(MESSAGE_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut messages = Vec::with_capacity(paths.len());
    for path in paths {
        let source = path.display().to_string();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read {}: {}", source, e);
                continue;
            }
        };
        match parse_message(&source, &raw) {
            Ok(message) => messages.push(message),
            Err(e) => warn!("Failed to parse headers of {}: {}", source, e),
        }
    }

    debug!(
        "Read {} messages from {}",
        messages.len(),
        directory.as_ref().display()
    );
    Ok(messages)
}
