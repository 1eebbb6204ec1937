use crate::error::ExtractError;
use crate::extractor::EmailFields;
use cfb::CompoundFile;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const KIND: &str = "email";

// MAPI property tags stored as top-level `__substg1.0_<tag><type>` streams.
const PR_TRANSPORT_MESSAGE_HEADERS: &str = "007D";
const PR_SENDER_NAME: &str = "0C1A";
const PR_SENDER_EMAIL_ADDRESS: &str = "0C1F";
const PR_SENDER_SMTP_ADDRESS: &str = "5D01";
const PR_DISPLAY_TO: &str = "0E04";
const PR_DISPLAY_CC: &str = "0E03";

const UNICODE_STRING: &str = "001F";
const ANSI_STRING: &str = "001E";

/// Read sender, recipients and CC from an Outlook `.msg` container.
///
/// RFC 822 transport headers win when the message has them; otherwise the
/// MAPI display properties are used. Dates are not read.
pub fn read_message_fields(path: &Path) -> Result<EmailFields, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let mut message =
        CompoundFile::open(file).map_err(|e| ExtractError::malformed(KIND, path, e))?;

    let headers = read_string_property(&mut message, PR_TRANSPORT_MESSAGE_HEADERS)
        .map(|raw| parse_headers(&raw))
        .unwrap_or_default();

    let from = header_value(&headers, "from").or_else(|| sender_from_properties(&mut message));
    let to = header_value(&headers, "to")
        .or_else(|| read_string_property(&mut message, PR_DISPLAY_TO));
    let cc = header_value(&headers, "cc")
        .or_else(|| read_string_property(&mut message, PR_DISPLAY_CC));

    Ok(EmailFields { from, to, cc })
}

fn sender_from_properties(message: &mut CompoundFile<File>) -> Option<String> {
    let name = read_string_property(message, PR_SENDER_NAME);
    let address = read_string_property(message, PR_SENDER_SMTP_ADDRESS)
        .or_else(|| read_string_property(message, PR_SENDER_EMAIL_ADDRESS));

    match (name, address) {
        (Some(name), Some(address)) if name != address => Some(format!("{} <{}>", name, address)),
        (_, Some(address)) => Some(address),
        (Some(name), None) => Some(name),
        (None, None) => None,
    }
}

fn read_string_property(message: &mut CompoundFile<File>, tag: &str) -> Option<String> {
    if let Some(bytes) = read_stream(message, &format!("/__substg1.0_{}{}", tag, UNICODE_STRING)) {
        return non_empty(decode_utf16le(&bytes));
    }

    read_stream(message, &format!("/__substg1.0_{}{}", tag, ANSI_STRING))
        .and_then(|bytes| non_empty(decode_ansi(&bytes)))
}

fn read_stream(message: &mut CompoundFile<File>, stream_path: &str) -> Option<Vec<u8>> {
    if !message.is_stream(stream_path) {
        return None;
    }

    let mut stream = message.open_stream(stream_path).ok()?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).ok()?;
    Some(bytes)
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn decode_ansi(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim_end_matches('\0').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Unfold an RFC 822 header block into `(lowercase name, value)` pairs.
fn parse_headers(raw: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in raw.lines() {
        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    headers
}

fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| non_empty(value.clone()))
}
