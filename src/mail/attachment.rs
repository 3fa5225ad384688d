//! Attachment classification into Mailgun's `attachment` and `inline` lists

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::{Result, TransportError};
use crate::models::{Attachment, AttachmentContent, CustomFile};

/// Lenient engine: padding optional and stray low bits ignored, like Node's
/// `Buffer.from(s, "base64")`
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Attachments split by disposition. Empty buckets are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedAttachments {
    pub attachment: Option<Vec<CustomFile>>,
    pub inline: Option<Vec<CustomFile>>,
}

/// Split attachments into regular and inline files.
///
/// Entries with neither content nor path are skipped. An entry with only a
/// path fails the whole batch with [`TransportError::UnsupportedAttachment`].
pub fn make_attachments(attachments: &[Attachment]) -> Result<ClassifiedAttachments> {
    let mut regular = Vec::new();
    let mut inline = Vec::new();

    for (index, item) in attachments.iter().enumerate() {
        let data = match &item.content {
            Some(content) => decode_content(content, item.encoding.as_deref())?,
            None if item.path.is_some() => return Err(TransportError::UnsupportedAttachment),
            None => {
                tracing::debug!(index, "Skipping attachment without content");
                continue;
            }
        };

        let cid = non_empty(&item.cid);
        let file = CustomFile {
            data,
            filename: cid.or_else(|| non_empty(&item.filename)).map(str::to_string),
            content_type: non_empty(&item.content_type).map(str::to_string),
            known_length: item.known_length.filter(|length| *length > 0),
        };

        if cid.is_some() {
            inline.push(file);
        } else {
            regular.push(file);
        }
    }

    Ok(ClassifiedAttachments {
        attachment: (!regular.is_empty()).then_some(regular),
        inline: (!inline.is_empty()).then_some(inline),
    })
}

/// Resolve attachment content to bytes using a Node-style encoding name
pub fn decode_content(content: &AttachmentContent, encoding: Option<&str>) -> Result<Vec<u8>> {
    let text = match content {
        AttachmentContent::Bytes(bytes) => return Ok(bytes.clone()),
        AttachmentContent::Text(text) => text,
    };

    let encoding = encoding.unwrap_or("utf8").to_ascii_lowercase();
    match encoding.as_str() {
        "utf8" | "utf-8" => Ok(text.as_bytes().to_vec()),
        "base64" | "base64url" => Ok(decode_base64(text)),
        "hex" => Ok(decode_hex(text)),
        // Node keeps the low byte of each UTF-16 code unit for these
        "binary" | "latin1" | "ascii" => Ok(text.encode_utf16().map(|unit| unit as u8).collect()),
        "ucs2" | "ucs-2" | "utf16le" | "utf-16le" => Ok(text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect()),
        other => Err(TransportError::InvalidAttachment(format!(
            "unknown encoding: {}",
            other
        ))),
    }
}

/// Decode every `=`-separated chunk, skipping characters outside the
/// standard and URL-safe alphabets. Never fails.
fn decode_base64(text: &str) -> Vec<u8> {
    let mut data = Vec::new();

    for chunk in text.split('=') {
        let mut symbols: String = chunk
            .chars()
            .filter_map(|c| match c {
                '-' => Some('+'),
                '_' => Some('/'),
                c if c.is_ascii_alphanumeric() || c == '+' || c == '/' => Some(c),
                _ => None,
            })
            .collect();

        // a single leftover symbol holds less than one byte
        if symbols.len() % 4 == 1 {
            symbols.pop();
        }

        if let Ok(bytes) = BASE64.decode(&symbols) {
            data.extend(bytes);
        }
    }

    data
}

/// Decode leading hex pairs, stopping at the first invalid one
fn decode_hex(text: &str) -> Vec<u8> {
    text.as_bytes()
        .chunks_exact(2)
        .map_while(|pair| hex::decode(pair).ok())
        .flatten()
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
