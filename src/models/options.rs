use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// A single sender/recipient entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Address {
    /// Raw address or `Name <address>` form, used as-is
    Text(String),
    Mailbox {
        #[serde(default)]
        name: Option<String>,
        address: String,
    },
    /// Anything else found in JSON input; never rendered
    Invalid(Value),
}

impl Address {
    pub fn mailbox(name: impl Into<String>, address: impl Into<String>) -> Self {
        Address::Mailbox {
            name: Some(name.into()),
            address: address.into(),
        }
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Address::Text(address.to_string())
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Address::Text(address)
    }
}

/// One address entry or an ordered list of them
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Many(Vec<Address>),
    One(Address),
}

impl Recipients {
    pub fn entries(&self) -> &[Address] {
        match self {
            Recipients::Many(list) => list,
            Recipients::One(address) => std::slice::from_ref(address),
        }
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Recipients::One(address.into())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Recipients::One(address.into())
    }
}

impl From<Address> for Recipients {
    fn from(address: Address) -> Self {
        Recipients::One(address)
    }
}

impl From<Vec<Address>> for Recipients {
    fn from(list: Vec<Address>) -> Self {
        Recipients::Many(list)
    }
}

/// Attachment body, either raw bytes or a string to decode
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttachmentContent {
    Text(String),
    Bytes(Vec<u8>),
}

/// A generic attachment.
///
/// Setting `cid` turns the attachment into an inline one; the cid is then
/// also used as its filename. File paths are accepted here but rejected at
/// send time since Mailgun needs the content in the request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub content: Option<AttachmentContent>,
    /// Encoding of string content (`utf8`, `base64`, `hex`, `latin1`, ...)
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub known_length: Option<u64>,
}

impl Attachment {
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: Some(AttachmentContent::Bytes(data)),
            ..Default::default()
        }
    }

    pub fn from_text(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            content: Some(AttachmentContent::Text(content.into())),
            ..Default::default()
        }
    }

    pub fn inline(cid: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            cid: Some(cid.into()),
            content: Some(AttachmentContent::Bytes(data)),
            ..Default::default()
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_known_length(mut self, length: u64) -> Self {
        self.known_length = Some(length);
        self
    }
}

/// Message priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// Exact, case-sensitive match on `high`, `normal` or `low`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "high" => Some(Priority::High),
            "normal" => Some(Priority::Normal),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Provider-agnostic options for one send request.
///
/// Every field is optional. Anything without a dedicated field (custom
/// `h:` headers, `v:` variables, `o:` options, `recipient-variables`, ...)
/// goes into `fields` under its provider key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawMailOptions")]
pub struct MailOptions {
    pub from: Option<Recipients>,
    pub to: Option<Recipients>,
    pub cc: Option<Recipients>,
    pub bcc: Option<Recipients>,
    pub reply_to: Option<Recipients>,
    pub message_id: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub template: Option<String>,
    pub attachments: Vec<Attachment>,
    pub priority: Option<Priority>,
    pub fields: BTreeMap<String, String>,
}

impl MailOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: impl Into<Recipients>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn to(mut self, to: impl Into<Recipients>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<Recipients>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<Recipients>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<Recipients>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set a raw provider field, e.g. `recipient-variables`
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Custom MIME header, sent as `h:<name>`
    pub fn header(self, name: &str, value: impl Into<String>) -> Self {
        self.field(format!("h:{}", name), value)
    }

    /// Custom variable, sent as `v:<name>`
    pub fn variable(self, name: &str, value: impl Into<String>) -> Self {
        self.field(format!("v:{}", name), value)
    }

    /// Provider option, sent as `o:<name>`
    pub fn option(self, name: &str, value: impl Into<String>) -> Self {
        self.field(format!("o:{}", name), value)
    }
}

/// JSON shape of [`MailOptions`], as produced by nodemailer-style callers
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMailOptions {
    #[serde(default)]
    from: Option<Recipients>,
    #[serde(default)]
    to: Option<Recipients>,
    #[serde(default)]
    cc: Option<Recipients>,
    #[serde(default)]
    bcc: Option<Recipients>,
    #[serde(default)]
    reply_to: Option<Recipients>,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl From<RawMailOptions> for MailOptions {
    fn from(raw: RawMailOptions) -> Self {
        let fields = raw
            .extra
            .into_iter()
            .map(|(key, value)| (key, field_text(value)))
            .collect();

        MailOptions {
            from: raw.from,
            to: raw.to,
            cc: raw.cc,
            bcc: raw.bcc,
            reply_to: raw.reply_to,
            message_id: raw.message_id,
            subject: raw.subject,
            text: raw.text,
            html: raw.html,
            template: raw.template,
            attachments: raw.attachments.unwrap_or_default(),
            priority: raw.priority.as_deref().and_then(Priority::from_name),
            fields,
        }
    }
}

/// Flatten a JSON value into form text. Falsy values become empty and are
/// dropped later by the whitelist.
fn field_text(value: Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::String(s) => s,
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.is_empty() => String::new(),
        other => other.to_string(),
    }
}
