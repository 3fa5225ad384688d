//! Field whitelist: which option keys reach Mailgun, and under what name

use crate::models::{FieldValue, MessageData};

/// Field name carrying the generic priority until it is translated
pub const PRIORITY_KEY: &str = "priority";

/// One whitelist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Exact name match, optionally renamed to `target`
    Exact {
        name: &'static str,
        target: Option<&'static str>,
    },
    /// Any name starting with the prefix, kept as-is
    Prefix(&'static str),
}

impl Rule {
    const fn keep(name: &'static str) -> Self {
        Rule::Exact { name, target: None }
    }

    const fn rename(name: &'static str, target: &'static str) -> Self {
        Rule::Exact {
            name,
            target: Some(target),
        }
    }

    /// Output key for `key` if this rule matches it
    pub fn target(&self, key: &str) -> Option<String> {
        match *self {
            Rule::Exact { name, target } if name == key => {
                Some(target.unwrap_or(name).to_string())
            }
            Rule::Prefix(prefix) if key.starts_with(prefix) => Some(key.to_string()),
            _ => None,
        }
    }
}

/// Evaluated in order; the first matching rule wins
pub const WHITELIST: &[Rule] = &[
    Rule::rename("replyTo", "h:Reply-To"),
    Rule::rename("messageId", "h:Message-Id"),
    Rule::Prefix("h:"),
    Rule::Prefix("v:"),
    Rule::keep("from"),
    Rule::keep("to"),
    Rule::keep("cc"),
    Rule::keep("bcc"),
    Rule::keep("subject"),
    Rule::keep("text"),
    Rule::keep("template"),
    Rule::keep("html"),
    Rule::keep("attachment"),
    Rule::keep("inline"),
    Rule::keep("recipient-variables"),
    Rule::keep("o:tag"),
    Rule::keep("o:campaign"),
    Rule::keep("o:dkim"),
    Rule::keep("o:deliverytime"),
    Rule::keep("o:testmode"),
    Rule::keep("o:tracking"),
    Rule::keep("o:tracking-clicks"),
    Rule::keep("o:tracking-opens"),
    Rule::keep("o:require-tls"),
    Rule::keep("o:skip-verification"),
    Rule::keep("X-Mailgun-Variables"),
    Rule::keep(PRIORITY_KEY),
];

pub fn target_key(key: &str) -> Option<String> {
    WHITELIST.iter().find_map(|rule| rule.target(key))
}

/// Keep recognized, non-empty fields under their provider names.
///
/// When two source fields map to the same key, the later one wins.
pub fn apply_key_whitelist<I>(fields: I) -> MessageData
where
    I: IntoIterator<Item = (String, FieldValue)>,
{
    let mut message = MessageData::new();

    for (key, value) in fields {
        let Some(target) = target_key(&key) else {
            tracing::trace!(field = %key, "Dropping unrecognized field");
            continue;
        };
        if value.is_empty() {
            continue;
        }
        message.insert(target, value);
    }

    message
}
