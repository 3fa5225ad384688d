//! Address list serialization (`Name <address>,other@host`)

use crate::models::{Address, MailOptions, Recipients};

/// Serialized address fields of one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAddresses {
    pub from: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub reply_to: String,
}

/// Render a single entry, or `None` if it has nothing to send
pub fn render_address(entry: &Address) -> Option<String> {
    let rendered = match entry {
        Address::Mailbox {
            name: Some(name),
            address,
        } if !name.is_empty() => format!("{} <{}>", name, address),
        Address::Mailbox { address, .. } => address.clone(),
        Address::Text(text) => text.clone(),
        Address::Invalid(value) => {
            tracing::trace!(entry = %value, "Dropping unrecognized address entry");
            return None;
        }
    };

    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

/// Join all entries of a recipient field with `,`, keeping input order
pub fn make_text_addresses(recipients: Option<&Recipients>) -> String {
    recipients
        .map(Recipients::entries)
        .unwrap_or_default()
        .iter()
        .filter_map(render_address)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn make_all_text_addresses(mail: &MailOptions) -> TextAddresses {
    TextAddresses {
        from: make_text_addresses(mail.from.as_ref()),
        to: make_text_addresses(mail.to.as_ref()),
        cc: make_text_addresses(mail.cc.as_ref()),
        bcc: make_text_addresses(mail.bcc.as_ref()),
        reply_to: make_text_addresses(mail.reply_to.as_ref()),
    }
}
