pub mod address;
pub mod attachment;
pub mod client;
pub mod priority;
pub mod whitelist;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::TransportOptions;
use crate::error::{Result, TransportError};
use crate::models::{FieldValue, MailOptions, MessageData, SentMessage};

pub use client::{MailgunClient, MessagesClient};

pub const TRANSPORT_NAME: &str = "Mailgun";

/// Build the provider message for `mail`.
///
/// Pure and synchronous; any error here means nothing was sent.
pub fn build_message(mail: &MailOptions) -> Result<MessageData> {
    let attachments = attachment::make_attachments(&mail.attachments)?;
    let addresses = address::make_all_text_addresses(mail);

    let mut fields: Vec<(String, FieldValue)> = vec![
        ("from".to_string(), addresses.from.into()),
        ("to".to_string(), addresses.to.into()),
        ("cc".to_string(), addresses.cc.into()),
        ("bcc".to_string(), addresses.bcc.into()),
        ("replyTo".to_string(), addresses.reply_to.into()),
    ];

    let named = [
        ("messageId", &mail.message_id),
        ("subject", &mail.subject),
        ("text", &mail.text),
        ("html", &mail.html),
        ("template", &mail.template),
    ];
    for (key, value) in named {
        if let Some(value) = value {
            fields.push((key.to_string(), value.clone().into()));
        }
    }

    if let Some(priority) = mail.priority {
        fields.push((whitelist::PRIORITY_KEY.to_string(), priority.as_str().into()));
    }

    fields.extend(
        mail.fields
            .iter()
            .map(|(key, value)| (key.clone(), FieldValue::from(value.as_str()))),
    );

    if let Some(files) = attachments.attachment {
        fields.push(("attachment".to_string(), FieldValue::Files(files)));
    }
    if let Some(files) = attachments.inline {
        fields.push(("inline".to_string(), FieldValue::Files(files)));
    }

    let message = whitelist::apply_key_whitelist(fields);
    Ok(priority::apply_priority(message))
}

/// Sends generic mail options through Mailgun
pub struct MailgunTransport<C = MailgunClient> {
    client: C,
    domain: String,
}

impl MailgunTransport<MailgunClient> {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        Ok(Self::with_client(
            MailgunClient::new(options)?,
            options.auth.domain.clone(),
        ))
    }

    /// Create transport from env (MAILGUN_API_KEY, MAILGUN_DOMAIN, etc.)
    pub fn from_env() -> Result<Self> {
        let options = TransportOptions::from_env()?;
        Self::new(&options)
    }
}

impl<C: MessagesClient> MailgunTransport<C> {
    pub fn with_client(client: C, domain: impl Into<String>) -> Self {
        Self {
            client,
            domain: domain.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Transform `mail` and hand it to the provider client.
    ///
    /// Makes exactly one provider call, or none if the message could not
    /// be built.
    pub async fn send(&self, mail: &MailOptions) -> Result<SentMessage> {
        let message = match build_message(mail) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "Message rejected before sending");
                return Err(e);
            }
        };

        tracing::debug!(
            domain = %self.domain,
            fields = message.len(),
            "Sending message"
        );

        match self.client.create(&self.domain, message).await {
            Ok(result) => {
                let sent = SentMessage::from(result);
                tracing::info!(message_id = %sent.message_id, "Message accepted by Mailgun");
                Ok(sent)
            }
            Err(e) => {
                if e.is_local() {
                    tracing::debug!(error = %e, "Message rejected by client");
                } else {
                    tracing::warn!(error = %e, domain = %self.domain, "Mailgun send failed");
                }
                Err(e)
            }
        }
    }

    /// Error-first completion: `callback` runs exactly once, with exactly
    /// one of its two arguments set.
    pub async fn send_with_callback<F>(&self, mail: &MailOptions, callback: F)
    where
        F: FnOnce(Option<TransportError>, Option<SentMessage>),
    {
        match self.send(mail).await {
            Ok(sent) => callback(None, Some(sent)),
            Err(e) => callback(Some(e), None),
        }
    }
}

impl<C: MessagesClient + 'static> MailgunTransport<C> {
    /// Run [`send_with_callback`](Self::send_with_callback) on the tokio runtime
    pub fn dispatch<F>(self: Arc<Self>, mail: MailOptions, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<TransportError>, Option<SentMessage>) + Send + 'static,
    {
        tokio::spawn(async move {
            self.send_with_callback(&mail, callback).await;
        })
    }
}
