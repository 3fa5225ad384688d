use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

use crate::config::{ConfigError, TransportOptions};
use crate::error::{Result, TransportError};
use crate::models::{FieldValue, MessageData, MessagesSendResult};

/// File name used for uploads that carry none
const DEFAULT_FILE_NAME: &str = "file";

/// The provider-side "create message" operation
#[async_trait]
pub trait MessagesClient: Send + Sync {
    async fn create(&self, domain: &str, message: MessageData) -> Result<MessagesSendResult>;
}

/// Mailgun HTTP API client
#[derive(Clone)]
pub struct MailgunClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl MailgunClient {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: options.base_url()?,
            api_key: options.auth.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/v3/{domain}/messages`, keeping any path prefix of the base URL
    pub fn messages_url(&self, domain: &str) -> Result<Url> {
        let url = format!(
            "{}/v3/{}/messages",
            self.base_url.as_str().trim_end_matches('/'),
            domain
        );
        Url::parse(&url).map_err(|e| ConfigError::InvalidUrl(e.to_string()).into())
    }
}

/// Encode a message as multipart form data. File lists become one part per
/// file under the list's key.
pub fn build_form(message: MessageData) -> Result<Form> {
    let mut form = Form::new();

    for (key, value) in message {
        match value {
            FieldValue::Text(text) => {
                form = form.text(key, text);
            }
            FieldValue::Files(files) => {
                for file in files {
                    let mut part = Part::bytes(file.data)
                        .file_name(file.filename.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()));
                    if let Some(content_type) = file.content_type {
                        part = part
                            .mime_str(&content_type)
                            .map_err(|e| TransportError::InvalidAttachment(e.to_string()))?;
                    }
                    form = form.part(key.clone(), part);
                }
            }
        }
    }

    Ok(form)
}

#[async_trait]
impl MessagesClient for MailgunClient {
    async fn create(&self, domain: &str, message: MessageData) -> Result<MessagesSendResult> {
        let url = self.messages_url(domain)?;
        let form = build_form(message)?;

        let res = self
            .client
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let details = res.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                details,
            });
        }

        let body = res.text().await?;
        let mut result: MessagesSendResult = serde_json::from_str(&body)?;
        result.status = status.as_u16();

        Ok(result)
    }
}
