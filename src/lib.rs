pub mod config;
pub mod error;
pub mod mail;
pub mod models;

pub use config::{ConfigError, Credentials, TransportOptions};
pub use error::{Result, TransportError};
pub use mail::{build_message, MailgunClient, MailgunTransport, MessagesClient};
pub use models::{
    Address, Attachment, AttachmentContent, CustomFile, FieldValue, MailOptions, MessageData,
    MessagesSendResult, Priority, Recipients, SentMessage,
};
