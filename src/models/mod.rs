pub mod message;
pub mod options;

pub use message::{CustomFile, FieldValue, MessageData, MessagesSendResult, SentMessage};
pub use options::{Address, Attachment, AttachmentContent, MailOptions, Priority, Recipients};
