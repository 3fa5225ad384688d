use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::oneshot;

use mailgun_transport::{
    Address, Attachment, AttachmentContent, FieldValue, MailOptions, MailgunTransport,
    MessageData, MessagesClient, MessagesSendResult, Priority, Result, SentMessage,
    TransportError,
};

/// Records every call and answers with a canned response
#[derive(Clone, Default)]
struct FakeClient {
    calls: Arc<Mutex<Vec<(String, MessageData)>>>,
    fail_with: Option<(u16, String)>,
    reject_locally: bool,
}

impl FakeClient {
    fn failing(status: u16, details: &str) -> Self {
        Self {
            fail_with: Some((status, details.to_string())),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, MessageData)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagesClient for FakeClient {
    async fn create(&self, domain: &str, message: MessageData) -> Result<MessagesSendResult> {
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), message));

        if self.reject_locally {
            return Err(TransportError::InvalidAttachment("bad content type".to_string()));
        }

        match &self.fail_with {
            Some((status, details)) => Err(TransportError::Api {
                status: *status,
                details: details.clone(),
            }),
            None => Ok(MessagesSendResult {
                id: "<msg-1>".to_string(),
                message: Some("Queued. Thank you.".to_string()),
                status: 200,
            }),
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn transport(client: FakeClient) -> MailgunTransport<FakeClient> {
    MailgunTransport::with_client(client, "mg.example.com")
}

fn text(message: &MessageData, key: &str) -> Option<String> {
    message
        .get(key)
        .and_then(FieldValue::as_text)
        .map(str::to_string)
}

#[tokio::test]
async fn test_send_high_priority_message() {
    init_tracing();
    let client = FakeClient::default();
    let transport = transport(client.clone());

    let mail = MailOptions::new()
        .from("a@x.com")
        .to(vec![Address::mailbox("Bob", "b@x.com")])
        .subject("Hi")
        .text("Hello")
        .priority(Priority::High);

    transport.send(&mail).await.expect("Should send");

    let calls = client.calls();
    assert_eq!(calls.len(), 1);

    let (domain, message) = &calls[0];
    assert_eq!(domain, "mg.example.com");
    assert_eq!(text(message, "from").as_deref(), Some("a@x.com"));
    assert_eq!(text(message, "to").as_deref(), Some("Bob <b@x.com>"));
    assert_eq!(text(message, "subject").as_deref(), Some("Hi"));
    assert_eq!(text(message, "text").as_deref(), Some("Hello"));
    assert_eq!(text(message, "h:X-Priority").as_deref(), Some("1 (Highest)"));
    assert!(!message.contains_key("priority"));
}

#[tokio::test]
async fn test_send_inline_attachment() {
    init_tracing();
    let client = FakeClient::default();
    let transport = transport(client.clone());

    let mail = MailOptions::new().attachment(Attachment {
        content: Some(AttachmentContent::Text("hi".to_string())),
        encoding: Some("utf8".to_string()),
        cid: Some("logo".to_string()),
        ..Default::default()
    });

    transport.send(&mail).await.expect("Should send");

    let calls = client.calls();
    let message = &calls[0].1;
    let inline = message
        .get("inline")
        .and_then(FieldValue::as_files)
        .expect("Should have inline files");

    assert_eq!(inline.len(), 1);
    assert_eq!(inline[0].filename.as_deref(), Some("logo"));
    assert_eq!(inline[0].data, b"hi".to_vec());
    assert!(!message.contains_key("attachment"));
}

#[tokio::test]
async fn test_path_attachment_fails_before_network() {
    init_tracing();
    let client = FakeClient::default();
    let transport = transport(client.clone());

    let mail = MailOptions::new()
        .to("b@x.com")
        .attachment(Attachment::from_path("/tmp/f.pdf"));

    let mut outcome = None;
    transport
        .send_with_callback(&mail, |err, result| outcome = Some((err, result)))
        .await;

    let (err, result) = outcome.expect("Callback should fire");
    assert!(matches!(err, Some(TransportError::UnsupportedAttachment)));
    assert!(result.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_success_mirrors_message_id() {
    let transport = transport(FakeClient::default());

    let mut outcome = None;
    transport
        .send_with_callback(&MailOptions::new().to("b@x.com"), |err, result| {
            outcome = Some((err, result))
        })
        .await;

    let (err, result) = outcome.expect("Callback should fire");
    assert!(err.is_none());

    let sent = result.expect("Should have result");
    assert_eq!(sent.result.id, "<msg-1>");
    assert_eq!(sent.message_id, "<msg-1>");
    assert_eq!(
        serde_json::to_value(&sent).unwrap(),
        json!({
            "id": "<msg-1>",
            "message": "Queued. Thank you.",
            "status": 200,
            "messageId": "<msg-1>"
        })
    );
}

#[tokio::test]
async fn test_provider_error_passes_through() {
    init_tracing();
    let client = FakeClient::failing(401, "Forbidden");
    let transport = transport(client.clone());

    let result = transport.send(&MailOptions::new().to("b@x.com")).await;

    match result {
        Err(TransportError::Api { status, details }) => {
            assert_eq!(status, 401);
            assert_eq!(details, "Forbidden");
        }
        other => panic!("Unexpected result: {:?}", other),
    }
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_client_side_rejection_passes_through() {
    init_tracing();
    let client = FakeClient {
        reject_locally: true,
        ..Default::default()
    };
    let transport = transport(client.clone());

    let result = transport.send(&MailOptions::new().to("b@x.com")).await;

    let err = result.expect_err("Should fail");
    assert!(err.is_local());
    assert!(matches!(err, TransportError::InvalidAttachment(_)));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_dispatch_fires_callback_once() {
    let client = FakeClient::default();
    let transport = Arc::new(transport(client.clone()));
    let (tx, rx) = oneshot::channel::<(Option<TransportError>, Option<SentMessage>)>();

    let handle = transport.dispatch(
        MailOptions::new().to("b@x.com").subject("Queued"),
        move |err, result| {
            let _ = tx.send((err, result));
        },
    );

    handle.await.expect("Task should complete");
    let (err, result) = rx.await.expect("Callback should fire");

    assert!(err.is_none());
    assert_eq!(result.map(|sent| sent.message_id).as_deref(), Some("<msg-1>"));
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn test_concurrent_sends_are_independent() {
    let client = FakeClient::default();
    let transport = Arc::new(transport(client.clone()));

    let sends = (0..5).map(|i| {
        let transport = Arc::clone(&transport);
        tokio::spawn(async move {
            let mail = MailOptions::new().to(format!("user{}@x.com", i));
            transport.send(&mail).await
        })
    });

    for send in sends.collect::<Vec<_>>() {
        send.await.expect("Task should complete").expect("Should send");
    }

    let mut recipients: Vec<_> = client
        .calls()
        .iter()
        .filter_map(|(_, message)| text(message, "to"))
        .collect();
    recipients.sort();

    assert_eq!(
        recipients,
        (0..5).map(|i| format!("user{}@x.com", i)).collect::<Vec<_>>()
    );
}

#[test]
fn test_send_from_json_options() {
    let client = FakeClient::default();
    let transport = transport(client.clone());

    let mail: MailOptions = serde_json::from_value(json!({
        "from": {"name": "Shop", "address": "shop@x.com"},
        "to": ["a@x.com", {"address": "b@x.com"}, null],
        "cc": [],
        "subject": "Order",
        "priority": "low",
        "envelope": {"from": "bounce@x.com"},
        "o:tracking": "yes",
        "o:testmode": false,
        "v:n": 0,
        "v:order-id": 1234
    }))
    .expect("Should parse mail options");

    tokio_test::block_on(transport.send(&mail)).expect("Should send");

    let calls = client.calls();
    let message = &calls[0].1;
    let keys: Vec<_> = message.keys().map(String::as_str).collect();

    assert_eq!(
        keys,
        vec![
            "from",
            "h:Importance",
            "h:X-MSMail-Priority",
            "h:X-Priority",
            "o:tracking",
            "subject",
            "to",
            "v:order-id",
        ]
    );
    assert_eq!(text(message, "from").as_deref(), Some("Shop <shop@x.com>"));
    assert_eq!(text(message, "to").as_deref(), Some("a@x.com,b@x.com"));
    assert_eq!(text(message, "h:X-Priority").as_deref(), Some("5 (Lowest)"));
    assert_eq!(text(message, "v:order-id").as_deref(), Some("1234"));
    assert!(!message.contains_key("o:testmode"));
    assert!(!message.contains_key("v:n"));
}

#[test]
fn test_transport_identity() {
    let transport = transport(FakeClient::default());
    assert_eq!(transport.name(), "Mailgun");
    assert_eq!(transport.domain(), "mg.example.com");
    assert!(!transport.version().is_empty());
}
