use crate::mail::whitelist::PRIORITY_KEY;
use crate::models::{FieldValue, MessageData, Priority};

const HIGH_PRIORITY_HEADERS: [(&str, &str); 3] = [
    ("h:X-Priority", "1 (Highest)"),
    ("h:X-MSMail-Priority", "High"),
    ("h:Importance", "High"),
];

const LOW_PRIORITY_HEADERS: [(&str, &str); 3] = [
    ("h:X-Priority", "5 (Lowest)"),
    ("h:X-MSMail-Priority", "Low"),
    ("h:Importance", "Low"),
];

/// Replace the generic `priority` field with Mailgun priority headers.
/// Normal or unknown priorities add nothing.
pub fn apply_priority(mut message: MessageData) -> MessageData {
    let priority = message
        .remove(PRIORITY_KEY)
        .as_ref()
        .and_then(FieldValue::as_text)
        .and_then(Priority::from_name);

    let headers: &[(&str, &str)] = match priority {
        Some(Priority::High) => &HIGH_PRIORITY_HEADERS,
        Some(Priority::Low) => &LOW_PRIORITY_HEADERS,
        Some(Priority::Normal) | None => &[],
    };

    for (key, value) in headers {
        message.insert(key.to_string(), FieldValue::from(*value));
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message_with(priority: Option<&str>) -> MessageData {
        let mut message = MessageData::new();
        message.insert("subject".to_string(), FieldValue::from("Hi"));
        if let Some(priority) = priority {
            message.insert(PRIORITY_KEY.to_string(), FieldValue::from(priority));
        }
        message
    }

    #[test]
    fn test_high() {
        let message = apply_priority(message_with(Some("high")));

        assert_eq!(message.len(), 4);
        assert!(!message.contains_key(PRIORITY_KEY));
        assert_eq!(message["h:X-Priority"], FieldValue::from("1 (Highest)"));
        assert_eq!(message["h:X-MSMail-Priority"], FieldValue::from("High"));
        assert_eq!(message["h:Importance"], FieldValue::from("High"));
    }

    #[test]
    fn test_low() {
        let message = apply_priority(message_with(Some("low")));

        assert_eq!(message["h:X-Priority"], FieldValue::from("5 (Lowest)"));
        assert_eq!(message["h:X-MSMail-Priority"], FieldValue::from("Low"));
        assert_eq!(message["h:Importance"], FieldValue::from("Low"));
    }

    #[test]
    fn test_normal_and_absent() {
        for priority in [Some("normal"), Some("HIGH"), None] {
            let message = apply_priority(message_with(priority));
            assert_eq!(message, message_with(None));
        }
    }
}
