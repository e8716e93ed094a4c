//! Wire types relayed to the callback endpoint.
//!
//! These model the canonical JSON body of a webhook request: contact
//! references, inbound message payloads, delivery-status events, and error
//! descriptors. Field names match the platform's wire format and
//! default/empty values are omitted during serialization, so a unit carrying
//! only statuses serializes without `messages` or `contacts` keys.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pool::Reusable;

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Supported inbound message types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text message.
    #[default]
    Text,
    /// Image attachment.
    Image,
    /// Audio attachment.
    Audio,
    /// Video attachment.
    Video,
    /// Document attachment.
    Document,
}

impl MessageType {
    /// All types the generator can produce.
    pub const ALL: [MessageType; 5] = [
        MessageType::Text,
        MessageType::Image,
        MessageType::Audio,
        MessageType::Video,
        MessageType::Document,
    ];
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MessageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            other => Err(CoreError::unsupported_type(other)),
        }
    }
}

/// Delivery milestone of an accepted outbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Accepted by the platform.
    #[default]
    Sent,
    /// Delivered to the recipient device.
    Delivered,
    /// Read by the recipient.
    Read,
}

/// Contact profile data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name of the contact.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// A contact known to the mock platform, referenced by generated traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Platform account id of the contact.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub wa_id: String,
    /// Profile attached to the contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl Contact {
    /// Creates a contact with the given account id and display name.
    pub fn new(wa_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { wa_id: wa_id.into(), profile: Some(Profile { name: name.into() }) }
    }
}

/// Body of a text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// The message text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// Body of a media message (image, audio, video, document).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaContent {
    /// Media id under which the payload can be fetched.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// MIME type of the media payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    /// Backing file name on the mock side.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Hex digest of the media payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sha256: String,
    /// Optional caption shown with the media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Reference to a message this message replies to or forwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    /// Id of the referenced message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Sender of the referenced message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Whether the message was forwarded.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forwarded: bool,
}

/// A synthetic inbound message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Account id of the sender.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Unique message id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Recipient account id; set on outbound messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Unix timestamp of message creation.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    /// Discriminator for the payload field below.
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    /// Text payload, present when `kind` is `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    /// Image payload, present when `kind` is `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaContent>,
    /// Audio payload, present when `kind` is `audio`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<MediaContent>,
    /// Video payload, present when `kind` is `video`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaContent>,
    /// Document payload, present when `kind` is `document`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<MediaContent>,
    /// Reference to a replied-to or forwarded message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

impl Reusable for Message {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One delivery milestone of an outbound message for a recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Id of the outbound message this status refers to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Account id of the recipient.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recipient_id: String,
    /// Unix timestamp at which the milestone was reached.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    /// The milestone itself.
    #[serde(default)]
    pub status: StatusKind,
}

impl Reusable for StatusEvent {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Error descriptor carried in a webhook request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Platform error code.
    #[serde(default, skip_serializing_if = "i32_is_zero")]
    pub code: i32,
    /// Short error title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Detail text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

fn i32_is_zero(value: &i32) -> bool {
    *value == 0
}

/// The batched payload sent to the callback endpoint.
///
/// A unit is owned by exactly one place at a time: the producer that built
/// it, the work queue, or the delivery worker. After a successful delivery
/// its contents return to their pools and the unit itself is released.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryUnit {
    /// Contacts referenced by the messages below.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Contact>,
    /// Synthetic inbound messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    /// Delivery-status events of outbound messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusEvent>,
    /// Error descriptors, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

impl Reusable for DeliveryUnit {
    fn reset(&mut self) {
        self.contacts.clear();
        self.messages.clear();
        self.statuses.clear();
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_omitted_from_wire_form() {
        let unit = DeliveryUnit {
            statuses: vec![StatusEvent {
                id: "wamid.1".into(),
                recipient_id: "491710000001".into(),
                timestamp: 1_700_000_000,
                status: StatusKind::Delivered,
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&unit).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("statuses"));
        assert!(!obj.contains_key("contacts"));
        assert!(!obj.contains_key("messages"));
        assert!(!obj.contains_key("errors"));
        assert_eq!(json["statuses"][0]["status"], "delivered");
    }

    #[test]
    fn round_trip_preserves_counts() {
        let unit = DeliveryUnit {
            contacts: vec![Contact::new("491710000001", "Test Contact")],
            messages: vec![
                Message {
                    from: "491710000001".into(),
                    id: "id-1".into(),
                    timestamp: 1_700_000_000,
                    kind: MessageType::Text,
                    text: Some(TextContent { body: "hello".into() }),
                    ..Default::default()
                },
                Message {
                    from: "491710000001".into(),
                    id: "id-2".into(),
                    timestamp: 1_700_000_001,
                    kind: MessageType::Image,
                    image: Some(MediaContent {
                        id: "media-1".into(),
                        mime_type: "image/png".into(),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            ],
            statuses: vec![StatusEvent::default()],
            errors: Vec::new(),
        };

        let bytes = serde_json::to_vec(&unit).unwrap();
        let decoded: DeliveryUnit = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded.contacts.len(), unit.contacts.len());
        assert_eq!(decoded.messages.len(), unit.messages.len());
        assert_eq!(decoded.statuses.len(), unit.statuses.len());
        assert_eq!(decoded.messages[0].text.as_ref().unwrap().body, "hello");
    }

    #[test]
    fn message_type_parses_known_names() {
        assert_eq!("text".parse::<MessageType>().unwrap(), MessageType::Text);
        assert_eq!("document".parse::<MessageType>().unwrap(), MessageType::Document);
        assert!("sticker".parse::<MessageType>().is_err());
    }

    #[test]
    fn type_field_uses_wire_name() {
        let msg = Message { kind: MessageType::Audio, id: "x".into(), ..Default::default() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "audio");
    }
}
