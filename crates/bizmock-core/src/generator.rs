//! Synthetic inbound-traffic generation.
//!
//! Fabricates messages of every supported type from a fixed contact set.
//! Generated messages and status events are acquired from the shared pools;
//! the webhook pipeline releases them once a delivery is acknowledged.

use std::{collections::HashMap, sync::Arc};

use rand::Rng;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::models::{
    Contact, MediaContent, Message, MessageContext, MessageType, StatusEvent, StatusKind,
    TextContent,
};
use crate::pool::Pools;

/// Static description of the media payload generated for one message type.
#[derive(Debug, Clone)]
pub struct MediaProfile {
    /// MIME type reported for the media.
    pub mime_type: String,
    /// Backing file name reported for the media.
    pub file: String,
    /// Hex digest reported for the media.
    pub sha256: String,
}

/// Generator of synthetic messages, contacts, and status events.
#[derive(Debug)]
pub struct Generators {
    contacts: Vec<Contact>,
    media: HashMap<MessageType, MediaProfile>,
    types: Vec<MessageType>,
    pools: Arc<Pools>,
}

impl Generators {
    /// Creates a generator over the given contact set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoContacts`] when `contacts` is empty; every
    /// generated message needs a sender.
    pub fn new(contacts: Vec<Contact>, pools: Arc<Pools>) -> Result<Self> {
        if contacts.is_empty() {
            return Err(CoreError::NoContacts);
        }
        Ok(Self { contacts, media: default_media(), types: MessageType::ALL.to_vec(), pools })
    }

    /// The fixed contact set attached to every generated batch.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Generates `n` messages uniformly distributed over all supported
    /// types.
    pub fn generate_random_messages(&self, n: usize) -> Vec<Message> {
        let mut rng = rand::rng();
        (0..n)
            .map(|_| {
                let kind = self.types[rng.random_range(0..self.types.len())];
                self.generate_message(kind)
            })
            .collect()
    }

    /// Generates `n` messages drawn from the given type list.
    pub fn generate_messages(&self, n: usize, types: &[MessageType]) -> Vec<Message> {
        if types.is_empty() {
            return self.generate_random_messages(n);
        }
        let mut rng = rand::rng();
        (0..n)
            .map(|_| {
                let kind = types[rng.random_range(0..types.len())];
                self.generate_message(kind)
            })
            .collect()
    }

    /// Generates one message of the given type.
    pub fn generate_message(&self, kind: MessageType) -> Message {
        let mut msg = self.base_message();
        msg.kind = kind;
        match kind {
            MessageType::Text => {
                msg.text = Some(TextContent { body: "Textbody".into() });
            }
            MessageType::Image => {
                let mut media = self.media_content(kind);
                media.caption = Some("Hello World!".into());
                msg.image = Some(media);
            }
            MessageType::Audio => msg.audio = Some(self.media_content(kind)),
            MessageType::Video => msg.video = Some(self.media_content(kind)),
            MessageType::Document => msg.document = Some(self.media_content(kind)),
        }
        msg
    }

    /// Attaches a forwarded-message context referencing a random contact.
    pub fn append_context(&self, msg: &mut Message) {
        let contact = self.random_contact();
        msg.context = Some(MessageContext {
            id: Uuid::new_v4().to_string(),
            from: contact.wa_id.clone(),
            forwarded: true,
        });
    }

    /// The `sent`/`delivered`/`read` milestone triple for an accepted
    /// outbound message.
    pub fn stati_for_outbound(&self, message_id: &str, recipient: &str) -> Vec<StatusEvent> {
        [StatusKind::Sent, StatusKind::Delivered, StatusKind::Read]
            .into_iter()
            .map(|status| self.generate_status(message_id, recipient, status))
            .collect()
    }

    fn generate_status(&self, message_id: &str, recipient: &str, status: StatusKind) -> StatusEvent {
        let mut event = self.pools.statuses.acquire();
        event.id = message_id.to_string();
        event.recipient_id = recipient.to_string();
        event.timestamp = chrono::Utc::now().timestamp();
        event.status = status;
        event
    }

    fn base_message(&self) -> Message {
        let contact = self.random_contact();
        let mut msg = self.pools.messages.acquire();
        msg.from = contact.wa_id.clone();
        msg.id = Uuid::new_v4().to_string();
        msg.timestamp = chrono::Utc::now().timestamp();
        msg
    }

    fn media_content(&self, kind: MessageType) -> MediaContent {
        // Fresh media id per message; the profile carries the static parts.
        let profile = &self.media[&kind];
        MediaContent {
            id: Uuid::new_v4().to_string(),
            mime_type: profile.mime_type.clone(),
            file: profile.file.clone(),
            sha256: profile.sha256.clone(),
            caption: None,
        }
    }

    fn random_contact(&self) -> &Contact {
        let mut rng = rand::rng();
        &self.contacts[rng.random_range(0..self.contacts.len())]
    }
}

fn default_media() -> HashMap<MessageType, MediaProfile> {
    let mut media = HashMap::new();
    media.insert(
        MessageType::Image,
        MediaProfile {
            mime_type: "image/png".into(),
            file: "mockImagefile".into(),
            sha256: String::new(),
        },
    );
    media.insert(
        MessageType::Audio,
        MediaProfile {
            mime_type: "audio/mp4".into(),
            file: "mockAudiofile".into(),
            sha256: String::new(),
        },
    );
    media.insert(
        MessageType::Video,
        MediaProfile {
            mime_type: "video/mp4".into(),
            file: "mockVideofile".into(),
            sha256: String::new(),
        },
    );
    media.insert(
        MessageType::Document,
        MediaProfile {
            mime_type: "application/pdf".into(),
            file: "mockDocumentfile".into(),
            sha256: String::new(),
        },
    );
    media
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generators() -> Generators {
        let contacts = vec![
            Contact::new("491710000001", "TestUser One"),
            Contact::new("491710000002", "TestUser Two"),
        ];
        Generators::new(contacts, Arc::new(Pools::default())).unwrap()
    }

    #[test]
    fn rejects_empty_contact_set() {
        assert!(Generators::new(Vec::new(), Arc::new(Pools::default())).is_err());
    }

    #[test]
    fn generates_requested_count() {
        let g = generators();
        assert_eq!(g.generate_random_messages(25).len(), 25);
        assert_eq!(g.generate_messages(10, &[MessageType::Text]).len(), 10);
    }

    #[test]
    fn constrained_generation_honors_types() {
        let g = generators();
        let messages = g.generate_messages(20, &[MessageType::Text, MessageType::Image]);
        for msg in &messages {
            assert!(matches!(msg.kind, MessageType::Text | MessageType::Image));
            match msg.kind {
                MessageType::Text => assert!(msg.text.is_some()),
                MessageType::Image => assert!(msg.image.is_some()),
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn generated_messages_have_identity() {
        let g = generators();
        let messages = g.generate_random_messages(5);
        for msg in &messages {
            assert!(!msg.id.is_empty());
            assert!(!msg.from.is_empty());
            assert!(msg.timestamp > 0);
        }
        // Message ids are unique.
        let mut ids: Vec<_> = messages.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), messages.len());
    }

    #[test]
    fn status_triple_covers_all_milestones() {
        let g = generators();
        let stati = g.stati_for_outbound("wamid.42", "491710000009");
        assert_eq!(stati.len(), 3);
        assert_eq!(stati[0].status, StatusKind::Sent);
        assert_eq!(stati[1].status, StatusKind::Delivered);
        assert_eq!(stati[2].status, StatusKind::Read);
        for status in &stati {
            assert_eq!(status.id, "wamid.42");
            assert_eq!(status.recipient_id, "491710000009");
        }
    }
}
