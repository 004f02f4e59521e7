use salon_core::{CanonicalMessage, CanonicalReply, Platform};
use serde_json::{json, Value};

use crate::{id_string, text_or_empty, PlatformAdapter};

/// Messenger-style webhook: `entry[0].messaging[0]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstagramAdapter;

impl PlatformAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn extract(&self, payload: &Value) -> Option<CanonicalMessage> {
        let event = payload.get("entry")?.get(0)?.get("messaging")?.get(0)?;

        let user_id = id_string(event.get("sender")?.get("id")?)?;
        let text = text_or_empty(event.get("message").and_then(|message| message.get("text")));

        Some(CanonicalMessage {
            user_id,
            text,
            platform: Platform::Instagram,
        })
    }

    fn render(&self, reply: &CanonicalReply, user_id: &str) -> Value {
        json!({
            "recipient": { "id": user_id },
            "message": { "text": reply.text },
        })
    }
}
