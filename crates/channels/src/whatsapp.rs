use salon_core::{CanonicalMessage, CanonicalReply, Platform};
use serde_json::{json, Value};

use crate::{id_string, text_or_empty, PlatformAdapter};

/// Cloud API webhook: `entry[0].changes[0].value.messages[0]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatsAppAdapter;

impl PlatformAdapter for WhatsAppAdapter {
    fn platform(&self) -> Platform {
        Platform::WhatsApp
    }

    fn extract(&self, payload: &Value) -> Option<CanonicalMessage> {
        let message = payload
            .get("entry")?
            .get(0)?
            .get("changes")?
            .get(0)?
            .get("value")?
            .get("messages")?
            .get(0)?;

        let user_id = id_string(message.get("from")?)?;
        let text = text_or_empty(message.get("text").and_then(|text| text.get("body")));

        Some(CanonicalMessage {
            user_id,
            text,
            platform: Platform::WhatsApp,
        })
    }

    fn render(&self, reply: &CanonicalReply, user_id: &str) -> Value {
        json!({
            "messaging_product": "whatsapp",
            "to": user_id,
            "type": "text",
            "text": { "body": reply.text },
        })
    }
}
