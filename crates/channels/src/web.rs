use salon_core::{CanonicalMessage, CanonicalReply, Platform};
use serde_json::Value;

use crate::{id_string, text_or_empty, PlatformAdapter};

pub const DEFAULT_WEB_USER: &str = "web_user";

/// Flat chat widget payload: `{ "user_id"?: string, "message": string }`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebAdapter;

impl PlatformAdapter for WebAdapter {
    fn platform(&self) -> Platform {
        Platform::Web
    }

    fn extract(&self, payload: &Value) -> Option<CanonicalMessage> {
        let object = payload.as_object()?;

        let user_id = object
            .get("user_id")
            .and_then(id_string)
            .unwrap_or_else(|| DEFAULT_WEB_USER.to_string());
        let text = text_or_empty(object.get("message"));

        Some(CanonicalMessage {
            user_id,
            text,
            platform: Platform::Web,
        })
    }

    fn render(&self, reply: &CanonicalReply, _user_id: &str) -> Value {
        serde_json::json!({
            "text": reply.text,
            "quick_replies": reply.quick_replies,
        })
    }
}
