//! Platform adapters: inbound webhook payloads to [`CanonicalMessage`] and
//! [`CanonicalReply`] back to each platform's outbound shape.
//!
//! Extraction never fails loudly. A payload with no usable message yields
//! `None`, which callers treat as "nothing to answer".

mod instagram;
mod web;
mod whatsapp;

use salon_core::{CanonicalMessage, CanonicalReply, Platform};
use serde_json::Value;

pub use instagram::InstagramAdapter;
pub use web::{WebAdapter, DEFAULT_WEB_USER};
pub use whatsapp::WhatsAppAdapter;

pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    fn extract(&self, payload: &Value) -> Option<CanonicalMessage>;

    fn render(&self, reply: &CanonicalReply, user_id: &str) -> Value;
}

static WHATSAPP: WhatsAppAdapter = WhatsAppAdapter;
static INSTAGRAM: InstagramAdapter = InstagramAdapter;
static WEB: WebAdapter = WebAdapter;

pub fn adapter_for(platform: Platform) -> &'static dyn PlatformAdapter {
    match platform {
        Platform::WhatsApp => &WHATSAPP,
        Platform::Instagram => &INSTAGRAM,
        Platform::Web => &WEB,
    }
}

/// Sender ids arrive as strings, but some test consoles send bare numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_default()
}
