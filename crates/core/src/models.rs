use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "whatsapp")]
    WhatsApp,
    Instagram,
    Web,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Self::WhatsApp, Self::Instagram, Self::Web];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "whatsapp" | "wa" => Some(Self::WhatsApp),
            "instagram" | "ig" => Some(Self::Instagram),
            "web" | "webchat" => Some(Self::Web),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::WhatsApp => "whatsapp",
            Self::Instagram => "instagram",
            Self::Web => "web",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Canned answer for one intent. The catalog file historically used
/// `response` and `message` for the text, both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResponse {
    #[serde(alias = "response", alias = "message")]
    pub text: String,
    #[serde(default)]
    pub quick_replies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    pub user_id: String,
    pub text: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalReply {
    pub text: String,
    pub quick_replies: Vec<String>,
}

impl From<&IntentResponse> for CanonicalReply {
    fn from(response: &IntentResponse) -> Self {
        Self {
            text: response.text.clone(),
            quick_replies: response.quick_replies.clone(),
        }
    }
}
