use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, UnknownIntentError};
use crate::intent::{ClassificationRule, IntentClassifier};
use crate::models::IntentResponse;

pub const GREETING_INTENT: &str = "greeting";
pub const MAIN_MENU_TEMPLATE: &str = "main_menu";

const REQUIRED_KEYS: [&str; 4] = [
    "intents",
    "fallback_responses",
    "quick_reply_templates",
    "greeting",
];

const BUNDLED_CATALOG: &str = include_str!("../../../catalog/salon_catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default)]
    business_info: Value,
    #[serde(default)]
    services: Value,
    #[serde(default)]
    working_hours: Value,
    intents: BTreeMap<String, IntentResponse>,
    fallback_responses: Vec<String>,
    quick_reply_templates: BTreeMap<String, Vec<String>>,
    greeting: IntentResponse,
    #[serde(default)]
    rules: Option<Vec<ClassificationRule>>,
}

fn default_bot_name() -> String {
    "SalonBot".to_string()
}

/// Descriptive business data served as-is by the config endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessProfile {
    pub bot_name: String,
    pub business_info: Value,
    pub services: Value,
    pub working_hours: Value,
}

/// Immutable business configuration. Share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    profile: BusinessProfile,
    intents: BTreeMap<String, IntentResponse>,
    fallback_responses: Vec<String>,
    main_menu_quick_replies: Vec<String>,
    greeting: IntentResponse,
    rules: Option<Vec<ClassificationRule>>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// The salon catalog shipped with the repository.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Some(object) = value.as_object() else {
            return Err(ConfigError::MissingKey(REQUIRED_KEYS[0].to_string()));
        };
        for key in REQUIRED_KEYS {
            if object.get(key).map_or(true, Value::is_null) {
                return Err(ConfigError::MissingKey(key.to_string()));
            }
        }

        let file: CatalogFile = serde_json::from_value(value)?;
        Self::from_file(file)
    }

    fn from_file(mut file: CatalogFile) -> Result<Self, ConfigError> {
        let main_menu_quick_replies = file
            .quick_reply_templates
            .remove(MAIN_MENU_TEMPLATE)
            .ok_or_else(|| {
                ConfigError::MissingKey(format!("quick_reply_templates.{MAIN_MENU_TEMPLATE}"))
            })?;

        if file.greeting.text.trim().is_empty() {
            return Err(ConfigError::EmptyText(GREETING_INTENT.to_string()));
        }

        let mut intents = file.intents;
        intents
            .entry(GREETING_INTENT.to_string())
            .or_insert_with(|| file.greeting.clone());

        if let Some((key, _)) = intents
            .iter()
            .find(|(_, response)| response.text.trim().is_empty())
        {
            return Err(ConfigError::EmptyText(key.clone()));
        }

        if file.fallback_responses.is_empty() {
            return Err(ConfigError::EmptyFallback);
        }
        if let Some(idx) = file
            .fallback_responses
            .iter()
            .position(|text| text.trim().is_empty())
        {
            return Err(ConfigError::EmptyFallbackEntry(idx));
        }

        Ok(Self {
            profile: BusinessProfile {
                bot_name: file.bot_name,
                business_info: file.business_info,
                services: file.services,
                working_hours: file.working_hours,
            },
            intents,
            fallback_responses: file.fallback_responses,
            main_menu_quick_replies,
            greeting: file.greeting,
            rules: file.rules,
        })
    }

    pub fn lookup(&self, intent: &str) -> Result<&IntentResponse, UnknownIntentError> {
        self.intents
            .get(intent)
            .ok_or_else(|| UnknownIntentError(intent.to_string()))
    }

    pub fn greeting(&self) -> &IntentResponse {
        &self.greeting
    }

    pub fn fallback_responses(&self) -> &[String] {
        &self.fallback_responses
    }

    pub fn main_menu_quick_replies(&self) -> &[String] {
        &self.main_menu_quick_replies
    }

    pub fn intent_keys(&self) -> impl Iterator<Item = &str> {
        self.intents.keys().map(String::as_str)
    }

    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    pub fn bot_name(&self) -> &str {
        &self.profile.bot_name
    }

    /// Classifier for this catalog: the file's own `rules` table when present,
    /// otherwise the built-in salon table. Fails if any rule names an intent
    /// the catalog does not define.
    pub fn classifier(&self) -> Result<IntentClassifier, ConfigError> {
        let classifier = match &self.rules {
            Some(rules) => IntentClassifier::new(rules.clone())?,
            None => IntentClassifier::salon_default(),
        };
        self.ensure_covers(&classifier)?;
        Ok(classifier)
    }

    pub fn ensure_covers(&self, classifier: &IntentClassifier) -> Result<(), UnknownIntentError> {
        for key in classifier.intent_keys() {
            self.lookup(key)?;
        }
        Ok(())
    }
}
