pub mod catalog;
pub mod error;
pub mod intent;
pub mod models;

pub use catalog::{BusinessProfile, Catalog, GREETING_INTENT, MAIN_MENU_TEMPLATE};
pub use error::{ConfigError, UnknownIntentError};
pub use intent::{default_rules, ClassificationRule, IntentClassifier};
pub use models::*;
