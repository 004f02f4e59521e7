use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub intent: String,
    pub keywords: Vec<String>,
}

impl ClassificationRule {
    pub fn new(intent: &str, keywords: &[&str]) -> Self {
        Self {
            intent: intent.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lower: &str) -> bool {
        contains_any(lower, &self.keywords)
    }
}

/// Ordered keyword rules. The first rule with a keyword contained in the
/// lowercased text decides the intent, so overlapping keyword sets resolve by
/// position in the table, never by match length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentClassifier {
    rules: Vec<ClassificationRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Result<Self, ConfigError> {
        let mut normalized = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.keywords.is_empty() {
                return Err(ConfigError::EmptyKeywords(rule.intent));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::BlankKeyword(rule.intent));
            }
            normalized.push(ClassificationRule {
                keywords: rule.keywords.iter().map(|k| k.to_lowercase()).collect(),
                intent: rule.intent,
            });
        }
        Ok(Self { rules: normalized })
    }

    pub fn salon_default() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn intent_keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.intent.as_str())
    }

    /// Returns `None` when nothing matches; the caller falls back.
    pub fn classify(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }

        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.intent.as_str())
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::salon_default()
    }
}

pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new("greeting", &["hola", "buenos", "buenas", "hey", "hi"]),
        ClassificationRule::new(
            "services_prices",
            &["servicios", "precios", "cuánto", "corte", "manicura"],
        ),
        ClassificationRule::new("working_hours", &["horarios", "horario", "abren", "cierran"]),
        ClassificationRule::new("location", &["ubicación", "dirección", "dónde", "gran vía"]),
        ClassificationRule::new("booking", &["reservar", "cita", "booking", "agendar"]),
        ClassificationRule::new("contact", &["contacto", "teléfono", "whatsapp", "instagram"]),
        ClassificationRule::new("faq", &["preguntas", "faq", "dudas", "ayuda"]),
        ClassificationRule::new("promotions", &["promociones", "ofertas", "descuentos"]),
        ClassificationRule::new("payment", &["pago", "tarjeta", "efectivo", "bizum"]),
        ClassificationRule::new("cancellation", &["cancelar", "cancelación", "anular"]),
        ClassificationRule::new("products", &["productos", "venden", "comprar"]),
        ClassificationRule::new("gender_services", &["hombres", "mujeres", "unisex"]),
        ClassificationRule::new("duration", &["duración", "tiempo", "minutos", "horas"]),
        ClassificationRule::new("languages", &["idiomas", "inglés", "español", "hablan"]),
    ]
}

fn contains_any(input: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| input.contains(needle.as_str()))
}
