mod booking;
mod random;

use std::sync::Arc;
use std::time::Instant;

use salon_channels::adapter_for;
use salon_core::{
    CanonicalMessage, CanonicalReply, Catalog, ConfigError, IntentClassifier, Platform,
    UnknownIntentError,
};
use salon_observability::AppMetrics;
use serde_json::Value;
use tracing::{debug, info, instrument};

pub use booking::{available_slots, create_demo_booking, DemoBooking, DEMO_SLOTS};
pub use random::{pick_from, CyclingRandom, FixedRandom, RandomSource, ThreadRandom};

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Reply(Value),
    /// The payload carried no message. Acknowledge without replying.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `None` when the fallback branch produced the reply.
    pub intent: Option<String>,
    pub reply: CanonicalReply,
}

#[derive(Clone)]
pub struct SalonResponder {
    catalog: Arc<Catalog>,
    classifier: IntentClassifier,
    random: Arc<dyn RandomSource>,
    metrics: Arc<AppMetrics>,
}

impl SalonResponder {
    /// Builds the classifier from the catalog and checks every rule resolves.
    pub fn new(catalog: Arc<Catalog>, metrics: Arc<AppMetrics>) -> Result<Self, ConfigError> {
        let classifier = catalog.classifier()?;
        Ok(Self {
            catalog,
            classifier,
            random: Arc::new(ThreadRandom),
            metrics,
        })
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Result<Self, ConfigError> {
        self.catalog.ensure_covers(&classifier)?;
        self.classifier = classifier;
        Ok(self)
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn greeting(&self) -> CanonicalReply {
        CanonicalReply::from(self.catalog.greeting())
    }

    #[instrument(skip_all, fields(platform = %platform))]
    pub fn handle(
        &self,
        platform: Platform,
        payload: &Value,
    ) -> Result<DispatchOutcome, UnknownIntentError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let adapter = adapter_for(platform);
        let Some(message) = adapter.extract(payload) else {
            self.metrics.inc_noop();
            self.metrics.observe_latency(started.elapsed());
            debug!("payload carried no message");
            return Ok(DispatchOutcome::NoOp);
        };

        let resolution = self.resolve(&message)?;
        let rendered = adapter.render(&resolution.reply, &message.user_id);

        self.metrics.inc_reply();
        self.metrics.observe_latency(started.elapsed());
        info!(
            user_id = %message.user_id,
            intent = resolution.intent.as_deref().unwrap_or("fallback"),
            "message handled"
        );

        Ok(DispatchOutcome::Reply(rendered))
    }

    pub fn resolve(&self, message: &CanonicalMessage) -> Result<Resolution, UnknownIntentError> {
        self.respond(&message.text)
    }

    /// Classify `text` and produce the canonical reply, platform agnostic.
    pub fn respond(&self, text: &str) -> Result<Resolution, UnknownIntentError> {
        match self.classifier.classify(text) {
            Some(intent) => {
                let response = self.catalog.lookup(intent)?;
                Ok(Resolution {
                    intent: Some(intent.to_string()),
                    reply: CanonicalReply::from(response),
                })
            }
            None => {
                self.metrics.inc_fallback();
                Ok(Resolution {
                    intent: None,
                    reply: self.fallback_reply(),
                })
            }
        }
    }

    pub fn fallback_reply(&self) -> CanonicalReply {
        let responses = self.catalog.fallback_responses();
        let text = pick_from(self.random.as_ref(), responses)
            .cloned()
            .unwrap_or_default();

        CanonicalReply {
            text,
            quick_replies: self.catalog.main_menu_quick_replies().to_vec(),
        }
    }

    pub fn available_slots(&self) -> Vec<&'static str> {
        available_slots(self.random.as_ref())
    }

    pub fn create_demo_booking(
        &self,
        user_id: &str,
        service: &str,
        date: &str,
        time: &str,
    ) -> DemoBooking {
        let booking = create_demo_booking(self.random.as_ref(), user_id, service, date, time);
        info!(booking_id = %booking.booking_id, user_id = %user_id, "demo booking created");
        booking
    }
}
