//! Classifies inbound bus messages and invokes the matching orchestrator
//! action. Everything that cannot succeed on replay (malformed JSON, missing
//! fields, foreign phases or originators) is logged and dropped here;
//! transient failures propagate so the harness can log them.

use crate::{
    api::V5ApiClient,
    messaging::{
        config::KafkaConfig,
        events::{
            AutopilotPayload, Envelope, RatingServicePayload, RoutedEvent, LOAD_CODERS_EVENT,
            RATINGS_CALCULATION_EVENT, RATING_SERVICE_ORIGINATOR, SUCCESS_STATUS
        }
    },
    processor::{ProcessorError, RoundProcessor}
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("challenge lookup failed: {0}")]
    ChallengeLookup(#[from] reqwest::Error),

    #[error("round calculation failed: {0}")]
    Calculation(#[from] ProcessorError)
}

/// The two topic names this processor subscribes to
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    pub autopilot: String,
    pub rating_service: String
}

impl TopicRegistry {
    pub fn from_config(config: &KafkaConfig) -> Self {
        Self {
            autopilot: config.autopilot_topic.clone(),
            rating_service: config.rating_service_topic.clone()
        }
    }
}

pub struct EventRouter {
    processor: Arc<RoundProcessor>,
    api: Arc<V5ApiClient>,
    topics: TopicRegistry
}

impl EventRouter {
    pub fn new(processor: Arc<RoundProcessor>, api: Arc<V5ApiClient>, topics: TopicRegistry) -> Self {
        Self { processor, api, topics }
    }

    /// Routes one delivered message. Returns Ok for every message that was
    /// handled or deliberately dropped; Err only for transient failures worth
    /// surfacing to the harness.
    pub async fn dispatch(&self, topic: &str, raw: &[u8]) -> Result<(), RouterError> {
        let Some(event) = classify(&self.topics, topic, raw) else {
            return Ok(());
        };

        match event {
            RoutedEvent::ReviewPhaseEnded { project_id } => self.handle_review_end(project_id).await,
            RoutedEvent::RatingsCalculated { round_id } => {
                self.processor.load_coders(round_id).await;
                Ok(())
            }
            RoutedEvent::CodersLoaded { round_id } => {
                self.processor.load_ratings(round_id).await;
                Ok(())
            }
        }
    }

    /// A review phase ended: look the challenge up and rate it when it turns
    /// out to be a marathon match. A challenge that cannot be resolved drops
    /// the message; the lookup is a fatal input to the calculation.
    async fn handle_review_end(&self, project_id: i64) -> Result<(), RouterError> {
        let Some(challenge) = self.api.challenge_by_legacy_id(project_id).await? else {
            log::warn!("no challenge found for legacy id {project_id}, dropping notification");
            return Ok(());
        };

        if !challenge.is_marathon_match() {
            log::debug!("challenge {} (legacy {project_id}) is not a marathon match, ignoring", challenge.id);
            return Ok(());
        }

        let legacy_id = challenge.legacy_id.unwrap_or(project_id);
        let outcome = self.processor.calculate(&challenge.id, legacy_id).await?;
        log::info!("review end for legacy contest {legacy_id}: {outcome:?}");

        Ok(())
    }
}

/// Classifies a raw message by topic and payload shape. Anything that does
/// not concern this processor decodes to None after logging.
pub fn classify(topics: &TopicRegistry, topic: &str, raw: &[u8]) -> Option<RoutedEvent> {
    let envelope: Envelope = match serde_json::from_slice(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::warn!("dropping malformed message on {topic}: {e}");
            return None;
        }
    };

    if topic == topics.autopilot {
        classify_autopilot(&envelope)
    } else if topic == topics.rating_service {
        classify_rating_service(&envelope)
    } else {
        log::warn!("dropping message on unrecognised topic {topic}");
        None
    }
}

fn classify_autopilot(envelope: &Envelope) -> Option<RoutedEvent> {
    let payload: AutopilotPayload = match serde_json::from_value(envelope.payload.clone()) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("dropping autopilot notification with unusable payload: {e}");
            return None;
        }
    };

    if !payload.is_review_end() {
        log::debug!("ignoring autopilot phase {} / {}", payload.phase_type_name, payload.state);
        return None;
    }

    Some(RoutedEvent::ReviewPhaseEnded {
        project_id: payload.project_id
    })
}

fn classify_rating_service(envelope: &Envelope) -> Option<RoutedEvent> {
    if envelope.originator.as_deref() != Some(RATING_SERVICE_ORIGINATOR) {
        log::debug!("ignoring rating-service message from originator {:?}", envelope.originator);
        return None;
    }

    let payload: RatingServicePayload = match serde_json::from_value(envelope.payload.clone()) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("dropping rating-service event with unusable payload: {e}");
            return None;
        }
    };

    if payload.status != SUCCESS_STATUS {
        log::debug!("ignoring rating-service event {} with status {}", payload.event, payload.status);
        return None;
    }

    let Some(round_id) = payload.round_id else {
        log::warn!("dropping {} event without a round id", payload.event);
        return None;
    };

    match payload.event.as_str() {
        RATINGS_CALCULATION_EVENT => Some(RoutedEvent::RatingsCalculated { round_id }),
        LOAD_CODERS_EVENT => Some(RoutedEvent::CodersLoaded { round_id }),
        other => {
            log::debug!("ignoring rating-service event {other}");
            None
        }
    }
}
