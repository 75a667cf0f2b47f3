//! The consumer harness: subscribes to both topics, decodes deliveries,
//! dispatches them through the router and commits offsets.

use crate::messaging::{config::KafkaConfig, router::EventRouter};
use rdkafka::{
    consumer::{CommitMode, Consumer, StreamConsumer},
    error::KafkaError,
    message::{BorrowedMessage, Message}
};
use tokio::{sync::watch, time::sleep};

pub struct RatingEventConsumer {
    consumer: StreamConsumer,
    router: EventRouter
}

impl RatingEventConsumer {
    /// Creates the consumer and subscribes to both topics under the
    /// configured group identity
    pub fn new(config: &KafkaConfig, router: EventRouter) -> Result<Self, KafkaError> {
        let consumer = Self::subscribe_consumer(config)?;

        Ok(Self { consumer, router })
    }

    /// Connects to Kafka with exponential backoff retry logic
    pub async fn connect_with_retry(config: &KafkaConfig, router: EventRouter) -> Result<Self, KafkaError> {
        let mut attempt = 0;
        let mut delay = config.retry_delay;

        loop {
            attempt += 1;

            match Self::subscribe_consumer(config) {
                Ok(consumer) => return Ok(Self { consumer, router }),
                Err(e) => {
                    if attempt >= config.retry_attempts {
                        log::error!("failed to connect to Kafka after {} attempts: {}", attempt, e);
                        return Err(e);
                    }

                    log::warn!(
                        "failed to connect to Kafka (attempt {}/{}): {}. Retrying in {:?}...",
                        attempt,
                        config.retry_attempts,
                        e,
                        delay
                    );

                    sleep(delay).await;

                    // Exponential backoff with max delay
                    delay = std::cmp::min(delay * 2, config.max_retry_delay);
                }
            }
        }
    }

    fn subscribe_consumer(config: &KafkaConfig) -> Result<StreamConsumer, KafkaError> {
        let consumer: StreamConsumer = config.client_config().create()?;
        let topics = config.topics();
        consumer.subscribe(&topics)?;

        log::info!(
            "subscribed to {} and {} as group {}",
            topics[0],
            topics[1],
            config.group_id
        );

        Ok(consumer)
    }

    /// Consumes until the shutdown signal fires.
    ///
    /// One message is dispatched at a time per partition stream. The offset
    /// commits after the dispatch returns, success or handled failure:
    /// delivery is at least once with best-effort side effects, and the
    /// idempotent round pipeline tolerates the duplicates. On shutdown the
    /// in-flight dispatch completes; no further messages are taken.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    log::info!("shutdown signal received, no further messages will be dispatched");
                    break;
                }
                delivery = self.consumer.recv() => match delivery {
                    Err(e) => log::error!("bus poll failed: {e}"),
                    Ok(message) => {
                        self.handle(&message).await;

                        if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                            log::error!("offset commit failed: {e}");
                        }
                    }
                }
            }
        }
    }

    async fn handle(&self, message: &BorrowedMessage<'_>) {
        let topic = message.topic();
        let Some(payload) = message.payload() else {
            log::warn!("dropping empty message on {topic}");
            return;
        };

        if let Err(e) = self.router.dispatch(topic, payload).await {
            // The offset still commits: the failure is logged and a replayed
            // duplicate would be absorbed by the already-calculated check
            log::error!("dispatch failed on {topic}: {e}");
        }
    }
}
