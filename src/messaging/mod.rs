pub mod config;
pub mod consumer;
pub mod events;
pub mod router;


pub use config::KafkaConfig;
pub use consumer::RatingEventConsumer;
pub use events::{AutopilotPayload, Envelope, RatingServicePayload, RoutedEvent};
pub use router::{EventRouter, TopicRegistry};
