use rdkafka::ClientConfig;
use std::{env, time::Duration};

/// Configuration for the Kafka consumer connection and topics
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated broker list, schemes stripped
    pub brokers: String,
    /// Consumer group identity; stable so offsets survive restarts
    pub group_id: String,
    /// PEM client certificate for TLS brokers
    pub client_cert: Option<String>,
    /// PEM private key for the client certificate
    pub client_cert_key: Option<String>,
    /// Topic carrying autopilot phase notifications
    pub autopilot_topic: String,
    /// Topic carrying rating-service lifecycle events
    pub rating_service_topic: String,
    /// Connection retry attempts at startup
    pub retry_attempts: u32,
    /// Initial retry delay
    pub retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration
}

impl KafkaConfig {
    /// Creates a Kafka configuration from environment variables
    pub fn from_env() -> Self {
        let url = env::var("KAFKA_URL").unwrap_or_else(|_| "localhost:9092".to_string());

        Self {
            brokers: Self::brokers_from_url(&url),
            group_id: env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| "marathon-rating-processor".to_string()),
            client_cert: env::var("KAFKA_CLIENT_CERT").ok().filter(|cert| !cert.is_empty()),
            client_cert_key: env::var("KAFKA_CLIENT_CERT_KEY").ok().filter(|key| !key.is_empty()),
            autopilot_topic: env::var("KAFKA_AUTOPILOT_NOTIFICATIONS_TOPIC")
                .unwrap_or_else(|_| "notifications.autopilot.events".to_string()),
            rating_service_topic: env::var("KAFKA_RATING_SERVICE_TOPIC")
                .unwrap_or_else(|_| "rating.service.events".to_string()),
            retry_attempts: env::var("KAFKA_RETRY_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            retry_delay: Duration::from_millis(
                env::var("KAFKA_RETRY_DELAY_MS")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .unwrap_or(100)
            ),
            max_retry_delay: Duration::from_secs(
                env::var("KAFKA_MAX_RETRY_DELAY_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30)
            )
        }
    }

    /// Strips `kafka://` / `kafka+ssl://` schemes from each entry of a
    /// comma-separated broker list
    pub fn brokers_from_url(url: &str) -> String {
        url.split(',')
            .map(|broker| {
                broker
                    .trim()
                    .trim_start_matches("kafka+ssl://")
                    .trim_start_matches("kafka://")
            })
            .filter(|broker| !broker.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn ssl_enabled(&self) -> bool {
        self.client_cert.is_some() && self.client_cert_key.is_some()
    }

    /// Builds the librdkafka client configuration: manual offset commits,
    /// TLS when a client certificate pair is configured
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .set("session.timeout.ms", "10000");

        if let (Some(cert), Some(key)) = (&self.client_cert, &self.client_cert_key) {
            config
                .set("security.protocol", "ssl")
                .set("ssl.certificate.pem", cert)
                .set("ssl.key.pem", key);
        }

        config
    }

    /// Both subscribed topics
    pub fn topics(&self) -> [&str; 2] {
        [self.autopilot_topic.as_str(), self.rating_service_topic.as_str()]
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "marathon-rating-processor".to_string(),
            client_cert: None,
            client_cert_key: None,
            autopilot_topic: "notifications.autopilot.events".to_string(),
            rating_service_topic: "rating.service.events".to_string(),
            retry_attempts: 5,
            retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(30)
        }
    }
}
