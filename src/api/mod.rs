pub mod api_structs;

use std::time::{Duration, Instant};

use crate::api::api_structs::{Challenge, Submission, TokenResponse};
use reqwest::{
    header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE},
    Client, ClientBuilder, Error
};
use serde_json::json;
use tokio::sync::RwLock;

/// Bounded timeout for every outbound call; the reconciler degrades and the
/// router drops the message when a call exceeds it
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size for submission listing
const SUBMISSIONS_PER_PAGE: u32 = 500;

/// Machine-to-machine credentials for the token endpoint
#[derive(Debug, Clone)]
pub struct M2mConfig {
    pub auth_url: String,
    pub audience: String,
    pub client_id: String,
    pub client_secret: String
}

/// The cached bearer token and its local expiry deadline. The deadline comes
/// from the configured cache TTL; the token itself is opaque.
struct CachedToken {
    token: Option<String>,
    expires_at: Instant
}

impl CachedToken {
    fn valid_at(&self, now: Instant) -> Option<&str> {
        match &self.token {
            Some(token) if now < self.expires_at => Some(token),
            _ => None
        }
    }
}

/// Client for the v5 challenge and submission APIs.
///
/// Holds the process-wide token cache: readers check the expiry deadline and
/// on a miss a fetch repopulates both fields. Concurrent fetches are
/// tolerated; the token endpoint is idempotent.
pub struct V5ApiClient {
    client: Client,
    base_url: String,
    m2m: M2mConfig,
    token_cache_time: Duration,
    token: RwLock<CachedToken>
}

impl V5ApiClient {
    pub fn new(base_url: &str, m2m: M2mConfig, token_cache_time: Duration) -> Result<Self, Error> {
        let client = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            m2m,
            token_cache_time,
            token: RwLock::new(CachedToken {
                token: None,
                expires_at: Instant::now()
            })
        })
    }

    /// Returns a valid bearer token, fetching a fresh one when the cached
    /// token is missing or past its deadline
    async fn valid_token(&self) -> Result<String, Error> {
        {
            let cache = self.token.read().await;
            if let Some(token) = cache.valid_at(Instant::now()) {
                return Ok(token.to_owned());
            }
        }

        let response: TokenResponse = self
            .client
            .post(&self.m2m.auth_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({
                "grant_type": "client_credentials",
                "client_id": self.m2m.client_id,
                "client_secret": self.m2m.client_secret,
                "audience": self.m2m.audience
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Putting `Bearer` here to save allocations on every request made
        let token = format!("Bearer {}", response.access_token);

        let mut cache = self.token.write().await;
        cache.token = Some(token.clone());
        cache.expires_at = Instant::now() + self.token_cache_time;

        Ok(token)
    }

    /// Looks up challenge details by legacy id. The v5 API answers with an
    /// array; only the first element is consumed.
    pub async fn challenge_by_legacy_id(&self, legacy_id: i64) -> Result<Option<Challenge>, Error> {
        let token = self.valid_token().await?;

        let challenges: Vec<Challenge> = self
            .client
            .get(format!("{}/challenges", self.base_url))
            .query(&[("legacyId", legacy_id)])
            .header(AUTHORIZATION, &token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(challenges.into_iter().next())
    }

    /// Fetches every submission for a challenge, paging until the `x-page`
    /// header reaches `x-total-pages`
    pub async fn submissions(&self, challenge_id: &str) -> Result<Vec<Submission>, Error> {
        let token = self.valid_token().await?;

        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .client
                .get(format!("{}/submissions", self.base_url))
                .query(&[
                    ("challengeId", challenge_id.to_owned()),
                    ("perPage", SUBMISSIONS_PER_PAGE.to_string()),
                    ("page", page.to_string())
                ])
                .header(AUTHORIZATION, &token)
                .send()
                .await?
                .error_for_status()?;

            let current = header_number(response.headers(), "x-page");
            let total = header_number(response.headers(), "x-total-pages");

            let batch: Vec<Submission> = response.json().await?;
            all.extend(batch);

            match (current, total) {
                (Some(current), Some(total)) if current < total => page = current + 1,
                _ => break
            }
        }

        Ok(all)
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}
