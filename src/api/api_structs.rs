use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Challenge details from the v5 challenge API. Only the fields the router
/// consumes are modelled; everything else in the response is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// v5 challenge id (a UUID), used for submission lookups
    pub id: String,
    pub legacy_id: Option<i64>,
    pub legacy: Option<ChallengeLegacy>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeLegacy {
    pub sub_track: Option<String>
}

impl Challenge {
    /// True when the challenge's legacy sub-track marks it as a marathon match
    pub fn is_marathon_match(&self) -> bool {
        self.legacy
            .as_ref()
            .and_then(|legacy| legacy.sub_track.as_deref())
            .is_some_and(|sub_track| sub_track.eq_ignore_ascii_case("marathon_match"))
    }
}

/// One submission from the v5 submission API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub member_id: i64,
    pub created: DateTime<Utc>,
    /// Present once the submission has a final graded review
    pub review_summation: Option<serde_json::Value>
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.review_summation.is_some()
    }
}

/// Response from the machine-to-machine token endpoint. The token is opaque;
/// its lifetime is governed by the local cache TTL, not the response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String
}
