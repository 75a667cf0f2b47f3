use serde::Deserialize;
use serde_json::Value;

/// Originator whose rating-service events drive the round sequencer
pub const RATING_SERVICE_ORIGINATOR: &str = "rating.calculation.service";

/// Sequencer event: a rating calculation finished
pub const RATINGS_CALCULATION_EVENT: &str = "RATINGS_CALCULATION";

/// Sequencer event: the coders load finished
pub const LOAD_CODERS_EVENT: &str = "LOAD_CODERS";

/// Sequencer status accepted for hand-offs
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Outer message envelope shared by both topics. The payload shape varies per
/// topic and is decoded in a second, narrow step that rejects anything
/// missing required fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub originator: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub payload: Value
}

/// Autopilot phase notification payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotPayload {
    pub phase_type_name: String,
    pub state: String,
    pub project_id: i64
}

impl AutopilotPayload {
    /// True for the one transition that can close a ratable contest: the
    /// review phase ending
    pub fn is_review_end(&self) -> bool {
        self.phase_type_name.eq_ignore_ascii_case("review") && self.state.eq_ignore_ascii_case("end")
    }
}

/// Rating-service lifecycle payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingServicePayload {
    pub event: String,
    pub status: String,
    #[serde(default)]
    pub round_id: Option<i64>
}

/// The actions a delivered message can route to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedEvent {
    /// Review phase ended for a project; rate it if it is a marathon match
    ReviewPhaseEnded { project_id: i64 },
    /// Rating calculation succeeded; hand off the coders load
    RatingsCalculated { round_id: i64 },
    /// Coders load succeeded; hand off the ratings load
    CodersLoaded { round_id: i64 }
}
