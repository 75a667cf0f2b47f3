//! Generators shared by the unit tests, the integration tests and the
//! benchmarks.

use crate::{api::api_structs::Submission, model::structures::Participant};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;

pub fn generate_participant(coder_id: i64, score: &str, rating: i32, volatility: i32, num_ratings: i32) -> Participant {
    Participant::new(
        coder_id,
        rating as f64,
        volatility as f64,
        num_ratings,
        score.parse::<Decimal>().expect("score must be a decimal literal")
    )
}

/// A participant entering their first rated round: the loader's `(0, 0, 0)`
/// marker, normalised by the engine
pub fn generate_first_timer(coder_id: i64, score: &str) -> Participant {
    generate_participant(coder_id, score, 0, 0, 0)
}

/// `n` experienced participants with identical priors and strictly
/// descending scores
pub fn generate_slate(n: i64) -> Vec<Participant> {
    (1..=n)
        .map(|coder_id| {
            let score = format!("{}.00", 1000 - coder_id * 10);
            generate_participant(coder_id, &score, 1500, 300, 5)
        })
        .collect()
}

pub fn generate_submission(member_id: i64, created: &str, graded: bool) -> Submission {
    Submission {
        member_id,
        created: created.parse::<DateTime<Utc>>().expect("created must be an RFC 3339 timestamp"),
        review_summation: graded.then(|| json!([{ "aggregateScore": 90.0 }]))
    }
}
