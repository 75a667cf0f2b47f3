//! The Qubits rating engine.
//!
//! A pure transformation over a slate of [`Participant`]s: no I/O, no shared
//! state. Given every attendee's score and prior rating tuple it produces a
//! new rating and volatility per attendee. The round orchestrator drives it
//! twice per round (provisional and non-provisional pass) and hands the
//! results to the persistor.

use crate::model::{
    constants::{
        CAP_BASE, CAP_SCALE, FINAL_WEIGHT, FIRST_VOLATILITY, INITIAL_RATING, INITIAL_VOLATILITY, INITIAL_WEIGHT,
        RATING_FLOOR, TIER_ONE_ATTENUATION, TIER_ONE_RATING, TIER_TWO_ATTENUATION, TIER_TWO_RATING
    },
    numerics::{erf, inverse_normal_cdf},
    structures::Participant
};

/// Rates a slate of participants, returning a new slate with
/// `new_rating`/`new_volatility` filled in and `num_ratings` incremented.
///
/// The increment is computational only: it lets the caller identify
/// first-timers after the run (`num_ratings == 1`). Durable increments are
/// the persistor's job.
///
/// A single-participant round has no field to perform against, so the engine
/// degenerates to a no-op carrying the (normalised) prior values forward. An
/// empty slate yields an empty slate.
pub fn rate_slate(slate: &[Participant]) -> Vec<Participant> {
    let mut field: Vec<Participant> = slate.to_vec();
    if field.is_empty() {
        return field;
    }

    for participant in field.iter_mut() {
        if participant.is_first_timer() {
            participant.rating = INITIAL_RATING;
            participant.volatility = INITIAL_VOLATILITY;
        }
    }

    let n = field.len();
    if n == 1 {
        let solo = &mut field[0];
        solo.new_rating = Some(solo.rating.round() as i32);
        solo.new_volatility = Some(solo.volatility.round() as i32);
        solo.num_ratings += 1;
        return field;
    }

    let nf = n as f64;
    let rave = field.iter().map(|p| p.rating).sum::<f64>() / nf;
    let vtemp = field.iter().map(|p| p.volatility * p.volatility).sum::<f64>();
    let rtemp = field.iter().map(|p| (p.rating - rave).powi(2)).sum::<f64>();
    let competition_factor = (vtemp / nf + rtemp / (nf - 1.0)).sqrt();

    let expected_performance = expected_performances(&field);
    let actual_performance = actual_performances(&field);

    for (i, participant) in field.iter_mut().enumerate() {
        let diff = actual_performance[i] - expected_performance[i];
        let performed_as = participant.rating + diff * competition_factor;
        let weight = attenuated_weight(participant.rating, participant.num_ratings);

        let tentative = (participant.rating + weight * performed_as) / (1.0 + weight);
        let cap = CAP_BASE + CAP_SCALE / (2.0 + participant.num_ratings as f64);
        let new_rating = tentative
            .clamp(participant.rating - cap, participant.rating + cap)
            .max(RATING_FLOOR)
            .round();

        let new_volatility = if participant.num_ratings > 0 {
            let variance = participant.volatility * participant.volatility / (1.0 + weight)
                + (new_rating - participant.rating).powi(2) / weight;
            variance.sqrt().round() as i32
        } else {
            FIRST_VOLATILITY
        };

        participant.new_rating = Some(new_rating as i32);
        participant.new_volatility = Some(new_volatility);
        participant.num_ratings += 1;
    }

    field
}

/// Probability that `a` beats `b`, from the difference of their ratings
/// against their joint volatility.
fn win_probability(a: &Participant, b: &Participant) -> f64 {
    let joint_volatility = (2.0 * (a.volatility * a.volatility + b.volatility * b.volatility)).sqrt();
    (erf((a.rating - b.rating) / joint_volatility) + 1.0) / 2.0
}

/// Expected performance per participant: the expected rank against the whole
/// field (self included, contributing the leading 0.5) mapped through the
/// inverse normal CDF.
fn expected_performances(field: &[Participant]) -> Vec<f64> {
    let nf = field.len() as f64;
    field
        .iter()
        .map(|p| {
            let expected_rank = 0.5 + field.iter().map(|other| win_probability(other, p)).sum::<f64>();
            -inverse_normal_cdf((expected_rank - 0.5) / nf)
        })
        .collect()
}

/// Actual performance per participant: the tie-aware actual rank mapped
/// through the inverse normal CDF. A participant at rank `i + 0.5 + k/2`
/// performs at `-inverse_cdf((i + k/2) / n)`.
fn actual_performances(field: &[Participant]) -> Vec<f64> {
    let nf = field.len() as f64;
    actual_ranks(field)
        .into_iter()
        .map(|rank| -inverse_normal_cdf((rank - 0.5) / nf))
        .collect()
}

/// Tie-aware actual ranks for a slate.
///
/// Scores rank descending; `k` participants tied at ranks `[i+1, i+k]` each
/// take the midpoint of the span. The iteration repeatedly pulls the maximum
/// remaining score and assigns its whole tie group at once, so the rank sum
/// over the slate is always `n(n+1)/2`.
pub(crate) fn actual_ranks(field: &[Participant]) -> Vec<f64> {
    let n = field.len();
    let mut ranks = vec![0.0; n];
    let mut assigned = vec![false; n];
    let mut ranked = 0usize;

    while ranked < n {
        let top_score = field
            .iter()
            .enumerate()
            .filter(|(idx, _)| !assigned[*idx])
            .map(|(_, p)| p.score)
            .max()
            .expect("unranked participants remain");

        let tied = field
            .iter()
            .enumerate()
            .filter(|(idx, p)| !assigned[*idx] && p.score == top_score)
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();

        let k = tied.len() as f64;
        let rank = ranked as f64 + 0.5 + k / 2.0;
        for idx in tied {
            ranks[idx] = rank;
            assigned[idx] = true;
        }

        ranked += k as usize;
    }

    ranks
}

/// Performance weight for a participant: raw experience-based weight,
/// attenuated for the high-rating tiers.
fn attenuated_weight(rating: f64, num_ratings: i32) -> f64 {
    let raw = (INITIAL_WEIGHT - FINAL_WEIGHT) / (num_ratings as f64 + 1.0) + FINAL_WEIGHT;
    let mut weight = 1.0 / (1.0 - raw) - 1.0;

    if (TIER_ONE_RATING..TIER_TWO_RATING).contains(&rating) {
        weight *= TIER_ONE_ATTENUATION;
    } else if rating >= TIER_TWO_RATING {
        weight *= TIER_TWO_ATTENUATION;
    }

    weight
}
