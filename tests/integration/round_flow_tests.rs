//! End-to-end checks of the two-pass rating flow on in-memory slates.

use crate::common::init_test_env;
use marathon_processor::{
    model::qubits::rate_slate,
    processor::{experienced_slate, provisional_results},
    utils::test_utils::{generate_first_timer, generate_participant}
};
use std::collections::HashSet;

fn scenario_slate() -> Vec<marathon_processor::model::structures::Participant> {
    vec![
        generate_participant(1001, "95.50", 1500, 400, 5),
        generate_participant(1002, "88.25", 1350, 450, 3),
        generate_first_timer(1003, "72.00"),
        generate_first_timer(1004, "60.75"),
        generate_first_timer(1005, "45.00"),
    ]
}

#[test]
fn two_passes_partition_the_field() {
    init_test_env();
    let slate = scenario_slate();

    let provisional: HashSet<i64> = provisional_results(&slate).iter().map(|p| p.coder_id).collect();
    let experienced: HashSet<i64> = experienced_slate(&slate).iter().map(|p| p.coder_id).collect();

    // Every attendee lands in exactly one pass
    assert!(provisional.is_disjoint(&experienced));
    let all: HashSet<i64> = slate.iter().map(|p| p.coder_id).collect();
    let union: HashSet<i64> = provisional.union(&experienced).copied().collect();
    assert_eq!(union, all);
}

#[test]
fn scenario_counts_and_volatilities_match_expectations() {
    init_test_env();
    let slate = scenario_slate();

    let provisional = provisional_results(&slate);
    let experienced = rate_slate(&experienced_slate(&slate));

    let by_id = |ps: &[marathon_processor::model::structures::Participant], id: i64| {
        ps.iter().find(|p| p.coder_id == id).cloned().unwrap()
    };

    assert_eq!(by_id(&experienced, 1001).num_ratings, 6);
    assert_eq!(by_id(&experienced, 1002).num_ratings, 4);

    for id in [1003, 1004, 1005] {
        let first_timer = by_id(&provisional, id);
        assert_eq!(first_timer.num_ratings, 1);
        assert_eq!(first_timer.new_volatility, Some(385));
    }

    // Score order is preserved in the combined results
    let combined: Vec<i32> = [1001, 1002]
        .iter()
        .map(|id| by_id(&experienced, *id).new_rating.unwrap())
        .chain([1003, 1004, 1005].iter().map(|id| by_id(&provisional, *id).new_rating.unwrap()))
        .collect();

    for pair in combined.windows(2) {
        assert!(pair[0] > pair[1], "ratings out of score order: {combined:?}");
    }
}

#[test]
fn deltas_respect_the_experience_cap() {
    init_test_env();

    // Extreme spread: a dominant veteran collapses, weak first-timers surge
    let slate = vec![
        generate_participant(1, "0.00", 2900, 150, 100),
        generate_participant(2, "10.00", 900, 500, 1),
        generate_first_timer(3, "99.00"),
        generate_first_timer(4, "98.00"),
        generate_first_timer(5, "97.00"),
    ];

    let priors: Vec<(f64, i32)> = slate.iter().map(|p| (p.rating, p.num_ratings)).collect();
    let rated = rate_slate(&slate);

    for (participant, (prior_rating, prior_count)) in rated.iter().zip(priors) {
        let prior_rating = if prior_count == 0 { 1200.0 } else { prior_rating };
        let cap = 150.0 + 1500.0 / (2.0 + prior_count as f64);
        let delta = (participant.new_rating.unwrap() as f64 - prior_rating).abs();
        assert!(
            delta <= cap + 0.5,
            "coder {} moved {delta} against cap {cap}",
            participant.coder_id
        );
    }
}

#[test]
fn no_rating_ever_drops_below_one() {
    init_test_env();

    let slate = vec![
        generate_participant(1, "0.00", 2, 700, 2),
        generate_participant(2, "0.00", 5, 600, 3),
        generate_participant(3, "100.00", 2600, 100, 40),
    ];

    for participant in rate_slate(&slate) {
        assert!(participant.new_rating.unwrap() >= 1);
    }
}

#[test]
fn every_participant_gains_exactly_one_rated_round() {
    init_test_env();
    let slate = scenario_slate();

    for (rated, prior) in rate_slate(&slate).iter().zip(&slate) {
        assert_eq!(rated.num_ratings, prior.num_ratings + 1);
    }
}
