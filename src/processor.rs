//! Round orchestration: the only place where I/O and the pure engine meet.
//!
//! A round travels through here exactly once: resolve the round id, reconcile
//! attendance against the submission catalogue (best effort), load the
//! unrated slate, run the two engine passes and persist each one.

use crate::{
    api::{api_structs::Submission, V5ApiClient},
    database::db::{DbClient, DbError},
    model::{
        qubits,
        structures::{CalculationOutcome, Participant}
    }
};
use itertools::Itertools;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("submission api error: {0}")]
    Api(#[from] reqwest::Error)
}

pub struct RoundProcessor {
    db: DbClient,
    api: Arc<V5ApiClient>
}

impl RoundProcessor {
    pub fn new(db: DbClient, api: Arc<V5ApiClient>) -> Self {
        Self { db, api }
    }

    /// Autopilot entry point: resolve the round from the legacy contest id,
    /// reconcile attendance and rate the round.
    ///
    /// A contest with no round mapping uses the legacy id as the round id
    /// directly, which is how pre-migration rounds were keyed.
    pub async fn calculate(&self, challenge_id: &str, legacy_id: i64) -> Result<CalculationOutcome, ProcessorError> {
        let round_id = match self.db.find_round_by_contest(legacy_id).await? {
            Some(round_id) => round_id,
            None => {
                log::info!("no round maps contest {legacy_id}; using it as the round id");
                legacy_id
            }
        };

        if let Err(e) = self.reconcile_attendance(round_id, challenge_id).await {
            log::warn!("attendance reconciliation failed for round {round_id}: {e}; proceeding with stored attendance");
        }

        self.calculate_by_round(round_id).await
    }

    /// Rates a round that is already resolved to its round id.
    ///
    /// An empty unrated slate means the round was rated before (or nobody
    /// attended): no writes happen and the call reports `AlreadyCalculated`.
    pub async fn calculate_by_round(&self, round_id: i64) -> Result<CalculationOutcome, ProcessorError> {
        let slate = self.db.load_unrated_participants(round_id).await?;
        if slate.is_empty() {
            log::info!("round {round_id} has no unrated attendees, nothing to calculate");
            return Ok(CalculationOutcome::AlreadyCalculated);
        }

        log::info!("rating round {round_id}: {} attending participants", slate.len());

        // Provisional pass: the whole field competes, only first-timers keep
        // their results. Persisted before the non-provisional pass runs.
        let provisional = provisional_results(&slate);
        if !provisional.is_empty() {
            self.db.persist_results(round_id, &provisional).await?;
            log::info!("round {round_id}: persisted {} provisional entrants", provisional.len());
        }

        // Non-provisional pass: experienced participants are re-rated against
        // the experienced subfield only, so provisional entrants do not
        // perturb established ratings
        let experienced = experienced_slate(&slate);
        if !experienced.is_empty() {
            let rated = qubits::rate_slate(&experienced);
            self.db.persist_results(round_id, &rated).await?;
            log::info!("round {round_id}: persisted {} experienced participants", rated.len());
        }

        Ok(CalculationOutcome::Success)
    }

    /// Cross-checks the round's attendance against the submission catalogue:
    /// every member whose latest submission carries a final graded review is
    /// flipped from 'N' to 'Y'.
    ///
    /// The submission service being down is not a reason to skip rating; the
    /// caller logs the error and proceeds with the attendance already stored.
    pub async fn reconcile_attendance(&self, round_id: i64, challenge_id: &str) -> Result<(), ProcessorError> {
        let submissions = self.api.submissions(challenge_id).await?;
        let members = graded_members(&submissions);
        if members.is_empty() {
            log::debug!("round {round_id}: no graded submissions to reconcile");
            return Ok(());
        }

        let updated = self.db.mark_attendance(round_id, &members).await?;
        log::info!(
            "round {round_id}: {updated} of {} graded members flipped to attending",
            members.len()
        );

        Ok(())
    }

    /// Data-warehouse hand-off issued when the rating service reports a
    /// successful calculation. The warehouse loaders consume the round id out
    /// of band; the processor only acknowledges the sequencing event.
    pub async fn load_coders(&self, round_id: i64) {
        log::info!("load-coders hand-off acknowledged for round {round_id}");
    }

    /// Follow-up hand-off once the coders load reports success
    pub async fn load_ratings(&self, round_id: i64) {
        log::info!("load-ratings hand-off acknowledged for round {round_id}");
    }
}

/// Runs the engine over the full field and keeps only the participants who
/// entered unrated (post-run `num_ratings == 1`)
pub fn provisional_results(slate: &[Participant]) -> Vec<Participant> {
    qubits::rate_slate(slate)
        .into_iter()
        .filter(|p| p.num_ratings == 1)
        .collect()
}

/// The experienced subfield: participants who entered with a prior rating
pub fn experienced_slate(slate: &[Participant]) -> Vec<Participant> {
    slate.iter().filter(|p| p.num_ratings > 0).cloned().collect()
}

/// Reduces a submission listing to the members whose *latest* submission (by
/// creation time) carries a final graded review
pub fn graded_members(submissions: &[Submission]) -> Vec<i64> {
    submissions
        .iter()
        .into_group_map_by(|s| s.member_id)
        .into_values()
        .filter_map(|group| group.into_iter().max_by_key(|s| s.created))
        .filter(|latest| latest.is_graded())
        .map(|latest| latest.member_id)
        .sorted()
        .collect()
}
