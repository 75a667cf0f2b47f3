use crate::{
    database::db_structs::AlgoRating,
    model::{constants::MARATHON_RATING_TYPE_ID, structures::Participant}
};
use postgres_types::ToSql;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tokio_postgres::{NoTls, Row};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("participant {0} has no computed rating to persist")]
    UnratedParticipant(i64)
}

#[derive(Clone)]
pub struct DbClient {
    client: Arc<tokio_postgres::Client>
}

impl DbClient {
    /// Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, DbError> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("database connection error: {}", e);
            }
        });

        Ok(DbClient {
            client: Arc::new(client)
        })
    }

    /// Resolves a legacy contest id to its round id, when a mapping exists
    pub async fn find_round_by_contest(&self, contest_id: i64) -> Result<Option<i64>, DbError> {
        let row = self
            .client
            .query_opt("SELECT round_id FROM round WHERE contest_id = $1", &[&contest_id])
            .await?;

        Ok(row.map(|r| r.get("round_id")))
    }

    /// Loads the unrated slate for a round: attendees whose results have not
    /// been written yet, each seeded with their current marathon rating tuple
    /// (or the first-timer marker `(0, 0, 0)` when none exists).
    pub async fn load_unrated_participants(&self, round_id: i64) -> Result<Vec<Participant>, DbError> {
        let rows = self
            .client
            .query(
                "SELECT lcr.coder_id, lcr.system_point_total, \
                 ar.rating, ar.vol, ar.num_ratings \
                 FROM long_comp_result lcr \
                 LEFT JOIN algo_rating ar \
                 ON ar.coder_id = lcr.coder_id AND ar.algo_rating_type_id = $2 \
                 WHERE lcr.round_id = $1 \
                 AND lcr.attended IN ('Y', 'y') \
                 AND lcr.new_rating IS NULL \
                 AND lcr.new_vol IS NULL \
                 ORDER BY lcr.system_point_total DESC NULLS LAST, lcr.coder_id",
                &[&round_id, &MARATHON_RATING_TYPE_ID]
            )
            .await?;

        Ok(rows.iter().map(Self::participant_from_row).collect())
    }

    /// Flips `attended` to 'Y' for the given coders where it is currently 'N'.
    /// Returns the number of rows updated.
    pub async fn mark_attendance(&self, round_id: i64, coder_ids: &[i64]) -> Result<u64, DbError> {
        let updated = self
            .client
            .execute(
                "UPDATE long_comp_result SET attended = 'Y' \
                 WHERE round_id = $1 AND attended = 'N' AND coder_id = ANY($2)",
                &[&round_id, &coder_ids]
            )
            .await?;

        Ok(updated)
    }

    /// Writes one engine pass's results in a single transaction: per
    /// participant a fresh snapshot of the prior rating row, the
    /// `long_comp_result` update and the `algo_rating` upsert; then the
    /// round's rated flag, flipped last.
    pub async fn persist_results(&self, round_id: i64, participants: &[Participant]) -> Result<(), DbError> {
        self.client.execute("BEGIN", &[]).await?;

        match self.write_results(round_id, participants).await {
            Ok(()) => {
                self.client.execute("COMMIT", &[]).await?;
                Ok(())
            }
            Err(e) => {
                // Surface the original failure, not the rollback's
                let _ = self.client.execute("ROLLBACK", &[]).await;
                Err(e)
            }
        }
    }

    async fn write_results(&self, round_id: i64, participants: &[Participant]) -> Result<(), DbError> {
        for participant in participants {
            let new_rating = participant
                .new_rating
                .ok_or(DbError::UnratedParticipant(participant.coder_id))?;
            let new_vol = participant
                .new_volatility
                .ok_or(DbError::UnratedParticipant(participant.coder_id))?;

            let snapshot = self.marathon_rating(participant.coder_id).await?;
            let old_rating = snapshot.as_ref().map(|s| s.rating);
            let old_vol = snapshot.as_ref().map(|s| s.vol);

            self.client
                .execute(
                    "UPDATE long_comp_result \
                     SET old_rating = $3, old_vol = $4, new_rating = $5, new_vol = $6, rated_ind = 1 \
                     WHERE round_id = $1 AND coder_id = $2",
                    &[&round_id, &participant.coder_id, &old_rating, &old_vol, &new_rating, &new_vol]
                )
                .await?;

            match snapshot {
                Some(prior) => {
                    let highest = prior.highest_rating.map_or(new_rating, |h| h.max(new_rating));
                    let lowest = prior.lowest_rating.map_or(new_rating, |l| l.min(new_rating));
                    let values: &[&(dyn ToSql + Sync)] = &[
                        &participant.coder_id,
                        &MARATHON_RATING_TYPE_ID,
                        &new_rating,
                        &new_vol,
                        &round_id,
                        &highest,
                        &lowest
                    ];

                    self.client
                        .execute(
                            "UPDATE algo_rating \
                             SET rating = $3, vol = $4, round_id = $5, \
                             num_ratings = num_ratings + 1, \
                             highest_rating = $6, lowest_rating = $7, \
                             last_rated_round_id = $5 \
                             WHERE coder_id = $1 AND algo_rating_type_id = $2",
                            values
                        )
                        .await?;
                }
                None => {
                    self.client
                        .execute(
                            "INSERT INTO algo_rating \
                             (coder_id, algo_rating_type_id, rating, vol, num_ratings, round_id, \
                             highest_rating, lowest_rating, first_rated_round_id, last_rated_round_id) \
                             VALUES ($1, $2, $3, $4, 1, $5, $3, $3, $5, $5)",
                            &[&participant.coder_id, &MARATHON_RATING_TYPE_ID, &new_rating, &new_vol, &round_id]
                        )
                        .await?;
                }
            }
        }

        self.client
            .execute("UPDATE round SET rated_ind = 1 WHERE round_id = $1", &[&round_id])
            .await?;

        Ok(())
    }

    /// Reads a coder's current marathon rating row, if any
    pub async fn marathon_rating(&self, coder_id: i64) -> Result<Option<AlgoRating>, DbError> {
        let row = self
            .client
            .query_opt(
                "SELECT coder_id, algo_rating_type_id, rating, vol, num_ratings, round_id, \
                 highest_rating, lowest_rating, first_rated_round_id, last_rated_round_id \
                 FROM algo_rating WHERE coder_id = $1 AND algo_rating_type_id = $2",
                &[&coder_id, &MARATHON_RATING_TYPE_ID]
            )
            .await?;

        Ok(row.map(|r| Self::algo_rating_from_row(&r)))
    }

    fn participant_from_row(row: &Row) -> Participant {
        let rating: Option<i32> = row.get("rating");
        let vol: Option<i32> = row.get("vol");
        let num_ratings: Option<i32> = row.get("num_ratings");
        let score: Option<Decimal> = row.get("system_point_total");

        Participant::new(
            row.get("coder_id"),
            rating.unwrap_or(0) as f64,
            vol.unwrap_or(0) as f64,
            num_ratings.unwrap_or(0),
            score.unwrap_or(Decimal::ZERO)
        )
    }

    fn algo_rating_from_row(row: &Row) -> AlgoRating {
        AlgoRating {
            coder_id: row.get("coder_id"),
            algo_rating_type_id: row.get("algo_rating_type_id"),
            rating: row.get("rating"),
            vol: row.get("vol"),
            num_ratings: row.get("num_ratings"),
            round_id: row.get("round_id"),
            highest_rating: row.get("highest_rating"),
            lowest_rating: row.get("lowest_rating"),
            first_rated_round_id: row.get("first_rated_round_id"),
            last_rated_round_id: row.get("last_rated_round_id")
        }
    }
}
