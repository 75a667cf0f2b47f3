/// A participant's current rating for one algorithmic competition type.
/// `(coder_id, algo_rating_type_id)` is unique; this processor only ever
/// touches type 3 (marathon). Created lazily on a coder's first rated round
/// and mutated monotonically: every update advances `num_ratings` by one.
#[derive(Debug, Clone)]
pub struct AlgoRating {
    pub coder_id: i64,
    pub algo_rating_type_id: i32,
    pub rating: i32,
    pub vol: i32,
    pub num_ratings: i32,
    /// Most recent rated round
    pub round_id: Option<i64>,
    pub highest_rating: Option<i32>,
    pub lowest_rating: Option<i32>,
    pub first_rated_round_id: Option<i64>,
    pub last_rated_round_id: Option<i64>
}
