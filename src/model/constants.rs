/// Rating assigned to a participant entering their first rated round
pub const INITIAL_RATING: f64 = 1200.0;

/// Volatility assigned to a participant entering their first rated round
pub const INITIAL_VOLATILITY: f64 = 515.0;

/// Volatility every participant leaves their first rated round with
pub const FIRST_VOLATILITY: i32 = 385;

/// Weight of a participant's performance in their first rated round
pub const INITIAL_WEIGHT: f64 = 0.60;

/// Asymptotic weight of a single performance for a long-established participant
pub const FINAL_WEIGHT: f64 = 0.18;

/// The absolute minimum rating any participant can hold
pub const RATING_FLOOR: f64 = 1.0;

/// Base term of the per-round rating delta cap
pub const CAP_BASE: f64 = 150.0;

/// Numerator of the experience-dependent term of the rating delta cap.
/// The full cap is `CAP_BASE + CAP_SCALE / (2 + num_ratings)`.
pub const CAP_SCALE: f64 = 1500.0;

/// Lower bound of the rating tier where the performance weight is
/// attenuated to 4.5/5 of its raw value
pub const TIER_ONE_RATING: f64 = 2000.0;

/// Lower bound of the rating tier where the performance weight is
/// attenuated to 4.0/5 of its raw value
pub const TIER_TWO_RATING: f64 = 2500.0;

/// Weight multiplier for ratings in `[TIER_ONE_RATING, TIER_TWO_RATING)`
pub const TIER_ONE_ATTENUATION: f64 = 4.5 / 5.0;

/// Weight multiplier for ratings at or above `TIER_TWO_RATING`
pub const TIER_TWO_ATTENUATION: f64 = 4.0 / 5.0;

/// The `algo_rating_type_id` of marathon ratings, fixed for this processor
pub const MARATHON_RATING_TYPE_ID: i32 = 3;
