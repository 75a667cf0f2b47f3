use rust_decimal::Decimal;

/// One contestant in a round's rating slate.
///
/// Materialised by the participant loader, carried through the engine and
/// consumed by the persistor. `rating`, `volatility` and `num_ratings` hold
/// the participant's standing *before* the round; the engine fills
/// `new_rating`/`new_volatility` and bumps `num_ratings` in memory so the
/// two-pass driver can tell first-timers apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub coder_id: i64,
    pub rating: f64,
    pub volatility: f64,
    /// Rated rounds contributing to `rating`; 0 marks a first-timer
    pub num_ratings: i32,
    /// Raw score for this round, exact decimal so ties compare exactly
    pub score: Decimal,
    pub new_rating: Option<i32>,
    pub new_volatility: Option<i32>
}

impl Participant {
    pub fn new(coder_id: i64, rating: f64, volatility: f64, num_ratings: i32, score: Decimal) -> Self {
        Self {
            coder_id,
            rating,
            volatility,
            num_ratings,
            score,
            new_rating: None,
            new_volatility: None
        }
    }

    /// True when the participant entered the round without a prior rating
    pub fn is_first_timer(&self) -> bool {
        self.num_ratings == 0
    }
}
