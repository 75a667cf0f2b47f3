/// Result of a round calculation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationOutcome {
    /// The round was rated and all results persisted
    Success,
    /// The unrated slate was empty: the round was already rated (or has no
    /// attending participants), so no writes were performed
    AlreadyCalculated
}
