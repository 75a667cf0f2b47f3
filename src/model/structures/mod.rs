pub mod calculation_outcome;
pub mod participant;

pub use calculation_outcome::CalculationOutcome;
pub use participant::Participant;
