pub mod grading;
pub mod krs_decision;

pub use grading::{GradingService, ScoreSaveResult};
pub use krs_decision::{DecisionOutcome, EnrollmentFailure, KrsDecisionService};
