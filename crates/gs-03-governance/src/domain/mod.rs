//! Pure governance domain: protocol parameters, lifecycle rules and
//! lifecycle validation.

pub mod lifecycle;
pub mod params;
pub mod rules;

pub use lifecycle::{validate_snapshot, validate_transition};
pub use params::ProtocolParams;
pub use rules::{
    boosted_half_point, can_claim, confidence, expected_stage_for_confidence, is_executable_at,
    meets_boosting_threshold, quiet_ending_restart, threshold_for, voting_deadline,
};
