//! Partner Match - practice-partner ranking for the coaching app
//!
//! This library scores how well other onboarded players fit the signed-in player
//! (skill proximity, shared goals, coaching style, shared days, location) and
//! serves the ranked list over HTTP.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, calculate_compatibility, scoring::MAX_MATCH_SCORE};
pub use models::{SkillLevel, PartnerProfile, ScoredCandidate, PartnerMatch, ScoringWeights};
