// Model exports
pub mod domain;
pub mod lenient;
pub mod requests;
pub mod responses;

pub use domain::{SkillLevel, PartnerProfile, ScoredCandidate, PartnerMatch, ScoringWeights};
pub use requests::{FindPartnersQuery, UpdateProfileRequest};
pub use responses::{FindPartnersResponse, ProfileResponse, HealthResponse, ErrorResponse};
