// Core algorithm exports
pub mod distance;
pub mod matcher;
pub mod scoring;

pub use distance::{haversine_distance, approximate_distance_km};
pub use matcher::{Matcher, RankResult, parse_rating, is_recently_active, MAX_CANDIDATES};
pub use scoring::calculate_compatibility;
