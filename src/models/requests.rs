use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{lenient, SkillLevel};

/// Query string for the find-partners endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindPartnersQuery {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<u16>,
}

/// Onboarding fields a user can set for partner matching
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_coordinates"))]
pub struct UpdateProfileRequest {
    #[serde(rename = "skillLevel", default)]
    pub skill_level: SkillLevel,
    #[validate(length(max = 20))]
    #[serde(rename = "primaryGoals", default, deserialize_with = "lenient::string_list")]
    pub primary_goals: Vec<String>,
    #[validate(length(max = 64))]
    #[serde(
        rename = "coachingStylePreference",
        default,
        deserialize_with = "lenient::optional_string"
    )]
    pub coaching_style_preference: Option<String>,
    #[validate(length(max = 7))]
    #[serde(rename = "preferredDays", default, deserialize_with = "lenient::string_list")]
    pub preferred_days: Vec<String>,
    #[validate(length(max = 120))]
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Latitude and longitude are stored as a pair
fn validate_coordinates(req: &UpdateProfileRequest) -> Result<(), ValidationError> {
    if req.latitude.is_some() != req.longitude.is_some() {
        return Err(ValidationError::new("coordinates_incomplete"));
    }
    Ok(())
}
