use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::lenient;

/// Player skill level, ordered from least to most experienced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Pro,
}

impl SkillLevel {
    /// Position in the ordering BEGINNER < INTERMEDIATE < ADVANCED < PRO
    pub fn ordinal(self) -> u8 {
        match self {
            SkillLevel::Beginner => 0,
            SkillLevel::Intermediate => 1,
            SkillLevel::Advanced => 2,
            SkillLevel::Pro => 3,
        }
    }

    /// Parse a stored skill level, falling back to `Beginner` for anything unrecognised
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INTERMEDIATE" => SkillLevel::Intermediate,
            "ADVANCED" => SkillLevel::Advanced,
            "PRO" => SkillLevel::Pro,
            _ => SkillLevel::Beginner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "BEGINNER",
            SkillLevel::Intermediate => "INTERMEDIATE",
            SkillLevel::Advanced => "ADVANCED",
            SkillLevel::Pro => "PRO",
        }
    }
}

impl<'de> Deserialize<'de> for SkillLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(SkillLevel::parse_lenient)
            .unwrap_or_default())
    }
}

/// Read-only view of a user row as seen by the compatibility scorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "skillLevel", default)]
    pub skill_level: SkillLevel,
    #[serde(rename = "primaryGoals", default, deserialize_with = "lenient::string_list")]
    pub primary_goals: Vec<String>,
    #[serde(
        rename = "coachingStylePreference",
        default,
        deserialize_with = "lenient::optional_string"
    )]
    pub coaching_style_preference: Option<String>,
    #[serde(rename = "preferredDays", default, deserialize_with = "lenient::string_list")]
    pub preferred_days: Vec<String>,
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Raw rating as stored; parsed when presented
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(rename = "lastActiveAt", default)]
    pub last_active_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl PartnerProfile {
    /// Coordinates, when both halves are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Compatibility of one candidate with the requesting user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "commonGoals")]
    pub common_goals: Vec<String>,
    #[serde(rename = "commonDays")]
    pub common_days: Vec<String>,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
}

/// Ranked partner as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerMatch {
    pub id: String,
    pub name: Option<String>,
    pub rating: f64,
    #[serde(rename = "skillLevel")]
    pub skill_level: String,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "commonGoals")]
    pub common_goals: Vec<String>,
    #[serde(rename = "commonDays")]
    pub common_days: Vec<String>,
    #[serde(rename = "playingStyle")]
    pub playing_style: Option<String>,
    pub availability: Vec<String>,
}

/// Point allocation for each compatibility term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Points indexed by skill distance 0..=3
    pub skill: [u32; 4],
    pub goal_per_match: u32,
    pub goal_max: u32,
    pub style: u32,
    pub day_per_match: u32,
    pub day_max: u32,
    pub location_exact: u32,
    pub location_partial: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: [30, 20, 10, 0],
            goal_per_match: 8,
            goal_max: 25,
            style: 15,
            day_per_match: 3,
            day_max: 15,
            location_exact: 15,
            location_partial: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_ordinals_are_ordered() {
        assert_eq!(SkillLevel::Beginner.ordinal(), 0);
        assert_eq!(SkillLevel::Intermediate.ordinal(), 1);
        assert_eq!(SkillLevel::Advanced.ordinal(), 2);
        assert_eq!(SkillLevel::Pro.ordinal(), 3);
        assert!(SkillLevel::Beginner < SkillLevel::Pro);
    }

    #[test]
    fn test_unknown_skill_defaults_to_beginner() {
        assert_eq!(SkillLevel::parse_lenient("grandmaster"), SkillLevel::Beginner);
        assert_eq!(SkillLevel::parse_lenient(""), SkillLevel::Beginner);
        assert_eq!(SkillLevel::parse_lenient("advanced"), SkillLevel::Advanced);
    }

    #[test]
    fn test_profile_deserialization_is_lenient() {
        let profile: PartnerProfile = serde_json::from_value(json!({
            "id": "u1",
            "skillLevel": 7,
            "primaryGoals": "serve",
            "preferredDays": ["Mon", 2],
            "coachingStylePreference": "",
            "location": null
        }))
        .unwrap();

        assert_eq!(profile.skill_level, SkillLevel::Beginner);
        assert!(profile.primary_goals.is_empty());
        assert_eq!(profile.preferred_days, vec!["Mon", "2"]);
        assert_eq!(profile.coaching_style_preference, None);
        assert_eq!(profile.location, None);
    }

    #[test]
    fn test_default_weights_sum_to_one_hundred() {
        let w = ScoringWeights::default();
        let total = w.skill[0] + w.goal_max + w.style + w.day_max + w.location_exact;
        assert_eq!(total, 100);
    }

    #[test]
    fn test_partner_match_omits_missing_distance() {
        let partner = PartnerMatch {
            id: "u2".to_string(),
            name: None,
            rating: 2.0,
            skill_level: "BEGINNER".to_string(),
            location: None,
            distance: None,
            is_available: false,
            match_score: 30,
            common_goals: vec![],
            common_days: vec![],
            playing_style: None,
            availability: vec![],
        };

        let value = serde_json::to_value(&partner).unwrap();
        assert!(value.get("distance").is_none());
        assert_eq!(value["matchScore"], 30);
        assert_eq!(value["skillLevel"], "BEGINNER");
    }
}
