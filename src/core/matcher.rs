use chrono::{DateTime, Duration, Utc};

use crate::core::{distance::approximate_distance_km, scoring::calculate_compatibility};
use crate::models::{PartnerMatch, PartnerProfile, ScoringWeights};

/// Hard cap on candidates scored per request
pub const MAX_CANDIDATES: usize = 50;

/// Rating shown when a player has none or it cannot be parsed
pub const DEFAULT_RATING: f64 = 2.0;

/// Players seen within this many days are shown as available
pub const DEFAULT_AVAILABILITY_DAYS: i64 = 7;

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub partners: Vec<PartnerMatch>,
    pub total_candidates: usize,
}

/// Scores candidate partners for a requester and ranks them
///
/// # Pipeline Stages
/// 1. Drop the requester's own row and cap the candidate list
/// 2. Score each candidate
/// 3. Present (rating, availability, distance)
/// 4. Stable sort by score, highest first
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    max_candidates: usize,
    availability_window: Duration,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            max_candidates: MAX_CANDIDATES,
            availability_window: Duration::days(DEFAULT_AVAILABILITY_DAYS),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Lower the candidate cap; values above `MAX_CANDIDATES` are ignored
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.min(MAX_CANDIDATES);
        self
    }

    pub fn with_availability_window(mut self, window: Duration) -> Self {
        self.availability_window = window;
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    /// Rank candidates for a requester
    ///
    /// # Arguments
    /// * `requester` - The signed-in user's profile
    /// * `candidates` - Onboarded users in repository order
    /// * `now` - Reference time for the availability flag
    ///
    /// # Returns
    /// RankResult with partners sorted by score. Equal scores keep repository order.
    pub fn rank_partners(
        &self,
        requester: &PartnerProfile,
        candidates: Vec<PartnerProfile>,
        now: DateTime<Utc>,
    ) -> RankResult {
        let candidates: Vec<PartnerProfile> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != requester.id)
            .collect();
        let total_candidates = candidates.len();

        let mut partners: Vec<PartnerMatch> = candidates
            .into_iter()
            .take(self.max_candidates)
            .map(|candidate| {
                let mut scored = calculate_compatibility(requester, &candidate, &self.weights);
                scored.distance_km = approximate_distance_km(requester, &candidate);

                PartnerMatch {
                    rating: parse_rating(candidate.rating.as_deref()),
                    skill_level: candidate.skill_level.as_str().to_string(),
                    is_available: is_recently_active(
                        candidate.last_active_at,
                        now,
                        self.availability_window,
                    ),
                    distance: scored.distance_km,
                    match_score: scored.match_score,
                    common_goals: scored.common_goals,
                    common_days: scored.common_days,
                    id: candidate.id,
                    name: candidate.name,
                    location: candidate.location,
                    playing_style: candidate.coaching_style_preference,
                    availability: candidate.preferred_days,
                }
            })
            .collect();

        // sort_by is stable, which keeps ties in repository order
        partners.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        RankResult {
            partners,
            total_candidates,
        }
    }

    /// Rank the whole candidate list, then keep the best `limit`
    pub fn top_partners(
        &self,
        requester: &PartnerProfile,
        candidates: Vec<PartnerProfile>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> RankResult {
        let mut result = self.rank_partners(requester, candidates, now);
        result.partners.truncate(limit);
        result
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Parse a stored rating, defaulting to `DEFAULT_RATING`
pub fn parse_rating(raw: Option<&str>) -> f64 {
    raw.and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite())
        .unwrap_or(DEFAULT_RATING)
}

/// Whether `last_active` falls within `window` before `now`
pub fn is_recently_active(
    last_active: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    match last_active {
        Some(at) => now.signed_duration_since(at) <= window,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkillLevel;

    fn create_candidate(id: &str, skill_level: SkillLevel, goals: &[&str]) -> PartnerProfile {
        PartnerProfile {
            id: id.to_string(),
            name: Some(format!("Player {}", id)),
            skill_level,
            primary_goals: goals.iter().map(|g| g.to_string()).collect(),
            ..PartnerProfile::default()
        }
    }

    fn create_requester() -> PartnerProfile {
        create_candidate("me", SkillLevel::Intermediate, &["serve", "volley"])
    }

    #[test]
    fn test_rank_partners_sorted_by_score() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![
            create_candidate("far", SkillLevel::Pro, &[]),
            create_candidate("close", SkillLevel::Intermediate, &["serve", "volley"]),
            create_candidate("mid", SkillLevel::Advanced, &["serve"]),
        ];

        let result = matcher.rank_partners(&create_requester(), candidates, Utc::now());

        let ids: Vec<&str> = result.partners.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["close", "mid", "far"]);
        assert_eq!(result.total_candidates, 3);
    }

    #[test]
    fn test_ties_keep_repository_order() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![
            create_candidate("a", SkillLevel::Advanced, &[]),
            create_candidate("b", SkillLevel::Intermediate, &[]),
            create_candidate("c", SkillLevel::Beginner, &[]),
            create_candidate("d", SkillLevel::Advanced, &[]),
        ];

        let result = matcher.rank_partners(&create_requester(), candidates, Utc::now());

        let ids: Vec<&str> = result.partners.iter().map(|p| p.id.as_str()).collect();
        // b=30, then a, c, d all at 20 in input order
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_requester_excluded() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![
            create_requester(),
            create_candidate("other", SkillLevel::Beginner, &[]),
        ];

        let result = matcher.rank_partners(&create_requester(), candidates, Utc::now());

        assert_eq!(result.partners.len(), 1);
        assert_eq!(result.partners[0].id, "other");
        assert_eq!(result.total_candidates, 1);
    }

    #[test]
    fn test_top_partners_picks_best_from_full_list() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![
            create_candidate("oldest", SkillLevel::Pro, &[]),
            create_candidate("middle", SkillLevel::Advanced, &[]),
            create_candidate("best", SkillLevel::Intermediate, &["serve", "volley"]),
        ];

        let result = matcher.top_partners(&create_requester(), candidates, Utc::now(), 1);

        assert_eq!(result.partners.len(), 1);
        assert_eq!(result.partners[0].id, "best");
        assert_eq!(result.total_candidates, 3);
    }

    #[test]
    fn test_candidate_cap() {
        let matcher = Matcher::with_default_weights().with_max_candidates(500);
        assert_eq!(matcher.max_candidates(), MAX_CANDIDATES);

        let candidates: Vec<PartnerProfile> = (0..80)
            .map(|i| create_candidate(&i.to_string(), SkillLevel::Beginner, &[]))
            .collect();

        let result = matcher.rank_partners(&create_requester(), candidates, Utc::now());

        assert_eq!(result.partners.len(), MAX_CANDIDATES);
        assert_eq!(result.total_candidates, 80);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(Some("4.5")), 4.5);
        assert_eq!(parse_rating(Some(" 3 ")), 3.0);
        assert_eq!(parse_rating(Some("n/a")), DEFAULT_RATING);
        assert_eq!(parse_rating(Some("NaN")), DEFAULT_RATING);
        assert_eq!(parse_rating(None), DEFAULT_RATING);
    }

    #[test]
    fn test_availability_window() {
        let now = Utc::now();
        let window = Duration::days(7);

        assert!(is_recently_active(Some(now - Duration::days(2)), now, window));
        assert!(is_recently_active(Some(now - Duration::days(7)), now, window));
        assert!(!is_recently_active(Some(now - Duration::days(8)), now, window));
        assert!(!is_recently_active(None, now, window));
    }

    #[test]
    fn test_presented_fields() {
        let matcher = Matcher::with_default_weights();
        let mut candidate = create_candidate("x", SkillLevel::Pro, &["serve"]);
        candidate.coaching_style_preference = Some("AGGRESSIVE".to_string());
        candidate.preferred_days = vec!["Tue".to_string()];
        candidate.rating = Some("3.8".to_string());

        let result = matcher.rank_partners(&create_requester(), vec![candidate], Utc::now());
        let partner = &result.partners[0];

        assert_eq!(partner.skill_level, "PRO");
        assert_eq!(partner.rating, 3.8);
        assert_eq!(partner.playing_style.as_deref(), Some("AGGRESSIVE"));
        assert_eq!(partner.availability, vec!["Tue"]);
        assert_eq!(partner.common_goals, vec!["serve"]);
        assert_eq!(partner.distance, None);
        assert!(!partner.is_available);
    }
}
