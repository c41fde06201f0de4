use crate::models::{PartnerProfile, ScoredCandidate, ScoringWeights, SkillLevel};

/// Upper bound on any compatibility score
pub const MAX_MATCH_SCORE: u32 = 100;

/// Calculate a compatibility score (0-100) of `candidate` for `requester`
///
/// Scoring formula (default points):
/// score = min(
///     skill_points      +   # 30/20/10/0 by skill distance
///     goal_points       +   # 8 per shared goal, max 25
///     style_points      +   # 15 if coaching styles are identical
///     day_points        +   # 3 per shared day, max 15
///     location_points,      # 15 same place, 10 substring, 0 otherwise
///     100
/// )
///
/// Goal and day overlap is directional: the requester's lists are filtered by
/// membership in the candidate's, so swapping the arguments can change the score.
pub fn calculate_compatibility(
    requester: &PartnerProfile,
    candidate: &PartnerProfile,
    weights: &ScoringWeights,
) -> ScoredCandidate {
    let common_goals = shared_items(&requester.primary_goals, &candidate.primary_goals);
    let common_days = shared_items(&requester.preferred_days, &candidate.preferred_days);

    let total = skill_points(requester.skill_level, candidate.skill_level, weights)
        .saturating_add(goal_points(common_goals.len(), weights))
        .saturating_add(style_points(
            requester.coaching_style_preference.as_deref(),
            candidate.coaching_style_preference.as_deref(),
            weights,
        ))
        .saturating_add(day_points(common_days.len(), weights))
        .saturating_add(location_points(
            requester.location.as_deref(),
            candidate.location.as_deref(),
            weights,
        ));

    ScoredCandidate {
        // Clamped to MAX_MATCH_SCORE, so the narrowing is lossless
        match_score: total.min(MAX_MATCH_SCORE) as u8,
        common_goals,
        common_days,
        distance_km: None,
    }
}

/// Items of `ours` that also appear in `theirs`, in `ours` order
fn shared_items(ours: &[String], theirs: &[String]) -> Vec<String> {
    ours.iter()
        .filter(|item| theirs.contains(item))
        .cloned()
        .collect()
}

/// Skill proximity points, looked up by ordinal distance
#[inline]
pub fn skill_points(requester: SkillLevel, candidate: SkillLevel, weights: &ScoringWeights) -> u32 {
    let distance = requester.ordinal().abs_diff(candidate.ordinal()) as usize;
    weights.skill.get(distance).copied().unwrap_or(0)
}

/// Shared goal points, saturating at the goal maximum
#[inline]
pub fn goal_points(shared: usize, weights: &ScoringWeights) -> u32 {
    saturating_weight(shared, weights.goal_per_match, weights.goal_max)
}

/// Coaching style points: exact, case-sensitive equality of two non-empty tags
#[inline]
pub fn style_points(requester: Option<&str>, candidate: Option<&str>, weights: &ScoringWeights) -> u32 {
    match (requester, candidate) {
        (Some(a), Some(b)) if !a.is_empty() && a == b => weights.style,
        _ => 0,
    }
}

/// Shared availability points, saturating at the day maximum
#[inline]
pub fn day_points(shared: usize, weights: &ScoringWeights) -> u32 {
    saturating_weight(shared, weights.day_per_match, weights.day_max)
}

/// Location points from a case-insensitive comparison of free-form place names
///
/// Only evaluated when both locations are present and non-empty.
#[inline]
pub fn location_points(requester: Option<&str>, candidate: Option<&str>, weights: &ScoringWeights) -> u32 {
    let (a, b) = match (requester, candidate) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (a.to_lowercase(), b.to_lowercase()),
        _ => return 0,
    };

    if a == b {
        weights.location_exact
    } else if a.contains(&b) || b.contains(&a) {
        weights.location_partial
    } else {
        0
    }
}

#[inline]
fn saturating_weight(count: usize, per_item: u32, max: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    count.saturating_mul(per_item).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_profile(skill_level: SkillLevel) -> PartnerProfile {
        PartnerProfile {
            id: "test_user".to_string(),
            name: Some("Test User".to_string()),
            skill_level,
            primary_goals: strings(&["serve", "footwork"]),
            coaching_style_preference: Some("BALANCED".to_string()),
            preferred_days: strings(&["Mon", "Sat"]),
            location: Some("Austin".to_string()),
            ..PartnerProfile::default()
        }
    }

    #[test]
    fn test_identical_profiles() {
        let a = create_test_profile(SkillLevel::Advanced);
        let b = create_test_profile(SkillLevel::Advanced);

        let scored = calculate_compatibility(&a, &b, &ScoringWeights::default());

        // 30 + 16 + 15 + 6 + 15
        assert_eq!(scored.match_score, 82);
        assert_eq!(scored.common_goals, vec!["serve", "footwork"]);
        assert_eq!(scored.common_days, vec!["Mon", "Sat"]);
        assert_eq!(scored.distance_km, None);
    }

    #[test]
    fn test_skill_table() {
        let w = ScoringWeights::default();
        assert_eq!(skill_points(SkillLevel::Pro, SkillLevel::Pro, &w), 30);
        assert_eq!(skill_points(SkillLevel::Pro, SkillLevel::Advanced, &w), 20);
        assert_eq!(skill_points(SkillLevel::Intermediate, SkillLevel::Pro, &w), 10);
        assert_eq!(skill_points(SkillLevel::Pro, SkillLevel::Beginner, &w), 0);
    }

    #[test]
    fn test_saturating_terms() {
        let w = ScoringWeights::default();
        assert_eq!(goal_points(3, &w), 24);
        assert_eq!(goal_points(4, &w), 25);
        assert_eq!(day_points(5, &w), 15);
        assert_eq!(day_points(7, &w), 15);
        assert_eq!(day_points(usize::MAX, &w), 15);
    }

    #[test]
    fn test_style_requires_exact_match() {
        let w = ScoringWeights::default();
        assert_eq!(style_points(Some("DRILL"), Some("DRILL"), &w), 15);
        assert_eq!(style_points(Some("DRILL"), Some("drill"), &w), 0);
        assert_eq!(style_points(Some(""), Some(""), &w), 0);
        assert_eq!(style_points(None, Some("DRILL"), &w), 0);
    }

    #[test]
    fn test_location_rules() {
        let w = ScoringWeights::default();
        assert_eq!(location_points(Some("Austin"), Some("austin"), &w), 15);
        assert_eq!(location_points(Some("Austin, TX"), Some("AUSTIN"), &w), 10);
        assert_eq!(location_points(Some("Austin"), Some("Dallas"), &w), 0);
        assert_eq!(location_points(Some("Austin"), None, &w), 0);
        assert_eq!(location_points(Some(""), Some("Austin"), &w), 0);
    }

    #[test]
    fn test_clamp_applies_to_heavier_weights() {
        let weights = ScoringWeights {
            skill: [90, 60, 30, 0],
            ..ScoringWeights::default()
        };
        let a = create_test_profile(SkillLevel::Beginner);
        let b = create_test_profile(SkillLevel::Beginner);

        let scored = calculate_compatibility(&a, &b, &weights);
        assert_eq!(scored.match_score, 100);
    }
}
