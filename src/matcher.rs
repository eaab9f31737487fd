//! Skill-overlap ranking
//!
//! A skill counts toward an opportunity when its normalized text occurs anywhere
//! in the normalized requirements text. Containment, not token equality: "java"
//! also matches "javascript".

use crate::error::MatchError;
use crate::normalize::normalize;
use crate::types::{MatchResult, OpportunityRecord, SkillSet};

/// Number of skills contained in `requirements`. Range `[0, skills.len()]`.
pub fn score(skills: &SkillSet, requirements: &str) -> u32 {
    let requirements = normalize(requirements);
    skills
        .iter()
        .map(|skill| normalize(skill))
        .filter(|skill| !skill.is_empty() && requirements.contains(skill.as_str()))
        .count() as u32
}

/// Rank opportunities by descending score, keeping input order among ties.
///
/// Pure function of its inputs.
pub fn rank(
    skills: &SkillSet,
    opportunities: &[OpportunityRecord],
    limit: usize,
) -> Result<Vec<MatchResult>, MatchError> {
    if skills.iter().all(|skill| normalize(skill).is_empty()) {
        return Err(MatchError::InvalidInput {
            reason: "student has no skills to match".to_string(),
        });
    }
    if opportunities.is_empty() {
        return Err(MatchError::InvalidInput {
            reason: "no opportunities to rank".to_string(),
        });
    }

    let mut results: Vec<MatchResult> = opportunities
        .iter()
        .map(|opportunity| MatchResult {
            opportunity: opportunity.clone(),
            score: score(skills, &opportunity.requirements),
        })
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);

    Ok(results)
}
