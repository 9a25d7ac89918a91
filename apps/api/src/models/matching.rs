use serde::{Deserialize, Serialize};

use crate::models::job_offer::{Requirement, RequirementPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Matched,
    Rejected,
}

/// Verdict for a single requirement. Only ever lives inside a [`JobMatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub requirement_id: String,
    pub name: String,
    pub priority: RequirementPriority,
    pub weight: f64,
    pub matched: bool,
}

impl RequirementMatch {
    pub fn new(requirement: &Requirement, matched: bool) -> Self {
        Self {
            requirement_id: requirement.id.clone(),
            name: requirement.name.clone(),
            priority: requirement.priority,
            weight: requirement.weight,
            matched,
        }
    }
}

/// Outcome of scoring one candidate against one job offer.
///
/// `matched_requirements`, `missing_required` and `missing_optional` partition
/// the job's requirements: every requirement appears in exactly one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: String,
    pub job_title: String,
    pub status: MatchStatus,
    pub score_percent: u32,
    pub total_score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub matched_requirements: Vec<RequirementMatch>,
    #[serde(default)]
    pub missing_required: Vec<RequirementMatch>,
    #[serde(default)]
    pub missing_optional: Vec<RequirementMatch>,
    #[serde(default)]
    pub rejection_reasons: Vec<String>,
}

impl JobMatch {
    pub fn requirement_count(&self) -> usize {
        self.matched_requirements.len() + self.missing_required.len() + self.missing_optional.len()
    }
}
