//! Job match scorer. Folds per-requirement verdicts into a [`JobMatch`].
//!
//! Algorithm:
//! 1. weighted_max = base_points(priority) × weight, summed into max_score
//! 2. met requirements award weighted_max; unmet ones are filed as missing
//!    REQUIRED or missing optional (IMPORTANT / OPTIONAL)
//! 3. any missing REQUIRED requirement vetoes the job: REJECTED, score 0
//! 4. otherwise MATCHED with score_percent = round(total / max × 100)
//!
//! Each job is scored independently; nothing carries over between jobs.

use crate::matching::embedding::EmbeddingError;
use crate::matching::requirements::{check_requirement_met, CandidateEvidence};
use crate::models::job_offer::{JobOffer, RequirementPriority};
use crate::models::matching::{JobMatch, MatchStatus, RequirementMatch};

pub fn score_for_job(
    evidence: &CandidateEvidence<'_>,
    job: &JobOffer,
) -> Result<JobMatch, EmbeddingError> {
    let mut matched_requirements = Vec::new();
    let mut missing_required = Vec::new();
    let mut missing_optional = Vec::new();

    let mut total_score = 0.0_f64;
    let mut max_score = 0.0_f64;

    for requirement in &job.requirements {
        let weighted_max = requirement.priority.base_points() * requirement.weight;
        max_score += weighted_max;

        let matched = check_requirement_met(evidence, requirement)?;
        let verdict = RequirementMatch::new(requirement, matched);

        if matched {
            total_score += weighted_max;
            matched_requirements.push(verdict);
        } else if requirement.priority == RequirementPriority::Required {
            missing_required.push(verdict);
        } else {
            missing_optional.push(verdict);
        }
    }

    let (status, score_percent, rejection_reasons) = if missing_required.is_empty() {
        (
            MatchStatus::Matched,
            percentage(total_score, max_score),
            Vec::new(),
        )
    } else {
        total_score = 0.0;
        (
            MatchStatus::Rejected,
            0,
            vec![missing_required_reason(&missing_required)],
        )
    };

    Ok(JobMatch {
        job_id: job.id.clone(),
        job_title: job.title.clone(),
        status,
        score_percent,
        total_score,
        max_score,
        matched_requirements,
        missing_required,
        missing_optional,
        rejection_reasons,
    })
}

/// The verdict recorded when a job could not be evaluated at all: every
/// requirement counts as missing and the job is rejected with `cause`.
pub fn failed_job_match(job: &JobOffer, cause: &str) -> JobMatch {
    let mut missing_required = Vec::new();
    let mut missing_optional = Vec::new();
    let mut max_score = 0.0_f64;

    for requirement in &job.requirements {
        max_score += requirement.priority.base_points() * requirement.weight;
        let verdict = RequirementMatch::new(requirement, false);
        if requirement.priority == RequirementPriority::Required {
            missing_required.push(verdict);
        } else {
            missing_optional.push(verdict);
        }
    }

    JobMatch {
        job_id: job.id.clone(),
        job_title: job.title.clone(),
        status: MatchStatus::Rejected,
        score_percent: 0,
        total_score: 0.0,
        max_score,
        matched_requirements: Vec::new(),
        missing_required,
        missing_optional,
        rejection_reasons: vec![format!("Scoring failed: {cause}")],
    }
}

fn percentage(total_score: f64, max_score: f64) -> u32 {
    if max_score > 0.0 && max_score.is_finite() {
        ((total_score / max_score) * 100.0).round().clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

fn missing_required_reason(missing: &[RequirementMatch]) -> String {
    let names: Vec<&str> = missing.iter().map(|r| r.name.as_str()).collect();
    format!("Missing required competencies: {}", names.join(", "))
}
