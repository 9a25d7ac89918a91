//! Batch upload summary: which job each accepted candidate lands on, and
//! where they rank there.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::candidate::CandidateRecord;
use crate::models::matching::{JobMatch, MatchStatus, RequirementMatch};
use crate::screening::pipeline::ScreeningOutcome;

pub const DEFAULT_TOP_N: usize = 3;
pub const MAX_TOP_N: usize = 20;

pub const NO_MATCH_REASON: &str = "No matching job offers";

#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub total_cv: usize,
    pub matched_cv: usize,
    pub rejected_cv: usize,
    pub jobs: Vec<JobCandidates>,
    pub rejected: Vec<RejectedCandidate>,
    pub failed: Vec<FailedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobCandidates {
    pub job_id: String,
    pub job_title: String,
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequirementSummary {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtherMatch {
    pub job_id: String,
    pub job_title: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: String,
    pub file_name: Option<String>,
    pub score: u32,
    pub total_score: f64,
    pub max_score: f64,
    pub matched_requirements: Vec<RequirementSummary>,
    pub unmatched_requirements: Vec<RequirementSummary>,
    pub other_matches: Vec<OtherMatch>,
    pub rank: usize,
    pub is_top: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedCandidate {
    pub candidate_id: String,
    pub file_name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

pub fn summarize(outcomes: &[ScreeningOutcome], top_n: usize) -> UploadSummary {
    let mut jobs: Vec<JobCandidates> = Vec::new();
    let mut job_slots: HashMap<String, usize> = HashMap::new();
    let mut rejected = Vec::new();
    let mut failed = Vec::new();
    let mut total_cv = 0;

    for outcome in outcomes {
        let record = match &outcome.result {
            Ok(record) => record,
            Err(e) => {
                failed.push(FailedFile {
                    file_name: outcome.file_name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        total_cv += 1;

        let mut matched: Vec<&JobMatch> = record
            .job_matches
            .iter()
            .filter(|m| m.status == MatchStatus::Matched)
            .collect();

        if record.is_globally_rejected() || matched.is_empty() {
            rejected.push(RejectedCandidate {
                candidate_id: record.id.clone(),
                file_name: record.file_name.clone(),
                reason: rejection_reason(record),
            });
            continue;
        }

        // Stable, so the first of equally scored jobs is the best one.
        matched.sort_by(|a, b| b.score_percent.cmp(&a.score_percent));
        let best = matched[0];

        let slot = *job_slots.entry(best.job_id.clone()).or_insert_with(|| {
            jobs.push(JobCandidates {
                job_id: best.job_id.clone(),
                job_title: best.job_title.clone(),
                candidates: Vec::new(),
            });
            jobs.len() - 1
        });

        jobs[slot].candidates.push(RankedCandidate {
            candidate_id: record.id.clone(),
            file_name: record.file_name.clone(),
            score: best.score_percent,
            total_score: best.total_score,
            max_score: best.max_score,
            matched_requirements: summarize_requirements(&best.matched_requirements),
            unmatched_requirements: summarize_requirements(
                best.missing_required.iter().chain(&best.missing_optional),
            ),
            other_matches: matched[1..]
                .iter()
                .map(|m| OtherMatch {
                    job_id: m.job_id.clone(),
                    job_title: m.job_title.clone(),
                    score: m.score_percent,
                })
                .collect(),
            rank: 0,
            is_top: false,
        });
    }

    let mut matched_cv = 0;
    for job in &mut jobs {
        job.candidates.sort_by(|a, b| b.score.cmp(&a.score));
        for (idx, candidate) in job.candidates.iter_mut().enumerate() {
            candidate.rank = idx + 1;
            candidate.is_top = candidate.rank <= top_n;
        }
        matched_cv += job.candidates.len();
    }

    UploadSummary {
        total_cv,
        matched_cv,
        rejected_cv: rejected.len(),
        jobs,
        rejected,
        failed,
    }
}

fn rejection_reason(record: &CandidateRecord) -> String {
    if let Some(reason) = &record.global_rejection_reason {
        return reason.clone();
    }

    let mut seen = HashSet::new();
    let unique: Vec<&str> = record
        .job_matches
        .iter()
        .flat_map(|m| m.rejection_reasons.iter())
        .map(String::as_str)
        .filter(|r| seen.insert(*r))
        .collect();

    if unique.is_empty() {
        NO_MATCH_REASON.to_string()
    } else {
        unique.join("; ")
    }
}

fn summarize_requirements<'a>(
    requirements: impl IntoIterator<Item = &'a RequirementMatch>,
) -> Vec<RequirementSummary> {
    requirements
        .into_iter()
        .map(|r| RequirementSummary {
            name: r.name.clone(),
            weight: r.weight,
        })
        .collect()
}
