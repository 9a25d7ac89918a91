//! Requirement matcher: boolean verdict for one (candidate, requirement) pair.
//!
//! Text-based types try literal keyword containment first and the semantic
//! index second; EDUCATION and EXPERIENCE look at the structured profile.
//! A miss is `Ok(false)`; only an embedding failure is an error.

use crate::matching::embedding::EmbeddingError;
use crate::matching::similarity::SemanticIndex;
use crate::models::candidate::{CandidateProfile, EducationEntry, ExperienceEntry};
use crate::models::job_offer::{Requirement, RequirementType};

/// Everything known about one candidate while their résumé is being scored.
pub struct CandidateEvidence<'a> {
    /// Lower-cased résumé text.
    pub text_norm: String,
    pub profile: &'a CandidateProfile,
    pub index: &'a SemanticIndex,
    pub threshold: f32,
    /// Year the evaluation happens in; drives the EDUCATION rule.
    pub current_year: i32,
}

impl<'a> CandidateEvidence<'a> {
    pub fn new(
        cv_text: &str,
        profile: &'a CandidateProfile,
        index: &'a SemanticIndex,
        threshold: f32,
        current_year: i32,
    ) -> Self {
        Self {
            text_norm: cv_text.to_lowercase(),
            profile,
            index,
            threshold,
            current_year,
        }
    }
}

pub fn check_requirement_met(
    evidence: &CandidateEvidence<'_>,
    requirement: &Requirement,
) -> Result<bool, EmbeddingError> {
    match requirement.requirement_type {
        RequirementType::Skill
        | RequirementType::Language
        | RequirementType::Cert
        | RequirementType::Other => text_requirement_met(evidence, requirement),
        RequirementType::Education => Ok(education_requirement_met(
            &requirement.name,
            &evidence.profile.education,
            evidence.current_year,
        )),
        RequirementType::Experience => Ok(experience_requirement_met(
            &requirement.name,
            &evidence.profile.experience,
        )),
    }
}

/// Any keyword literally present, or semantically present via the index.
/// Requirement synonyms are extra literal alternatives.
fn text_requirement_met(
    evidence: &CandidateEvidence<'_>,
    requirement: &Requirement,
) -> Result<bool, EmbeddingError> {
    for keyword in &requirement.keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        if evidence.text_norm.contains(&keyword) {
            return Ok(true);
        }
        if evidence.index.has_synonym(&keyword, evidence.threshold)? {
            return Ok(true);
        }
    }

    Ok(requirement
        .synonyms
        .iter()
        .map(|s| s.trim().to_lowercase())
        .any(|s| !s.is_empty() && evidence.text_norm.contains(&s)))
}

/// "student" wants an education that ends after this year; anything else
/// wants one that already ended.
fn education_requirement_met(name: &str, education: &[EducationEntry], current_year: i32) -> bool {
    if name.trim().eq_ignore_ascii_case("student") {
        education.iter().any(|e| e.end_year > current_year)
    } else {
        education.iter().any(|e| e.end_year < current_year)
    }
}

fn experience_requirement_met(name: &str, experience: &[ExperienceEntry]) -> bool {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    experience.iter().any(|e| {
        e.position.to_lowercase().contains(&needle) || e.company_name.to_lowercase().contains(&needle)
    })
}
