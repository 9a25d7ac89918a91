use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::matching::{JobMatch, MatchStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school_name: String,
    pub start_year: i32,
    pub end_year: i32,
    #[serde(default)]
    pub field_of_study: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company_name: String,
    pub position: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub proficiency: Option<f64>,
}

/// Contact data and structured history pulled out of a résumé.
///
/// Empty strings / `None` mean "not found"; the screening pipeline decides
/// whether that is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub linkedin_profile: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
}

impl CandidateProfile {
    /// Human-readable labels of the contact fields that are missing.
    pub fn missing_contact_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.surname.trim().is_empty() {
            missing.push("surname");
        }
        if self.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            missing.push("email address");
        }
        if self.phone_number.as_deref().map_or(true, |p| p.trim().is_empty()) {
            missing.push("phone number");
        }
        missing
    }
}

/// One screened résumé as persisted in the candidate store.
///
/// Either `global_rejection_reason` is set and `job_matches` is empty, or the
/// reason is absent and `job_matches` holds one entry per evaluated job.
/// Build through [`CandidateRecord::rejected`] / [`CandidateRecord::scored`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    pub profile: CandidateProfile,
    #[serde(default)]
    pub job_matches: Vec<JobMatch>,
    #[serde(default)]
    pub global_rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CandidateRecord {
    pub fn rejected(profile: CandidateProfile, file_name: Option<String>, reason: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name,
            profile,
            job_matches: Vec::new(),
            global_rejection_reason: Some(reason),
            created_at: Utc::now(),
        }
    }

    pub fn scored(
        profile: CandidateProfile,
        file_name: Option<String>,
        job_matches: Vec<JobMatch>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name,
            profile,
            job_matches,
            global_rejection_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_matched(&self) -> bool {
        self.job_matches
            .iter()
            .any(|m| m.status == MatchStatus::Matched)
    }

    pub fn is_globally_rejected(&self) -> bool {
        self.global_rejection_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> CandidateProfile {
        CandidateProfile {
            name: "Jan".to_string(),
            surname: "Kowalski".to_string(),
            email: Some("jan@example.com".to_string()),
            phone_number: Some("+48 600 100 200".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_profile_has_no_missing_fields() {
        assert!(full_profile().missing_contact_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let profile = CandidateProfile {
            name: "Jan".to_string(),
            email: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            profile.missing_contact_fields(),
            vec!["surname", "email address", "phone number"]
        );
    }

    #[test]
    fn test_rejected_record_has_no_matches() {
        let record = CandidateRecord::rejected(full_profile(), None, "missing data".to_string());
        assert!(record.is_globally_rejected());
        assert!(record.job_matches.is_empty());
        assert!(!record.has_matched());
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "c1",
            "profile": {"name": "Ann", "surname": "Lee", "email": null, "phone_number": null},
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let record: CandidateRecord = serde_json::from_str(json).unwrap();
        assert!(record.job_matches.is_empty());
        assert!(record.global_rejection_reason.is_none());
        assert!(record.profile.education.is_empty());
    }
}
