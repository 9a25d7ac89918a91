use serde::{Deserialize, Serialize};

/// Publication state of a job offer. Only `Active` offers take part in matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    #[serde(alias = "ACTIVE")]
    Active,
    #[serde(alias = "PAUSED")]
    Paused,
    #[serde(alias = "CLOSED")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementType {
    Skill,
    Education,
    Experience,
    Cert,
    Language,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementPriority {
    Required,
    Important,
    Optional,
}

impl RequirementPriority {
    /// Points a fully met requirement earns before its weight is applied.
    pub fn base_points(self) -> f64 {
        match self {
            RequirementPriority::Required => 1.0,
            RequirementPriority::Important => 0.7,
            RequirementPriority::Optional => 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    pub name: String,
    pub priority: RequirementPriority,
    pub weight: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub requirements: Vec<Requirement>,
}

impl JobOffer {
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Write-side payloads (ids are assigned by the store)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RequirementInput {
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    pub name: String,
    pub priority: RequirementPriority,
    pub weight: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobOfferInput {
    pub title: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub requirements: Vec<RequirementInput>,
}

impl JobOfferInput {
    /// Checks the shape the matching engine relies on. Returns a human-readable
    /// message describing the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        if self.requirements.is_empty() {
            return Err("a job offer needs at least one requirement".to_string());
        }
        for (idx, req) in self.requirements.iter().enumerate() {
            if req.name.trim().is_empty() {
                return Err(format!("requirement #{} has an empty name", idx + 1));
            }
            if !req.weight.is_finite() || req.weight <= 0.0 {
                return Err(format!(
                    "requirement '{}' must have a positive weight, got {}",
                    req.name, req.weight
                ));
            }
        }
        Ok(())
    }

    /// Materialises the payload into a stored offer, minting requirement ids.
    pub fn into_offer(self, id: String) -> JobOffer {
        JobOffer {
            id,
            title: self.title.trim().to_string(),
            status: self.status,
            contract_type: self.contract_type,
            seniority: self.seniority,
            description: self.description,
            requirements: self
                .requirements
                .into_iter()
                .map(|r| Requirement {
                    id: uuid::Uuid::new_v4().to_string(),
                    requirement_type: r.requirement_type,
                    name: r.name,
                    priority: r.priority,
                    weight: r.weight,
                    keywords: r.keywords,
                    synonyms: r.synonyms,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, weight: f64) -> JobOfferInput {
        JobOfferInput {
            title: title.to_string(),
            status: JobStatus::Active,
            contract_type: None,
            seniority: None,
            description: None,
            requirements: vec![RequirementInput {
                requirement_type: RequirementType::Skill,
                name: "Python".to_string(),
                priority: RequirementPriority::Required,
                weight,
                keywords: vec!["python".to_string()],
                synonyms: vec![],
            }],
        }
    }

    #[test]
    fn test_base_points_table() {
        assert_eq!(RequirementPriority::Required.base_points(), 1.0);
        assert_eq!(RequirementPriority::Important.base_points(), 0.7);
        assert_eq!(RequirementPriority::Optional.base_points(), 0.4);
    }

    #[test]
    fn test_status_accepts_upper_case_alias() {
        let status: JobStatus = serde_json::from_str(r#""ACTIVE""#).unwrap();
        assert_eq!(status, JobStatus::Active);
        let status: JobStatus = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(status, JobStatus::Paused);
    }

    #[test]
    fn test_requirement_deserializes_type_field() {
        let json = r#"{
            "id": "r1",
            "type": "LANGUAGE",
            "name": "English",
            "priority": "IMPORTANT",
            "weight": 3
        }"#;
        let req: Requirement = serde_json::from_str(json).unwrap();
        assert_eq!(req.requirement_type, RequirementType::Language);
        assert_eq!(req.priority, RequirementPriority::Important);
        assert!(req.keywords.is_empty());
        assert!(req.synonyms.is_empty());
    }

    #[test]
    fn test_validate_rejects_non_positive_weight() {
        assert!(input("Backend Engineer", 0.0).validate().is_err());
        assert!(input("Backend Engineer", f64::NAN).validate().is_err());
        assert!(input("Backend Engineer", 5.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_title_and_empty_requirements() {
        assert!(input("   ", 1.0).validate().is_err());
        let mut no_reqs = input("Backend Engineer", 1.0);
        no_reqs.requirements.clear();
        assert!(no_reqs.validate().is_err());
    }

    #[test]
    fn test_into_offer_mints_distinct_requirement_ids() {
        let mut payload = input("  Backend Engineer ", 1.0);
        payload.requirements.push(payload.requirements[0].clone());
        let offer = payload.into_offer("job-1".to_string());
        assert_eq!(offer.title, "Backend Engineer");
        assert_ne!(offer.requirements[0].id, offer.requirements[1].id);
    }
}
