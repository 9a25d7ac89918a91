//! Contact details pulled out of résumé text with a handful of regexes.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::candidate::CandidateProfile;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d(?:[ \t-]?\d){8,}").expect("valid regex"));

static NAME_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:full\s+name|name)\s*[:\-]\s*(.+)$").expect("valid regex")
});

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?")
        .expect("valid regex")
});

/// How many leading lines are searched for a `Name:` label.
const LABEL_SCAN_LINES: usize = 10;

#[derive(Debug, Default, Clone, Copy)]
pub struct CandidateExtractor;

impl CandidateExtractor {
    /// Builds a profile from free text. Education, experience and skills stay
    /// empty; only contact data is recognised here.
    pub fn extract(&self, text: &str) -> CandidateProfile {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let (name, surname) = labelled_name(&lines)
            .or_else(|| heading_name(&lines))
            .unwrap_or_default();

        CandidateProfile {
            name,
            surname,
            email: first_match(&EMAIL_RE, text),
            phone_number: first_match(&PHONE_RE, text),
            linkedin_profile: first_match(&LINKEDIN_RE, text),
            ..CandidateProfile::default()
        }
    }
}

/// Global rejection reason when contact data is incomplete.
pub fn contact_rejection_reason(profile: &CandidateProfile) -> Option<String> {
    let missing = profile.missing_contact_fields();
    if missing.is_empty() {
        None
    } else {
        Some(format!("Missing contact information: {}", missing.join(", ")))
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().trim().to_string())
}

fn split_name(raw: &str) -> Option<(String, String)> {
    let mut tokens = raw.split_whitespace();
    let first = tokens.next()?;
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return None;
    }
    Some((first.to_string(), rest.join(" ")))
}

fn labelled_name(lines: &[&str]) -> Option<(String, String)> {
    lines.iter().take(LABEL_SCAN_LINES).find_map(|line| {
        NAME_LINE_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| split_name(m.as_str()))
    })
}

/// First line that reads like a bare "Firstname Lastname" heading.
fn heading_name(lines: &[&str]) -> Option<(String, String)> {
    lines
        .iter()
        .filter(|line| !line.chars().any(|c| c.is_ascii_digit() || c == '@' || c == ':'))
        .find_map(|line| split_name(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_full_contact_block() {
        let text = "Jane Mary Roe\nSoftware Engineer\njane.roe@example.com | +48 600 123 456\nlinkedin.com/in/janeroe";
        let profile = CandidateExtractor.extract(text);
        assert_eq!(profile.name, "Jane");
        assert_eq!(profile.surname, "Mary Roe");
        assert_eq!(profile.email.as_deref(), Some("jane.roe@example.com"));
        assert_eq!(profile.phone_number.as_deref(), Some("+48 600 123 456"));
        assert_eq!(profile.linkedin_profile.as_deref(), Some("linkedin.com/in/janeroe"));
        assert!(profile.education.is_empty());
        assert!(contact_rejection_reason(&profile).is_none());
    }

    #[test]
    fn test_labelled_name_wins_over_heading() {
        let text = "Curriculum Vitae\nFull name: John Smith\nEmail: js@example.org";
        let profile = CandidateExtractor.extract(text);
        assert_eq!(profile.name, "John");
        assert_eq!(profile.surname, "Smith");
    }

    #[test]
    fn test_label_outside_first_lines_is_ignored() {
        let mut text = String::from("Résumé\n");
        for i in 0..12 {
            text.push_str(&format!("line {i}\n"));
        }
        text.push_str("Name: Late Label\n");
        let profile = CandidateExtractor.extract(&text);
        assert!(profile.name.is_empty());
        assert!(profile.surname.is_empty());
    }

    #[test]
    fn test_heading_skips_lines_with_digits_or_contacts() {
        let text = "CV 2024\nphone: 123\nAnna Kowalska\npython";
        let profile = CandidateExtractor.extract(text);
        assert_eq!(profile.name, "Anna");
        assert_eq!(profile.surname, "Kowalska");
    }

    #[test]
    fn test_short_phone_numbers_are_ignored() {
        let profile = CandidateExtractor.extract("Anna Kowalska\nroom 12 34 56");
        assert!(profile.phone_number.is_none());
    }

    #[test]
    fn test_missing_contact_lists_fields() {
        let profile = CandidateExtractor.extract("python developer");
        let reason = contact_rejection_reason(&profile).unwrap();
        assert_eq!(reason, "Missing contact information: email address, phone number");
    }

    #[test]
    fn test_nothing_found_lists_everything() {
        let profile = CandidateExtractor.extract("1234");
        let reason = contact_rejection_reason(&profile).unwrap();
        assert_eq!(
            reason,
            "Missing contact information: name, surname, email address, phone number"
        );
    }
}
