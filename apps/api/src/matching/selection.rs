//! Job selection policy. Decides which active offers a résumé is scored against.
//!
//! First match wins: offers are tried in the order given, so callers that care
//! about precedence must pass offers in that order.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::models::job_offer::JobOffer;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid regex")
});

/// A declaration is a label at the start of a line: `Position: X`,
/// `Applying for X`, `Application for: X`. The value stays on the same line.
static POSITION_DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:position|applying[ \t]+for|application[ \t]+for)\b[ \t]*:?[ \t]*(.+)$",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// No explicit title found → score against every active offer.
    #[default]
    FallbackToAll,
    /// No explicit title found but the CV declares a position → reject globally.
    RejectUnknownPosition,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(SelectionPolicy::FallbackToAll),
            "strict" => Ok(SelectionPolicy::RejectUnknownPosition),
            other => Err(format!(
                "unknown selection policy '{other}' (expected 'fallback' or 'strict')"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSelectionResult {
    pub jobs_to_consider: Vec<JobOffer>,
    pub explicit_title: Option<String>,
    pub explicit_title_matched: bool,
    pub global_rejection_reason: Option<String>,
}

/// Picks the offers to score `cv_text` against.
pub fn select_jobs(
    cv_text: &str,
    all_jobs: &[JobOffer],
    policy: SelectionPolicy,
) -> JobSelectionResult {
    let active_jobs: Vec<&JobOffer> = all_jobs.iter().filter(|j| j.is_active()).collect();
    let cleaned = strip_contacts(&cv_text.to_lowercase());

    for job in &active_jobs {
        if title_occurs(&job.title, &cleaned) {
            return JobSelectionResult {
                jobs_to_consider: vec![(*job).clone()],
                explicit_title: Some(job.title.clone()),
                explicit_title_matched: true,
                global_rejection_reason: None,
            };
        }
    }

    if policy == SelectionPolicy::RejectUnknownPosition {
        if let Some(declared) = declared_position(cv_text) {
            let reason = format!(
                "CV declares an application for position '{declared}', which is not among the currently open job offers."
            );
            return JobSelectionResult {
                jobs_to_consider: Vec::new(),
                explicit_title: Some(declared),
                explicit_title_matched: false,
                global_rejection_reason: Some(reason),
            };
        }
    }

    JobSelectionResult {
        jobs_to_consider: active_jobs.into_iter().cloned().collect(),
        explicit_title: None,
        explicit_title_matched: false,
        global_rejection_reason: None,
    }
}

/// Removes e-mail addresses and URLs, then collapses whitespace.
fn strip_contacts(text: &str) -> String {
    let without_emails = EMAIL_RE.replace_all(text, " ");
    let without_urls = URL_RE.replace_all(&without_emails, " ");
    collapse_whitespace(&without_urls)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word occurrence of the (trimmed, lower-cased) title in `cleaned`.
fn title_occurs(title: &str, cleaned: &str) -> bool {
    let title = collapse_whitespace(&title.to_lowercase());
    if title.is_empty() {
        return false;
    }
    // \b fails next to titles that start or end in a non-word char ("c++"),
    // so bound on "not a word char" instead.
    let pattern = format!(r"(?:^|[^\w]){}(?:$|[^\w])", regex::escape(&title));
    Regex::new(&pattern)
        .map(|re| re.is_match(cleaned))
        .unwrap_or(false)
}

fn declared_position(cv_text: &str) -> Option<String> {
    POSITION_DECLARATION_RE
        .captures(cv_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
