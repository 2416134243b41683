//! Structural validation of raw card submissions.
//!
//! Validation collects every violation instead of stopping at the first, so
//! a submitter can fix a bad payload in one round trip. It has no side
//! effects; nothing is stored until a submission passes here.

use thiserror::Error;

use super::models::{CardSubmission, Difficulty};

const MIN_COURSE_LEN: usize = 2;
const MIN_MODULE_LEN: usize = 2;
const MIN_FRONT_LEN: usize = 5;
const MIN_BACK_LEN: usize = 10;

#[derive(Error, Debug, Clone)]
#[error("invalid submission: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// A submission that passed validation: fields trimmed, tags deduplicated
/// in insertion order, difficulty parsed.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub course: String,
    pub module: String,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub source: String,
}

pub fn validate(submission: &CardSubmission) -> Result<ValidSubmission, ValidationError> {
    let mut violations = Vec::new();

    let course = submission.course.trim();
    let module = submission.module.trim();
    let front = submission.front.trim();
    let back = submission.back.trim();

    if course.chars().count() < MIN_COURSE_LEN {
        violations.push(format!(
            "course must be at least {} characters",
            MIN_COURSE_LEN
        ));
    }
    if module.chars().count() < MIN_MODULE_LEN {
        violations.push(format!(
            "module must be at least {} characters",
            MIN_MODULE_LEN
        ));
    }
    if front.chars().count() < MIN_FRONT_LEN {
        violations.push(format!(
            "front must be at least {} characters",
            MIN_FRONT_LEN
        ));
    }
    if back.chars().count() < MIN_BACK_LEN {
        violations.push(format!("back must be at least {} characters", MIN_BACK_LEN));
    }

    // Tags are set-like: blanks dropped, duplicates collapsed, order kept
    let mut tags: Vec<String> = Vec::new();
    for tag in &submission.tags {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.is_empty() {
        violations.push("at least one non-empty tag is required".to_string());
    }

    let difficulty = match submission.difficulty.parse::<Difficulty>() {
        Ok(d) => Some(d),
        Err(e) => {
            violations.push(format!("{} (expected easy, medium or hard)", e));
            None
        }
    };

    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }

    Ok(ValidSubmission {
        course: course.to_string(),
        module: module.to_string(),
        front: front.to_string(),
        back: back.to_string(),
        tags,
        // violations is empty, so the parse above succeeded
        difficulty: difficulty.unwrap(),
        source: submission.source.trim().to_string(),
    })
}
