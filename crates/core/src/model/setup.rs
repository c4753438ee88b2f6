use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetupValidationError {
    #[error("job description is required")]
    MissingJobDescription,

    #[error("company name is required")]
    MissingCompanyName,

    #[error("duration must be at least one minute")]
    InvalidDuration,

    #[error("unknown interview type: {0}")]
    UnknownInterviewType(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Behavioral,
    #[default]
    Mixed,
}

impl InterviewType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Behavioral => "behavioral",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = SetupValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "behavioral" => Ok(Self::Behavioral),
            "mixed" => Ok(Self::Mixed),
            _ => Err(SetupValidationError::UnknownInterviewType(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Entry,
    #[default]
    Mid,
    Senior,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SetupValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(Self::Entry),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            _ => Err(SetupValidationError::UnknownDifficulty(s.to_owned())),
        }
    }
}

/// Unvalidated setup form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSetupDraft {
    pub job_description: String,
    pub company_name: String,
    pub interview_type: InterviewType,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub job_title: Option<String>,
    pub resume: Option<String>,
}

impl Default for InterviewSetupDraft {
    fn default() -> Self {
        Self {
            job_description: String::new(),
            company_name: String::new(),
            interview_type: InterviewType::default(),
            difficulty: Difficulty::default(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            job_title: None,
            resume: None,
        }
    }
}

impl InterviewSetupDraft {
    #[must_use]
    pub fn new(job_description: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            job_description: job_description.into(),
            company_name: company_name.into(),
            ..Self::default()
        }
    }

    /// Validate the form before any network call is made.
    ///
    /// # Errors
    ///
    /// Returns `SetupValidationError` when the job description or company name is blank,
    /// or when the duration is zero.
    pub fn validate(self) -> Result<InterviewSetup, SetupValidationError> {
        let job_description = self.job_description.trim();
        if job_description.is_empty() {
            return Err(SetupValidationError::MissingJobDescription);
        }
        let company_name = self.company_name.trim();
        if company_name.is_empty() {
            return Err(SetupValidationError::MissingCompanyName);
        }
        if self.duration_minutes == 0 {
            return Err(SetupValidationError::InvalidDuration);
        }

        Ok(InterviewSetup {
            job_description: job_description.to_owned(),
            company_name: company_name.to_owned(),
            interview_type: self.interview_type,
            difficulty: self.difficulty,
            duration_minutes: self.duration_minutes,
            job_title: non_blank(self.job_title),
            resume: non_blank(self.resume),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Validated setup, ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSetup {
    job_description: String,
    company_name: String,
    interview_type: InterviewType,
    difficulty: Difficulty,
    #[serde(rename = "duration")]
    duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume: Option<String>,
}

impl InterviewSetup {
    #[must_use]
    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    #[must_use]
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    #[must_use]
    pub fn interview_type(&self) -> InterviewType {
        self.interview_type
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn job_title(&self) -> Option<&str> {
        self.job_title.as_deref()
    }

    #[must_use]
    pub fn resume(&self) -> Option<&str> {
        self.resume.as_deref()
    }
}
