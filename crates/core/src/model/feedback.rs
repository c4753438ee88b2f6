use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum FeedbackValidationError {
    #[error("{field} score {value} is outside 0-10")]
    ScoreOutOfRange { field: &'static str, value: f64 },
}

/// Structured assessment produced by the backend after answers are submitted.
///
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReport {
    pub overall_score: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub communication_skills: CommunicationSkills,
    #[serde(default)]
    pub technical_accuracy: ScoredNote,
    #[serde(default)]
    pub company_fit: ScoredNote,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub question_feedback: Vec<QuestionFeedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationSkills {
    #[serde(default)]
    pub clarity: f64,
    #[serde(default)]
    pub conciseness: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// A score with its accompanying remark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredNote {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFeedback {
    pub question: String,
    #[serde(default)]
    pub your_answer: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_answer: Option<String>,
}

impl FeedbackReport {
    /// Check every score lies in `0..=10`.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackValidationError::ScoreOutOfRange` naming the first offending field.
    pub fn validate(&self) -> Result<(), FeedbackValidationError> {
        check_score("overallScore", self.overall_score)?;
        check_score("communicationSkills.clarity", self.communication_skills.clarity)?;
        check_score(
            "communicationSkills.conciseness",
            self.communication_skills.conciseness,
        )?;
        check_score(
            "communicationSkills.confidence",
            self.communication_skills.confidence,
        )?;
        check_score("technicalAccuracy", self.technical_accuracy.score)?;
        check_score("companyFit", self.company_fit.score)?;
        for item in &self.question_feedback {
            check_score("questionFeedback.score", item.score)?;
        }
        Ok(())
    }
}

fn check_score(field: &'static str, value: f64) -> Result<(), FeedbackValidationError> {
    if value.is_finite() && (0.0..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(FeedbackValidationError::ScoreOutOfRange { field, value })
    }
}
