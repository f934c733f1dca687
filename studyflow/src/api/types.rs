//! Request and response records exchanged with the backend

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A signed-in user's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<u64>,
    pub username: String,
    pub login_id: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub grade: u8,
    pub exam_style: Option<String>,
    pub learning_depth: Option<String>,
    pub material_preference: Option<String>,
    pub practice_style: Option<String>,
    pub ai_persona: Option<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub theme: Option<String>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Sign-up form
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub login_id: String,
    pub password: String,
    pub username: String,
    pub school: String,
    pub major: String,
    pub grade: u8,
}

/// Login form
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// Onboarding answers (five learning-style questions)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingProfile {
    pub exam_style: String,
    pub learning_depth: String,
    pub material_preference: String,
    pub practice_style: String,
    pub ai_persona: String,
}

/// Editable profile fields; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
}

/// Theme and notification preferences
#[derive(Debug, Clone, Default, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
}

/// Response carrying a user record
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub user: Option<UserProfile>,
}

/// Generic `{ "message": ... }` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Weekly entry of a syllabus analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTopic {
    pub week_no: u32,
    pub topic: String,
    pub description: Option<String>,
}

/// AI analysis of an uploaded syllabus
///
/// A failed analysis is stored by the backend as `{ "error": ..., "message": ... }`
/// in the same slot, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyllabusAnalysis {
    pub basic_info: Option<serde_json::Value>,
    #[serde(default)]
    pub weekly_schedule: Vec<WeeklyTopic>,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// The analysis arrives either as an object or as JSON text
fn analysis_from_json_or_text<'de, D>(deserializer: D) -> Result<Option<SyllabusAnalysis>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => {
            Ok(Some(serde_json::from_str(&text).unwrap_or_default()))
        }
        Some(value) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
    }
}

/// Daily study plan keyed by ISO date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    #[serde(default)]
    pub plan: BTreeMap<String, String>,
}

/// A course the user is studying
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,
    #[serde(default)]
    pub user_id: u64,
    pub name: String,
    #[serde(default)]
    pub subject_type: String,
    #[serde(default)]
    pub syllabus_context: Option<String>,
    pub syllabus_file_path: Option<String>,
    pub syllabus_text: Option<String>,
    #[serde(default, deserialize_with = "analysis_from_json_or_text")]
    pub syllabus_analysis: Option<SyllabusAnalysis>,
    pub color: Option<String>,
    pub order: Option<i64>,
    pub exam_date: Option<String>,
    pub exam_type: Option<String>,
    pub exam_week_start: Option<u32>,
    pub exam_week_end: Option<u32>,
    pub is_notification_on: Option<bool>,
    pub study_plan: Option<StudyPlan>,
    #[serde(default)]
    pub weeks: Vec<Week>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// One week of a subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub id: u64,
    pub subject_id: u64,
    pub week_number: u32,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// An uploaded study file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: u64,
    pub week_id: u64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub uploaded_at: Option<String>,
    pub learning_pdf_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectsResponse {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub subject: Subject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeekEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub week: Week,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialUploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub material: Material,
    pub learning_pdf_id: Option<u64>,
}

/// Subject-level study PDF, separate from weekly materials
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LearningPdf {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    pub uploaded_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningPdfUploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub learning_pdf: LearningPdf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDeleteResponse {
    #[serde(default)]
    pub message: String,
    pub week_id: Option<u64>,
}

/// Concept-learning explanation depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptMode {
    Summary,
    DeepDive,
}

impl ConceptMode {
    /// Wire and cache-key name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::DeepDive => "deep_dive",
        }
    }

    /// Every mode, in display order
    pub fn all() -> [ConceptMode; 2] {
        [Self::Summary, Self::DeepDive]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptRequest {
    pub week_id: u64,
    pub mode: ConceptMode,
    pub force_regenerate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConceptResponse {
    #[serde(default)]
    pub content: String,
}

/// Response of the older per-week concept endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct WeekConceptResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub mode: String,
    pub concept: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    Subjective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizLanguage {
    Korean,
    English,
}

/// Options chosen in the quiz creation dialog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOptions {
    pub week_numbers: Vec<u32>,
    pub difficulty: Difficulty,
    pub question_types: Vec<QuestionType>,
    pub language: QuizLanguage,
    pub num_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub past_exam_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u64,
    pub subject_id: u64,
    pub user_id: u64,
    #[serde(default)]
    pub week_numbers: Vec<u32>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_types: Vec<QuestionType>,
    pub language: QuizLanguage,
    pub num_questions: u32,
    pub past_exam_context: Option<String>,
    pub quiz_number: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub quiz_id: u64,
    pub question_type: QuestionType,
    pub question_text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub explanation: String,
    pub key_concept: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub quiz_id: u64,
    pub question_id: u64,
    pub user_answer: String,
    pub is_correct: bool,
    pub submitted_at: String,
}

/// Graded result with the AI-written report text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizReport {
    pub id: u64,
    pub quiz_id: u64,
    pub score: u32,
    pub total: u32,
    pub ai_report: String,
    pub created_at: String,
}

/// Quiz with questions, previous answers and the report if graded
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizDetail {
    pub quiz: Quiz,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Keyed by question id (JSON object keys are strings)
    #[serde(default)]
    pub user_responses: BTreeMap<String, UserResponse>,
    pub report: Option<QuizReport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuiz {
    #[serde(default)]
    pub message: Option<String>,
    pub quiz: Quiz,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerPayload {
    pub question_id: u64,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub question_id: u64,
    pub is_correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
    pub explanation: String,
    pub key_concept: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuizResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub results: Vec<QuizResult>,
    pub report: QuizReport,
}

/// Quiz history entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuizSummary {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub report: Option<QuizReport>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizHistoryResponse {
    #[serde(default)]
    pub quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    Midterm,
    Final,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamDateRequest {
    pub exam_date: String,
    pub exam_type: Option<ExamType>,
    pub exam_week_start: Option<u32>,
    pub exam_week_end: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyPlanResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub study_plan: StudyPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_tolerates_missing_fields() {
        let json = r#"{"id": 3, "name": "자료구조"}"#;
        let subject: Subject = serde_json::from_str(json).unwrap();
        assert_eq!(subject.id, 3);
        assert!(subject.weeks.is_empty());
        assert_eq!(subject.syllabus_analysis, None);
    }

    #[test]
    fn test_failed_analysis_shape() {
        let json = r#"{"id": 1, "name": "x", "syllabus_analysis": {"error": "parse", "message": "분석 실패"}}"#;
        let subject: Subject = serde_json::from_str(json).unwrap();
        let analysis = subject.syllabus_analysis.unwrap();
        assert_eq!(analysis.error.as_deref(), Some("parse"));
        assert!(analysis.weekly_schedule.is_empty());
    }

    #[test]
    fn test_analysis_as_json_text() {
        let json = r#"{"id": 1, "name": "x", "syllabus_analysis": "{\"weekly_schedule\": [{\"week_no\": 1, \"topic\": \"개요\"}]}"}"#;
        let subject: Subject = serde_json::from_str(json).unwrap();
        let analysis = subject.syllabus_analysis.unwrap();
        assert_eq!(analysis.weekly_schedule[0].topic, "개요");
        assert_eq!(analysis.weekly_schedule[0].description, None);
    }

    #[test]
    fn test_quiz_options_wire_format() {
        let options = QuizOptions {
            week_numbers: vec![1, 2],
            difficulty: Difficulty::Medium,
            question_types: vec![QuestionType::MultipleChoice, QuestionType::ShortAnswer],
            language: QuizLanguage::Korean,
            num_questions: 5,
            past_exam_context: None,
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["difficulty"], "medium");
        assert_eq!(value["question_types"][0], "multiple_choice");
        assert!(value.get("past_exam_context").is_none());
    }

    #[test]
    fn test_quiz_history_flattens_quiz() {
        let json = r#"{"quizzes": [{
            "id": 9, "subject_id": 1, "user_id": 2, "week_numbers": [1],
            "difficulty": "hard", "question_types": ["subjective"],
            "language": "english", "num_questions": 3, "past_exam_context": null,
            "quiz_number": 4, "created_at": "2025-01-01T00:00:00", "report": null
        }]}"#;
        let history: QuizHistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(history.quizzes[0].quiz.id, 9);
        assert_eq!(history.quizzes[0].quiz.difficulty, Difficulty::Hard);
        assert!(history.quizzes[0].report.is_none());
    }

    #[test]
    fn test_concept_mode_names() {
        assert_eq!(ConceptMode::DeepDive.as_str(), "deep_dive");
        assert_eq!(
            serde_json::to_value(ConceptMode::DeepDive).unwrap(),
            serde_json::json!("deep_dive")
        );
    }
}
