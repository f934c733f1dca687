//! Quiz taking state
//!
//! A [`QuizSession`] holds one quiz page: the questions, the answers typed so
//! far, and the graded result once there is one.

use itertools::Itertools;
use std::collections::BTreeMap;

use crate::api::{AnswerPayload, Question, QuizDetail, QuizReport, QuizResult, SubmitQuizResponse};
use crate::router::QuizMode;

/// One open quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    detail: QuizDetail,
    mode: QuizMode,
    answers: BTreeMap<u64, String>,
    results: Option<Vec<QuizResult>>,
    report: Option<QuizReport>,
    retaking: bool,
}

impl QuizSession {
    /// Open a loaded quiz in the given mode
    ///
    /// Viewing a graded quiz restores its answers and results. Retaking
    /// starts from a blank sheet; the backend discards the old result on the
    /// next submission.
    pub fn open(mut detail: QuizDetail, mode: QuizMode) -> Self {
        detail.questions.sort_by_key(|q| q.order);

        let mut session = Self {
            detail,
            mode,
            answers: BTreeMap::new(),
            results: None,
            report: None,
            retaking: mode == QuizMode::Retake,
        };

        if mode == QuizMode::View {
            if let Some(report) = session.detail.report.clone() {
                session.restore_graded(report);
            }
        }

        session
    }

    fn restore_graded(&mut self, report: QuizReport) {
        for response in self.detail.user_responses.values() {
            self.answers
                .insert(response.question_id, response.user_answer.clone());
        }

        let results = self
            .detail
            .questions
            .iter()
            .map(|q| {
                let response = self.detail.user_responses.get(&q.id.to_string());
                QuizResult {
                    question_id: q.id,
                    is_correct: response.is_some_and(|r| r.is_correct),
                    user_answer: response.map(|r| r.user_answer.clone()).unwrap_or_default(),
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                    key_concept: q.key_concept.clone(),
                }
            })
            .collect();

        self.results = Some(results);
        self.report = Some(report);
        self.retaking = false;
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn detail(&self) -> &QuizDetail {
        &self.detail
    }

    /// Questions in display order
    pub fn questions(&self) -> &[Question] {
        &self.detail.questions
    }

    /// Record an answer; unknown question ids are ignored
    pub fn answer(&mut self, question_id: u64, answer: impl Into<String>) -> bool {
        if self.detail.questions.iter().any(|q| q.id == question_id) {
            self.answers.insert(question_id, answer.into());
            true
        } else {
            false
        }
    }

    pub fn answer_of(&self, question_id: u64) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    /// Questions without a non-blank answer
    pub fn unanswered(&self) -> Vec<&Question> {
        self.detail
            .questions
            .iter()
            .filter(|q| self.answer_of(q.id).map_or(true, |a| a.trim().is_empty()))
            .collect()
    }

    /// Answers to send, in question order
    pub fn answers_payload(&self) -> Vec<AnswerPayload> {
        self.detail
            .questions
            .iter()
            .filter_map(|q| {
                self.answers.get(&q.id).map(|answer| AnswerPayload {
                    question_id: q.id,
                    answer: answer.clone(),
                })
            })
            .collect()
    }

    /// Take in the graded submission
    pub fn apply_submission(&mut self, response: SubmitQuizResponse) {
        self.results = Some(response.results);
        self.report = Some(response.report);
        self.retaking = false;
    }

    /// Whether the graded result should be shown instead of the answer form
    pub fn is_submitted(&self) -> bool {
        let graded = self.report.is_some() && self.results.is_some();
        match self.mode {
            QuizMode::View => graded,
            QuizMode::Retake => graded && !self.retaking,
        }
    }

    pub fn report(&self) -> Option<&QuizReport> {
        self.report.as_ref()
    }

    pub fn result_for(&self, question_id: u64) -> Option<&QuizResult> {
        self.results
            .as_ref()?
            .iter()
            .find(|r| r.question_id == question_id)
    }

    pub fn score(&self) -> u32 {
        self.report.as_ref().map_or(0, |r| r.score)
    }

    pub fn total(&self) -> u32 {
        self.detail.questions.len() as u32
    }

    /// Rounded score percentage; `None` for a quiz without questions
    pub fn percentage(&self) -> Option<u32> {
        percentage(self.score(), self.total())
    }
}

/// `round(score / total * 100)`, or `None` when `total` is zero
pub fn percentage(score: u32, total: u32) -> Option<u32> {
    (total > 0).then(|| (score as f64 / total as f64 * 100.0).round() as u32)
}

/// Short label of the weeks a quiz covers
///
/// One week reads `Week 3`, a contiguous run `Weeks 2-4`, anything else
/// `Week 1, 3, 5`.
pub fn format_week_scope(week_numbers: &[u32]) -> String {
    match week_numbers {
        [] => String::new(),
        [single] => format!("Week {}", single),
        _ => {
            let sorted: Vec<u32> = week_numbers.iter().copied().sorted().collect();
            let contiguous = sorted.iter().tuple_windows().all(|(a, b)| *b == a + 1);
            if contiguous {
                format!("Weeks {}-{}", sorted[0], sorted[sorted.len() - 1])
            } else {
                format!("Week {}", sorted.iter().join(", "))
            }
        }
    }
}
