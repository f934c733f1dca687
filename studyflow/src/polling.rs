//! Waiting for the syllabus analysis
//!
//! Creating a subject starts an AI analysis on the backend. The subject is
//! re-fetched on a fixed interval until the analysis lands, fails, or the
//! attempt budget runs out. This is the only automatic retry in the client.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::api::{ApiError, Subject};

/// Message shown when the attempt budget is exhausted
pub const TIMEOUT_MESSAGE: &str =
    "AI 분석이 시간 내에 완료되지 않았습니다. 잠시 후 다시 시도해주세요.";

const FAILED_MESSAGE: &str = "AI 분석이 실패했습니다.";

/// Failures while waiting for an analysis
#[derive(Error, Debug)]
pub enum PollError {
    #[error("AI 분석이 시간 내에 완료되지 않았습니다. 잠시 후 다시 시도해주세요.")]
    TimedOut { attempts: u32 },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where a subject's syllabus analysis stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    /// Analysis stored and usable
    Ready,

    /// The backend stored an error instead of an analysis
    Failed(String),

    /// Text extracted, analysis not stored yet
    Pending,

    /// No syllabus text to analyse
    NoSyllabus,
}

impl AnalysisState {
    pub fn of(subject: &Subject) -> Self {
        match (&subject.syllabus_analysis, &subject.syllabus_text) {
            (Some(analysis), _) if analysis.error.is_some() => AnalysisState::Failed(
                analysis
                    .message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FAILED_MESSAGE.to_string()),
            ),
            (Some(_), _) => AnalysisState::Ready,
            (None, Some(text)) if !text.is_empty() => AnalysisState::Pending,
            (None, _) => AnalysisState::NoSyllabus,
        }
    }
}

/// Re-fetch a subject until its analysis is settled
///
/// # Parameters
/// * `fetch` - Loads the subject; called once up front and once per attempt
/// * `interval` - Delay before every re-fetch
/// * `max_attempts` - Number of re-fetches before giving up
///
/// # Returns
/// * `Ok(Subject)` - Analysis ready, or there was nothing to analyse
/// * `Err(PollError::Failed)` - The backend recorded an analysis error
/// * `Err(PollError::TimedOut)` - Still pending after `max_attempts`
/// * `Err(PollError::Api)` - A fetch failed; polling stops
pub async fn wait_for_analysis<F, Fut>(
    mut fetch: F,
    interval: Duration,
    max_attempts: u32,
) -> Result<Subject, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Subject, ApiError>>,
{
    let mut subject = fetch().await?;
    let mut attempt = 0;

    loop {
        match AnalysisState::of(&subject) {
            AnalysisState::Ready | AnalysisState::NoSyllabus => return Ok(subject),
            AnalysisState::Failed(message) => {
                log::warn!("Syllabus analysis of subject {} failed", subject.id);
                return Err(PollError::Failed(message));
            }
            AnalysisState::Pending => {}
        }

        if attempt >= max_attempts {
            log::warn!("Syllabus analysis of subject {} timed out", subject.id);
            return Err(PollError::TimedOut {
                attempts: max_attempts,
            });
        }

        attempt += 1;
        tokio::time::sleep(interval).await;
        log::info!(
            "Checking analysis of subject {} (attempt {}/{})",
            subject.id,
            attempt,
            max_attempts
        );
        subject = fetch().await?;
    }
}
