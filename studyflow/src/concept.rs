//! Concept-learning content and subject colours
//!
//! Generated explanations are cached per week and mode. The cache is only a
//! convenience: regenerating always goes to the backend.

use std::future::Future;
use thiserror::Error;

use crate::api::{ApiError, ConceptMode, ConceptRequest, Subject};
use crate::storage::{clear_concepts, keys, KeyValueStore, StoreError};

/// Shortest explanation accepted as complete, in characters after trimming
pub const MIN_CONTENT_CHARS: usize = 100;

/// Colour of subjects that never picked one
pub const DEFAULT_SUBJECT_COLOR: &str = "#A8D5E2";

const DARK_TEXT: &str = "#1F2937";
const LIGHT_TEXT: &str = "#FFFFFF";

const FRIENDLY_QUOTA_MESSAGE: &str =
    "Gemini API 할당량을 초과했습니다. 잠시 후 다시 시도해주세요. (일반적으로 몇 분 후에 재시도 가능합니다)";

/// Failures of concept generation
#[derive(Error, Debug)]
pub enum ConceptError {
    #[error("콘텐츠가 비어있습니다. 다시 시도해주세요.")]
    Empty,

    #[error("생성된 콘텐츠가 너무 짧습니다. 다시 시도해주세요. ({chars} chars)")]
    TooShort { chars: usize },

    #[error("{0}")]
    QuotaExceeded(String),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for ConceptError {
    /// Quota problems get a friendlier message, whatever the status code
    fn from(err: ApiError) -> Self {
        let message = err.user_message();
        let is_quota = matches!(err, ApiError::QuotaExceeded(_))
            || ["할당량", "quota", "exceeded"]
                .iter()
                .any(|needle| message.contains(needle));

        if is_quota {
            ConceptError::QuotaExceeded(FRIENDLY_QUOTA_MESSAGE.to_string())
        } else {
            ConceptError::Api(err)
        }
    }
}

/// Cached explanation of a week, if any
pub fn cached<S: KeyValueStore + ?Sized>(store: &S, week_id: u64, mode: ConceptMode) -> Option<String> {
    let hit = store
        .get(&keys::concept(week_id, mode))
        .filter(|c| !c.is_empty());
    log::debug!(
        "Concept cache {} for week {} ({})",
        if hit.is_some() { "hit" } else { "miss" },
        week_id,
        mode.as_str()
    );
    hit
}

/// Reject responses that are empty or cut short
pub fn check_content(content: &str) -> Result<(), ConceptError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ConceptError::Empty);
    }

    let chars = trimmed.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(ConceptError::TooShort { chars });
    }
    Ok(())
}

/// Generate an explanation and cache it
///
/// # Parameters
/// * `store` - Cache receiving the content on success
/// * `request` - Week, mode and whether to force regeneration
/// * `call` - The backend call
///
/// # Returns
/// * `Ok(String)` - Content accepted and cached
/// * `Err(ConceptError)` - Empty or short content, quota exhausted, or a
///   failed call; the cache is left untouched
pub async fn generate<S, F, Fut>(
    store: &mut S,
    request: ConceptRequest,
    call: F,
) -> Result<String, ConceptError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(ConceptRequest) -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    let week_id = request.week_id;
    let mode = request.mode;

    let content = call(request).await?;
    check_content(&content)?;

    store.set(&keys::concept(week_id, mode), &content)?;
    log::info!(
        "Cached {} chars of concept text for week {} ({})",
        content.chars().count(),
        week_id,
        mode.as_str()
    );
    Ok(content)
}

/// Cached content unless `force`, generated content otherwise
pub async fn load<S, F, Fut>(
    store: &mut S,
    request: ConceptRequest,
    call: F,
) -> Result<String, ConceptError>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(ConceptRequest) -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    if !request.force_regenerate {
        if let Some(content) = cached(store, request.week_id, request.mode) {
            return Ok(content);
        }
    }
    generate(store, request, call).await
}

/// Forget both cached modes of a week (after its materials change)
pub fn invalidate_week<S: KeyValueStore + ?Sized>(store: &mut S, week_id: u64) -> Result<(), StoreError> {
    clear_concepts(store, week_id)
}

/// Subject colour, falling back to the default
pub fn subject_color(subject: &Subject) -> &str {
    subject
        .color
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_SUBJECT_COLOR)
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim_start_matches('#');
    if hex.len() < 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Text colour readable on a background colour
///
/// Perceived brightness above 200 gets dark text; anything else, including
/// an unparsable colour, gets white.
pub fn text_color_for(background: &str) -> &'static str {
    match parse_hex(background) {
        Some((r, g, b)) => {
            let brightness = (r as f64 * 299.0 + g as f64 * 587.0 + b as f64 * 114.0) / 1000.0;
            if brightness > 200.0 {
                DARK_TEXT
            } else {
                LIGHT_TEXT
            }
        }
        None => LIGHT_TEXT,
    }
}

/// Border colour: every channel at 80 %, floored
pub fn border_color_for(background: &str) -> Option<String> {
    let (r, g, b) = parse_hex(background)?;
    let darken = |c: u8| (c as f64 * 0.8).floor() as u8;
    Some(format!("rgb({}, {}, {})", darken(r), darken(g), darken(b)))
}
