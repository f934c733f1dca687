use thiserror::Error;

/// Failures of a backend call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    #[error("AI usage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not signed in")]
    NoSession,
}

impl ApiError {
    /// Message suitable for showing next to the failed action
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server { message, .. } | ApiError::QuotaExceeded(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// Build a server error from a response body
    ///
    /// The body's `error` field wins, then `message`, then `fallback`.
    pub fn from_body(status: u16, body: &str, fallback: &str) -> ApiError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["error", "message"]
                    .iter()
                    .find_map(|field| value[*field].as_str().map(str::to_string))
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        if status == 429 {
            ApiError::QuotaExceeded(message)
        } else {
            ApiError::Server { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_wins() {
        let err = ApiError::from_body(400, r#"{"error": "이미 존재하는 아이디", "message": "x"}"#, "가입 실패");
        assert_eq!(err.user_message(), "이미 존재하는 아이디");
    }

    #[test]
    fn test_message_field_fallback() {
        let err = ApiError::from_body(500, r#"{"message": "서버 오류"}"#, "실패");
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert_eq!(err.user_message(), "서버 오류");
    }

    #[test]
    fn test_non_json_body_uses_default() {
        let err = ApiError::from_body(502, "<html>Bad gateway</html>", "과목 목록을 불러오지 못했습니다");
        assert_eq!(err.user_message(), "과목 목록을 불러오지 못했습니다");
    }

    #[test]
    fn test_429_is_quota() {
        let err = ApiError::from_body(429, r#"{"error": "quota exceeded"}"#, "실패");
        assert!(matches!(err, ApiError::QuotaExceeded(_)));
    }
}
