use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::error::ApiError;
use super::types::*;
use crate::config::ClientConfig;

/// Message used when the AI quota runs out on concept generation
pub const QUOTA_MESSAGE: &str =
    "API 할당량을 초과했습니다. 잠시 후 다시 시도해주세요. (무료 티어: 일일 20회 제한)";

/// A file picked for upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    fn into_part(self) -> Part {
        Part::bytes(self.bytes).file_name(self.file_name)
    }
}

/// Client for every backend endpoint the app uses
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    generation_timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration
    ///
    /// # Parameters
    /// * `config` - Backend URL and timeouts
    ///
    /// # Returns
    /// * `Ok(ApiClient)` - Ready client
    /// * `Err(ApiError)` - The HTTP client could not be built
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            generation_timeout: config.generation_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        log::debug!("Calling {}", endpoint);

        let response = request.send().await.map_err(|e| {
            log::warn!("{} failed: {}", endpoint, e);
            ApiError::Transport(e)
        })?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_body(status.as_u16(), &body, fallback);
            log::warn!("{} returned {}: {}", endpoint, status, err.user_message());
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    // Account

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserEnvelope, ApiError> {
        let req = self.http.post(self.url("/register")).json(request);
        self.send(req, "POST /register", "회원가입에 실패했습니다.")
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<UserEnvelope, ApiError> {
        let req = self.http.post(self.url("/login")).json(request);
        self.send(req, "POST /login", "로그인에 실패했습니다.").await
    }

    /// Store the onboarding answers
    pub async fn save_profile(
        &self,
        user_id: u64,
        profile: &OnboardingProfile,
    ) -> Result<UserEnvelope, ApiError> {
        let body = json!({
            "user_id": user_id,
            "exam_style": profile.exam_style,
            "learning_depth": profile.learning_depth,
            "material_preference": profile.material_preference,
            "practice_style": profile.practice_style,
            "ai_persona": profile.ai_persona,
        });
        let req = self.http.post(self.url("/save-profile")).json(&body);
        self.send(req, "POST /save-profile", "프로필 저장에 실패했습니다.")
            .await
    }

    pub async fn get_user(&self, user_id: u64) -> Result<UserEnvelope, ApiError> {
        let req = self
            .http
            .get(self.url("/api/user"))
            .query(&[("user_id", user_id)]);
        self.send(req, "GET /api/user", "사용자 정보 조회에 실패했습니다.")
            .await
    }

    pub async fn update_profile(
        &self,
        user_id: u64,
        update: &ProfileUpdate,
    ) -> Result<UserEnvelope, ApiError> {
        let mut body = serde_json::to_value(update).map_err(|source| ApiError::Decode {
            endpoint: "PUT /api/user/profile".to_string(),
            source,
        })?;
        body["user_id"] = json!(user_id);
        let req = self.http.put(self.url("/api/user/profile")).json(&body);
        self.send(req, "PUT /api/user/profile", "프로필 수정에 실패했습니다.")
            .await
    }

    pub async fn change_password(
        &self,
        user_id: u64,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = json!({
            "user_id": user_id,
            "current_password": current_password,
            "new_password": new_password,
        });
        let req = self.http.put(self.url("/api/user/password")).json(&body);
        self.send(req, "PUT /api/user/password", "비밀번호 변경에 실패했습니다.")
            .await
    }

    pub async fn delete_account(&self, user_id: u64) -> Result<MessageResponse, ApiError> {
        let req = self
            .http
            .delete(self.url("/api/user/account"))
            .json(&json!({ "user_id": user_id }));
        self.send(req, "DELETE /api/user/account", "회원 탈퇴에 실패했습니다.")
            .await
    }

    pub async fn update_preferences(
        &self,
        user_id: u64,
        preferences: &Preferences,
    ) -> Result<UserEnvelope, ApiError> {
        let mut body = serde_json::to_value(preferences).map_err(|source| ApiError::Decode {
            endpoint: "PUT /api/user/preferences".to_string(),
            source,
        })?;
        body["user_id"] = json!(user_id);
        let req = self.http.put(self.url("/api/user/preferences")).json(&body);
        self.send(req, "PUT /api/user/preferences", "설정 저장에 실패했습니다.")
            .await
    }

    // Subjects

    pub async fn list_subjects(&self, user_id: u64) -> Result<Vec<Subject>, ApiError> {
        let req = self
            .http
            .get(self.url("/subjects"))
            .query(&[("user_id", user_id)]);
        let response: SubjectsResponse = self
            .send(req, "GET /subjects", "과목 목록 조회에 실패했습니다.")
            .await?;
        Ok(response.subjects)
    }

    pub async fn get_subject(&self, subject_id: u64) -> Result<Subject, ApiError> {
        let req = self.http.get(self.url(&format!("/subjects/{}", subject_id)));
        let response: SubjectEnvelope = self
            .send(req, "GET /subjects/:id", "과목 정보 조회에 실패했습니다.")
            .await?;
        Ok(response.subject)
    }

    /// Create a subject from its syllabus file
    ///
    /// The backend analyses the syllabus in the background; poll the subject
    /// until the analysis is ready.
    pub async fn create_subject(
        &self,
        user_id: u64,
        name: &str,
        subject_type: &str,
        syllabus: Upload,
    ) -> Result<Subject, ApiError> {
        let form = Form::new()
            .text("user_id", user_id.to_string())
            .text("name", name.to_string())
            .text("subject_type", subject_type.to_string())
            .part("file", syllabus.into_part());
        let req = self.http.post(self.url("/subjects")).multipart(form);
        let response: SubjectEnvelope = self
            .send(req, "POST /subjects", "과목 생성에 실패했습니다.")
            .await?;
        Ok(response.subject)
    }

    pub async fn delete_subject(&self, subject_id: u64) -> Result<MessageResponse, ApiError> {
        let req = self
            .http
            .delete(self.url(&format!("/subjects/{}", subject_id)));
        self.send(req, "DELETE /subjects/:id", "과목 삭제에 실패했습니다.")
            .await
    }

    pub async fn reorder_subjects(
        &self,
        user_id: u64,
        subject_ids: &[u64],
    ) -> Result<(), ApiError> {
        let body = json!({ "user_id": user_id, "subject_ids": subject_ids });
        let req = self.http.patch(self.url("/api/subjects/reorder")).json(&body);
        let _: serde_json::Value = self
            .send(req, "PATCH /api/subjects/reorder", "과목 순서 변경에 실패했습니다.")
            .await?;
        Ok(())
    }

    pub async fn update_subject_color(
        &self,
        subject_id: u64,
        user_id: u64,
        color: &str,
    ) -> Result<(), ApiError> {
        let body = json!({ "user_id": user_id, "color": color });
        let req = self
            .http
            .patch(self.url(&format!("/api/subjects/{}/color", subject_id)))
            .json(&body);
        let _: serde_json::Value = self
            .send(req, "PATCH /api/subjects/:id/color", "과목 색상 변경에 실패했습니다.")
            .await?;
        Ok(())
    }

    /// Attach a study PDF to a subject as a whole
    pub async fn upload_learning_pdf(
        &self,
        subject_id: u64,
        file: Upload,
    ) -> Result<LearningPdfUploadResponse, ApiError> {
        let form = Form::new().part("file", file.into_part());
        let req = self
            .http
            .post(self.url(&format!("/api/subjects/{}/learning-pdf", subject_id)))
            .multipart(form);
        self.send(
            req,
            "POST /api/subjects/:id/learning-pdf",
            "학습용 PDF 업로드에 실패했습니다.",
        )
        .await
    }

    // Weeks and materials

    pub async fn create_week(
        &self,
        subject_id: u64,
        week_number: u32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Week, ApiError> {
        let body = json!({
            "week_number": week_number,
            "title": title,
            "description": description.unwrap_or_default(),
        });
        let req = self
            .http
            .post(self.url(&format!("/subjects/{}/weeks", subject_id)))
            .json(&body);
        let response: WeekEnvelope = self
            .send(req, "POST /subjects/:id/weeks", "주차 생성에 실패했습니다.")
            .await?;
        Ok(response.week)
    }

    /// Upload a study file to a week
    ///
    /// `subject_id` and `week_number` let the backend create the week when it
    /// does not exist yet.
    pub async fn upload_material(
        &self,
        week_id: u64,
        file: Upload,
        subject_id: Option<u64>,
        week_number: Option<u32>,
    ) -> Result<MaterialUploadResponse, ApiError> {
        let mut form = Form::new().part("file", file.into_part());
        if let Some(subject_id) = subject_id {
            form = form.text("subject_id", subject_id.to_string());
        }
        if let Some(week_number) = week_number {
            form = form.text("week_number", week_number.to_string());
        }
        let req = self
            .http
            .post(self.url(&format!("/weeks/{}/materials", week_id)))
            .multipart(form);
        self.send(req, "POST /weeks/:id/materials", "자료 업로드에 실패했습니다.")
            .await
    }

    pub async fn delete_material(
        &self,
        material_id: u64,
    ) -> Result<MaterialDeleteResponse, ApiError> {
        let req = self
            .http
            .delete(self.url(&format!("/api/materials/{}", material_id)));
        self.send(req, "DELETE /api/materials/:id", "자료 삭제에 실패했습니다.")
            .await
    }

    pub async fn update_week_topic(
        &self,
        subject_id: u64,
        week_no: u32,
        topic: &str,
    ) -> Result<Subject, ApiError> {
        let body = json!({ "week_no": week_no, "topic": topic });
        let req = self
            .http
            .put(self.url(&format!("/subjects/{}/update-week-topic", subject_id)))
            .json(&body);
        let response: SubjectEnvelope = self
            .send(
                req,
                "PUT /subjects/:id/update-week-topic",
                "주차 주제 업데이트에 실패했습니다.",
            )
            .await?;
        Ok(response.subject)
    }

    // AI generation

    /// Generate (or fetch the stored) concept explanation of a week
    pub async fn generate_concept_content(
        &self,
        request: &ConceptRequest,
    ) -> Result<String, ApiError> {
        let req = self
            .http
            .post(self.url("/api/concept/generate"))
            .timeout(self.generation_timeout)
            .json(request);
        let response: ConceptResponse = self
            .send(req, "POST /api/concept/generate", "콘텐츠 생성에 실패했습니다.")
            .await?;
        Ok(response.content)
    }

    /// Older per-week concept summary endpoint
    pub async fn generate_week_concept(
        &self,
        week_id: u64,
        mode: ConceptMode,
    ) -> Result<WeekConceptResponse, ApiError> {
        let req = self
            .http
            .post(self.url(&format!("/api/week/{}/concept", week_id)))
            .timeout(self.generation_timeout)
            .json(&json!({ "mode": mode }));
        self.send(req, "POST /api/week/:id/concept", "개념 정리 생성에 실패했습니다.")
            .await
            .map_err(|e| match e {
                ApiError::QuotaExceeded(_) => ApiError::QuotaExceeded(QUOTA_MESSAGE.to_string()),
                other => other,
            })
    }

    // Quizzes

    pub async fn generate_quiz(
        &self,
        subject_id: u64,
        user_id: u64,
        options: &QuizOptions,
    ) -> Result<GeneratedQuiz, ApiError> {
        let mut body = serde_json::to_value(options).map_err(|source| ApiError::Decode {
            endpoint: "POST /api/quiz/generate".to_string(),
            source,
        })?;
        body["subject_id"] = json!(subject_id);
        body["user_id"] = json!(user_id);
        let req = self
            .http
            .post(self.url("/api/quiz/generate"))
            .timeout(self.generation_timeout)
            .json(&body);
        self.send(req, "POST /api/quiz/generate", "퀴즈 생성에 실패했습니다.")
            .await
    }

    pub async fn get_quiz(&self, quiz_id: u64) -> Result<QuizDetail, ApiError> {
        let req = self.http.get(self.url(&format!("/api/quiz/{}", quiz_id)));
        self.send(req, "GET /api/quiz/:id", "퀴즈 조회에 실패했습니다.")
            .await
    }

    pub async fn submit_quiz(
        &self,
        quiz_id: u64,
        user_id: u64,
        answers: &[AnswerPayload],
    ) -> Result<SubmitQuizResponse, ApiError> {
        let body = json!({ "user_id": user_id, "answers": answers });
        let req = self
            .http
            .post(self.url(&format!("/api/quiz/{}/submit", quiz_id)))
            .timeout(self.generation_timeout)
            .json(&body);
        self.send(req, "POST /api/quiz/:id/submit", "퀴즈 제출에 실패했습니다.")
            .await
    }

    pub async fn quiz_history(
        &self,
        subject_id: u64,
        user_id: u64,
    ) -> Result<Vec<QuizSummary>, ApiError> {
        let req = self
            .http
            .get(self.url(&format!("/api/subjects/{}/quizzes", subject_id)))
            .query(&[("user_id", user_id)]);
        let response: QuizHistoryResponse = self
            .send(
                req,
                "GET /api/subjects/:id/quizzes",
                "퀴즈 히스토리 조회에 실패했습니다.",
            )
            .await?;
        Ok(response.quizzes)
    }

    pub async fn delete_quiz(&self, quiz_id: u64, user_id: u64) -> Result<MessageResponse, ApiError> {
        let req = self
            .http
            .delete(self.url(&format!("/api/quiz/{}", quiz_id)))
            .query(&[("user_id", user_id)]);
        self.send(req, "DELETE /api/quiz/:id", "퀴즈 삭제에 실패했습니다.")
            .await
    }

    // Exam date, notifications and study plan

    pub async fn set_exam_date(
        &self,
        subject_id: u64,
        request: &ExamDateRequest,
    ) -> Result<Subject, ApiError> {
        let req = self
            .http
            .put(self.url(&format!("/api/subjects/{}/exam-date", subject_id)))
            .json(request);
        let response: SubjectEnvelope = self
            .send(req, "PUT /api/subjects/:id/exam-date", "시험 날짜 설정에 실패했습니다.")
            .await?;
        Ok(response.subject)
    }

    pub async fn clear_exam_date(&self, subject_id: u64) -> Result<Subject, ApiError> {
        let req = self
            .http
            .delete(self.url(&format!("/api/subjects/{}/exam-date", subject_id)));
        let response: SubjectEnvelope = self
            .send(
                req,
                "DELETE /api/subjects/:id/exam-date",
                "시험 날짜 삭제에 실패했습니다.",
            )
            .await?;
        Ok(response.subject)
    }

    pub async fn toggle_notification(
        &self,
        subject_id: u64,
        enabled: bool,
    ) -> Result<Subject, ApiError> {
        let req = self
            .http
            .put(self.url(&format!("/api/subjects/{}/notification", subject_id)))
            .json(&json!({ "is_notification_on": enabled }));
        let response: SubjectEnvelope = self
            .send(
                req,
                "PUT /api/subjects/:id/notification",
                "알림 설정 변경에 실패했습니다.",
            )
            .await?;
        Ok(response.subject)
    }

    pub async fn generate_study_plan(
        &self,
        subject_id: u64,
        user_id: u64,
    ) -> Result<StudyPlan, ApiError> {
        let req = self
            .http
            .post(self.url(&format!("/api/subjects/{}/study-plan", subject_id)))
            .query(&[("user_id", user_id)])
            .timeout(self.generation_timeout)
            .json(&json!({}));
        let response: StudyPlanResponse = self
            .send(
                req,
                "POST /api/subjects/:id/study-plan",
                "학습 계획 생성에 실패했습니다.",
            )
            .await?;
        Ok(response.study_plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer one request on a local port with a canned response
    ///
    /// The handle yields the raw request text once it has been served.
    async fn serve_once(status: u16, body: &'static str) -> (ApiClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });

        let config = ClientConfig {
            backend_url: format!("http://{}", addr),
            ..ClientConfig::default()
        };
        (ApiClient::new(&config).unwrap(), server)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        while !request_complete(&raw) {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn request_complete(raw: &[u8]) -> bool {
        let Some(split) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..split]).to_ascii_lowercase();
        let body = &raw[split + 4..];

        if head.contains("transfer-encoding: chunked") {
            return body.ends_with(b"0\r\n\r\n");
        }
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn request_line(request: &str) -> &str {
        request.lines().next().unwrap_or_default()
    }

    fn json_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_reorder_subjects_request() {
        let (client, server) = serve_once(200, r#"{"message": "ok"}"#).await;

        client.reorder_subjects(7, &[3, 1, 2]).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "PATCH /api/subjects/reorder HTTP/1.1");
        let body = json_body(&request);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["subject_ids"], json!([3, 1, 2]));
    }

    #[tokio::test]
    async fn test_update_subject_color_request() {
        let (client, server) = serve_once(200, r#"{"message": "ok"}"#).await;

        client.update_subject_color(4, 7, "#B5EAD7").await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "PATCH /api/subjects/4/color HTTP/1.1");
        let body = json_body(&request);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["color"], "#B5EAD7");
    }

    #[tokio::test]
    async fn test_submit_quiz_request() {
        let (client, server) = serve_once(
            200,
            r###"{"score": 1, "total": 2, "results": [],
                "report": {"id": 9, "quiz_id": 5, "score": 1, "total": 2,
                           "ai_report": "## 총평", "created_at": "2025-05-01T10:00:00"}}"###,
        )
        .await;
        let answers = vec![
            AnswerPayload { question_id: 11, answer: "B".to_string() },
            AnswerPayload { question_id: 12, answer: "스택".to_string() },
        ];

        let response = client.submit_quiz(5, 7, &answers).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "POST /api/quiz/5/submit HTTP/1.1");
        let body = json_body(&request);
        assert_eq!(body["user_id"], 7);
        assert_eq!(body["answers"][1]["question_id"], 12);
        assert_eq!(body["answers"][1]["answer"], "스택");
        assert_eq!(response.report.quiz_id, 5);
    }

    #[tokio::test]
    async fn test_set_exam_date_request() {
        let (client, server) = serve_once(
            200,
            r#"{"subject": {"id": 2, "name": "운영체제", "exam_date": "2025-06-10"}}"#,
        )
        .await;
        let request = ExamDateRequest {
            exam_date: "2025-06-10".to_string(),
            exam_type: Some(ExamType::Midterm),
            exam_week_start: Some(7),
            exam_week_end: Some(8),
        };

        let subject = client.set_exam_date(2, &request).await.unwrap();

        let captured = server.await.unwrap();
        assert_eq!(request_line(&captured), "PUT /api/subjects/2/exam-date HTTP/1.1");
        let body = json_body(&captured);
        assert_eq!(body["exam_date"], "2025-06-10");
        assert_eq!(body["exam_type"], "midterm");
        assert_eq!(body["exam_week_start"], 7);
        assert_eq!(body["exam_week_end"], 8);
        assert_eq!(subject.exam_date.as_deref(), Some("2025-06-10"));
    }

    #[tokio::test]
    async fn test_quiz_history_sends_user_query() {
        let (client, server) = serve_once(200, r#"{"quizzes": []}"#).await;

        let quizzes = client.quiz_history(2, 7).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "GET /api/subjects/2/quizzes?user_id=7 HTTP/1.1");
        assert!(quizzes.is_empty());
    }

    #[tokio::test]
    async fn test_create_subject_sends_multipart_form() {
        // Arrange
        let (client, server) = serve_once(200, r#"{"subject": {"id": 11, "name": "자료구조"}}"#).await;
        let syllabus = Upload {
            file_name: "syllabus.pdf".to_string(),
            bytes: b"%PDF-1.4 syllabus".to_vec(),
        };

        // Act
        let subject = client
            .create_subject(7, "자료구조", "전공", syllabus)
            .await
            .unwrap();

        // Assert
        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "POST /subjects HTTP/1.1");
        assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains("name=\"user_id\"\r\n\r\n7\r\n"));
        assert!(request.contains("name=\"name\"\r\n\r\n자료구조\r\n"));
        assert!(request.contains("name=\"subject_type\"\r\n\r\n전공\r\n"));
        assert!(request.contains("name=\"file\"; filename=\"syllabus.pdf\""));
        assert!(request.contains("%PDF-1.4 syllabus"));
        assert_eq!(subject.id, 11);
    }

    #[tokio::test]
    async fn test_upload_learning_pdf_request() {
        let (client, server) = serve_once(
            201,
            r#"{"message": "ok", "learning_pdf": {"id": 3, "file_name": "notes.pdf",
                "file_path": "uploads/notes.pdf", "uploaded_at": "2025-05-01T10:00:00"}}"#,
        )
        .await;
        let file = Upload {
            file_name: "notes.pdf".to_string(),
            bytes: b"%PDF-1.4 notes".to_vec(),
        };

        let response = client.upload_learning_pdf(4, file).await.unwrap();

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "POST /api/subjects/4/learning-pdf HTTP/1.1");
        assert!(request.contains("name=\"file\"; filename=\"notes.pdf\""));
        assert!(request.contains("%PDF-1.4 notes"));
        assert_eq!(response.learning_pdf.id, 3);
        assert_eq!(response.learning_pdf.file_name, "notes.pdf");
    }

    #[tokio::test]
    async fn test_429_response_is_quota_error() {
        let (client, server) = serve_once(429, r#"{"error": "quota exceeded"}"#).await;

        let result = client.get_quiz(5).await;

        server.await.unwrap();
        let Err(ApiError::QuotaExceeded(message)) = result else {
            panic!("expected quota error");
        };
        assert_eq!(message, "quota exceeded");
    }

    #[tokio::test]
    async fn test_server_error_body_is_surfaced() {
        let (client, server) = serve_once(400, r#"{"error": "과목을 찾을 수 없습니다"}"#).await;

        let result = client.delete_subject(99).await;

        let request = server.await.unwrap();
        assert_eq!(request_line(&request), "DELETE /subjects/99 HTTP/1.1");
        assert!(matches!(
            result,
            Err(ApiError::Server { status: 400, ref message }) if message == "과목을 찾을 수 없습니다"
        ));
    }

    #[test]
    fn test_base_url_is_normalised() {
        let config = ClientConfig {
            backend_url: "http://localhost:5000/".to_string(),
            ..ClientConfig::default()
        };

        let client = ApiClient::new(&config).unwrap();

        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/subjects"), "http://localhost:5000/subjects");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let config = ClientConfig {
            backend_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..ClientConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let result = client.get_quiz(1).await;

        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
