/// Ranking Service client — the single point of contact with the external backend.
///
/// The workflow only talks to the service through the `RankingService` trait, so
/// tests can swap in an in-process fake. `HttpRankingClient` implements the
/// three-endpoint HTTP contract.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::file::SelectedFile;

const UPLOAD_RESUME_PATH: &str = "/upload_resume/";
const RANK_RESUMES_PATH: &str = "/rank_resumes/";
const LLM_FEEDBACK_PATH: &str = "/llm_feedback/";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error (status {status})")]
    Api { status: u16, detail: Option<String> },

    #[error("Malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ServiceError {
    /// The service's own message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResumeResponse {
    resume_id: String,
}

/// One entry of the service's ranked list, in the order the service chose.
#[derive(Debug, Clone, Deserialize)]
pub struct RankedResumeEntry {
    pub resume_id: String,
    pub filename: String,
    pub score: f64,
    pub snippet: String,
    pub full_text: String,
}

#[derive(Debug, Deserialize)]
pub struct RankResumesResponse {
    pub ranked_resumes: Vec<RankedResumeEntry>,
    pub job_description_text: String,
}

#[derive(Debug, Serialize)]
struct FeedbackRequest<'a> {
    resume_text: &'a str,
    jd_text: &'a str,
}

#[derive(Debug, Deserialize)]
struct FeedbackResponse {
    feedback: String,
}

/// FastAPI-style error body. `detail` is a string for handled errors and a
/// list of objects for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// The operations the workflow needs from the Ranking Service.
#[async_trait]
pub trait RankingService: Send + Sync {
    /// Uploads one resume PDF and returns the id the service assigned to it.
    async fn upload_resume(&self, file: &SelectedFile) -> Result<String, ServiceError>;

    /// Ranks the session's resumes against a job description PDF.
    async fn rank_resumes(
        &self,
        job_description: &SelectedFile,
        resume_ids: &[String],
    ) -> Result<RankResumesResponse, ServiceError>;

    /// Generates free-text feedback comparing one resume to the job description.
    async fn llm_feedback(&self, resume_text: &str, jd_text: &str) -> Result<String, ServiceError>;
}

/// reqwest implementation of the Ranking Service contract.
#[derive(Clone)]
pub struct HttpRankingClient {
    client: Client,
    base_url: String,
    send_resume_ids: bool,
}

impl HttpRankingClient {
    pub fn new(config: &Config) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            send_resume_ids: config.send_resume_ids,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RankingService for HttpRankingClient {
    async fn upload_resume(&self, file: &SelectedFile) -> Result<String, ServiceError> {
        let form = Form::new().part("file", pdf_part(file)?);

        let response = self
            .client
            .post(self.endpoint(UPLOAD_RESUME_PATH))
            .multipart(form)
            .send()
            .await?;

        let body: UploadResumeResponse = read_json(response).await?;
        debug!(filename = %file.name, resume_id = %body.resume_id, "resume uploaded");
        Ok(body.resume_id)
    }

    async fn rank_resumes(
        &self,
        job_description: &SelectedFile,
        resume_ids: &[String],
    ) -> Result<RankResumesResponse, ServiceError> {
        let mut form = Form::new().part("jd_file", pdf_part(job_description)?);
        if self.send_resume_ids {
            for id in resume_ids {
                form = form.text("resume_ids", id.clone());
            }
        }

        let response = self
            .client
            .post(self.endpoint(RANK_RESUMES_PATH))
            .multipart(form)
            .send()
            .await?;

        let body: RankResumesResponse = read_json(response).await?;
        debug!(ranked = body.ranked_resumes.len(), "ranking received");
        Ok(body)
    }

    async fn llm_feedback(&self, resume_text: &str, jd_text: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(LLM_FEEDBACK_PATH))
            .json(&FeedbackRequest {
                resume_text,
                jd_text,
            })
            .send()
            .await?;

        let body: FeedbackResponse = read_json(response).await?;
        Ok(body.feedback)
    }
}

fn pdf_part(file: &SelectedFile) -> Result<Part, ServiceError> {
    let part = Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)?;
    Ok(part)
}

/// Decodes a success body as `T`, or turns an error status into `ServiceError::Api`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let detail = extract_detail(&body);
        warn!(status = status.as_u16(), detail = ?detail, "ranking service returned an error");
        return Err(ServiceError::Api {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::json;

    use crate::models::file::PDF_MIME;

    /// (field name, file name, content type) of every multipart field the fake service saw.
    type SeenFields = Arc<Mutex<Vec<(String, Option<String>, Option<String>)>>>;

    async fn record_fields(seen: &SeenFields, mut multipart: Multipart) {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let _ = field.bytes().await.unwrap();
            seen.lock().unwrap().push((name, file_name, content_type));
        }
    }

    async fn upload_ok(State(seen): State<SeenFields>, multipart: Multipart) -> Json<Value> {
        record_fields(&seen, multipart).await;
        Json(json!({ "resume_id": "r-42" }))
    }

    async fn rank_ok(State(seen): State<SeenFields>, multipart: Multipart) -> Json<Value> {
        record_fields(&seen, multipart).await;
        Json(json!({
            "ranked_resumes": [
                { "resume_id": "r2", "filename": "b.pdf", "score": 0.12, "snippet": "b...", "full_text": "bbb" },
                { "resume_id": "r1", "filename": "a.pdf", "score": 0.45, "snippet": "a...", "full_text": "aaa" }
            ],
            "job_description_text": "Rust engineer"
        }))
    }

    async fn feedback_ok(Json(body): Json<Value>) -> Json<Value> {
        let feedback = format!(
            "{} vs {}",
            body["resume_text"].as_str().unwrap_or_default(),
            body["jd_text"].as_str().unwrap_or_default()
        );
        Json(json!({ "feedback": feedback }))
    }

    async fn detail_error() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Could not read PDF" })),
        )
    }

    async fn validation_error() -> (StatusCode, Json<Value>) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "file"], "msg": "field required" }] })),
        )
    }

    async fn not_json() -> &'static str {
        "<html>oops</html>"
    }

    async fn spawn_service(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: &str, send_resume_ids: bool) -> HttpRankingClient {
        let config = Config {
            backend_url: format!("{base_url}/"),
            request_timeout_secs: 5,
            send_resume_ids,
            rust_log: "info".to_string(),
        };
        HttpRankingClient::new(&config).unwrap()
    }

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(name, PDF_MIME, b"%PDF-1.4".to_vec())
    }

    #[tokio::test]
    async fn test_upload_sends_file_field_and_returns_id() {
        let seen = SeenFields::default();
        let router = Router::new()
            .route(UPLOAD_RESUME_PATH, post(upload_ok))
            .with_state(seen.clone());
        let client = client_for(&spawn_service(router).await, false);

        let id = client.upload_resume(&pdf("a.pdf")).await.unwrap();

        assert_eq!(id, "r-42");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "file");
        assert_eq!(seen[0].1.as_deref(), Some("a.pdf"));
        assert_eq!(seen[0].2.as_deref(), Some(PDF_MIME));
    }

    #[tokio::test]
    async fn test_rank_sends_only_jd_file_by_default() {
        let seen = SeenFields::default();
        let router = Router::new()
            .route(RANK_RESUMES_PATH, post(rank_ok))
            .with_state(seen.clone());
        let client = client_for(&spawn_service(router).await, false);

        let response = client
            .rank_resumes(&pdf("jd.pdf"), &["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();

        let names: Vec<String> = seen.lock().unwrap().iter().map(|f| f.0.clone()).collect();
        assert_eq!(names, vec!["jd_file"]);
        assert_eq!(response.job_description_text, "Rust engineer");
        let ids: Vec<&str> = response
            .ranked_resumes
            .iter()
            .map(|r| r.resume_id.as_str())
            .collect();
        assert_eq!(ids, vec!["r2", "r1"]);
        assert_eq!(response.ranked_resumes[0].score, 0.12);
    }

    #[tokio::test]
    async fn test_rank_can_resend_resume_ids() {
        let seen = SeenFields::default();
        let router = Router::new()
            .route(RANK_RESUMES_PATH, post(rank_ok))
            .with_state(seen.clone());
        let client = client_for(&spawn_service(router).await, true);

        client
            .rank_resumes(&pdf("jd.pdf"), &["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();

        let names: Vec<String> = seen.lock().unwrap().iter().map(|f| f.0.clone()).collect();
        assert_eq!(names, vec!["jd_file", "resume_ids", "resume_ids"]);
    }

    #[tokio::test]
    async fn test_feedback_posts_json_body() {
        let router = Router::new().route(LLM_FEEDBACK_PATH, post(feedback_ok));
        let client = client_for(&spawn_service(router).await, false);

        let feedback = client.llm_feedback("resume", "jd").await.unwrap();
        assert_eq!(feedback, "resume vs jd");
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let router = Router::new().route(UPLOAD_RESUME_PATH, post(detail_error));
        let client = client_for(&spawn_service(router).await, false);

        let err = client.upload_resume(&pdf("a.pdf")).await.unwrap_err();
        match &err {
            ServiceError::Api { status, detail } => {
                assert_eq!(*status, 400);
                assert_eq!(detail.as_deref(), Some("Could not read PDF"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message("fallback"), "Could not read PDF");
    }

    #[tokio::test]
    async fn test_non_string_detail_falls_back() {
        let router = Router::new().route(RANK_RESUMES_PATH, post(validation_error));
        let client = client_for(&spawn_service(router).await, false);

        let err = client.rank_resumes(&pdf("jd.pdf"), &[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 422, detail: None }));
        assert_eq!(
            err.user_message("Failed to rank resumes."),
            "Failed to rank resumes."
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_a_parse_error() {
        let router = Router::new().route(LLM_FEEDBACK_PATH, post(not_json));
        let client = client_for(&spawn_service(router).await, false);

        let err = client.llm_feedback("r", "j").await.unwrap_err();
        assert!(matches!(err, ServiceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{addr}"), false);

        let err = client.upload_resume(&pdf("a.pdf")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
    }

    #[test]
    fn test_extract_detail_ignores_blank_and_missing() {
        assert_eq!(extract_detail(br#"{"detail": ""}"#), None);
        assert_eq!(extract_detail(br#"{}"#), None);
        assert_eq!(extract_detail(b"not json"), None);
        assert_eq!(
            extract_detail(br#"{"detail": "nope"}"#).as_deref(),
            Some("nope")
        );
    }
}
