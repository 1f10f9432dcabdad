//! Request builders and response decoders for the MyHealth backend.
//!
//! # Design
//! User ids are caller-supplied text, so they are percent-encoded both as
//! the history path segment and as the `user_id` query of the report
//! upload; `/` or a space never changes the route. The upload is handed to
//! the transport as one `file` part and encoded there. Every decoder checks
//! the status first and then deserializes strictly: a 2xx body that misses
//! a required field is an error here, not a blank field in the view.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AiQueryRequest, AiQueryResult, ChatRequest, ChatResult, HistoryResponse, RecommendationRequest,
    RecommendationSet, ReportFile, ReportResult,
};

/// Name of the multipart field carrying the uploaded report.
pub const REPORT_FIELD: &str = "file";

/// Synchronous, stateless client for the MyHealth API.
#[derive(Debug, Clone)]
pub struct HealthClient {
    base_url: String,
}

impl HealthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_health(&self) -> HttpRequest {
        self.get("/api/health".to_string())
    }

    pub fn build_chat(&self, input: &ChatRequest) -> Result<HttpRequest, ApiError> {
        self.post_json("/api/chat", input)
    }

    pub fn build_ai_query(&self, input: &AiQueryRequest) -> Result<HttpRequest, ApiError> {
        self.post_json("/api/ai-query", input)
    }

    pub fn build_recommendations(
        &self,
        input: &RecommendationRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json("/api/recommendations", input)
    }

    /// The user id becomes a single path segment, so `/` and spaces are escaped.
    pub fn build_history(&self, user_id: &str) -> HttpRequest {
        self.get(format!("/api/history/{}", urlencoding::encode(user_id)))
    }

    /// Takes ownership of the file; its bytes move into the request body.
    pub fn build_analyze_report(&self, user_id: &str, file: ReportFile) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!(
                "{}/api/analyze-report?user_id={}",
                self.base_url,
                urlencoding::encode(user_id)
            ),
            headers: Vec::new(),
            body: Some(HttpBody::Multipart {
                field: REPORT_FIELD.to_string(),
                file,
            }),
        }
    }

    /// The health payload is backend-defined, so it is returned untyped.
    pub fn parse_health(&self, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        decode(response)
    }

    pub fn parse_chat(&self, response: HttpResponse) -> Result<ChatResult, ApiError> {
        decode(response)
    }

    pub fn parse_ai_query(&self, response: HttpResponse) -> Result<AiQueryResult, ApiError> {
        decode(response)
    }

    pub fn parse_recommendations(
        &self,
        response: HttpResponse,
    ) -> Result<RecommendationSet, ApiError> {
        decode(response)
    }

    pub fn parse_history(&self, response: HttpResponse) -> Result<HistoryResponse, ApiError> {
        decode(response)
    }

    pub fn parse_analyze_report(&self, response: HttpResponse) -> Result<ReportResult, ApiError> {
        decode(response)
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_json<T: Serialize>(&self, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{path}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(HttpBody::Json(body)),
        })
    }
}

/// Map non-2xx responses to `ApiError::Http` carrying the body text.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(
            status = response.status,
            content_type = response.header("content-type").unwrap_or("-"),
            error = %e,
            "response body does not match the expected schema"
        );
        ApiError::Deserialization(e.to_string())
    })
}
