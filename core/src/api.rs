//! Async API client: request building, one transport round-trip, parsing.

use tracing::{debug, warn};

use crate::client::HealthClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    AiQueryRequest, AiQueryResult, ChatRequest, ChatResult, HistoryResponse, RecommendationRequest,
    RecommendationSet, ReportFile, ReportResult,
};

/// One method per backend operation. Each call suspends until its single
/// exchange completes and cannot be cancelled except by dropping the future.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    client: HealthClient,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client for the base URL resolved from `MYHEALTH_API_URL`.
    pub fn from_env() -> Self {
        Self::new(&ClientConfig::from_env(), ReqwestTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: HealthClient::new(&config.base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub async fn health(&self) -> Result<serde_json::Value, ApiError> {
        let response = self.send("health", self.client.build_health()).await?;
        self.client.parse_health(response)
    }

    pub async fn chat(&self, input: &ChatRequest) -> Result<ChatResult, ApiError> {
        let response = self.send("chat", self.client.build_chat(input)?).await?;
        self.client.parse_chat(response)
    }

    pub async fn ai_query(&self, input: &AiQueryRequest) -> Result<AiQueryResult, ApiError> {
        let response = self.send("ai_query", self.client.build_ai_query(input)?).await?;
        self.client.parse_ai_query(response)
    }

    pub async fn recommendations(
        &self,
        input: &RecommendationRequest,
    ) -> Result<RecommendationSet, ApiError> {
        let request = self.client.build_recommendations(input)?;
        let response = self.send("recommendations", request).await?;
        self.client.parse_recommendations(response)
    }

    pub async fn history(&self, user_id: &str) -> Result<HistoryResponse, ApiError> {
        let response = self.send("history", self.client.build_history(user_id)).await?;
        self.client.parse_history(response)
    }

    pub async fn analyze_report(
        &self,
        user_id: &str,
        file: ReportFile,
    ) -> Result<ReportResult, ApiError> {
        debug!(file = %file.file_name, size = file.bytes.len(), "uploading report");
        let request = self.client.build_analyze_report(user_id, file);
        let response = self.send("analyze_report", request).await?;
        self.client.parse_analyze_report(response)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        debug!(operation, url = %request.url, "calling backend");
        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(operation, error = %e, "transport failure");
            e
        })?;
        if !response.is_success() {
            warn!(operation, status = response.status, "backend returned an error status");
        }
        Ok(response)
    }
}
