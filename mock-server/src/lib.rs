use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub mod services;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymptomInput {
    pub user_id: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub possible_conditions: Vec<String>,
    pub urgency: String,
    pub specialist: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// Field order is the category order clients display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub diet: Vec<String>,
    pub lifestyle: Vec<String>,
    pub exercises: Vec<String>,
    pub home_remedies: Vec<String>,
    pub otc_medicines: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MedicalQueryRequest {
    pub user_id: String,
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicalQueryResponse {
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub summary: String,
    pub alerts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub interaction_type: String,
    pub summary: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserHistory {
    pub user_id: String,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
pub struct ReportParams {
    pub user_id: String,
}

/// Interaction history per user, oldest first.
pub type Db = Arc<RwLock<HashMap<String, Vec<HistoryEntry>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/ai-query", post(ai_query))
        .route("/api/recommendations", post(recommendations))
        .route("/api/analyze-report", post(analyze_report))
        .route("/api/history/{user_id}", get(history))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn record(db: &Db, user_id: &str, interaction_type: &str, summary: String) {
    debug!(user_id, interaction_type, "recording interaction");
    db.write()
        .await
        .entry(user_id.to_string())
        .or_default()
        .push(HistoryEntry {
            timestamp: Utc::now(),
            interaction_type: interaction_type.to_string(),
            summary,
        });
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "myhealth-ai-backend"}))
}

async fn chat(State(db): State<Db>, Json(input): Json<SymptomInput>) -> Json<ChatResponse> {
    let result = services::triage(&input.message, &input.symptoms);
    let summary = format!(
        "message={}; conditions={}; urgency={}",
        input.message,
        result.possible_conditions.join(", "),
        result.urgency
    );
    record(&db, &input.user_id, "chat", summary).await;
    Json(result)
}

async fn ai_query(
    State(db): State<Db>,
    Json(input): Json<MedicalQueryRequest>,
) -> Json<MedicalQueryResponse> {
    let answer = services::answer_query(&input.query);
    let preview: String = answer.chars().take(180).collect();
    let summary = format!("query={}; ai_answer={preview}", input.query);
    record(&db, &input.user_id, "ai_query", summary).await;
    Json(MedicalQueryResponse { answer })
}

async fn recommendations(
    State(db): State<Db>,
    Json(input): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    let recs = services::recommendations(&input.conditions);
    let summary = format!("conditions={}", input.conditions.join(", "));
    record(&db, &input.user_id, "recommendation", summary).await;
    Json(recs)
}

async fn analyze_report(
    State(db): State<Db>,
    Query(params): Query<ReportParams>,
    mut multipart: Multipart,
) -> Result<Json<ReportAnalysis>, (StatusCode, String)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .unwrap_or("uploaded_report.txt")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let Some((file_name, bytes)) = upload else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "file field is required".to_string(),
        ));
    };

    info!(
        user_id = %params.user_id,
        file_name = %file_name,
        size = bytes.len(),
        "analyzing report"
    );
    let analysis = services::analyze_report(&file_name, &bytes);
    let summary = format!("file={file_name}; alerts={}", analysis.alerts.join(" | "));
    record(&db, &params.user_id, "report", summary).await;
    Ok(Json(analysis))
}

async fn history(State(db): State<Db>, Path(user_id): Path<String>) -> Json<UserHistory> {
    let entries: Vec<HistoryEntry> = db
        .read()
        .await
        .get(&user_id)
        .map(|entries| entries.iter().rev().cloned().collect())
        .unwrap_or_default();
    Json(UserHistory { user_id, entries })
}
