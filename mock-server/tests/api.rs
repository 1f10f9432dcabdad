use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{
    app, ChatResponse, MedicalQueryResponse, RecommendationResponse, ReportAnalysis, UserHistory,
};
use tower::ServiceExt;

const BOUNDARY: &str = "myhealth-test-boundary";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn multipart_request(uri: &str, field: &str, file_name: &str, content: &str) -> Request<String> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

// --- health ---

#[tokio::test]
async fn health_reports_ok() {
    let resp = app().oneshot(get_request("/api/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "myhealth-ai-backend");
}

// --- chat ---

#[tokio::test]
async fn chat_triages_symptoms() {
    let resp = app()
        .oneshot(json_request(
            "/api/chat",
            r#"{"user_id":"u","symptoms":["fever","cough"],"message":"since two days"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let chat: ChatResponse = body_json(resp).await;
    assert_eq!(chat.urgency, "normal");
    assert_eq!(
        chat.possible_conditions,
        vec!["Upper Respiratory Infection", "Viral Fever"]
    );
}

#[tokio::test]
async fn chat_missing_message_returns_422() {
    let resp = app()
        .oneshot(json_request("/api/chat", r#"{"user_id":"u"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!body_text(resp).await.is_empty());
}

// --- ai query ---

#[tokio::test]
async fn ai_query_appends_safety_note() {
    let resp = app()
        .oneshot(json_request(
            "/api/ai-query",
            r#"{"user_id":"u","query":"How do I manage hypertension?"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let answer: MedicalQueryResponse = body_json(resp).await;
    assert!(answer.answer.starts_with("Hypertension management"));
    assert!(answer.answer.ends_with(mock_server::services::SAFETY_NOTE));
}

// --- recommendations ---

#[tokio::test]
async fn recommendations_for_cardiac_conditions() {
    let resp = app()
        .oneshot(json_request(
            "/api/recommendations",
            r#"{"user_id":"u","conditions":["Cardiac Concern"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let recs: RecommendationResponse = body_json(resp).await;
    assert!(recs
        .diet
        .contains(&"Reduce sodium intake and avoid trans fats.".to_string()));
    assert_eq!(recs.home_remedies.len(), 2);
}

// --- report ---

#[tokio::test]
async fn analyze_report_flags_high_glucose() {
    let resp = app()
        .oneshot(multipart_request(
            "/api/analyze-report?user_id=u",
            "file",
            "labs.txt",
            "Fasting glucose: 240 mg/dL",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report: ReportAnalysis = body_json(resp).await;
    assert_eq!(
        report.alerts,
        vec!["High glucose detected; diabetes evaluation is recommended."]
    );
}

#[tokio::test]
async fn analyze_report_without_file_returns_422() {
    let resp = app()
        .oneshot(multipart_request(
            "/api/analyze-report?user_id=u",
            "attachment",
            "labs.txt",
            "glucose: 240",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_text(resp).await, "file field is required");
}

#[tokio::test]
async fn analyze_report_without_user_returns_400() {
    let resp = app()
        .oneshot(multipart_request(
            "/api/analyze-report",
            "file",
            "labs.txt",
            "glucose: 240",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- history ---

#[tokio::test]
async fn history_for_unknown_user_is_empty() {
    let resp = app()
        .oneshot(get_request("/api/history/nobody"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let history: UserHistory = body_json(resp).await;
    assert_eq!(history.user_id, "nobody");
    assert!(history.entries.is_empty());
}

// --- full session ---

#[tokio::test]
async fn session_history_tracks_every_interaction() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/api/chat",
            r#"{"user_id":"user 001/x","symptoms":["headache"],"message":"since morning"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(multipart_request(
            "/api/analyze-report?user_id=user%20001%2Fx",
            "file",
            "bp.txt",
            "blood pressure 150/95",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // a different user's interaction must not leak in
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/api/ai-query",
            r#"{"user_id":"someone else","query":"cold remedies"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/history/user%20001%2Fx"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let history: UserHistory = body_json(resp).await;
    assert_eq!(history.user_id, "user 001/x");

    let kinds: Vec<&str> = history
        .entries
        .iter()
        .map(|e| e.interaction_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["report", "chat"]);
    assert!(history.entries[0].summary.contains("file=bp.txt"));
    assert!(history.entries[1].summary.contains("Migraine"));
}
