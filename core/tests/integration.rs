//! Full client session against the live mock server.
//!
//! # Design
//! Each test binds the mock server to an ephemeral port and drives a
//! `ViewController` over `ReqwestTransport`, so builders, multipart encoding
//! and parsers are checked against the real router.

use std::net::SocketAddr;

use myhealth_core::view::{history_line, recommendation_label, render_in};
use myhealth_core::{
    ApiClient, ChainStage, ChatRequest, ClientConfig, HealthClient, HttpBody, Msg, ReportFile,
    ReqwestTransport, SymptomAnalysis, Transport, ViewController,
};

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    addr
}

fn controller(addr: SocketAddr) -> ViewController<ReqwestTransport> {
    let config = ClientConfig::new(&format!("http://{addr}"));
    ViewController::new(ApiClient::new(&config, ReqwestTransport::new()))
}

#[tokio::test]
async fn full_session() {
    let addr = start_server().await;
    let mut view = controller(addr);

    // Step 1: backend reachable.
    view.check_health().await.unwrap();
    assert_eq!(view.state().backend_status.as_ref().unwrap()["status"], "ok");

    // Step 2: user id with reserved characters.
    view.dispatch(Msg::SetUserId("user 001/x".into())).unwrap();

    // Step 3: symptom analysis chains into recommendations.
    view.dispatch(Msg::SetSymptoms("fever, thirst, ,".into())).unwrap();
    view.dispatch(Msg::SetMessage("high sugar readings this week".into()))
        .unwrap();
    view.analyze_symptoms().await.unwrap();

    let state = view.state();
    assert!(state.error.is_none(), "unexpected error: {:?}", state.error);
    let chat = state.chat_result.as_ref().unwrap();
    assert_eq!(chat.possible_conditions, vec!["Diabetes", "Viral Fever"]);
    assert_eq!(chat.specialist.as_deref(), Some("Endocrinologist"));

    let recs = state.recommendations.as_ref().unwrap();
    let labels: Vec<String> = recs.iter().map(|(k, _)| recommendation_label(k)).collect();
    assert_eq!(
        labels,
        vec!["diet", "lifestyle", "exercises", "home remedies", "otc medicines"]
    );
    assert_eq!(recs.get("diet").unwrap().len(), 3);
    assert!(matches!(
        state.analysis,
        Some(SymptomAnalysis::ChatAndRecommendations(..))
    ));

    // Step 4: medical query.
    view.submit_medical_query().await.unwrap();
    let answer = view.state().ai_answer.clone().unwrap();
    assert!(answer.starts_with("Diabetes care includes"));

    // Step 5: report upload.
    let file = ReportFile::new("labs.csv", b"test,value\ncholesterol,260\n".to_vec());
    view.upload_report(Some(file)).await.unwrap();
    let report = view.state().report_result.clone().unwrap();
    assert_eq!(
        report.alerts,
        vec!["High cholesterol level detected; lipid management advised."]
    );

    // Step 6: history is keyed by the exact user id, newest first.
    view.load_history().await.unwrap();
    let state = view.state();
    let kinds: Vec<&str> = state
        .history
        .iter()
        .map(|e| e.interaction_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["report", "ai_query", "recommendation", "chat"]);
    assert!(history_line(&state.history[0], &chrono::Utc).contains("[report] file=labs.csv"));

    let rendered = render_in(state, &chrono::Utc);
    assert!(rendered.title.starts_with("MyHealth AI"));
    assert!(rendered.banner.is_none());
    assert!(!rendered.busy);
    assert_eq!(
        rendered.section("5) History & Follow-Up").unwrap().lines.len(),
        4
    );
}

#[tokio::test]
async fn history_is_isolated_per_user() {
    let addr = start_server().await;
    let mut view = controller(addr);

    view.analyze_symptoms().await.unwrap();
    view.dispatch(Msg::SetUserId("demo_user_002".into())).unwrap();
    view.load_history().await.unwrap();

    assert!(view.state().history.is_empty());
    assert!(view.state().error.is_none());
}

#[tokio::test]
async fn server_rejection_lands_in_banner() {
    let addr = start_server().await;
    let mut view = controller(addr);

    // Schema rejections come back as `ApiError::Http` with the server's text.
    let client = HealthClient::new(view.api().base_url());
    let mut request = client
        .build_chat(&ChatRequest {
            user_id: "u".into(),
            symptoms: vec![],
            message: "headache".into(),
        })
        .unwrap();
    request.body = Some(HttpBody::Json(r#"{"user_id":"u"}"#.into()));
    let response = ReqwestTransport::new().execute(request).await.unwrap();
    assert_eq!(response.status, 422);
    let err = client.parse_chat(response).unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(!err.to_string().is_empty());

    // Unreachable backend: chat fails and the chain stops at the first stage.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut offline = controller(dead);
    offline.analyze_symptoms().await.unwrap();
    let state = offline.state();
    assert!(state
        .error
        .as_deref()
        .unwrap()
        .starts_with("Unable to analyze symptoms: "));
    assert!(matches!(
        state.analysis,
        Some(SymptomAnalysis::Failed {
            stage: ChainStage::Chat,
            chat: None,
            ..
        })
    ));
    assert!(!state.busy());

    // The live server still answers afterwards.
    view.load_history().await.unwrap();
    assert!(view.state().error.is_none());
}
