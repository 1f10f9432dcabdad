//! View state container.
//!
//! # Design
//! `ViewState` is an immutable snapshot; `reduce` is the only way to derive
//! the next one. Every action follows the same lifecycle: `Started` marks it
//! in flight and clears the error banner, and exactly one terminal message
//! (a success message, `Failed`, or `Cancelled` when the action was dropped)
//! takes it out of flight again. A second
//! `Started` while an action is in flight is rejected instead of sharing
//! the busy flag.
//!
//! Symptom analysis is a chained call (chat, then recommendations). Its
//! progress is tracked as a `SymptomAnalysis` so that "chat succeeded but
//! recommendations failed" is a state of its own.

use std::fmt;

use thiserror::Error;

use crate::error::ApiError;
use crate::symptoms::parse_symptoms;
use crate::types::{
    AiQueryRequest, AiQueryResult, ChatRequest, ChatResult, HistoryEntry, HistoryResponse,
    RecommendationRequest, RecommendationSet, ReportResult,
};

pub const DEFAULT_USER_ID: &str = "demo_user_001";
pub const DEFAULT_SYMPTOMS: &str = "fever, cough";
pub const DEFAULT_MESSAGE: &str = "I have fever and cough since two days";
pub const DEFAULT_MEDICAL_QUERY: &str = "What should I do for high blood sugar trends?";

/// A user-triggered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AnalyzeSymptoms,
    MedicalQuery,
    UploadReport,
    LoadHistory,
    CheckHealth,
}

impl ActionKind {
    /// Fixed phrase shown before the underlying failure message.
    pub fn error_prefix(self) -> &'static str {
        match self {
            ActionKind::AnalyzeSymptoms => "Unable to analyze symptoms",
            ActionKind::MedicalQuery => "Unable to get AI medical answer",
            ActionKind::UploadReport => "Unable to analyze report",
            ActionKind::LoadHistory => "Unable to load history",
            ActionKind::CheckHealth => "Unable to reach backend",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::AnalyzeSymptoms => "symptom analysis",
            ActionKind::MedicalQuery => "medical query",
            ActionKind::UploadReport => "report upload",
            ActionKind::LoadHistory => "history load",
            ActionKind::CheckHealth => "health check",
        };
        f.write_str(name)
    }
}

/// Which half of the chained symptom analysis failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    Chat,
    Recommendations,
}

/// Progress of the most recent symptom analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum SymptomAnalysis {
    Pending,
    /// Chat answered; the recommendations call is in flight.
    ChatOnly(ChatResult),
    ChatAndRecommendations(ChatResult, RecommendationSet),
    /// `chat` is set when the chat call succeeded and only the
    /// recommendations call failed.
    Failed {
        stage: ChainStage,
        chat: Option<ChatResult>,
        error: ApiError,
    },
    /// The action was dropped before it finished; `chat` is kept when the
    /// chat half had already answered.
    Cancelled { chat: Option<ChatResult> },
}

/// Input to `reduce`.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    SetUserId(String),
    SetSymptoms(String),
    SetMessage(String),
    SetMedicalQuery(String),
    Started(ActionKind),
    /// First half of the symptom analysis chain; the action stays in flight.
    ChatAnswered(ChatResult),
    RecommendationsReady(RecommendationSet),
    QueryAnswered(AiQueryResult),
    ReportAnalyzed(ReportResult),
    HistoryLoaded(HistoryResponse),
    HealthChecked(serde_json::Value),
    Failed(ActionKind, ApiError),
    /// The action was abandoned mid-flight. Leaves busy without a banner.
    Cancelled(ActionKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("cannot start {requested} while {running} is in progress")]
    Busy {
        running: ActionKind,
        requested: ActionKind,
    },

    #[error("{0} is not in progress")]
    NotRunning(ActionKind),

    #[error("recommendations arrived before a chat result")]
    RecommendationsBeforeChat,
}

/// Snapshot of everything the view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub user_id: String,
    pub symptoms_text: String,
    pub message: String,
    pub medical_query: String,

    pub chat_result: Option<ChatResult>,
    pub recommendations: Option<RecommendationSet>,
    pub ai_answer: Option<String>,
    pub report_result: Option<ReportResult>,
    pub history: Vec<HistoryEntry>,
    pub backend_status: Option<serde_json::Value>,

    pub analysis: Option<SymptomAnalysis>,
    pub error: Option<String>,
    pub in_flight: Option<ActionKind>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            symptoms_text: DEFAULT_SYMPTOMS.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            medical_query: DEFAULT_MEDICAL_QUERY.to_string(),
            chat_result: None,
            recommendations: None,
            ai_answer: None,
            report_result: None,
            history: Vec::new(),
            backend_status: None,
            analysis: None,
            error: None,
            in_flight: None,
        }
    }
}

impl ViewState {
    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Symptom list derived from `symptoms_text`.
    pub fn symptoms(&self) -> Vec<String> {
        parse_symptoms(&self.symptoms_text)
    }

    pub fn chat_request(&self) -> ChatRequest {
        ChatRequest {
            user_id: self.user_id.clone(),
            symptoms: self.symptoms(),
            message: self.message.clone(),
        }
    }

    pub fn ai_query_request(&self) -> AiQueryRequest {
        AiQueryRequest {
            user_id: self.user_id.clone(),
            query: self.medical_query.clone(),
        }
    }

    pub fn recommendation_request(&self, chat: &ChatResult) -> RecommendationRequest {
        RecommendationRequest {
            user_id: self.user_id.clone(),
            conditions: chat.possible_conditions.clone(),
        }
    }

    fn expect_running(&self, kind: ActionKind) -> Result<(), StateError> {
        if self.in_flight == Some(kind) {
            Ok(())
        } else {
            Err(StateError::NotRunning(kind))
        }
    }
}

/// Derive the next snapshot. `state` is never modified; on `Err` the caller
/// keeps the old snapshot.
pub fn reduce(state: &ViewState, msg: Msg) -> Result<ViewState, StateError> {
    let mut next = state.clone();
    match msg {
        Msg::SetUserId(value) => next.user_id = value,
        Msg::SetSymptoms(value) => next.symptoms_text = value,
        Msg::SetMessage(value) => next.message = value,
        Msg::SetMedicalQuery(value) => next.medical_query = value,
        Msg::Started(kind) => {
            if let Some(running) = state.in_flight {
                return Err(StateError::Busy {
                    running,
                    requested: kind,
                });
            }
            next.in_flight = Some(kind);
            next.error = None;
            if kind == ActionKind::AnalyzeSymptoms {
                next.analysis = Some(SymptomAnalysis::Pending);
            }
        }
        Msg::ChatAnswered(chat) => {
            state.expect_running(ActionKind::AnalyzeSymptoms)?;
            next.chat_result = Some(chat.clone());
            next.analysis = Some(SymptomAnalysis::ChatOnly(chat));
        }
        Msg::RecommendationsReady(set) => {
            state.expect_running(ActionKind::AnalyzeSymptoms)?;
            let Some(SymptomAnalysis::ChatOnly(chat)) = &state.analysis else {
                return Err(StateError::RecommendationsBeforeChat);
            };
            next.analysis = Some(SymptomAnalysis::ChatAndRecommendations(
                chat.clone(),
                set.clone(),
            ));
            next.recommendations = Some(set);
            next.in_flight = None;
        }
        Msg::QueryAnswered(result) => {
            state.expect_running(ActionKind::MedicalQuery)?;
            next.ai_answer = Some(result.answer);
            next.in_flight = None;
        }
        Msg::ReportAnalyzed(result) => {
            state.expect_running(ActionKind::UploadReport)?;
            next.report_result = Some(result);
            next.in_flight = None;
        }
        Msg::HistoryLoaded(response) => {
            state.expect_running(ActionKind::LoadHistory)?;
            next.history = response.entries;
            next.in_flight = None;
        }
        Msg::HealthChecked(status) => {
            state.expect_running(ActionKind::CheckHealth)?;
            next.backend_status = Some(status);
            next.in_flight = None;
        }
        Msg::Failed(kind, error) => {
            state.expect_running(kind)?;
            next.error = Some(format!("{}: {error}", kind.error_prefix()));
            if kind == ActionKind::AnalyzeSymptoms {
                let (stage, chat) = match &state.analysis {
                    Some(SymptomAnalysis::ChatOnly(chat)) => {
                        (ChainStage::Recommendations, Some(chat.clone()))
                    }
                    _ => (ChainStage::Chat, None),
                };
                next.analysis = Some(SymptomAnalysis::Failed { stage, chat, error });
            }
            next.in_flight = None;
        }
        Msg::Cancelled(kind) => {
            state.expect_running(kind)?;
            if kind == ActionKind::AnalyzeSymptoms {
                let chat = match &state.analysis {
                    Some(SymptomAnalysis::ChatOnly(chat)) => Some(chat.clone()),
                    _ => None,
                };
                next.analysis = Some(SymptomAnalysis::Cancelled { chat });
            }
            next.in_flight = None;
        }
    }
    Ok(next)
}
