//! Client core for the MyHealth assistant service.
//!
//! # Overview
//! Two halves. The API client turns the backend's six operations into
//! `HttpRequest` values and parses `HttpResponse` values into typed results
//! (host-does-IO pattern), with a `Transport` performing the actual round
//! trip. The view controller owns the interactive state, runs one action at
//! a time through a reducer and publishes snapshots for rendering.
//!
//! # Design
//! - `HealthClient` is stateless and holds only `base_url`.
//! - Responses are validated by deserialization at the boundary; a missing
//!   field is an `ApiError`, not a rendering failure.
//! - `ViewState` snapshots are only derived through `state::reduce`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod state;
pub mod symptoms;
pub mod transport;
pub mod types;
pub mod view;

pub use api::ApiClient;
pub use client::HealthClient;
pub use config::ClientConfig;
pub use controller::ViewController;
pub use error::ApiError;
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
pub use state::{reduce, ActionKind, ChainStage, Msg, StateError, SymptomAnalysis, ViewState};
pub use symptoms::parse_symptoms;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AiQueryRequest, AiQueryResult, ChatRequest, ChatResult, HistoryEntry, HistoryResponse,
    RecommendationRequest, RecommendationSet, ReportFile, ReportResult, Timestamp,
};
