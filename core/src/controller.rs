//! Sequences API calls for user actions and publishes view snapshots.
//!
//! # Design
//! `ViewController` owns the current `ViewState` and applies every change
//! through `reduce`. Actions take `&mut self`, so a controller runs one
//! action at a time; a caller that dispatches `Msg::Started` by hand while
//! an action is in flight gets `StateError::Busy`. Each new snapshot is
//! published on a `watch` channel for renderers.
//!
//! API failures never escape an action. They end up in the error banner of
//! the snapshot; only state-machine violations are returned as `Err`. An
//! action future dropped before completion (timeout, `select!`, aborted
//! task) still takes the controller out of the busy state.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::state::{reduce, ActionKind, Msg, StateError, ViewState};
use crate::transport::Transport;
use crate::types::ReportFile;

pub struct ViewController<T> {
    api: ApiClient<T>,
    state: ViewState,
    updates: watch::Sender<ViewState>,
}

impl<T> ViewController<T> {
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Receiver that sees every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.updates.subscribe()
    }

    /// Apply one message and publish the resulting snapshot.
    pub fn dispatch(&mut self, msg: Msg) -> Result<(), StateError> {
        let next = reduce(&self.state, msg)?;
        self.state = next.clone();
        self.updates.send_replace(next);
        Ok(())
    }

    fn begin(&mut self, kind: ActionKind) -> Result<InFlight<'_, T>, StateError> {
        self.dispatch(Msg::Started(kind))?;
        Ok(InFlight {
            view: self,
            kind,
            settled: false,
        })
    }
}

impl<T: Transport> ViewController<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self::with_state(api, ViewState::default())
    }

    pub fn with_state(api: ApiClient<T>, state: ViewState) -> Self {
        let (updates, _) = watch::channel(state.clone());
        Self {
            api,
            state,
            updates,
        }
    }

    /// Chat, then recommendations for the returned conditions.
    ///
    /// A chat failure skips the recommendations call. A recommendations
    /// failure keeps the new chat result on screen.
    pub async fn analyze_symptoms(&mut self) -> Result<(), StateError> {
        let mut action = self.begin(ActionKind::AnalyzeSymptoms)?;

        let request = action.view.state.chat_request();
        debug!(symptoms = request.symptoms.len(), "analyzing symptoms");
        let chat = match action.view.api.chat(&request).await {
            Ok(chat) => chat,
            Err(e) => return action.fail(e),
        };

        let follow_up = action.view.state.recommendation_request(&chat);
        action.view.dispatch(Msg::ChatAnswered(chat))?;

        let result = action.view.api.recommendations(&follow_up).await;
        action.finish(result, Msg::RecommendationsReady)
    }

    pub async fn submit_medical_query(&mut self) -> Result<(), StateError> {
        let action = self.begin(ActionKind::MedicalQuery)?;
        let request = action.view.state.ai_query_request();
        let result = action.view.api.ai_query(&request).await;
        action.finish(result, Msg::QueryAnswered)
    }

    /// Upload the selected report. Without a file nothing happens at all.
    pub async fn upload_report(&mut self, file: Option<ReportFile>) -> Result<(), StateError> {
        let Some(file) = file else {
            debug!("no report selected");
            return Ok(());
        };
        let action = self.begin(ActionKind::UploadReport)?;
        let user_id = action.view.state.user_id.clone();
        let result = action.view.api.analyze_report(&user_id, file).await;
        action.finish(result, Msg::ReportAnalyzed)
    }

    pub async fn load_history(&mut self) -> Result<(), StateError> {
        let action = self.begin(ActionKind::LoadHistory)?;
        let user_id = action.view.state.user_id.clone();
        let result = action.view.api.history(&user_id).await;
        action.finish(result, Msg::HistoryLoaded)
    }

    pub async fn check_health(&mut self) -> Result<(), StateError> {
        let action = self.begin(ActionKind::CheckHealth)?;
        let result = action.view.api.health().await;
        action.finish(result, Msg::HealthChecked)
    }
}

/// An action between `Started` and its terminal message.
///
/// Dropping it unsettled (the action future was dropped at an await point,
/// or a dispatch in between was rejected) publishes `Msg::Cancelled`, so the
/// controller never stays busy.
struct InFlight<'a, T> {
    view: &'a mut ViewController<T>,
    kind: ActionKind,
    settled: bool,
}

impl<T> InFlight<'_, T> {
    fn finish<R>(
        mut self,
        result: Result<R, ApiError>,
        on_success: impl FnOnce(R) -> Msg,
    ) -> Result<(), StateError> {
        match result {
            Ok(value) => self.settle(on_success(value)),
            Err(e) => self.fail(e),
        }
    }

    fn fail(mut self, error: ApiError) -> Result<(), StateError> {
        warn!(action = %self.kind, error = %error, "action failed");
        let kind = self.kind;
        self.settle(Msg::Failed(kind, error))
    }

    fn settle(&mut self, msg: Msg) -> Result<(), StateError> {
        let outcome = self.view.dispatch(msg);
        self.settled = outcome.is_ok();
        outcome
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(action = %self.kind, "action dropped before completion");
        if let Err(e) = self.view.dispatch(Msg::Cancelled(self.kind)) {
            warn!(action = %self.kind, error = %e, "could not cancel action");
        }
    }
}
