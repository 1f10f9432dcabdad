//! Text rendering of a `ViewState`.
//!
//! Produces the assistant's titled sections as plain lines that any front
//! end (terminal, web template, test) can display.

use chrono::{Local, TimeZone};

use crate::state::ViewState;
use crate::types::HistoryEntry;

pub const TITLE: &str = "MyHealth AI: Intelligent Health Companion & Diagnostic Assistant";

pub const RECOMMENDATIONS_HINT: &str =
    "Run symptom chat first to generate personalized recommendations.";

/// One titled card of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub title: &'static str,
    pub banner: Option<String>,
    pub busy: bool,
    pub sections: Vec<Section>,
}

impl Rendered {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Display label for a recommendation category key.
///
/// Only the first underscore becomes a space (`sleep_hygiene_tips` renders
/// as `sleep hygiene_tips`), matching what the web UI has always shown.
pub fn recommendation_label(key: &str) -> String {
    key.replacen('_', " ", 1)
}

/// `"<time>: [<interaction_type>] <summary>"` with the time shown in `tz`.
pub fn history_line<Tz: TimeZone>(entry: &HistoryEntry, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let when = entry.timestamp.as_datetime().with_timezone(tz);
    format!(
        "{}: [{}] {}",
        when.format("%Y-%m-%d %H:%M:%S"),
        entry.interaction_type,
        entry.summary
    )
}

/// Render with history times in the local time zone.
pub fn render(state: &ViewState) -> Rendered {
    render_in(state, &Local)
}

pub fn render_in<Tz: TimeZone>(state: &ViewState, tz: &Tz) -> Rendered
where
    Tz::Offset: std::fmt::Display,
{
    let mut setup = vec![format!("User ID: {}", state.user_id)];
    if let Some(status) = &state.backend_status {
        let text = status
            .get("status")
            .and_then(|s| s.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        setup.push(format!("Backend: {text}"));
    }

    let mut chat = vec![
        format!("Symptoms: {}", state.symptoms().join(", ")),
        format!("Message: {}", state.message),
    ];
    if let Some(result) = &state.chat_result {
        chat.push(format!("Urgency: {}", result.urgency));
        chat.push(result.response.clone());
        chat.push(format!(
            "Specialist: {}",
            result.specialist.as_deref().unwrap_or("")
        ));
    }

    let mut query = vec![format!("Query: {}", state.medical_query)];
    if let Some(answer) = state.ai_answer.as_deref().filter(|a| !a.is_empty()) {
        query.extend(answer.lines().map(str::to_string));
    }

    let mut report = Vec::new();
    if let Some(result) = &state.report_result {
        report.push(result.summary.clone());
        report.extend(result.alerts.iter().map(|a| format!("- {a}")));
    }

    let recommendations = match &state.recommendations {
        Some(set) => set
            .iter()
            .flat_map(|(key, items)| {
                std::iter::once(recommendation_label(key))
                    .chain(items.iter().map(|item| format!("- {item}")))
            })
            .collect(),
        None => vec![RECOMMENDATIONS_HINT.to_string()],
    };

    let history = state.history.iter().map(|e| history_line(e, tz)).collect();

    Rendered {
        title: TITLE,
        banner: state.error.clone(),
        busy: state.busy(),
        sections: vec![
            Section {
                title: "User Setup",
                lines: setup,
            },
            Section {
                title: "1) Symptom Chat",
                lines: chat,
            },
            Section {
                title: "2) AI Medical Query",
                lines: query,
            },
            Section {
                title: "3) Medical Report Analysis",
                lines: report,
            },
            Section {
                title: "4) Personalized Recommendations",
                lines: recommendations,
            },
            Section {
                title: "5) History & Follow-Up",
                lines: history,
            },
        ],
    }
}
