//! Domain DTOs for the MyHealth API.
//!
//! # Design
//! These types mirror the backend's wire schema but are defined
//! independently of the mock-server crate; the integration tests catch any
//! drift between the two. Response types are deserialized strictly, so a
//! missing field fails at the client boundary instead of later in the view.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Request payload for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub symptoms: Vec<String>,
    pub message: String,
}

/// Triage answer from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub urgency: String,
    pub response: String,
    /// The backend may leave this out when no specialist applies.
    #[serde(default)]
    pub specialist: Option<String>,
    pub possible_conditions: Vec<String>,
}

/// Request payload for `POST /api/ai-query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiQueryRequest {
    pub user_id: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiQueryResult {
    pub answer: String,
}

/// Request payload for `POST /api/recommendations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub conditions: Vec<String>,
}

/// Suggestions grouped by category key, in the order the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationSet(pub IndexMap<String, Vec<String>>);

impl RecommendationSet {
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of `POST /api/analyze-report`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResult {
    pub summary: String,
    pub alerts: Vec<String>,
}

/// Instant of a history entry, normalized to UTC.
///
/// Accepts RFC 3339 strings, naive ISO-8601 strings (taken as UTC) and epoch
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    fn parse_text(s: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Timestamp(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Timestamp(naive.and_utc()));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Timestamp(naive.and_utc()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Millis(i64),
            FractionalMillis(f64),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Timestamp::parse_text(&s),
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms).map(Timestamp),
            Raw::FractionalMillis(ms) => DateTime::from_timestamp_millis(ms as i64).map(Timestamp),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("invalid history timestamp"))
    }
}

/// One past interaction as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub interaction_type: String,
    pub summary: String,
}

/// Body of `GET /api/history/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    pub entries: Vec<HistoryEntry>,
}

/// A report file selected for upload. The bytes are moved into the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ReportFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a report from disk once.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploaded_report.txt".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn chat_result_accepts_null_specialist() {
        let chat: ChatResult = serde_json::from_str(
            r#"{"urgency":"normal","response":"rest","specialist":null,"possible_conditions":[]}"#,
        )
        .unwrap();
        assert!(chat.specialist.is_none());
    }

    #[test]
    fn chat_result_rejects_missing_conditions() {
        let result: Result<ChatResult, _> =
            serde_json::from_str(r#"{"urgency":"normal","response":"rest","specialist":"GP"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn recommendation_set_keeps_backend_order() {
        let set: RecommendationSet = serde_json::from_str(
            r#"{"lifestyle":["sleep"],"diet":["greens"],"exercises":[]}"#,
        )
        .unwrap();
        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["lifestyle", "diet", "exercises"]);
        assert_eq!(set.get("diet"), Some(&["greens".to_string()][..]));
    }

    #[test]
    fn recommendation_set_may_be_empty() {
        let set: RecommendationSet = serde_json::from_str("{}").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        let ts: Timestamp = serde_json::from_str(r#""2024-01-01T00:00:00Z""#).unwrap();
        assert_eq!(ts.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_parses_naive_iso_as_utc() {
        let ts: Timestamp = serde_json::from_str(r#""2024-03-05T10:20:30.123456""#).unwrap();
        assert_eq!(ts.0.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-05 10:20:30");
    }

    #[test]
    fn timestamp_parses_epoch_millis() {
        let ts: Timestamp = serde_json::from_str("1704067200000").unwrap();
        assert_eq!(ts.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_rejects_garbage() {
        let result: Result<Timestamp, _> = serde_json::from_str(r#""yesterday""#);
        assert!(result.is_err());
    }

    #[test]
    fn history_response_without_user_id() {
        let history: HistoryResponse = serde_json::from_str(
            r#"{"entries":[{"timestamp":"2024-01-01T00:00:00Z","interaction_type":"chat","summary":"flu check"}]}"#,
        )
        .unwrap();
        assert!(history.user_id.is_none());
        assert_eq!(history.entries.len(), 1);
    }

    #[test]
    fn report_file_guesses_content_type() {
        assert_eq!(ReportFile::new("labs.csv", Vec::new()).content_type, "text/csv");
        assert_eq!(ReportFile::new("labs.pdf", Vec::new()).content_type, "application/pdf");
        assert_eq!(
            ReportFile::new("labs", Vec::new()).content_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn report_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.txt");
        std::fs::write(&path, b"glucose: 200").unwrap();

        let file = ReportFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "panel.txt");
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(file.bytes, b"glucose: 200");
    }
}
