//! Deterministic stand-ins for the backend's triage, report scan,
//! recommendation and Q&A engines.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::{ChatResponse, RecommendationResponse, ReportAnalysis};

/// Keyword → condition, checked in this order.
const KEYWORD_CONDITIONS: &[(&str, &str)] = &[
    ("fever", "Viral Fever"),
    ("cough", "Upper Respiratory Infection"),
    ("cold", "Common Cold"),
    ("headache", "Migraine"),
    ("chest pain", "Cardiac Concern"),
    ("high sugar", "Diabetes"),
    ("thirst", "Diabetes"),
    ("fatigue", "Anemia / Metabolic Stress"),
    ("breath", "Respiratory Concern"),
    ("palpitations", "Cardiac Arrhythmia Concern"),
];

const EMERGENCY_KEYWORDS: &[&str] = &[
    "chest pain",
    "difficulty breathing",
    "shortness of breath",
    "fainting",
    "stroke",
    "seizure",
    "unconscious",
    "severe bleeding",
];

pub const GENERAL_CONDITION: &str = "General Health Concern";
pub const DEFAULT_SPECIALIST: &str = "General Physician";

pub const SAFETY_NOTE: &str = "Safety Note: This response is informational only and not a \
substitute for professional medical diagnosis or treatment.";

const REPORT_SUMMARY: &str = "Automated report scan completed. This tool provides educational \
guidance and should not replace physician review.";

const NO_FLAGS: &str = "No critical flags found in uploaded content.";

fn specialist_for(condition: &str) -> &'static str {
    match condition {
        "Diabetes" => "Endocrinologist",
        "Cardiac Concern" | "Cardiac Arrhythmia Concern" => "Cardiologist",
        "Upper Respiratory Infection" | "Respiratory Concern" => "Pulmonologist",
        "Migraine" => "Neurologist",
        "Anemia / Metabolic Stress" => "Internal Medicine Specialist",
        _ => DEFAULT_SPECIALIST,
    }
}

/// Keyword triage over the free-text message and the symptom list.
pub fn triage(message: &str, symptoms: &[String]) -> ChatResponse {
    let combined = format!("{message} {}", symptoms.join(" ")).to_lowercase();

    let mut matched: Vec<&str> = KEYWORD_CONDITIONS
        .iter()
        .filter(|(keyword, _)| combined.contains(keyword))
        .map(|(_, condition)| *condition)
        .collect();
    if matched.is_empty() {
        matched.push(GENERAL_CONDITION);
    }

    let emergency = EMERGENCY_KEYWORDS.iter().any(|kw| combined.contains(kw));
    let urgency = if emergency { "emergency" } else { "normal" };

    // Most frequent condition; ties go to the earliest match.
    let mut primary = matched[0];
    let mut best = 0;
    for candidate in &matched {
        let count = matched.iter().filter(|m| *m == candidate).count();
        if count > best {
            best = count;
            primary = *candidate;
        }
    }
    let specialist = specialist_for(primary);

    let mut conditions: Vec<String> = matched.iter().map(|c| c.to_string()).collect();
    conditions.sort();
    conditions.dedup();

    let response = if emergency {
        "Your symptoms may indicate an emergency. Please call local emergency services \
         or visit the nearest emergency room immediately."
            .to_string()
    } else {
        format!(
            "Based on your input, possible issues include: {}. \
             For an accurate diagnosis, consult a {specialist}.",
            conditions.join(", ")
        )
    };

    ChatResponse {
        response,
        possible_conditions: conditions,
        urgency: urgency.to_string(),
        specialist: Some(specialist.to_string()),
    }
}

static GLUCOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"glucose\D+(\d+)").expect("valid glucose pattern"));
static BLOOD_PRESSURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"blood pressure\D+(\d{2,3})/(\d{2,3})").expect("valid blood pressure pattern")
});
static CHOLESTEROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cholesterol\D+(\d+)").expect("valid cholesterol pattern"));

fn first_number(re: &Regex, text: &str, group: usize) -> Option<u64> {
    re.captures(text)?.get(group)?.as_str().parse().ok()
}

/// Scan an uploaded report for out-of-range glucose, blood pressure and
/// cholesterol values.
pub fn analyze_report(file_name: &str, raw: &[u8]) -> ReportAnalysis {
    let decoded = String::from_utf8_lossy(raw);
    let text = if file_name.to_lowercase().ends_with(".csv") {
        decoded
            .lines()
            .map(|row| row.split(',').collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        decoded.into_owned()
    };
    let normalized = text.to_lowercase();

    let mut alerts = Vec::new();
    if first_number(&GLUCOSE, &normalized, 1).is_some_and(|v| v > 180) {
        alerts.push("High glucose detected; diabetes evaluation is recommended.".to_string());
    }
    let systolic = first_number(&BLOOD_PRESSURE, &normalized, 1);
    let diastolic = first_number(&BLOOD_PRESSURE, &normalized, 2);
    if let (Some(sys), Some(dia)) = (systolic, diastolic) {
        if sys >= 140 || dia >= 90 {
            alerts.push("Elevated blood pressure observed; consult a cardiologist.".to_string());
        }
    }
    if first_number(&CHOLESTEROL, &normalized, 1).is_some_and(|v| v > 240) {
        alerts.push("High cholesterol level detected; lipid management advised.".to_string());
    }
    if alerts.is_empty() {
        alerts.push(NO_FLAGS.to_string());
    }

    ReportAnalysis {
        summary: REPORT_SUMMARY.to_string(),
        alerts,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Baseline wellness suggestions, extended for diabetic and cardiac conditions.
pub fn recommendations(conditions: &[String]) -> RecommendationResponse {
    let mut recs = RecommendationResponse {
        diet: strings(&[
            "Include more vegetables, lean proteins, and whole grains.",
            "Limit high-sugar and highly processed foods.",
        ]),
        lifestyle: strings(&[
            "Sleep 7-8 hours daily.",
            "Hydrate with at least 2-3 liters of water unless advised otherwise.",
        ]),
        exercises: strings(&[
            "Brisk walking for 30 minutes, 5 times per week.",
            "Light stretching or yoga for 15 minutes daily.",
        ]),
        home_remedies: strings(&[
            "For mild cold/cough, use warm fluids and steam inhalation.",
            "For mild fever, prioritize hydration and rest.",
        ]),
        otc_medicines: strings(&[
            "Only use over-the-counter medicines after checking labels and contraindications.",
            "Avoid self-medication if pregnant, elderly, or managing chronic disease.",
        ]),
    };

    let has = |name: &str| conditions.iter().any(|c| c == name);
    if has("Diabetes") {
        recs.diet
            .push("Prefer low glycemic index meals and monitor carbohydrate portions.".to_string());
        recs.lifestyle
            .push("Track fasting and post-meal blood sugar trends.".to_string());
    }
    if has("Cardiac Concern") || has("Cardiac Arrhythmia Concern") {
        recs.diet
            .push("Reduce sodium intake and avoid trans fats.".to_string());
        recs.exercises
            .push("Choose moderate-intensity exercise after medical clearance.".to_string());
    }
    recs
}

const KNOWLEDGE_BASE: &[(&str, &str)] = &[
    (
        "diabetes",
        "Diabetes care includes blood sugar monitoring, low glycemic nutrition, regular physical \
         activity, medication adherence, and periodic HbA1c tests under physician supervision.",
    ),
    (
        "hypertension",
        "Hypertension management focuses on low sodium diet, blood pressure tracking, stress \
         reduction, exercise, sleep quality, and prescribed antihypertensive medication.",
    ),
    (
        "cold and cough",
        "Most mild cold and cough cases improve with hydration, rest, steam inhalation, and \
         symptomatic over-the-counter medicines when safe for the patient profile.",
    ),
    (
        "heart emergency",
        "Warning signs like chest pain, shortness of breath, fainting, or severe sweating can \
         indicate emergency cardiac issues and require immediate emergency care.",
    ),
];

const RED_FLAGS: &[&str] = &["chest pain", "faint", "breath", "stroke", "seizure"];

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(str::to_lowercase)
        .collect()
}

/// Answer a free-text medical question from the built-in knowledge base.
///
/// Red-flag terms always yield emergency advice. Otherwise the two passages
/// sharing the most words with the query are returned; a query that shares
/// nothing gets general guidance.
pub fn answer_query(query: &str) -> String {
    let normalized = query.to_lowercase();
    if RED_FLAGS.iter().any(|term| normalized.contains(term)) {
        return format!(
            "Your symptoms may indicate an emergency. Seek immediate emergency care. \
             For non-emergency concerns, consult a physician for examination.\n\n{SAFETY_NOTE}"
        );
    }

    let query_words = words(&normalized);
    let mut scored: Vec<(usize, &str)> = KNOWLEDGE_BASE
        .iter()
        .map(|(topic, text)| {
            let passage = words(&format!("{topic} {text}"));
            (query_words.intersection(&passage).count(), *text)
        })
        .filter(|(score, _)| *score > 0)
        .collect();
    // Stable sort keeps knowledge-base order among equal scores.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    if scored.is_empty() {
        return format!(
            "For general health concerns, track symptoms, stay hydrated, maintain rest, and \
             consult a licensed doctor for personalized evaluation.\n\n{SAFETY_NOTE}"
        );
    }
    let context: Vec<&str> = scored.iter().take(2).map(|(_, text)| *text).collect();
    format!("{}\n\n{SAFETY_NOTE}", context.join("\n"))
}
