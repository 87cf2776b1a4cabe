use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed set of intake answers the assistant tries to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeField {
    Symptoms,
    Duration,
    Triggers,
    Intensity,
    Frequency,
    ImpactOnLife,
    CopingMechanisms,
}

impl IntakeField {
    pub const ALL: [IntakeField; 7] = [
        IntakeField::Symptoms,
        IntakeField::Duration,
        IntakeField::Triggers,
        IntakeField::Intensity,
        IntakeField::Frequency,
        IntakeField::ImpactOnLife,
        IntakeField::CopingMechanisms,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            IntakeField::Symptoms => "symptoms",
            IntakeField::Duration => "duration",
            IntakeField::Triggers => "triggers",
            IntakeField::Intensity => "intensity",
            IntakeField::Frequency => "frequency",
            IntakeField::ImpactOnLife => "impact_on_life",
            IntakeField::CopingMechanisms => "coping_mechanisms",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Answers received for one scoring request.
///
/// Only string values are retained. Numbers, booleans, arrays, objects and
/// null are dropped on construction, so they score exactly like a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeFieldSet {
    values: BTreeMap<IntakeField, String>,
}

impl IntakeFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let values = IntakeField::ALL
            .into_iter()
            .filter_map(|field| match map.get(field.key()) {
                Some(Value::String(text)) => Some((field, text.clone())),
                _ => None,
            })
            .collect();
        Self { values }
    }

    pub fn with(mut self, field: IntakeField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: IntakeField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// True when the field holds text that is non-empty after trimming.
    pub fn is_answered(&self, field: IntakeField) -> bool {
        self.get(field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Structured answers pulled out of a free-text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub symptoms: Option<String>,
    pub duration: Option<String>,
    pub triggers: Option<String>,
    pub intensity: Option<String>,
    pub frequency: Option<String>,
    pub impact_on_life: Option<String>,
    pub coping_mechanisms: Option<String>,
}

impl ExtractedFields {
    pub fn slot_mut(&mut self, field: IntakeField) -> &mut Option<String> {
        match field {
            IntakeField::Symptoms => &mut self.symptoms,
            IntakeField::Duration => &mut self.duration,
            IntakeField::Triggers => &mut self.triggers,
            IntakeField::Intensity => &mut self.intensity,
            IntakeField::Frequency => &mut self.frequency,
            IntakeField::ImpactOnLife => &mut self.impact_on_life,
            IntakeField::CopingMechanisms => &mut self.coping_mechanisms,
        }
    }

    pub fn get(&self, field: IntakeField) -> Option<&str> {
        let slot = match field {
            IntakeField::Symptoms => &self.symptoms,
            IntakeField::Duration => &self.duration,
            IntakeField::Triggers => &self.triggers,
            IntakeField::Intensity => &self.intensity,
            IntakeField::Frequency => &self.frequency,
            IntakeField::ImpactOnLife => &self.impact_on_life,
            IntakeField::CopingMechanisms => &self.coping_mechanisms,
        };
        slot.as_deref()
    }

    pub fn to_field_set(&self) -> IntakeFieldSet {
        IntakeField::ALL
            .into_iter()
            .fold(IntakeFieldSet::new(), |set, field| match self.get(field) {
                Some(value) => set.with(field, value),
                None => set,
            })
    }
}

/// Category flags reported by the content moderation provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationCategories {
    pub self_harm: bool,
    pub self_harm_intent: bool,
    pub violence: bool,
    pub harassment_threatening: bool,
}

impl ModerationCategories {
    /// Reads provider keys such as `self-harm/intent`; unknown keys are ignored
    /// and missing ones stay `false`.
    pub fn from_provider_map<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut categories = Self::default();
        for (key, value) in entries {
            match normalize_category_key(key).as_str() {
                "self_harm" => categories.self_harm = value,
                "self_harm_intent" => categories.self_harm_intent = value,
                "violence" => categories.violence = value,
                "harassment_threatening" => categories.harassment_threatening = value,
                _ => {}
            }
        }
        categories
    }
}

fn normalize_category_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '-' | '/' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Moderation verdict for a single message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: ModerationCategories,
}

/// Elevated-risk tag returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskFlag {
    #[serde(rename = "self-harm")]
    SelfHarm,
    #[serde(rename = "violence")]
    Violence,
}

impl RiskFlag {
    pub fn label(&self) -> &'static str {
        match self {
            RiskFlag::SelfHarm => "self-harm",
            RiskFlag::Violence => "violence",
        }
    }
}

/// Conversation phase the assistant should move into next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    Intake,
    Advice,
    Reflection,
    Summary,
}

impl ChatMode {
    pub const ALL: [ChatMode; 4] = [
        ChatMode::Intake,
        ChatMode::Advice,
        ChatMode::Reflection,
        ChatMode::Summary,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChatMode::Intake => "intake",
            ChatMode::Advice => "advice",
            ChatMode::Reflection => "reflection",
            ChatMode::Summary => "summary",
        }
    }

    /// Interprets a model reply. Anything outside the four modes becomes `Advice`.
    pub fn from_model_output(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.label() == normalized)
            .unwrap_or(ChatMode::Advice)
    }
}

pub const MAX_SUMMARY_CHARS: usize = 2000;
pub const MAX_CONTEXT_CHARS: usize = 4000;

/// Latest summary for a session, replaced wholesale on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub summary: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Truncates to [`MAX_SUMMARY_CHARS`] characters, then trims both inputs.
    pub fn new(session_id: &str, summary: &str, updated_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.trim().to_string(),
            summary: truncate_chars(summary, MAX_SUMMARY_CHARS).trim().to_string(),
            updated_at,
        }
    }

    pub fn updated_at_label(&self) -> String {
        format_timestamp(&self.updated_at)
    }
}

pub(crate) fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

/// Keeps at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
