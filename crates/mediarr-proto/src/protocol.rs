use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Player states in which the now-playing overlay is hidden.
pub const INACTIVE_PLAYER_STATES: [&str; 3] = ["unavailable", "idle", "off"];

/// The full host state map: entity id -> entity state.
pub type StateSnapshot = HashMap<String, EntityState>;

/// One slot of the host's state store.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EntityState {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    /// Non-empty text attribute. Numbers are rendered as text.
    pub fn attr_text(&self, name: &str) -> Option<String> {
        self.attributes.get(name).and_then(value_text)
    }

    /// Numeric attribute; numeric strings are accepted.
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        match self.attributes.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Items under `attributes.data`, in order. Entries that are not objects are skipped.
    pub fn media_items(&self) -> Vec<MediaItem> {
        let Some(Value::Array(data)) = self.attributes.get("data") else {
            return Vec::new();
        };
        data.iter()
            .filter(|v| v.is_object())
            .filter_map(|v| MediaItem::deserialize(v).ok())
            .collect()
    }

    pub fn is_inactive_player(&self) -> bool {
        INACTIVE_PLAYER_STATES.contains(&self.state.as_str())
    }
}

/// Host `/api/states` entry, used when a snapshot arrives as a list.
#[derive(Debug, Deserialize)]
struct StateListEntry {
    entity_id: String,
    #[serde(flatten)]
    state: EntityState,
}

/// Parse a snapshot from either a `{entity_id: state}` map or a host state list.
pub fn parse_snapshot(json: &str) -> anyhow::Result<StateSnapshot> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(_) => {
            let entries: Vec<StateListEntry> = serde_json::from_value(value)?;
            Ok(entries
                .into_iter()
                .map(|e| (e.entity_id, e.state))
                .collect())
        }
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => anyhow::bail!("snapshot must be a JSON object or array"),
    }
}

/// One entry of a feed's `data` list. Every field is optional and parsed leniently:
/// numbers are accepted where text is expected and lists are joined.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaItem {
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub poster: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub fanart: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub banner: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub backdrop: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub release: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub runtime: Option<f64>,
    #[serde(deserialize_with = "lenient_text")]
    pub genres: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub studio: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    /// Set by the integrations on the single placeholder entry of an empty feed.
    pub title_default: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub key: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub release_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub release_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub airdate: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub episode: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub number: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub requested_by: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

impl MediaItem {
    pub fn is_placeholder(&self) -> bool {
        self.title_default.as_ref().is_some_and(is_truthy)
    }

    pub fn title_text(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Image for the detail background, widest artwork first.
    pub fn background_image(&self) -> Option<&str> {
        self.fanart
            .as_deref()
            .or(self.backdrop.as_deref())
            .or(self.banner.as_deref())
            .or(self.poster.as_deref())
    }

    /// Release or air date, whichever the feed provides.
    pub fn date_text(&self) -> Option<&str> {
        self.release_date.as_deref().or(self.airdate.as_deref())
    }
}

/// A playback-capable device reported by the media server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteClient {
    pub name: String,
    pub product: String,
    pub version: String,
    pub client_id: String,
}

/// JS-style truthiness, used wherever the card historically relied on `||` fallbacks.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar or list value as display text. Empty results are `None`.
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
