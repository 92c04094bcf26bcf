//! Card configuration: validation, defaults and typed accessors.
//!
//! `normalize` is the only constructor. It overlays the raw user map onto the
//! variant defaults, derives per-section limits, and caches slash-terminated
//! copies of server URLs next to (not instead of) the fields the user typed.

use std::collections::HashMap;

use mediarr_proto::protocol::{is_truthy, value_text};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::variant::{CardVariant, FALLBACK_BACKGROUND};

const DEFAULT_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct CardConfig {
    variant: CardVariant,
    values: Map<String, Value>,
    /// Slash-terminated copies of URL fields, keyed by field name.
    formatted_urls: HashMap<String, String>,
}

/// Validate `raw` and produce the canonical configuration for `variant`.
pub fn normalize(raw: &Value, variant: CardVariant) -> Result<CardConfig, ConfigError> {
    let Value::Object(raw) = raw else {
        return Err(ConfigError::NotAMap);
    };

    // Same rule the registry uses to pick active sections.
    let has_entity = raw
        .iter()
        .any(|(key, value)| variant.enabled_entity_section(key, value).is_some());
    if !has_entity {
        return Err(ConfigError::NoMediaEntity {
            hint: variant.entity_hint().to_string(),
        });
    }

    let mut values = variant.defaults();
    for (key, value) in raw {
        values.insert(key.clone(), value.clone());
    }

    let max_items = values
        .get("max_items")
        .cloned()
        .unwrap_or_else(|| Value::from(variant.default_max_items()));
    let days_to_check = values
        .get("days_to_check")
        .cloned()
        .unwrap_or_else(|| Value::from(crate::variant::DEFAULT_DAYS_TO_CHECK));

    // "Absent or falsy" falls back, so an explicit 0 or "" takes the global value.
    for spec in variant.sections() {
        let key = format!("{}_max_items", spec.key);
        if !values.get(&key).is_some_and(is_truthy) {
            values.insert(key, max_items.clone());
        }
        if spec.windowed {
            let key = format!("{}_days_to_check", spec.key);
            if !values.get(&key).is_some_and(is_truthy) {
                values.insert(key, days_to_check.clone());
            }
        }
    }

    let mut formatted_urls = HashMap::new();
    for field in variant.url_fields() {
        if let Some(url) = raw.get(*field).and_then(Value::as_str) {
            if url.is_empty() {
                continue;
            }
            let formatted = if url.ends_with('/') {
                url.to_string()
            } else {
                format!("{url}/")
            };
            formatted_urls.insert(field.to_string(), formatted);
        }
    }

    debug!(
        variant = variant.element_name(),
        keys = values.len(),
        "card configuration normalized"
    );

    Ok(CardConfig {
        variant,
        values,
        formatted_urls,
    })
}

impl CardConfig {
    pub fn variant(&self) -> CardVariant {
        self.variant
    }

    /// Canonical values in user order (defaults first, then user keys).
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Non-empty string value.
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Entity id configured under `config_key`, if any.
    pub fn entity(&self, config_key: &str) -> Option<&str> {
        self.str_value(config_key)
    }

    pub fn max_items(&self, section: &str) -> usize {
        self.number(&format!("{section}_max_items"))
            .or_else(|| self.number("max_items"))
            .map(|n| n.max(0.0) as usize)
            .unwrap_or(self.variant.default_max_items() as usize)
    }

    pub fn days_to_check(&self, section: &str) -> i64 {
        self.number(&format!("{section}_days_to_check"))
            .or_else(|| self.number("days_to_check"))
            .map(|n| n as i64)
            .unwrap_or(crate::variant::DEFAULT_DAYS_TO_CHECK as i64)
    }

    /// User label for a section, falling back to the plugin default.
    pub fn label<'a>(&'a self, section: &str, default: &'a str) -> &'a str {
        self.values
            .get(&format!("{section}_label"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }

    /// Allowed release types; `None` means no filtering.
    pub fn release_types(&self, section: &str) -> Option<Vec<String>> {
        match self.values.get(&format!("{section}_release_types"))? {
            Value::Array(items) => Some(items.iter().filter_map(value_text).collect()),
            Value::String(s) if !s.is_empty() => {
                Some(s.split(',').map(|t| t.trim().to_string()).collect())
            }
            _ => None,
        }
    }

    pub fn opacity(&self) -> f64 {
        self.number("opacity").unwrap_or(DEFAULT_OPACITY)
    }

    pub fn blur_radius(&self) -> f64 {
        self.number("blur_radius").unwrap_or(0.0)
    }

    pub fn media_player_entity(&self) -> Option<&str> {
        self.str_value("media_player_entity")
    }

    /// Server URL for a source, slash-terminated when the user gave one.
    pub fn server_url(&self, source: &str) -> Option<&str> {
        let field = format!("{source}_url");
        self.formatted_urls
            .get(&field)
            .map(String::as_str)
            .or_else(|| self.str_value(&field))
    }

    pub fn plex_token(&self) -> Option<&str> {
        self.str_value("plex_token")
    }

    pub fn fallback_image(&self) -> &str {
        self.str_value("fallback_image")
            .unwrap_or(FALLBACK_BACKGROUND)
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_config_is_rejected() {
        let err = normalize(&json!({}), CardVariant::Mediarr).unwrap_err();
        assert!(matches!(err, ConfigError::NoMediaEntity { .. }));
        assert!(err.to_string().starts_with("Please define at least one media entity"));
    }

    #[test]
    fn test_non_map_is_rejected() {
        assert_eq!(
            normalize(&json!(["plex_entity"]), CardVariant::Mediarr).unwrap_err(),
            ConfigError::NotAMap
        );
    }

    #[test]
    fn test_empty_entity_string_does_not_count() {
        assert!(normalize(&json!({"plex_entity": ""}), CardVariant::Mediarr).is_err());
        assert!(normalize(&json!({"media_player_entity": "media_player.tv"}), CardVariant::Mediarr).is_err());
    }

    #[test]
    fn test_non_string_entity_does_not_count() {
        for value in [json!(true), json!(1), json!(["sensor.plex"]), json!({"id": "sensor.plex"})] {
            assert!(
                normalize(&json!({"plex_entity": value}), CardVariant::Mediarr).is_err(),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn test_family_member_counts_as_entity() {
        let config =
            normalize(&json!({"seer_trending_entity": "sensor.t"}), CardVariant::Mediarr).unwrap();
        assert_eq!(config.entity("seer_trending_entity"), Some("sensor.t"));
    }

    #[test]
    fn test_falsy_section_limit_falls_back() {
        let config = normalize(
            &json!({"max_items": 10, "radarr_max_items": 0, "radarr_entity": "sensor.radarr"}),
            CardVariant::Mediarr,
        )
        .unwrap();
        assert_eq!(config.get("radarr_max_items"), Some(&json!(10)));
        assert_eq!(config.max_items("radarr"), 10);
    }

    #[test]
    fn test_section_overrides_win() {
        let config = normalize(
            &json!({"sonarr_entity": "sensor.s", "sonarr_max_items": 3, "sonarr_days_to_check": ""}),
            CardVariant::Mediarr,
        )
        .unwrap();
        assert_eq!(config.max_items("sonarr"), 3);
        assert_eq!(config.days_to_check("sonarr"), 60);
        assert_eq!(config.max_items("plex"), 10);
        // Non-windowed sections get no derived window.
        assert_eq!(config.get("plex_days_to_check"), None);
    }

    #[test]
    fn test_emby_defaults() {
        let config =
            normalize(&json!({"emby_movies_entity": "sensor.m"}), CardVariant::Emby).unwrap();
        assert_eq!(config.max_items("emby_movies"), 40);
        assert_eq!(config.get("emby_series_days_to_check"), Some(&json!(60)));
        assert_eq!(config.get("radarr_release_types"), None);
    }

    #[test]
    fn test_release_type_defaults_and_override() {
        let config = normalize(
            &json!({"radarr_entity": "sensor.r", "radarr2_release_types": ["Physical"]}),
            CardVariant::Mediarr,
        )
        .unwrap();
        assert_eq!(
            config.release_types("radarr"),
            Some(vec!["Digital".to_string(), "Theaters".to_string()])
        );
        assert_eq!(config.release_types("radarr2"), Some(vec!["Physical".to_string()]));
        assert_eq!(config.release_types("sonarr"), None);
    }

    #[test]
    fn test_url_is_derived_not_rewritten() {
        let config = normalize(
            &json!({"plex_entity": "sensor.p", "plex_url": "http://plex:32400", "jellyfin_url": "http://jf/"}),
            CardVariant::Mediarr,
        )
        .unwrap();
        assert_eq!(config.server_url("plex"), Some("http://plex:32400/"));
        assert_eq!(config.get("plex_url"), Some(&json!("http://plex:32400")));
        assert_eq!(config.server_url("jellyfin"), Some("http://jf/"));
        assert_eq!(config.server_url("trakt"), None);
    }

    #[test]
    fn test_user_key_order_is_preserved() {
        let config = normalize(
            &json!({"tmdb_entity": "sensor.t", "plex_entity": "sensor.p"}),
            CardVariant::Mediarr,
        )
        .unwrap();
        let keys: Vec<&str> = config.values().keys().map(String::as_str).collect();
        let tmdb = keys.iter().position(|k| *k == "tmdb_entity").unwrap();
        let plex = keys.iter().position(|k| *k == "plex_entity").unwrap();
        assert!(tmdb < plex);
    }

    #[test]
    fn test_display_defaults() {
        let config = normalize(&json!({"plex_entity": "sensor.p"}), CardVariant::Mediarr).unwrap();
        assert_eq!(config.opacity(), 0.7);
        assert_eq!(config.blur_radius(), 0.0);
        assert_eq!(config.fallback_image(), FALLBACK_BACKGROUND);
        assert_eq!(config.media_player_entity(), None);
    }

    #[test]
    fn test_label_override() {
        let config = normalize(
            &json!({"sonarr_entity": "sensor.s", "sonarr_label": "Upcoming Shows"}),
            CardVariant::Mediarr,
        )
        .unwrap();
        assert_eq!(config.label("sonarr", "Sonarr"), "Upcoming Shows");
        assert_eq!(config.label("radarr", "Radarr"), "Radarr");
    }
}
