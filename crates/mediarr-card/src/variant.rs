//! Card variants and their section catalogs.
//!
//! The full "mediarr" card aggregates nine sources; the "emby" card is the
//! reduced two-section build with its own defaults. Everything that differs
//! between the two is data in this module.

use serde_json::{json, Map, Value};

/// Background shown when no section renders a selection.
pub const FALLBACK_BACKGROUND: &str =
    "https://emby.media/community/uploads/inline/76/584829879112e_WATER.jpg";

pub const DEFAULT_DAYS_TO_CHECK: u64 = 60;

const TMDB_FEEDS: &[&str] = &[
    "tmdb_entity",
    "tmdb_airing_today_entity",
    "tmdb_now_playing_entity",
    "tmdb_on_air_entity",
    "tmdb_upcoming_entity",
    "tmdb_popular_movies_entity",
    "tmdb_popular_tv_entity",
];

const SEER_FEEDS: &[&str] = &[
    "seer_entity",
    "seer_trending_entity",
    "seer_discover_entity",
    "seer_popular_movies_entity",
    "seer_popular_tv_entity",
];

/// Static description of one section slot in a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub key: &'static str,
    /// Entity config keys feeding this section, in bind order. Empty means
    /// the single `{key}_entity`.
    pub feeds: &'static [&'static str],
    /// Whether `{key}_days_to_check` is derived for this section.
    pub windowed: bool,
}

impl SectionSpec {
    const fn single(key: &'static str, windowed: bool) -> Self {
        Self {
            key,
            feeds: &[],
            windowed,
        }
    }

    const fn family(key: &'static str, feeds: &'static [&'static str]) -> Self {
        Self {
            key,
            feeds,
            windowed: false,
        }
    }

    pub fn is_family(&self) -> bool {
        !self.feeds.is_empty()
    }

    /// Config keys whose entity ids feed this section.
    pub fn feed_keys(&self) -> Vec<String> {
        if self.feeds.is_empty() {
            vec![format!("{}_entity", self.key)]
        } else {
            self.feeds.iter().map(|f| f.to_string()).collect()
        }
    }

    /// The feed selected by `select(key, index)`.
    pub fn primary_feed(&self) -> String {
        self.feeds
            .first()
            .map(|f| f.to_string())
            .unwrap_or_else(|| format!("{}_entity", self.key))
    }
}

const MEDIARR_SECTIONS: &[SectionSpec] = &[
    SectionSpec::single("plex", false),
    SectionSpec::single("jellyfin", false),
    SectionSpec::single("sonarr", true),
    SectionSpec::single("sonarr2", true),
    SectionSpec::single("radarr", true),
    SectionSpec::single("radarr2", true),
    SectionSpec::family("seer", SEER_FEEDS),
    SectionSpec::family("tmdb", TMDB_FEEDS),
    SectionSpec::single("trakt", false),
];

const EMBY_SECTIONS: &[SectionSpec] = &[
    SectionSpec::single("emby_movies", false),
    SectionSpec::single("emby_series", true),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardVariant {
    #[default]
    Mediarr,
    Emby,
}

impl CardVariant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mediarr" | "mediarr-card" => Some(Self::Mediarr),
            "emby" | "emby-mediarr-card" => Some(Self::Emby),
            _ => None,
        }
    }

    /// Custom element name the host registers the card under.
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Mediarr => "mediarr-card",
            Self::Emby => "emby-mediarr-card",
        }
    }

    pub fn sections(&self) -> &'static [SectionSpec] {
        match self {
            Self::Mediarr => MEDIARR_SECTIONS,
            Self::Emby => EMBY_SECTIONS,
        }
    }

    pub fn section(&self, key: &str) -> Option<&'static SectionSpec> {
        self.sections().iter().find(|s| s.key == key)
    }

    pub fn default_max_items(&self) -> u64 {
        match self {
            Self::Mediarr => 10,
            Self::Emby => 40,
        }
    }

    /// URL fields that get a trailing-slash derived copy.
    pub fn url_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Mediarr => &["plex_url", "jellyfin_url"],
            Self::Emby => &["emby_movies_url", "emby_series_url"],
        }
    }

    /// Map an entity config key to the section that owns it.
    pub fn section_for_entity_key(&self, config_key: &str) -> Option<&'static str> {
        for spec in self.sections() {
            let owns = if spec.is_family() {
                spec.feeds.contains(&config_key)
            } else {
                config_key
                    .strip_suffix("_entity")
                    .is_some_and(|stem| stem == spec.key)
            };
            if owns {
                return Some(spec.key);
            }
        }
        // Catalog feeds added by newer integrations still land in the catalog section.
        if *self == Self::Mediarr
            && config_key.starts_with("tmdb_")
            && config_key.ends_with("_entity")
        {
            return Some("tmdb");
        }
        None
    }

    /// Owning section of a config entry that enables one, i.e. a recognised
    /// entity key holding a non-empty string.
    pub fn enabled_entity_section(&self, config_key: &str, value: &Value) -> Option<&'static str> {
        match value {
            Value::String(id) if !id.is_empty() => self.section_for_entity_key(config_key),
            _ => None,
        }
    }

    /// Short list of accepted entity keys for the setup error.
    pub fn entity_hint(&self) -> &'static str {
        match self {
            Self::Mediarr => "e.g. plex_entity, sonarr_entity, tmdb_entity",
            Self::Emby => "emby_movies_entity or emby_series_entity",
        }
    }

    /// The base map user options are overlaid onto.
    pub fn defaults(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("max_items".into(), json!(self.default_max_items()));
        map.insert("days_to_check".into(), json!(DEFAULT_DAYS_TO_CHECK));
        if *self == Self::Mediarr {
            // Physical releases are excluded unless the user asks for them.
            map.insert("radarr_release_types".into(), json!(["Digital", "Theaters"]));
            map.insert("radarr2_release_types".into(), json!(["Digital", "Theaters"]));
        }
        map
    }

    /// Example configuration offered to the host's card editor.
    pub fn stub_config(&self) -> Map<String, Value> {
        let stub = match self {
            Self::Mediarr => json!({
                "max_items": 10,
                "days_to_check": 60,
                "radarr_release_types": ["Digital", "Theaters"],
                "radarr2_release_types": ["Digital", "Theaters"],
                "tmdb_max_items": 15,
                "seer_max_items": 10,
                "plex_max_items": 10,
                "sonarr_max_items": 10,
                "sonarr_days_to_check": 60,
                "radarr_max_items": 10,
                "radarr_days_to_check": 60,
                "tmdb_entity": "sensor.tmdb_mediarr",
                "tmdb_airing_today_entity": "sensor.tmdb_mediarr_airing_today",
                "tmdb_now_playing_entity": "sensor.tmdb_mediarr_now_playing",
                "tmdb_on_air_entity": "sensor.tmdb_mediarr_on_air",
                "tmdb_upcoming_entity": "sensor.tmdb_mediarr_upcoming",
                "plex_entity": "sensor.plex_mediarr",
                "jellyfin_entity": "sensor.jellyfin_mediarr",
                "sonarr_entity": "sensor.sonarr_mediarr",
                "sonarr_label": "Upcoming Shows",
                "sonarr2_entity": "sensor.sonarr2_mediarr",
                "sonarr2_label": "Sonarr2 Shows",
                "radarr_entity": "sensor.radarr_mediarr",
                "radarr_label": "Upcoming Movies",
                "radarr2_entity": "sensor.radarr2_mediarr",
                "radarr2_label": "Radarr2 Movies",
                "seer_entity": "sensor.seer_mediarr",
                "seer_trending_entity": "sensor.seer_mediarr_trending",
                "seer_discover_entity": "sensor.seer_mediarr_discover",
                "seer_popular_movies_entity": "sensor.seer_mediarr_popular_movies",
                "seer_popular_tv_entity": "sensor.seer_mediarr_popular_tv",
                "trakt_entity": "sensor.trakt_mediarr",
                "media_player_entity": "",
                "opacity": 0.7,
                "blur_radius": 0
            }),
            Self::Emby => json!({
                "max_items": 40,
                "days_to_check": 60,
                "emby_movies_entity": "sensor.emby_movies_mediarr",
                "emby_movies_label": "Emby Movies",
                "emby_series_entity": "sensor.emby_series_mediarr",
                "emby_series_label": "Emby Series",
                "opacity": 0.7,
                "blur_radius": 0
            }),
        };
        match stub {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}
