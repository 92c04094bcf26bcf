//! StateBinder: pushes one state snapshot into every active section.
//!
//! A bind pass owns nothing between calls: all per-pass bookkeeping lives in
//! the `BindContext` created here, so back-to-back or repeated binds are
//! independent. The composed shell is never touched.

use chrono::NaiveDate;
use mediarr_proto::protocol::StateSnapshot;
use tracing::trace;

use crate::card_config::CardConfig;
use crate::registry::SectionRegistry;
use crate::section::BindContext;
use crate::selection::SelectionState;
use crate::view::CardView;

/// What one pass did; mostly useful for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Number of `update` calls issued (one per present feed).
    pub updates: usize,
    pub fallback_applied: bool,
    pub now_playing_bound: bool,
}

pub fn bind(
    registry: &SectionRegistry,
    config: &CardConfig,
    selection: &SelectionState,
    view: &mut CardView,
    snapshot: &StateSnapshot,
    today: NaiveDate,
) -> BindReport {
    let mut report = BindReport::default();

    if let Some(player_id) = config.media_player_entity() {
        view.now_playing.update(snapshot.get(player_id));
        report.now_playing_bound = true;
    }

    let active = view.root().sections.clone();
    let mut ctx = BindContext {
        config,
        selection,
        view,
        today,
        background_rendered: false,
    };

    for key in &active {
        let Some(section) = registry.get(key) else {
            continue;
        };
        let Some(spec) = registry.variant().section(key) else {
            continue;
        };
        // Each present feed is an independent update on the same plugin.
        for feed in spec.feed_keys() {
            let Some(entity_id) = config.entity(&feed) else {
                continue;
            };
            let Some(entity) = snapshot.get(entity_id) else {
                trace!(section = %key, entity = %entity_id, "entity absent from snapshot");
                continue;
            };
            section.update(&mut ctx, &feed, entity);
            report.updates += 1;
        }
    }

    // A selection whose item is gone must not leave its detail behind.
    if let (Some(key), Some(feed)) = (selection.selected_key(), selection.selected_feed()) {
        if ctx.view.item(key, feed, selection.selected_index()).is_none() {
            ctx.view.clear_detail();
        }
    }

    // Decided once, after every section had the chance to render a selection.
    if !ctx.background_rendered {
        ctx.view.background = Some(config.fallback_image().to_string());
        report.fallback_applied = true;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_config::normalize;
    use crate::variant::{CardVariant, FALLBACK_BACKGROUND};
    use mediarr_proto::protocol::EntityState;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn feed(items: serde_json::Value) -> EntityState {
        EntityState::new("ok").with_attribute("data", items)
    }

    fn setup(raw: serde_json::Value) -> (SectionRegistry, CardConfig, CardView) {
        let config = normalize(&raw, CardVariant::Mediarr).unwrap();
        let registry = SectionRegistry::for_variant(CardVariant::Mediarr);
        let view = CardView::new(registry.compose(&config), 1);
        (registry, config, view)
    }

    #[test]
    fn test_fallback_when_nothing_selected() {
        let (registry, config, mut view) = setup(json!({"plex_entity": "sensor.plex"}));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert("sensor.plex".into(), feed(json!([{"title": "A", "poster": "p.jpg"}])));
        let report = bind(&registry, &config, &SelectionState::new(), &mut view, &snapshot, today());
        assert_eq!(report.updates, 1);
        assert!(report.fallback_applied);
        assert_eq!(view.background.as_deref(), Some(FALLBACK_BACKGROUND));
        assert_eq!(view.feed("plex", "plex_entity").unwrap().len(), 1);
    }

    #[test]
    fn test_selected_section_cancels_fallback() {
        let (registry, config, mut view) = setup(json!({"plex_entity": "sensor.plex"}));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert(
            "sensor.plex".into(),
            feed(json!([{"title": "A", "fanart": "http://img/a.jpg"}])),
        );
        let mut selection = SelectionState::new();
        selection.select("plex", "plex_entity", 0);
        let report = bind(&registry, &config, &selection, &mut view, &snapshot, today());
        assert!(!report.fallback_applied);
        assert_eq!(view.background.as_deref(), Some("http://img/a.jpg"));
        assert!(view.info_html.contains("A"));
    }

    #[test]
    fn test_selected_placeholder_still_falls_back() {
        let (registry, config, mut view) = setup(json!({"plex_entity": "sensor.plex"}));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert(
            "sensor.plex".into(),
            feed(json!([{"title_default": "$title", "fanart": "http://img/none.jpg"}])),
        );
        let mut selection = SelectionState::new();
        selection.select("plex", "plex_entity", 0);
        let report = bind(&registry, &config, &selection, &mut view, &snapshot, today());
        assert!(report.fallback_applied);
        assert_eq!(view.background.as_deref(), Some(FALLBACK_BACKGROUND));
    }

    #[test]
    fn test_configured_but_absent_entity_is_skipped() {
        let (registry, config, mut view) =
            setup(json!({"plex_entity": "sensor.plex", "sonarr_entity": "sensor.sonarr"}));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert("sensor.sonarr".into(), feed(json!([])));
        let report = bind(&registry, &config, &SelectionState::new(), &mut view, &snapshot, today());
        assert_eq!(report.updates, 1);
        assert!(view.feed("plex", "plex_entity").is_none());
    }

    #[test]
    fn test_family_feeds_update_independently() {
        let (registry, config, mut view) = setup(json!({
            "tmdb_entity": "sensor.tmdb",
            "tmdb_upcoming_entity": "sensor.tmdb_upcoming",
            "tmdb_popular_tv_entity": "sensor.missing"
        }));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert("sensor.tmdb".into(), feed(json!([{"title": "T1"}])));
        snapshot.insert("sensor.tmdb_upcoming".into(), feed(json!([{"title": "U1"}, {"title": "U2"}])));
        let report = bind(&registry, &config, &SelectionState::new(), &mut view, &snapshot, today());
        assert_eq!(report.updates, 2);
        assert_eq!(view.feed("tmdb", "tmdb_entity").unwrap().len(), 1);
        assert_eq!(view.feed("tmdb", "tmdb_upcoming_entity").unwrap().len(), 2);
    }

    #[test]
    fn test_shrunk_feed_clears_stale_detail() {
        let (registry, config, mut view) = setup(json!({"plex_entity": "sensor.plex"}));
        let mut selection = SelectionState::new();
        selection.select("plex", "plex_entity", 0);

        let mut snapshot = StateSnapshot::new();
        snapshot.insert(
            "sensor.plex".into(),
            feed(json!([{"title": "Alien", "fanart": "http://img/alien.jpg", "key": "/library/metadata/9"}])),
        );
        bind(&registry, &config, &selection, &mut view, &snapshot, today());
        assert!(view.info_html.contains("Alien"));
        assert!(view.play_button_visible);

        snapshot.insert("sensor.plex".into(), feed(json!([])));
        let report = bind(&registry, &config, &selection, &mut view, &snapshot, today());
        assert!(report.fallback_applied);
        assert_eq!(view.background.as_deref(), Some(FALLBACK_BACKGROUND));
        assert!(view.info_html.is_empty());
        assert!(!view.play_button_visible);
    }

    #[test]
    fn test_selection_into_unbound_feed_clears_detail() {
        let (registry, config, mut view) = setup(json!({"plex_entity": "sensor.plex"}));
        view.info_html = "<h2>Stale</h2>".into();
        view.play_button_visible = true;
        let mut selection = SelectionState::new();
        selection.select("plex", "plex_entity", 0);

        let report = bind(&registry, &config, &selection, &mut view, &StateSnapshot::new(), today());
        assert_eq!(report.updates, 0);
        assert!(view.info_html.is_empty());
        assert!(!view.play_button_visible);
    }

    #[test]
    fn test_now_playing_bound_regardless_of_sections() {
        let (registry, config, mut view) =
            setup(json!({"plex_entity": "sensor.plex", "media_player_entity": "media_player.tv"}));
        let mut snapshot = StateSnapshot::new();
        snapshot.insert(
            "media_player.tv".into(),
            EntityState::new("playing").with_attribute("media_title", json!("Heat")),
        );
        let report = bind(&registry, &config, &SelectionState::new(), &mut view, &snapshot, today());
        assert!(report.now_playing_bound);
        assert_eq!(report.updates, 0);
        assert!(view.now_playing.visible);
        assert_eq!(view.now_playing.title, "Heat");
    }
}
