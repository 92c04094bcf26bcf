//! MediarrCard: the owned state of one card instance.
//!
//! Lifecycle:
//! 1. `new` normalizes the configuration (fatal on error).
//! 2. The first `set_state` composes the shell, binds, and bootstraps the
//!    initial selection.
//! 3. Every later `set_state` only binds.
//! 4. `handle_event` applies clicks; remote playback returns a
//!    [`PlaybackEffect`] the host runs and feeds back through `apply_outcome`.

use chrono::{Local, NaiveDate};
use mediarr_proto::protocol::StateSnapshot;
use serde_json::Value;
use tracing::{debug, info};

use crate::binder::{self, BindReport};
use crate::card_config::{self, CardConfig};
use crate::error::ConfigError;
use crate::event::CardEvent;
use crate::playback::{PlaybackController, PlaybackEffect, PlaybackOutcome, PlaybackPhase, PlexClient};
use crate::registry::SectionRegistry;
use crate::selection::SelectionState;
use crate::variant::CardVariant;
use crate::view::CardView;

pub struct MediarrCard {
    config: CardConfig,
    registry: SectionRegistry,
    selection: SelectionState,
    playback: PlaybackController,
    view: Option<CardView>,
    /// Compositions so far; the live view carries the latest.
    builds: u64,
}

impl MediarrCard {
    pub fn new(raw: &Value, variant: CardVariant) -> Result<Self, ConfigError> {
        let config = card_config::normalize(raw, variant)?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: CardConfig) -> Self {
        let registry = SectionRegistry::for_variant(config.variant());
        Self {
            config,
            registry,
            selection: SelectionState::new(),
            playback: PlaybackController::new(),
            view: None,
            builds: 0,
        }
    }

    /// Replace the configuration. The view is dropped and rebuilt on the next
    /// `set_state`; results of in-flight playback requests are discarded.
    pub fn set_config(&mut self, raw: &Value) -> Result<(), ConfigError> {
        let config = card_config::normalize(raw, self.config.variant())?;
        self.config = config;
        self.view = None;
        self.selection.clear();
        self.playback.reset();
        Ok(())
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn view(&self) -> Option<&CardView> {
        self.view.as_ref()
    }

    pub fn playback_phase(&self) -> PlaybackPhase {
        self.playback.phase()
    }

    /// Bind a fresh snapshot, using the local date for day windows.
    pub fn set_state(&mut self, snapshot: &StateSnapshot) -> BindReport {
        self.set_state_at(snapshot, Local::now().date_naive())
    }

    pub fn set_state_at(&mut self, snapshot: &StateSnapshot, today: NaiveDate) -> BindReport {
        let first_build = self.view.is_none();
        let view = self.view.get_or_insert_with(|| {
            self.builds += 1;
            CardView::new(self.registry.compose(&self.config), self.builds)
        });

        let mut report = binder::bind(
            &self.registry,
            &self.config,
            &self.selection,
            view,
            snapshot,
            today,
        );

        if first_build {
            info!(
                generation = self.builds,
                sections = ?view.root().sections,
                "card initialized"
            );
            if self.bootstrap_selection() {
                report.fallback_applied = false;
            }
        }
        report
    }

    /// Select the first item of the first active section, if it has one.
    /// Returns true when the selection rendered a background.
    fn bootstrap_selection(&mut self) -> bool {
        let Some(view) = self.view.as_ref() else {
            return false;
        };
        let Some(key) = view.root().sections.first() else {
            return false;
        };
        let Some(spec) = self.registry.variant().section(key) else {
            return false;
        };
        let Some(feed) = spec
            .feed_keys()
            .into_iter()
            .find(|feed| view.item(key, feed, 0).is_some())
        else {
            return false;
        };
        let key = key.clone();
        debug!(section = %key, feed = %feed, "initial selection");
        self.selection.select(&key, &feed, 0);
        self.refresh_detail()
    }

    /// Re-render the detail pane for the current selection.
    fn refresh_detail(&mut self) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let (Some(key), Some(feed)) = (self.selection.selected_key(), self.selection.selected_feed())
        else {
            view.clear_detail();
            return false;
        };
        let Some(section) = self.registry.get(key) else {
            view.clear_detail();
            return false;
        };
        match view.item(key, feed, self.selection.selected_index()).cloned() {
            Some(item) => section.update_info(view, &item),
            None => {
                view.clear_detail();
                false
            }
        }
    }

    pub fn toggle_section(&mut self, key: &str) -> bool {
        self.selection.toggle_section(key)
    }

    /// Select within the section's primary feed.
    pub fn select(&mut self, key: &str, index: usize) -> bool {
        let Some(spec) = self.registry.variant().section(key) else {
            return false;
        };
        let feed = spec.primary_feed();
        self.select_feed(key, &feed, index)
    }

    /// Select within an explicit feed. The selection moves even when the
    /// item is missing; the detail pane is then cleared.
    pub fn select_feed(&mut self, key: &str, feed: &str, index: usize) -> bool {
        let Some(spec) = self.registry.variant().section(key) else {
            debug!(section = %key, "select on unknown section");
            return false;
        };
        if !spec.feed_keys().iter().any(|f| f == feed) {
            debug!(section = %key, feed = %feed, "select on unknown feed");
            return false;
        }
        self.selection.select(key, feed, index);
        self.refresh_detail();
        true
    }

    pub fn handle_event(&mut self, event: CardEvent) -> Option<PlaybackEffect> {
        debug!(?event, "card event");
        match event {
            CardEvent::ToggleSection { section } => {
                self.toggle_section(&section);
                None
            }
            CardEvent::Select {
                section,
                feed,
                index,
            } => {
                self.select_feed(&section, &feed, index);
                None
            }
            CardEvent::PlayPressed => self.open_client_selector().map(PlaybackEffect::Discover),
            CardEvent::ChooseClient { client_id } => {
                let view = self.view.as_mut()?;
                let generation = view.generation();
                self.playback
                    .choose_client(&client_id, &mut view.client_modal, generation)
                    .map(PlaybackEffect::Dispatch)
            }
            CardEvent::CloseClientModal => {
                if let Some(view) = self.view.as_mut() {
                    self.playback.close(&mut view.client_modal);
                } else {
                    self.playback.reset();
                }
                None
            }
        }
    }

    fn open_client_selector(&mut self) -> Option<crate::playback::DiscoveryTicket> {
        let view = self.view.as_mut()?;
        let key = self.selection.selected_key()?;
        let playable = self
            .registry
            .get(key)
            .is_some_and(|section| section.supports_playback());
        if !playable {
            debug!(section = %key, "play pressed outside a playable section");
            return None;
        }
        let feed = self.selection.selected_feed()?;
        let item = view.item(key, feed, self.selection.selected_index()).cloned();
        let generation = view.generation();
        self.playback
            .open(&self.config, item.as_ref(), &mut view.client_modal, generation)
    }

    /// Feed a finished network round-trip back in. Returns false when the
    /// result was stale and ignored.
    pub fn apply_outcome(&mut self, outcome: PlaybackOutcome) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let generation = view.generation();
        match outcome {
            PlaybackOutcome::Discovered(ticket, clients) => {
                self.playback
                    .on_clients_discovered(&ticket, clients, &mut view.client_modal, generation)
            }
            PlaybackOutcome::Dispatched(ticket, result) => {
                self.playback
                    .on_dispatch_finished(&ticket, result, &mut view.client_modal, generation)
            }
        }
    }

    /// Apply `event` and, when it needs the network, run the request and
    /// apply its result before returning.
    pub async fn dispatch(&mut self, client: &PlexClient, event: CardEvent) -> bool {
        let Some(effect) = self.handle_event(event) else {
            return false;
        };
        let outcome = effect.run(client).await;
        self.apply_outcome(outcome)
    }

    /// Full markup for the current state; `None` before the first snapshot.
    pub fn render_html(&self) -> Option<String> {
        self.view
            .as_ref()
            .map(|view| view.render_html(&self.registry, &self.selection, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::FALLBACK_BACKGROUND;
    use mediarr_proto::protocol::EntityState;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn snapshot() -> StateSnapshot {
        let mut s = StateSnapshot::new();
        s.insert(
            "sensor.plex".into(),
            EntityState::new("ok").with_attribute(
                "data",
                json!([
                    {"title": "Alien", "fanart": "http://img/alien.jpg", "key": "/library/metadata/1"},
                    {"title": "Heat", "poster": "http://img/heat.jpg"}
                ]),
            ),
        );
        s.insert(
            "sensor.trakt".into(),
            EntityState::new("ok")
                .with_attribute("data", json!([{"title": "Dark", "type": "show"}])),
        );
        s
    }

    fn card() -> MediarrCard {
        MediarrCard::new(
            &json!({
                "plex_entity": "sensor.plex",
                "trakt_entity": "sensor.trakt",
                "plex_url": "http://plex:32400",
                "plex_token": "t"
            }),
            CardVariant::Mediarr,
        )
        .unwrap()
    }

    #[test]
    fn test_first_state_bootstraps_selection() {
        let mut card = card();
        assert!(card.render_html().is_none());
        let report = card.set_state_at(&snapshot(), today());
        assert!(!report.fallback_applied);
        assert_eq!(card.selection().selected_key(), Some("plex"));
        let view = card.view().unwrap();
        assert_eq!(view.generation(), 1);
        assert_eq!(view.background.as_deref(), Some("http://img/alien.jpg"));
        assert!(view.play_button_visible);
    }

    #[test]
    fn test_rebind_is_idempotent() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        let before = card.view().unwrap().clone();
        let html = card.render_html();
        card.set_state_at(&snapshot(), today());
        assert_eq!(card.view().unwrap(), &before);
        assert_eq!(card.view().unwrap().generation(), 1);
        assert_eq!(card.render_html(), html);
    }

    #[test]
    fn test_select_missing_item_clears_info() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        assert!(card.select("trakt", 5));
        assert_eq!(card.selection().selected_key(), Some("trakt"));
        assert_eq!(card.selection().selected_index(), 5);
        let view = card.view().unwrap();
        assert!(view.info_html.is_empty());
        assert!(!view.play_button_visible);
    }

    #[test]
    fn test_select_non_playable_hides_play_button() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        card.handle_event(CardEvent::item_click("trakt", "trakt_entity", 0));
        let view = card.view().unwrap();
        assert!(view.info_html.contains("Dark"));
        assert!(!view.play_button_visible);
        assert!(card.handle_event(CardEvent::PlayPressed).is_none());
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        assert!(!card.select("sonarr9", 0));
        assert!(!card.select_feed("plex", "tmdb_entity", 0));
        assert_eq!(card.selection().selected_key(), Some("plex"));
    }

    #[test]
    fn test_no_selection_falls_back() {
        let mut card = MediarrCard::new(&json!({"trakt_entity": "sensor.none"}), CardVariant::Mediarr)
            .unwrap();
        let report = card.set_state_at(&snapshot(), today());
        assert!(report.fallback_applied);
        assert!(!card.selection().has_selection());
        assert_eq!(card.view().unwrap().background.as_deref(), Some(FALLBACK_BACKGROUND));
    }

    #[test]
    fn test_play_pressed_opens_modal() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        let effect = card.handle_event(CardEvent::PlayPressed).unwrap();
        let PlaybackEffect::Discover(ticket) = effect else {
            panic!("expected discovery");
        };
        assert_eq!(ticket.media_key, "/library/metadata/1");
        assert_eq!(card.playback_phase(), PlaybackPhase::Discovering);
        assert!(card.view().unwrap().client_modal.visible);
        assert!(card.render_html().unwrap().contains("Searching for clients"));
    }

    #[test]
    fn test_set_config_discards_in_flight_discovery() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        let Some(PlaybackEffect::Discover(ticket)) = card.handle_event(CardEvent::PlayPressed) else {
            panic!("expected discovery");
        };
        card.set_config(&json!({"plex_entity": "sensor.plex"})).unwrap();
        card.set_state_at(&snapshot(), today());
        assert_eq!(card.view().unwrap().generation(), 2);
        assert!(!card.apply_outcome(PlaybackOutcome::Discovered(ticket, Vec::new())));
        assert!(!card.view().unwrap().client_modal.visible);
    }

    #[test]
    fn test_toggle_keeps_updates_flowing() {
        let mut card = card();
        card.set_state_at(&snapshot(), today());
        assert!(card.toggle_section("trakt"));
        let mut next = snapshot();
        next.insert(
            "sensor.trakt".into(),
            EntityState::new("ok").with_attribute("data", json!([{"title": "Dark"}, {"title": "Ozark"}])),
        );
        card.set_state_at(&next, today());
        assert_eq!(card.view().unwrap().feed("trakt", "trakt_entity").unwrap().len(), 2);
        assert!(card.render_html().unwrap().contains(r#"section-content collapsed" data-content="trakt""#));
    }
}
