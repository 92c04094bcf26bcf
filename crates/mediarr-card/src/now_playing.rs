//! Now-playing overlay bound to the configured media player entity.

use mediarr_proto::protocol::EntityState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlayingView {
    pub visible: bool,
    pub title: String,
    pub subtitle: String,
    /// Width of the progress fill, 0..=100 for well-formed players.
    pub progress_percent: f64,
    pub background: Option<String>,
}

impl NowPlayingView {
    /// Project the player state onto the overlay. Absent or inactive players hide it;
    /// every attribute defaults on its own, so partial players never fail.
    pub fn update(&mut self, player: Option<&EntityState>) {
        let Some(player) = player.filter(|p| !p.is_inactive_player()) else {
            self.visible = false;
            return;
        };

        self.visible = true;
        self.title = player.attr_text("media_title").unwrap_or_default();
        self.subtitle = player.attr_text("media_series_title").unwrap_or_default();

        // Keep the previous width when the duration is unknown or zero.
        if let (Some(position), Some(duration)) = (
            player.attr_f64("media_position"),
            player.attr_f64("media_duration"),
        ) {
            if duration > 0.0 {
                self.progress_percent = position / duration * 100.0;
            }
        }

        if let Some(picture) = player.attr_text("entity_picture") {
            self.background = Some(picture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn playing() -> EntityState {
        EntityState::new("playing")
            .with_attribute("media_title", json!("Pilot"))
            .with_attribute("media_series_title", json!("Severance"))
            .with_attribute("media_position", json!(30))
            .with_attribute("media_duration", json!(120))
            .with_attribute("entity_picture", json!("/api/media_player_proxy/tv"))
    }

    #[test]
    fn test_hidden_for_inactive_states() {
        for state in ["idle", "off", "unavailable"] {
            let mut view = NowPlayingView {
                visible: true,
                ..Default::default()
            };
            view.update(Some(&EntityState::new(state)));
            assert!(!view.visible, "{state} should hide the overlay");
        }
        let mut view = NowPlayingView::default();
        view.update(None);
        assert!(!view.visible);
    }

    #[test]
    fn test_shows_title_progress_and_picture() {
        let mut view = NowPlayingView::default();
        view.update(Some(&playing()));
        assert!(view.visible);
        assert_eq!(view.title, "Pilot");
        assert_eq!(view.subtitle, "Severance");
        assert_eq!(view.progress_percent, 25.0);
        assert_eq!(view.background.as_deref(), Some("/api/media_player_proxy/tv"));
    }

    #[test]
    fn test_zero_duration_keeps_previous_progress() {
        let mut view = NowPlayingView::default();
        view.update(Some(&playing()));
        let paused = playing().with_attribute("media_duration", json!(0));
        view.update(Some(&paused));
        assert_eq!(view.progress_percent, 25.0);
    }

    #[test]
    fn test_partial_attributes_default_independently() {
        let mut view = NowPlayingView::default();
        view.update(Some(&EntityState::new("paused").with_attribute("media_title", json!("Solo"))));
        assert!(view.visible);
        assert_eq!(view.title, "Solo");
        assert_eq!(view.subtitle, "");
        assert_eq!(view.progress_percent, 0.0);
        assert_eq!(view.background, None);
    }
}
