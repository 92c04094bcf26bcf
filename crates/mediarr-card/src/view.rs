//! CardView: the visible state of one composed card.
//!
//! The composed shell is built once; everything that changes on a refresh or
//! a click lives in plain fields here. `render_html` projects the whole value
//! (plus the selection) to markup without mutating anything.

use std::collections::HashMap;

use mediarr_proto::protocol::{MediaItem, RemoteClient};

use crate::card_config::CardConfig;
use crate::markup;
use crate::now_playing::NowPlayingView;
use crate::registry::SectionRegistry;
use crate::selection::SelectionState;

/// Output of composition: the static shell and the section order it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedRoot {
    pub shell: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientListView {
    /// Discovery in flight; the modal is already visible.
    Awaiting,
    NoClients,
    Clients(Vec<RemoteClient>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientModalView {
    pub visible: bool,
    pub list: ClientListView,
    pub error: Option<String>,
}

impl Default for ClientModalView {
    fn default() -> Self {
        Self {
            visible: false,
            list: ClientListView::Awaiting,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    root: ComposedRoot,
    generation: u64,

    // ── Detail pane ───────────────────────────────────────────────────────────
    pub background: Option<String>,
    pub info_html: String,
    pub play_button_visible: bool,

    // ── Section data ──────────────────────────────────────────────────────────
    /// section key -> feed key -> items as last bound (filtered and capped).
    feeds: HashMap<String, HashMap<String, Vec<MediaItem>>>,

    // ── Overlays ──────────────────────────────────────────────────────────────
    pub now_playing: NowPlayingView,
    pub client_modal: ClientModalView,
}

impl CardView {
    pub fn new(root: ComposedRoot, generation: u64) -> Self {
        Self {
            root,
            generation,
            background: None,
            info_html: String::new(),
            play_button_visible: false,
            feeds: HashMap::new(),
            now_playing: NowPlayingView::default(),
            client_modal: ClientModalView::default(),
        }
    }

    pub fn root(&self) -> &ComposedRoot {
        &self.root
    }

    /// Which composition built this view. Deferred writes compare against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_feed(&mut self, section: &str, feed: &str, items: Vec<MediaItem>) {
        self.feeds
            .entry(section.to_string())
            .or_default()
            .insert(feed.to_string(), items);
    }

    pub fn feed(&self, section: &str, feed: &str) -> Option<&[MediaItem]> {
        self.feeds
            .get(section)
            .and_then(|feeds| feeds.get(feed))
            .map(Vec::as_slice)
    }

    pub fn item(&self, section: &str, feed: &str, index: usize) -> Option<&MediaItem> {
        self.feed(section, feed).and_then(|items| items.get(index))
    }

    /// Show `item` in the detail pane. Returns true when a real background was rendered.
    pub fn show_detail(&mut self, item: &MediaItem, info_html: String, playable: bool) -> bool {
        self.play_button_visible = playable && item.key.is_some();
        if item.is_placeholder() {
            self.info_html.clear();
            return false;
        }
        self.info_html = info_html;
        match item.background_image() {
            Some(url) => {
                self.background = Some(url.to_string());
                true
            }
            None => false,
        }
    }

    pub fn clear_detail(&mut self) {
        self.info_html.clear();
        self.play_button_visible = false;
    }

    /// Full markup for the current state.
    pub fn render_html(
        &self,
        registry: &SectionRegistry,
        selection: &SelectionState,
        config: &CardConfig,
    ) -> String {
        let mut html = self
            .root
            .shell
            .replace(markup::MARK_CLIENT_MODAL, &markup::client_modal(&self.client_modal))
            .replace(markup::MARK_NOW_PLAYING, &markup::now_playing(&self.now_playing))
            .replace(
                markup::MARK_MEDIA_CONTENT,
                &markup::media_content(
                    self.background.as_deref(),
                    &self.info_html,
                    self.play_button_visible,
                ),
            );

        for key in &self.root.sections {
            let Some(section) = registry.get(key) else {
                continue;
            };
            let collapsed = selection.is_collapsed(key);
            html = html
                .replace(&markup::mark_toggle(key), &markup::toggle_icon(collapsed))
                .replace(
                    &markup::mark_content(key),
                    &section.render_content(self, selection, config),
                );
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_view() -> CardView {
        CardView::new(
            ComposedRoot {
                shell: String::new(),
                sections: Vec::new(),
            },
            1,
        )
    }

    #[test]
    fn test_feed_replace_not_append() {
        let mut view = empty_view();
        let item = MediaItem {
            title: Some("A".into()),
            ..Default::default()
        };
        view.set_feed("plex", "plex_entity", vec![item.clone(), item.clone()]);
        view.set_feed("plex", "plex_entity", vec![item]);
        assert_eq!(view.feed("plex", "plex_entity").unwrap().len(), 1);
        assert!(view.item("plex", "plex_entity", 1).is_none());
        assert!(view.feed("plex", "other").is_none());
    }

    #[test]
    fn test_show_detail_placeholder_does_not_count() {
        let mut view = empty_view();
        let placeholder = MediaItem {
            title_default: Some(serde_json::json!("$title")),
            fanart: Some("http://img/f.jpg".into()),
            ..Default::default()
        };
        assert!(!view.show_detail(&placeholder, "<b>x</b>".into(), false));
        assert!(view.info_html.is_empty());
        assert_eq!(view.background, None);
    }

    #[test]
    fn test_show_detail_sets_background_and_play_button() {
        let mut view = empty_view();
        let item = MediaItem {
            title: Some("Dune".into()),
            poster: Some("http://img/p.jpg".into()),
            key: Some("/library/metadata/1".into()),
            ..Default::default()
        };
        assert!(view.show_detail(&item, "info".into(), true));
        assert_eq!(view.background.as_deref(), Some("http://img/p.jpg"));
        assert!(view.play_button_visible);
        assert!(view.show_detail(&item, "info".into(), false));
        assert!(!view.play_button_visible);
    }
}
