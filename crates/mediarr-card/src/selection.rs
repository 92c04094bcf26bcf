//! SelectionState: which section/item drives the detail pane, and which
//! sections are collapsed.
//!
//! This is the source of truth for both; the rendered markup only projects it.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected_key: Option<String>,
    /// Feed (entity config key) inside the selected section.
    selected_feed: Option<String>,
    selected_index: usize,

    /// Sections currently collapsed to their header.
    collapsed: HashSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected_key.as_deref()
    }

    pub fn selected_feed(&self) -> Option<&str> {
        self.selected_feed.as_deref()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn has_selection(&self) -> bool {
        self.selected_key.is_some()
    }

    pub fn select(&mut self, key: &str, feed: &str, index: usize) {
        self.selected_key = Some(key.to_string());
        self.selected_feed = Some(feed.to_string());
        self.selected_index = index;
    }

    pub fn clear(&mut self) {
        self.selected_key = None;
        self.selected_feed = None;
        self.selected_index = 0;
    }

    /// True when `index` of `feed` in section `key` is the selected item.
    pub fn is_selected(&self, key: &str, feed: &str, index: usize) -> bool {
        self.is_selected_feed(key, feed) && self.selected_index == index
    }

    pub fn is_selected_feed(&self, key: &str, feed: &str) -> bool {
        self.selected_key.as_deref() == Some(key) && self.selected_feed.as_deref() == Some(feed)
    }

    /// Flip `key` between collapsed and expanded. Returns the new collapsed state.
    pub fn toggle_section(&mut self, key: &str) -> bool {
        if self.collapsed.remove(key) {
            false
        } else {
            self.collapsed.insert(key.to_string());
            true
        }
    }

    pub fn is_collapsed(&self, key: &str) -> bool {
        self.collapsed.contains(key)
    }

    pub fn collapsed(&self) -> impl Iterator<Item = &str> {
        self.collapsed.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let mut sel = SelectionState::new();
        assert!(sel.toggle_section("sonarr"));
        assert!(sel.is_collapsed("sonarr"));
        assert!(!sel.toggle_section("sonarr"));
        assert!(!sel.is_collapsed("sonarr"));
    }

    #[test]
    fn test_toggle_does_not_touch_selection() {
        let mut sel = SelectionState::new();
        sel.select("plex", "plex_entity", 2);
        sel.toggle_section("plex");
        assert_eq!(sel.selected_key(), Some("plex"));
        assert_eq!(sel.selected_index(), 2);
    }

    #[test]
    fn test_is_selected_matches_feed() {
        let mut sel = SelectionState::new();
        sel.select("tmdb", "tmdb_upcoming_entity", 1);
        assert!(sel.is_selected("tmdb", "tmdb_upcoming_entity", 1));
        assert!(!sel.is_selected("tmdb", "tmdb_entity", 1));
        assert!(!sel.is_selected("tmdb", "tmdb_upcoming_entity", 0));
        sel.clear();
        assert!(!sel.has_selection());
    }
}
