//! CardEvent: every user interaction the card reacts to.
//!
//! The host turns clicks into events; `MediarrCard::handle_event` applies them.
//! Events cross the host boundary as JSON tagged by `type`.

use serde::{Deserialize, Serialize};

/// All interactions that can flow into a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardEvent {
    // ── Sections ─────────────────────────────────────────────────────────────
    /// Click on a section header.
    ToggleSection { section: String },
    /// Click on a media item.
    Select {
        section: String,
        feed: String,
        index: usize,
    },

    // ── Remote playback ──────────────────────────────────────────────────────
    PlayPressed,
    ChooseClient { client_id: String }, // machine identifier
    CloseClientModal,
}

impl CardEvent {
    /// Build an event from the `data-*` attributes of a clicked media item.
    pub fn item_click(section: &str, feed: &str, index: usize) -> Self {
        Self::Select {
            section: section.to_string(),
            feed: feed.to_string(),
            index,
        }
    }
}
