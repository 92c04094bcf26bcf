//! Recently-added library sections (Plex, Jellyfin, Emby).

use mediarr_proto::protocol::MediaItem;

use crate::section::Section;
use crate::sections::{joined, runtime_text, summary, title_line};
use crate::variant::SectionSpec;

pub struct LibrarySection {
    spec: &'static SectionSpec,
    label: &'static str,
    icon: &'static str,
    playable: bool,
}

impl LibrarySection {
    pub fn new(spec: &'static SectionSpec, label: &'static str, icon: &'static str) -> Self {
        Self {
            spec,
            label,
            icon,
            playable: false,
        }
    }

    /// Items of this library can be dispatched to a remote client.
    pub fn playable(mut self) -> Self {
        self.playable = true;
        self
    }
}

impl Section for LibrarySection {
    fn spec(&self) -> &SectionSpec {
        self.spec
    }

    fn default_label(&self) -> &str {
        self.label
    }

    fn icon(&self) -> &str {
        self.icon
    }

    fn supports_playback(&self) -> bool {
        self.playable
    }

    fn info_html(&self, item: &MediaItem) -> String {
        let details = joined(&[item.genres.clone(), item.studio.clone()], " | ");
        let runtime = runtime_text(item).map(|r| format!("⏱️ {r}"));
        let rating = item.rating.clone().map(|r| format!("⭐ {r}"));
        let metadata = joined(&[runtime, rating], " | ");
        format!(
            r#"{title}<div class="details">{details}</div><div class="metadata">{metadata}</div>{summary}"#,
            title = title_line(item),
            summary = summary(item),
        )
    }
}
