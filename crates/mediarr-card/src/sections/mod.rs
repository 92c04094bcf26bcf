//! Section plugins, one struct per source family.

pub mod catalog;
pub mod library;
pub mod requests;
pub mod trakt;
pub mod upcoming;

use std::sync::Arc;

use mediarr_proto::protocol::MediaItem;

use crate::markup::escape;
use crate::section::Section;
use crate::variant::SectionSpec;

use self::catalog::CatalogSection;
use self::library::LibrarySection;
use self::requests::RequestSection;
use self::trakt::TraktSection;
use self::upcoming::{UpcomingKind, UpcomingSection};

/// Build the plugin for a catalog slot. Unknown keys have no plugin.
pub fn build(spec: &'static SectionSpec) -> Option<Arc<dyn Section>> {
    let section: Arc<dyn Section> = match spec.key {
        "plex" => Arc::new(LibrarySection::new(spec, "Plex Recently Added", "mdi:plex").playable()),
        "jellyfin" => Arc::new(LibrarySection::new(spec, "Jellyfin Recently Added", "mdi:jellyfish")),
        "emby_movies" => Arc::new(LibrarySection::new(spec, "Emby Movies", "mdi:movie")),
        "emby_series" => Arc::new(LibrarySection::new(spec, "Emby Series", "mdi:television")),
        "sonarr" => Arc::new(UpcomingSection::new(spec, "Upcoming Shows", UpcomingKind::Series)),
        "sonarr2" => Arc::new(UpcomingSection::new(spec, "Sonarr2 Shows", UpcomingKind::Series)),
        "radarr" => Arc::new(UpcomingSection::new(spec, "Upcoming Movies", UpcomingKind::Movies)),
        "radarr2" => Arc::new(UpcomingSection::new(spec, "Radarr2 Movies", UpcomingKind::Movies)),
        "seer" => Arc::new(RequestSection::new(spec)),
        "tmdb" => Arc::new(CatalogSection::new(spec)),
        "trakt" => Arc::new(TraktSection::new(spec)),
        _ => return None,
    };
    Some(section)
}

/// `Title (Year)` heading used by most detail panes.
pub(crate) fn title_line(item: &MediaItem) -> String {
    let title = escape(item.title_text());
    match item.release.as_deref() {
        Some(year) => format!(r#"<div class="title">{title} ({})</div>"#, escape(year)),
        None => format!(r#"<div class="title">{title}</div>"#),
    }
}

/// Join the non-empty parts with `sep`.
pub(crate) fn joined(parts: &[Option<String>], sep: &str) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(|p| escape(p))
        .collect::<Vec<_>>()
        .join(sep)
}

pub(crate) fn summary(item: &MediaItem) -> String {
    format!(
        r#"<div class="summary">{}</div>"#,
        escape(item.summary.as_deref().unwrap_or("No description available."))
    )
}

pub(crate) fn runtime_text(item: &MediaItem) -> Option<String> {
    item.runtime
        .filter(|r| *r > 0.0)
        .map(|r| format!("{} min", r.round() as i64))
}
