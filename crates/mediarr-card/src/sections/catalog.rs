//! TMDB catalog section: trending, airing, upcoming and popular feeds rendered
//! as labelled sub-lists of one section.

use mediarr_proto::protocol::MediaItem;

use crate::section::Section;
use crate::sections::{joined, summary, title_line};
use crate::variant::SectionSpec;

pub struct CatalogSection {
    spec: &'static SectionSpec,
}

impl CatalogSection {
    pub fn new(spec: &'static SectionSpec) -> Self {
        Self { spec }
    }
}

impl Section for CatalogSection {
    fn spec(&self) -> &SectionSpec {
        self.spec
    }

    fn default_label(&self) -> &str {
        "TMDB"
    }

    fn icon(&self) -> &str {
        "mdi:movie-roll"
    }

    fn empty_message(&self) -> &str {
        "Nothing to show"
    }

    fn feed_label(&self, feed: &str) -> Option<&str> {
        match feed {
            "tmdb_entity" => Some("Trending"),
            "tmdb_airing_today_entity" => Some("Airing Today"),
            "tmdb_now_playing_entity" => Some("Now Playing"),
            "tmdb_on_air_entity" => Some("On Air"),
            "tmdb_upcoming_entity" => Some("Upcoming"),
            "tmdb_popular_movies_entity" => Some("Popular Movies"),
            "tmdb_popular_tv_entity" => Some("Popular TV"),
            _ => None,
        }
    }

    fn info_html(&self, item: &MediaItem) -> String {
        let rating = item.rating.clone().map(|r| format!("⭐ {r}"));
        let details = joined(&[item.genres.clone(), rating], " | ");
        format!(
            r#"{title}<div class="details">{details}</div>{summary}"#,
            title = title_line(item),
            summary = summary(item),
        )
    }
}
