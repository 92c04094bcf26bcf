//! Trakt popular/trending section.

use mediarr_proto::protocol::MediaItem;

use crate::section::Section;
use crate::sections::{joined, summary, title_line};
use crate::variant::SectionSpec;

pub struct TraktSection {
    spec: &'static SectionSpec,
}

impl TraktSection {
    pub fn new(spec: &'static SectionSpec) -> Self {
        Self { spec }
    }
}

impl Section for TraktSection {
    fn spec(&self) -> &SectionSpec {
        self.spec
    }

    fn default_label(&self) -> &str {
        "Trakt Popular"
    }

    fn icon(&self) -> &str {
        "mdi:trending-up"
    }

    fn info_html(&self, item: &MediaItem) -> String {
        let kind = item.kind.as_deref().map(|k| match k {
            "show" | "tv" => "TV Show".to_string(),
            "movie" => "Movie".to_string(),
            other => other.to_string(),
        });
        let rating = item.rating.clone().map(|r| format!("⭐ {r}"));
        let details = joined(&[kind, item.genres.clone(), rating], " | ");
        format!(
            r#"{title}<div class="details">{details}</div>{summary}"#,
            title = title_line(item),
            summary = summary(item),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::CardVariant;

    fn info(kind: &str) -> String {
        let section = TraktSection::new(CardVariant::Mediarr.section("trakt").unwrap());
        section.info_html(&MediaItem {
            title: Some("Severance".into()),
            kind: Some(kind.into()),
            genres: Some("Drama".into()),
            rating: Some("8.7".into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_kind_names() {
        assert!(info("show").contains(r#"<div class="details">TV Show | Drama | ⭐ 8.7</div>"#));
        assert!(info("tv").contains(">TV Show | "));
        assert!(info("movie").contains(">Movie | "));
        assert!(info("anime").contains(">anime | "));
    }
}
