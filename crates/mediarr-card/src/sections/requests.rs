//! Request-queue section (Overseerr/Jellyseerr). Five feeds share one section.

use mediarr_proto::protocol::MediaItem;

use crate::section::Section;
use crate::sections::{joined, summary, title_line};
use crate::variant::SectionSpec;

pub struct RequestSection {
    spec: &'static SectionSpec,
}

impl RequestSection {
    pub fn new(spec: &'static SectionSpec) -> Self {
        Self { spec }
    }
}

impl Section for RequestSection {
    fn spec(&self) -> &SectionSpec {
        self.spec
    }

    fn default_label(&self) -> &str {
        "Media Requests"
    }

    fn icon(&self) -> &str {
        "mdi:movie-search"
    }

    fn empty_message(&self) -> &str {
        "No pending requests"
    }

    fn feed_label(&self, feed: &str) -> Option<&str> {
        match feed {
            "seer_entity" => Some("Requests"),
            "seer_trending_entity" => Some("Trending"),
            "seer_discover_entity" => Some("Discover"),
            "seer_popular_movies_entity" => Some("Popular Movies"),
            "seer_popular_tv_entity" => Some("Popular TV"),
            _ => None,
        }
    }

    fn info_html(&self, item: &MediaItem) -> String {
        let requested = item.requested_by.clone().map(|r| format!("Requested by {r}"));
        let details = joined(&[item.kind.clone(), requested], " | ");
        let status = joined(&[item.status.clone()], "");
        format!(
            r#"{title}<div class="details">{details}</div><div class="metadata">{status}</div>{summary}"#,
            title = title_line(item),
            summary = summary(item),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::CardVariant;

    #[test]
    fn test_request_info() {
        let section = RequestSection::new(CardVariant::Mediarr.section("seer").unwrap());
        let item = MediaItem {
            title: Some("Shogun".into()),
            kind: Some("tv".into()),
            requested_by: Some("alex".into()),
            status: Some("Pending".into()),
            ..Default::default()
        };
        let html = section.info_html(&item);
        assert!(html.contains("tv | Requested by alex"));
        assert!(html.contains(r#"<div class="metadata">Pending</div>"#));
        assert_eq!(section.feed_label("seer_trending_entity"), Some("Trending"));
    }
}
