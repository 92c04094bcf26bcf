//! Upcoming calendar sections (Sonarr, Radarr and their second instances).
//!
//! Items carrying a parseable date beyond `{key}_days_to_check` days are
//! dropped; movie sections additionally honour `{key}_release_types`.

use chrono::NaiveDate;
use mediarr_proto::protocol::MediaItem;

use crate::markup::escape;
use crate::section::{BindContext, Section};
use crate::sections::{joined, runtime_text, summary, title_line};
use crate::variant::SectionSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcomingKind {
    Series,
    Movies,
}

pub struct UpcomingSection {
    spec: &'static SectionSpec,
    label: &'static str,
    kind: UpcomingKind,
}

impl UpcomingSection {
    pub fn new(spec: &'static SectionSpec, label: &'static str, kind: UpcomingKind) -> Self {
        Self { spec, label, kind }
    }
}

/// Leading `YYYY-MM-DD` of a date or timestamp string.
pub fn parse_item_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

/// Items without a parseable date are always inside the window.
pub fn within_window(item: &MediaItem, today: NaiveDate, days: i64) -> bool {
    match item.date_text().and_then(parse_item_date) {
        Some(date) => (date - today).num_days() <= days,
        None => true,
    }
}

impl Section for UpcomingSection {
    fn spec(&self) -> &SectionSpec {
        self.spec
    }

    fn default_label(&self) -> &str {
        self.label
    }

    fn icon(&self) -> &str {
        match self.kind {
            UpcomingKind::Series => "mdi:television-classic",
            UpcomingKind::Movies => "mdi:movie-open",
        }
    }

    fn empty_message(&self) -> &str {
        match self.kind {
            UpcomingKind::Series => "No upcoming episodes",
            UpcomingKind::Movies => "No upcoming movies",
        }
    }

    fn filter_items(&self, ctx: &BindContext<'_>, items: Vec<MediaItem>) -> Vec<MediaItem> {
        let key = self.key();
        let days = ctx.config.days_to_check(key);
        let release_types = match self.kind {
            UpcomingKind::Movies => ctx.config.release_types(key),
            UpcomingKind::Series => None,
        };
        items
            .into_iter()
            .filter(|item| item.is_placeholder() || within_window(item, ctx.today, days))
            .filter(|item| match (&release_types, item.release_type.as_deref()) {
                (Some(allowed), Some(kind)) => allowed.iter().any(|a| a.eq_ignore_ascii_case(kind)),
                _ => true,
            })
            .take(ctx.config.max_items(key))
            .collect()
    }

    fn info_html(&self, item: &MediaItem) -> String {
        match self.kind {
            UpcomingKind::Series => {
                let episode = joined(&[item.number.clone(), item.episode.clone()], " - ");
                let airs = item
                    .date_text()
                    .map(|d| format!("Airs {}", escape(d)))
                    .unwrap_or_default();
                format!(
                    r#"{title}<div class="details">{episode}</div><div class="metadata">{airs}</div>{summary}"#,
                    title = title_line(item),
                    summary = summary(item),
                )
            }
            UpcomingKind::Movies => {
                let release = joined(
                    &[item.release_type.clone(), item.date_text().map(str::to_string)],
                    ": ",
                );
                let runtime = runtime_text(item).map(|r| format!("⏱️ {r}"));
                let rating = item.rating.clone().map(|r| format!("⭐ {r}"));
                let metadata = joined(&[runtime, rating], " | ");
                format!(
                    r#"{title}<div class="details">{release}</div><div class="metadata">{metadata}</div>{summary}"#,
                    title = title_line(item),
                    summary = summary(item),
                )
            }
        }
    }

    fn render_item(&self, feed: &str, index: usize, item: &MediaItem, selected: bool) -> String {
        if item.is_placeholder() {
            return format!(
                r#"<div class="empty-section-content"><div class="empty-message">{}</div></div>"#,
                escape(self.empty_message())
            );
        }
        let selected = if selected { " selected" } else { "" };
        let title = escape(item.title_text());
        let date = item.date_text().map(escape).unwrap_or_default();
        format!(
            r#"<div class="media-item{selected}" data-type="{key}" data-feed="{feed}" data-index="{index}"><img src="{poster}" alt="{title}"><div class="media-item-title">{title}</div><div class="media-item-footer">{date}</div></div>"#,
            key = escape(self.key()),
            feed = escape(feed),
            poster = escape(item.poster.as_deref().unwrap_or("")),
        )
    }
}
