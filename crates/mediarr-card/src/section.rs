//! Section trait: the interface every media-source plugin implements.
//!
//! Design principles:
//! - Sections are stateless: everything they render comes from the config,
//!   the bound entity state, or the `CardView` they are handed.
//! - One instance per key, shared through `Arc`, safe to call from any bind pass.
//! - `update` replaces the feed's slot in the view; it never appends, so a
//!   repeated bind with the same snapshot leaves the view unchanged.
//! - Selection is read, never written; only the card owner moves it.

use chrono::NaiveDate;
use mediarr_proto::protocol::{EntityState, MediaItem};

use crate::card_config::CardConfig;
use crate::markup::{self, escape};
use crate::selection::SelectionState;
use crate::variant::SectionSpec;
use crate::view::CardView;

/// Everything a section may read or write during one bind pass.
pub struct BindContext<'a> {
    pub config: &'a CardConfig,
    pub selection: &'a SelectionState,
    pub view: &'a mut CardView,
    /// Reference date for day windows.
    pub today: NaiveDate,
    /// Set when a section rendered a non-placeholder background this pass.
    pub background_rendered: bool,
}

/// The trait every source family implements.
pub trait Section: Send + Sync {
    /// Static slot description (key and feeds).
    fn spec(&self) -> &SectionSpec;

    /// Label used when the config has no `{key}_label`.
    fn default_label(&self) -> &str;

    /// Detail-pane markup for a non-placeholder item.
    fn info_html(&self, item: &MediaItem) -> String;

    fn key(&self) -> &str {
        self.spec().key
    }

    fn icon(&self) -> &str {
        "mdi:filmstrip"
    }

    /// Whether items of this section can be sent to a remote client.
    fn supports_playback(&self) -> bool {
        false
    }

    fn empty_message(&self) -> &str {
        "No recently added media"
    }

    /// Caption for a feed inside a multi-feed family.
    fn feed_label(&self, _feed: &str) -> Option<&str> {
        None
    }

    /// Static header and content slot for this section.
    fn generate_template(&self, config: &CardConfig) -> String {
        markup::section_shell(
            self.key(),
            config.label(self.key(), self.default_label()),
            self.icon(),
        )
    }

    /// Narrow a feed's items to what the section shows. Defaults to the item cap.
    fn filter_items(&self, ctx: &BindContext<'_>, items: Vec<MediaItem>) -> Vec<MediaItem> {
        let max = ctx.config.max_items(self.key());
        items.into_iter().take(max).collect()
    }

    /// Bind one feed's entity state. Re-renders the detail pane when the
    /// selection points into this feed, and clears it when the selected
    /// index no longer resolves.
    fn update(&self, ctx: &mut BindContext<'_>, feed: &str, entity: &EntityState) {
        let items = self.filter_items(ctx, entity.media_items());
        ctx.view.set_feed(self.key(), feed, items);

        if ctx.selection.is_selected_feed(self.key(), feed) {
            let index = ctx.selection.selected_index();
            match ctx.view.item(self.key(), feed, index).cloned() {
                Some(item) => {
                    if self.update_info(ctx.view, &item) {
                        ctx.background_rendered = true;
                    }
                }
                // The selected item fell out of the feed.
                None => ctx.view.clear_detail(),
            }
        }
    }

    /// Show `item` in the detail pane. Returns true when a real background was rendered.
    fn update_info(&self, view: &mut CardView, item: &MediaItem) -> bool {
        let info = if item.is_placeholder() {
            String::new()
        } else {
            self.info_html(item)
        };
        view.show_detail(item, info, self.supports_playback())
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
        format!(
            r#"<div class="media-item{selected}" data-type="{key}" data-feed="{feed}" data-index="{index}"><img src="{poster}" alt="{title}"><div class="media-item-title">{title}</div></div>"#,
            key = escape(self.key()),
            feed = escape(feed),
            poster = escape(item.poster.as_deref().unwrap_or("")),
        )
    }

    /// Content slot projection: every bound feed, in feed order.
    fn render_content(
        &self,
        view: &CardView,
        selection: &SelectionState,
        _config: &CardConfig,
    ) -> String {
        let key = self.key();
        let mut body = String::new();
        for feed in self.spec().feed_keys() {
            let Some(items) = view.feed(key, &feed) else {
                continue;
            };
            if let Some(label) = self.feed_label(&feed) {
                body.push_str(&format!(r#"<div class="feed-label">{}</div>"#, escape(label)));
            }
            body.push_str(&format!(
                r#"<div class="media-list {key}-list" data-feed="{feed}">"#,
                key = escape(key),
                feed = escape(&feed),
            ));
            for (index, item) in items.iter().enumerate() {
                let selected = selection.is_selected(key, &feed, index);
                body.push_str(&self.render_item(&feed, index, item, selected));
            }
            body.push_str("</div>");
        }
        let collapsed = if selection.is_collapsed(key) { " collapsed" } else { "" };
        format!(
            r#"<div class="section-content{collapsed}" data-content="{key}">{body}</div>"#,
            key = escape(key),
        )
    }
}
