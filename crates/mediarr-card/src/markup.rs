//! Markup building blocks shared by the composer and the view projection.
//!
//! Class names here are consumed by the host's styles and click wiring and
//! must stay stable.

use mediarr_proto::protocol::RemoteClient;

use crate::card_config::CardConfig;
use crate::now_playing::NowPlayingView;
use crate::playback::plex::client_icon;
use crate::view::{ClientListView, ClientModalView};

/// Placeholders the composed shell carries for content filled in at projection time.
pub const MARK_CLIENT_MODAL: &str = "<!--mediarr:client-modal-->";
pub const MARK_NOW_PLAYING: &str = "<!--mediarr:now-playing-->";
pub const MARK_MEDIA_CONTENT: &str = "<!--mediarr:media-content-->";

pub fn mark_toggle(section: &str) -> String {
    format!("<!--mediarr:toggle:{section}-->")
}

pub fn mark_content(section: &str) -> String {
    format!("<!--mediarr:content:{section}-->")
}

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `url('...')` value for inline background styles.
pub fn css_url(url: &str) -> String {
    format!("url('{}')", escape(url))
}

/// Fixed chrome around the sections. `sections` is the concatenated section templates.
pub fn card_shell(config: &CardConfig, sections: &str) -> String {
    format!(
        r#"<ha-card class="{element}">
  <div class="card-background" style="opacity: {opacity}; filter: blur({blur}px);"></div>
  <div class="card-content">
    {modal}
    {now_playing}
    {media}
    {sections}
  </div>
</ha-card>"#,
        element = config.variant().element_name(),
        opacity = config.opacity(),
        blur = config.blur_radius(),
        modal = MARK_CLIENT_MODAL,
        now_playing = MARK_NOW_PLAYING,
        media = MARK_MEDIA_CONTENT,
    )
}

/// Header and content slot for one section.
pub fn section_shell(key: &str, label: &str, icon: &str) -> String {
    format!(
        r#"<div class="section" data-section="{key}">
      <div class="section-header">
        <div class="section-header-content">
          {toggle}
          <ha-icon class="section-icon" icon="{icon}"></ha-icon>
          <div class="section-label">{label}</div>
        </div>
      </div>
      {content}
    </div>"#,
        key = escape(key),
        toggle = mark_toggle(key),
        icon = escape(icon),
        label = escape(label),
        content = mark_content(key),
    )
}

pub fn toggle_icon(collapsed: bool) -> String {
    let degrees = if collapsed { -90 } else { 0 };
    format!(
        r#"<ha-icon class="section-toggle-icon" icon="mdi:chevron-down" style="transform: rotate({degrees}deg)"></ha-icon>"#
    )
}

pub fn client_modal(modal: &ClientModalView) -> String {
    let hidden = if modal.visible { "" } else { " hidden" };
    let error = modal
        .error
        .as_deref()
        .map(|e| format!(r#"<div class="client-error">{}</div>"#, escape(e)))
        .unwrap_or_default();
    format!(
        r#"<div class="client-modal{hidden}">
      <div class="client-modal-content">
        <div class="client-modal-header">
          <div class="client-modal-title">Select Client</div>
          <ha-icon class="client-modal-close" icon="mdi:close"></ha-icon>
        </div>
        {error}<div class="client-list">{list}</div>
      </div>
    </div>"#,
        list = client_list(&modal.list),
    )
}

fn client_list(list: &ClientListView) -> String {
    match list {
        ClientListView::Awaiting => {
            r#"<div class="client-loading">Searching for clients…</div>"#.to_string()
        }
        ClientListView::NoClients => r#"<div class="client-empty">
          <div class="client-empty-title">No Available Clients</div>
          <div class="client-empty-hint">Make sure your Plex clients are online and connected.</div>
        </div>"#
            .to_string(),
        ClientListView::Clients(clients) => clients.iter().map(client_item).collect(),
    }
}

fn client_item(client: &RemoteClient) -> String {
    format!(
        r#"<div class="client-item" data-client-id="{id}">
          <ha-icon class="client-item-icon" icon="{icon}"></ha-icon>
          <div class="client-item-info">
            <div class="client-item-name">{name}</div>
            <div class="client-item-details">{product} {version}</div>
          </div>
        </div>"#,
        id = escape(&client.client_id),
        icon = client_icon(&client.product),
        name = escape(&client.name),
        product = escape(&client.product),
        version = escape(&client.version),
    )
}

pub fn now_playing(view: &NowPlayingView) -> String {
    let hidden = if view.visible { "" } else { " hidden" };
    let background = view
        .background
        .as_deref()
        .map(|url| format!(r#" style="background-image: {}""#, css_url(url)))
        .unwrap_or_default();
    format!(
        r#"<div class="now-playing{hidden}">
      <div class="now-playing-background"{background}></div>
      <div class="now-playing-content">
        <div class="now-playing-info">
          <div class="now-playing-title">{title}</div>
          <div class="now-playing-subtitle">{subtitle}</div>
        </div>
      </div>
      <div class="progress-bar">
        <div class="progress-bar-fill" style="width: {progress}%"></div>
      </div>
    </div>"#,
        title = escape(&view.title),
        subtitle = escape(&view.subtitle),
        progress = view.progress_percent,
    )
}

pub fn media_content(background: Option<&str>, info_html: &str, play_visible: bool) -> String {
    let style = background
        .map(|url| format!(r#" style="background-image: {}""#, css_url(url)))
        .unwrap_or_default();
    let hidden = if play_visible { "" } else { " hidden" };
    format!(
        r#"<div class="media-content">
      <div class="media-background"{style}></div>
      <div class="media-info">{info_html}</div>
      <div class="play-button{hidden}">
        <ha-icon class="play-icon" icon="mdi:play-circle-outline"></ha-icon>
      </div>
    </div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_section_shell_carries_markers() {
        let html = section_shell("plex", "Recently Added", "mdi:plex");
        assert!(html.contains(r#"data-section="plex""#));
        assert!(html.contains("section-header"));
        assert!(html.contains(&mark_toggle("plex")));
        assert!(html.contains(&mark_content("plex")));
    }

    #[test]
    fn test_no_clients_state_is_explicit() {
        let modal = ClientModalView {
            visible: true,
            list: ClientListView::NoClients,
            error: None,
        };
        let html = client_modal(&modal);
        assert!(html.contains("No Available Clients"));
        assert!(!html.contains("client-item"));
        assert!(!html.contains("client-modal hidden"));
    }

    #[test]
    fn test_toggle_icon_rotation() {
        assert!(toggle_icon(true).contains("rotate(-90deg)"));
        assert!(toggle_icon(false).contains("rotate(0deg)"));
    }
}
