//! Plex client-control API: list connected players and start playback on one.

use std::time::Duration;

use mediarr_proto::protocol::RemoteClient;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::{PlaybackError, Result};

/// Icon for a Plex product name. Unknown products get a generic network player icon.
pub fn client_icon(product: &str) -> &'static str {
    match product {
        "Plex for Android (TV)" => "mdi:android-tv",
        "Plex for Android" => "mdi:android",
        "Plex for iOS" => "mdi:apple",
        "Plex Web" => "mdi:web",
        "Plex HTPC" => "mdi:monitor",
        "Plex Media Player" => "mdi:play-circle",
        "Plex for Samsung" | "Plex for LG" => "mdi:television",
        "Plex for Xbox" => "mdi:xbox",
        "Plex for PlayStation" => "mdi:playstation",
        _ => "mdi:play-network",
    }
}

/// `base` joined with `path`, with exactly one slash between them.
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Parse a `/clients` response. Every `<Server>` child of the root
/// `<MediaContainer>` is one player.
pub fn parse_clients_xml(body: &str) -> Result<Vec<RemoteClient>> {
    let document =
        roxmltree::Document::parse(body).map_err(|e| PlaybackError::Parse(e.to_string()))?;
    let root = document.root_element();
    if !root.has_tag_name("MediaContainer") {
        return Err(PlaybackError::Parse(format!(
            "expected <MediaContainer>, found <{}>",
            root.tag_name().name()
        )));
    }

    let clients = root
        .children()
        .filter(|node| node.has_tag_name("Server"))
        .map(|server| {
            let attr = |name: &str| server.attribute(name).unwrap_or_default().to_string();
            RemoteClient {
                name: attr("name"),
                product: attr("product"),
                version: attr("version"),
                client_id: attr("machineIdentifier"),
            }
        })
        .collect();
    Ok(clients)
}

#[derive(Clone)]
pub struct PlexClient {
    http: Client,
}

impl PlexClient {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(format!("mediarr/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// List the players currently connected to the server.
    pub async fn fetch_clients(&self, server_url: &str, token: &str) -> Result<Vec<RemoteClient>> {
        let url = endpoint(server_url, "clients");
        debug!(url = %url, "fetching plex clients");

        let response = self
            .http
            .get(&url)
            .query(&[("X-Plex-Token", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_clients_xml(&body)
    }

    /// Like [`fetch_clients`](Self::fetch_clients), but a failure is logged and
    /// reported as an empty list.
    pub async fn discover_clients(&self, server_url: &str, token: &str) -> Vec<RemoteClient> {
        match self.fetch_clients(server_url, token).await {
            Ok(clients) => {
                info!(count = clients.len(), "plex clients discovered");
                clients
            }
            Err(e) => {
                error!("Error fetching Plex clients: {}", e);
                Vec::new()
            }
        }
    }

    /// Ask the server to start `media_key` on the player `client_id`.
    pub async fn play_media(
        &self,
        server_url: &str,
        token: &str,
        client_id: &str,
        media_key: &str,
    ) -> Result<()> {
        let url = endpoint(server_url, "player/playback/playMedia");
        debug!(url = %url, client = %client_id, key = %media_key, "dispatching playback");

        let response = self
            .http
            .post(&url)
            .query(&[
                ("key", media_key),
                ("machineIdentifier", client_id),
                ("X-Plex-Token", token),
            ])
            .header("X-Plex-Target-Client-Identifier", client_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Rejected {
                status: status.as_u16(),
            });
        }
        info!(client = %client_id, "playback started");
        Ok(())
    }
}
