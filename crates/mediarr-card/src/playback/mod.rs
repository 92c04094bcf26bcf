//! Remote playback: client discovery, client choice and dispatch.
//!
//! Network round-trips run outside the card. Each one is described by a
//! ticket that carries the liveness token and view generation it was issued
//! under; a result whose ticket no longer matches is dropped without touching
//! the view.
//!
//! # Phases
//! ```text
//!  Idle ──open──▶ Discovering ──clients──▶ Selecting ──choose──▶ Dispatching
//!   ▲                                          ▲                     │
//!   │                                          └──────failure────────┤
//!   └───────────────────── success / close ──────────────────────────┘
//! ```

pub mod plex;

use mediarr_proto::protocol::{MediaItem, RemoteClient};
use tracing::{debug, error};

use crate::card_config::CardConfig;
use crate::error::{PlaybackError, Result};
use crate::view::{ClientListView, ClientModalView};

pub use plex::PlexClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    /// Modal visible, waiting for the client list.
    Discovering,
    /// Client list shown, waiting for a choice.
    Selecting,
    /// Playback request in flight.
    Dispatching,
}

/// Issued by [`PlaybackController::open`]; hand it to the discovery task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTicket {
    pub token: u64,
    pub generation: u64,
    pub server_url: String,
    pub plex_token: String,
    pub media_key: String,
}

/// Issued by [`PlaybackController::choose_client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTicket {
    pub token: u64,
    pub generation: u64,
    pub server_url: String,
    pub plex_token: String,
    pub media_key: String,
    pub client_id: String,
}

/// Deferred network work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEffect {
    Discover(DiscoveryTicket),
    Dispatch(DispatchTicket),
}

/// Result of running a [`PlaybackEffect`], to be fed back into the card.
#[derive(Debug)]
pub enum PlaybackOutcome {
    Discovered(DiscoveryTicket, Vec<RemoteClient>),
    Dispatched(DispatchTicket, Result<()>),
}

impl PlaybackEffect {
    pub async fn run(self, client: &PlexClient) -> PlaybackOutcome {
        match self {
            Self::Discover(ticket) => {
                let clients = client
                    .discover_clients(&ticket.server_url, &ticket.plex_token)
                    .await;
                PlaybackOutcome::Discovered(ticket, clients)
            }
            Self::Dispatch(ticket) => {
                let result = client
                    .play_media(
                        &ticket.server_url,
                        &ticket.plex_token,
                        &ticket.client_id,
                        &ticket.media_key,
                    )
                    .await;
                PlaybackOutcome::Dispatched(ticket, result)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    phase: PlaybackPhase,
    /// Bumped whenever outstanding tickets must stop counting.
    token: u64,
    /// Target of the open selector: (server url, plex token, media key).
    target: Option<(String, String, String)>,
    clients: Vec<RemoteClient>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn clients(&self) -> &[RemoteClient] {
        &self.clients
    }

    /// Open the client selector for `item`. The modal is shown in its
    /// awaiting state right away; `None` when there is nothing to play or
    /// the server is not configured.
    pub fn open(
        &mut self,
        config: &CardConfig,
        item: Option<&MediaItem>,
        modal: &mut ClientModalView,
        generation: u64,
    ) -> Option<DiscoveryTicket> {
        let Some(media_key) = item.and_then(|i| i.key.clone()) else {
            error!("Selected item has no playable key");
            return None;
        };
        let (Some(server_url), Some(plex_token)) = (config.server_url("plex"), config.plex_token())
        else {
            error!("{}", PlaybackError::NotConfigured);
            return None;
        };

        self.token += 1;
        self.phase = PlaybackPhase::Discovering;
        self.clients.clear();
        self.target = Some((
            server_url.to_string(),
            plex_token.to_string(),
            media_key.clone(),
        ));

        modal.visible = true;
        modal.list = ClientListView::Awaiting;
        modal.error = None;

        Some(DiscoveryTicket {
            token: self.token,
            generation,
            server_url: server_url.to_string(),
            plex_token: plex_token.to_string(),
            media_key,
        })
    }

    fn is_live(&self, token: u64, issued: u64, current: u64) -> bool {
        token == self.token && issued == current
    }

    /// Apply a discovery result. Returns false when the ticket was stale.
    pub fn on_clients_discovered(
        &mut self,
        ticket: &DiscoveryTicket,
        clients: Vec<RemoteClient>,
        modal: &mut ClientModalView,
        generation: u64,
    ) -> bool {
        if !self.is_live(ticket.token, ticket.generation, generation)
            || self.phase != PlaybackPhase::Discovering
        {
            debug!(token = ticket.token, "dropping stale discovery result");
            return false;
        }

        modal.list = if clients.is_empty() {
            ClientListView::NoClients
        } else {
            ClientListView::Clients(clients.clone())
        };
        self.clients = clients;
        self.phase = PlaybackPhase::Selecting;
        true
    }

    /// Pick one of the listed clients.
    pub fn choose_client(
        &mut self,
        client_id: &str,
        modal: &mut ClientModalView,
        generation: u64,
    ) -> Option<DispatchTicket> {
        if self.phase != PlaybackPhase::Selecting {
            debug!(phase = ?self.phase, "client choice ignored");
            return None;
        }
        if !self.clients.iter().any(|c| c.client_id == client_id) {
            debug!(client = %client_id, "unknown client");
            return None;
        }
        let (server_url, plex_token, media_key) = self.target.clone()?;

        self.phase = PlaybackPhase::Dispatching;
        modal.error = None;
        Some(DispatchTicket {
            token: self.token,
            generation,
            server_url,
            plex_token,
            media_key,
            client_id: client_id.to_string(),
        })
    }

    /// Apply a dispatch result. Success closes the modal; failure keeps it
    /// open with an error line so another client can be tried.
    pub fn on_dispatch_finished(
        &mut self,
        ticket: &DispatchTicket,
        result: Result<()>,
        modal: &mut ClientModalView,
        generation: u64,
    ) -> bool {
        if !self.is_live(ticket.token, ticket.generation, generation)
            || self.phase != PlaybackPhase::Dispatching
        {
            debug!(token = ticket.token, "dropping stale dispatch result");
            return false;
        }

        match result {
            Ok(()) => self.close(modal),
            Err(e) => {
                error!(client = %ticket.client_id, "Error playing on Plex client: {}", e);
                modal.error = Some(format!("Playback failed: {e}"));
                self.phase = PlaybackPhase::Selecting;
            }
        }
        true
    }

    /// Hide the modal and invalidate every outstanding ticket.
    pub fn close(&mut self, modal: &mut ClientModalView) {
        self.reset();
        *modal = ClientModalView::default();
    }

    /// Back to `Idle` without a modal to update, e.g. when the view is dropped.
    pub fn reset(&mut self) {
        self.token += 1;
        self.phase = PlaybackPhase::Idle;
        self.target = None;
        self.clients.clear();
    }
}
