//! Media dashboard card engine: section plugins, configuration, state binding
//! and remote playback for the Mediarr and Emby cards.

pub mod binder;
pub mod card;
pub mod card_config;
pub mod error;
pub mod event;
pub mod markup;
pub mod now_playing;
pub mod playback;
pub mod registry;
pub mod section;
pub mod sections;
pub mod selection;
pub mod variant;
pub mod view;

pub use card::MediarrCard;
pub use card_config::{normalize, CardConfig};
pub use error::{ConfigError, PlaybackError};
pub use event::CardEvent;
pub use playback::{PlaybackEffect, PlaybackOutcome, PlaybackPhase, PlexClient};
pub use registry::SectionRegistry;
pub use variant::CardVariant;
