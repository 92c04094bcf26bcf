//! Shared data model for the mediarr card: host state snapshots, media items,
//! remote clients, CLI settings and the revisioned snapshot store.

pub mod config;
pub mod platform;
pub mod protocol;
pub mod state;
