use crate::protocol::{parse_snapshot, StateSnapshot};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Snapshot plus a revision counter. `rev` increases every time the content
/// actually changes, so consumers can skip redundant binds.
#[derive(Debug, Clone, Default)]
pub struct RevisionedSnapshot {
    pub rev: u64,
    pub snapshot: Arc<StateSnapshot>,
}

/// Host-side holder for the latest state snapshot.
pub struct SnapshotStore {
    state: Arc<RwLock<RevisionedSnapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(RevisionedSnapshot::default())),
        }
    }

    pub async fn get(&self) -> RevisionedSnapshot {
        self.state.read().await.clone()
    }

    /// Replace the whole snapshot. Returns the revision after the call.
    pub async fn replace(&self, snapshot: StateSnapshot) -> u64 {
        let mut state = self.state.write().await;
        if *state.snapshot != snapshot {
            state.snapshot = Arc::new(snapshot);
            state.rev += 1;
            debug!(rev = state.rev, entities = state.snapshot.len(), "snapshot replaced");
        }
        state.rev
    }

    /// Re-read a snapshot file and replace the current snapshot with it.
    pub async fn reload_from(&self, path: &Path) -> anyhow::Result<u64> {
        let snapshot = load_snapshot_file(path).await?;
        Ok(self.replace(snapshot).await)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn load_snapshot_file(path: &Path) -> anyhow::Result<StateSnapshot> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_snapshot(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::EntityState;

    fn snapshot_with(id: &str, state: &str) -> StateSnapshot {
        let mut snapshot = StateSnapshot::new();
        snapshot.insert(id.to_string(), EntityState::new(state));
        snapshot
    }

    #[tokio::test]
    async fn test_replace_bumps_rev_only_on_change() {
        let store = SnapshotStore::new();
        assert_eq!(store.get().await.rev, 0);
        assert_eq!(store.replace(snapshot_with("sensor.a", "on")).await, 1);
        assert_eq!(store.replace(snapshot_with("sensor.a", "on")).await, 1);
        assert_eq!(store.replace(snapshot_with("sensor.a", "off")).await, 2);
    }

    #[tokio::test]
    async fn test_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(&path, r#"{"sensor.plex": {"state": "5", "attributes": {}}}"#).unwrap();
        let store = SnapshotStore::new();
        assert_eq!(store.reload_from(&path).await.unwrap(), 1);
        assert_eq!(store.get().await.snapshot["sensor.plex"].state, "5");
    }
}
