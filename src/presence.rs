//! Process-wide registry of live connections per user.
//!
//! A user is online while at least one connection is registered; the value
//! tracked is the set of live connection ids, not a boolean, so a user with
//! several tabs open stays online until the last one drops. Mutation is
//! atomic per user-id key (DashMap shard locking), so concurrent
//! register/unregister for different users never contend on a global lock.
//!
//! Deployment constraint: this registry is in-process memory, which is only
//! correct for a single-instance deployment. Horizontally scaled instances
//! need a shared external counter plus pub/sub fan-out instead.

use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Online/offline edge produced by a register/unregister call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    Online,
    Offline,
}

#[derive(Default)]
pub struct PresenceTracker {
    connections: DashMap<Uuid, HashSet<Uuid>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live connection. Returns `Online` when this is the user's
    /// first connection (0 -> 1 transition).
    pub fn register(&self, user_id: Uuid, connection_id: Uuid) -> Option<PresenceTransition> {
        let mut entry = self.connections.entry(user_id).or_default();
        let was_empty = entry.is_empty();
        entry.insert(connection_id);
        if was_empty {
            Some(PresenceTransition::Online)
        } else {
            None
        }
    }

    /// Drop a connection. Returns `Offline` on the 1 -> 0 transition and
    /// removes the record. Unregistering an unknown connection is a no-op.
    pub fn unregister(&self, user_id: Uuid, connection_id: Uuid) -> Option<PresenceTransition> {
        let mut transition = None;
        self.connections.remove_if_mut(&user_id, |_, conns| {
            if conns.remove(&connection_id) && conns.is_empty() {
                transition = Some(PresenceTransition::Offline);
            }
            conns.is_empty()
        });
        transition
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.connections
            .get(&user_id)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// Ids of every currently online user, for bulk presence pushes on
    /// (re)connect.
    pub fn snapshot(&self) -> Vec<Uuid> {
        self.connections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect()
    }
}
