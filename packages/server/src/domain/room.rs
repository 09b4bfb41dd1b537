//! Named broadcast group.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use chatrelay_shared::time::Clock;

use super::{
    client::Client,
    message::Message,
    value_object::{ClientId, RoomName},
};

/// A room and its membership set.
///
/// The membership lock is independent of the registry lock. A room never
/// reaches back into the registry, so the registry -> room lock order
/// cannot cycle.
pub struct Room {
    name: RoomName,
    members: RwLock<HashMap<ClientId, Arc<Client>>>,
    clock: Arc<dyn Clock>,
}

impl Room {
    pub fn new(name: RoomName, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            members: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub async fn add(&self, client: Arc<Client>) {
        self.members.write().await.insert(client.id(), client);
    }

    /// Remove a member; returns whether it was present
    pub async fn remove(&self, client_id: &ClientId) -> bool {
        self.members.write().await.remove(client_id).is_some()
    }

    pub async fn contains(&self, client_id: &ClientId) -> bool {
        self.members.read().await.contains_key(client_id)
    }

    /// Format `message` with the current time and push it to every member
    /// except `excluded`.
    ///
    /// A failed push is logged; the recipient stays a member and delivery to
    /// the remaining members continues.
    pub async fn broadcast(&self, message: &Message, excluded: Option<&ClientId>) {
        let line = message.format_line(self.clock.now());
        let members = self.members.read().await;

        for (id, member) in members.iter() {
            if excluded == Some(id) {
                continue;
            }
            if let Err(e) = member.try_send(&line).await {
                tracing::warn!(
                    "Failed to deliver message in room '{}' to client '{}': {}",
                    self.name,
                    id,
                    e
                );
            }
        }
        tracing::debug!("Broadcasted to room '{}': {}", self.name, line);
    }

    pub async fn count(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn member_ids(&self) -> Vec<ClientId> {
        self.members.read().await.keys().copied().collect()
    }

    /// Snapshot of `(id, username)` for every member, ordered by username
    pub async fn list_usernames(&self) -> Vec<(ClientId, String)> {
        let members = self.members.read().await;
        let mut usernames = Vec::with_capacity(members.len());
        for (id, member) in members.iter() {
            usernames.push((*id, member.username().await));
        }
        usernames.sort_by(|a, b| a.1.cmp(&b.1));
        usernames
    }
}
