//! Server registry: rooms, clients, and reply targets.
//!
//! All three maps live behind one coarse `RwLock`. Room membership has its
//! own lock inside each [`Room`]; when both are needed the registry lock is
//! always taken first.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use tokio::sync::RwLock;

use chatrelay_shared::time::{Clock, SystemClock};

use crate::domain::{
    ChatError, Client, ClientId, Message, MessagePusher, Room, RoomName, Username,
};

/// Rooms that exist from startup
pub const DEFAULT_ROOMS: [&str; 3] = ["general", "random", "tech"];

/// The most recent `/msg`, `/all` or `/global` and who sent it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastMessage {
    pub sender: ClientId,
    pub message: Message,
}

#[derive(Default)]
pub(super) struct RegistryState {
    pub(super) rooms: BTreeMap<RoomName, Arc<Room>>,
    pub(super) clients: HashMap<ClientId, Arc<Client>>,
    /// Who each client addresses with `/r`
    pub(super) reply_targets: HashMap<ClientId, Arc<Client>>,
    /// Username of a reply target purged because it disconnected, reported on the next `/r`
    pub(super) departed_reply_targets: HashMap<ClientId, String>,
    pub(super) last_message: Option<LastMessage>,
}

impl RegistryState {
    pub(super) fn set_reply_target(&mut self, from: ClientId, to: Arc<Client>) {
        self.departed_reply_targets.remove(&from);
        self.reply_targets.insert(from, to);
    }
}

/// Process-wide chat state, shared by every session task through an `Arc`.
pub struct ChatRegistry {
    pub(super) state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl ChatRegistry {
    /// Create a registry holding `default_rooms`, all empty
    pub fn new(clock: Arc<dyn Clock>, default_rooms: impl IntoIterator<Item = RoomName>) -> Self {
        let rooms = default_rooms
            .into_iter()
            .map(|name| {
                let room = Arc::new(Room::new(name.clone(), clock.clone()));
                (name, room)
            })
            .collect();

        Self {
            state: RwLock::new(RegistryState {
                rooms,
                ..RegistryState::default()
            }),
            clock,
        }
    }

    /// Registry on the system clock with the [`DEFAULT_ROOMS`]
    pub fn with_default_rooms() -> Self {
        let rooms = DEFAULT_ROOMS
            .iter()
            .filter_map(|name| RoomName::new(name).ok());
        Self::new(Arc::new(SystemClock), rooms)
    }

    /// Register a new connection under a default `User_<n>` name.
    ///
    /// `n` is one more than the number of clients currently connected, so a
    /// default name can repeat after disconnects. Names are only checked for
    /// uniqueness by `/setname`.
    pub async fn register(&self, pusher: Arc<dyn MessagePusher>) -> Arc<Client> {
        let mut state = self.state.write().await;
        let username = format!("User_{}", state.clients.len() + 1);
        let client = Arc::new(Client::new(ClientId::generate(), username, pusher));
        state.clients.insert(client.id(), client.clone());

        tracing::info!(
            "Client '{}' registered as '{}' ({} connected)",
            client.id(),
            client.username().await,
            state.clients.len()
        );
        client
    }

    /// Unlink a client from its room, from every reply target, and from the
    /// client map.
    pub async fn unregister(&self, client: &Client) {
        let mut state = self.state.write().await;
        let id = client.id();
        let username = client.username().await;

        if let Some(room_name) = client.room().await {
            if let Some(room) = state.rooms.get(&room_name) {
                room.remove(&id).await;
                room.broadcast(&Message::system(format!("{} left the room", username)), None)
                    .await;
            }
            client.set_room(None).await;
        }
        for room in state.rooms.values() {
            if room.remove(&id).await {
                tracing::warn!(
                    "Dropped stray membership of client '{}' in room '{}'",
                    id,
                    room.name()
                );
            }
        }

        state.reply_targets.remove(&id);
        state.departed_reply_targets.remove(&id);
        let orphaned: Vec<ClientId> = state
            .reply_targets
            .iter()
            .filter(|(_, target)| target.id() == id)
            .map(|(from, _)| *from)
            .collect();
        for from in orphaned {
            state.reply_targets.remove(&from);
            state.departed_reply_targets.insert(from, username.clone());
        }

        state.clients.remove(&id);
        tracing::info!(
            "Client '{}' ('{}') unregistered ({} connected)",
            id,
            username,
            state.clients.len()
        );
    }

    /// Rebind a client's username after validation and a collision check.
    ///
    /// The collision scan and the rebind are not one atomic step: two clients
    /// racing for the same free name can both succeed.
    pub async fn set_username(&self, client: &Client, requested: &str) -> Result<(), ChatError> {
        let username = Username::new(requested)?;

        {
            let state = self.state.read().await;
            for other in state.clients.values() {
                if other.id() != client.id() && other.username().await == username.as_str() {
                    return Err(ChatError::UsernameTaken);
                }
            }
        }

        let new_name = username.into_string();
        let old_name = client.set_username(new_name.clone()).await;
        client
            .send(&format!(
                "Welcome {}! Type /list to see available rooms.",
                new_name
            ))
            .await;

        tracing::info!("Client '{}' changed name from '{}' to '{}'", client.id(), old_name, new_name);
        Ok(())
    }

    /// Send the room list with live member counts to `client`
    pub async fn list_rooms(&self, client: &Client) {
        let lines = {
            let state = self.state.read().await;
            if state.rooms.is_empty() {
                vec!["No rooms available".to_string()]
            } else {
                let mut lines = Vec::with_capacity(state.rooms.len() + 1);
                lines.push("Available rooms:".to_string());
                for (name, room) in state.rooms.iter() {
                    lines.push(format!("  - {} ({} users)", name, room.count().await));
                }
                lines
            }
        };

        for line in lines {
            client.send(&line).await;
        }
    }

    /// Create an empty room unless one with that name exists.
    ///
    /// Returns whether a room was created. Rooms are never removed.
    pub async fn create_room(&self, name: RoomName) -> bool {
        let mut state = self.state.write().await;
        if state.rooms.contains_key(&name) {
            return false;
        }
        let room = self.new_room(name.clone());
        state.rooms.insert(name.clone(), room);
        tracing::info!("Room '{}' created", name);
        true
    }

    /// Move `client` into `name`, creating the room on first use.
    ///
    /// The old room (if any) hears "left", the new room hears "joined"
    /// except for the joiner, who gets a confirmation instead.
    pub async fn join_room(&self, client: &Arc<Client>, name: RoomName) {
        let mut state = self.state.write().await;
        let id = client.id();
        let username = client.username().await;

        if let Some(old_name) = client.room().await
            && let Some(old_room) = state.rooms.get(&old_name)
        {
            old_room.remove(&id).await;
            old_room
                .broadcast(&Message::system(format!("{} left the room", username)), None)
                .await;
        }

        let room = match state.rooms.get(&name) {
            Some(room) => room.clone(),
            None => {
                let room = self.new_room(name.clone());
                state.rooms.insert(name.clone(), room.clone());
                tracing::info!("Room '{}' created on join", name);
                room
            }
        };

        room.add(client.clone()).await;
        client.set_room(Some(name.clone())).await;
        client.send(&format!("Joined room: {}", name)).await;
        room.broadcast(
            &Message::system(format!("{} joined the room", username)),
            Some(&id),
        )
        .await;

        tracing::info!("Client '{}' ('{}') joined room '{}'", id, username, name);
    }

    fn new_room(&self, name: RoomName) -> Arc<Room> {
        Arc::new(Room::new(name, self.clock.clone()))
    }

    // ========================================
    // Inspection
    // ========================================

    pub async fn client_count(&self) -> usize {
        self.state.read().await.clients.len()
    }

    pub async fn is_registered(&self, client_id: &ClientId) -> bool {
        self.state.read().await.clients.contains_key(client_id)
    }

    /// Look up a connected client by exact (case-sensitive) username
    pub async fn find_client(&self, username: &str) -> Option<Arc<Client>> {
        let state = self.state.read().await;
        for client in state.clients.values() {
            if client.username().await == username {
                return Some(client.clone());
            }
        }
        None
    }

    pub async fn room(&self, name: &RoomName) -> Option<Arc<Room>> {
        self.state.read().await.rooms.get(name).cloned()
    }

    pub async fn room_names(&self) -> Vec<RoomName> {
        self.state.read().await.rooms.keys().cloned().collect()
    }

    /// Current reply target of `client_id`, if any
    pub async fn reply_target(&self, client_id: &ClientId) -> Option<ClientId> {
        self.state
            .read()
            .await
            .reply_targets
            .get(client_id)
            .map(|target| target.id())
    }

    pub async fn last_message(&self) -> Option<LastMessage> {
        self.state.read().await.last_message.clone()
    }
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::with_default_rooms()
    }
}
