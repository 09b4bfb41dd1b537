//! Per-connection client handle.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{
    pusher::MessagePusher,
    value_object::{ClientId, RoomName},
};

/// Identity of one live connection.
///
/// The current room is held by name only; the registry keeps it consistent
/// with the room's membership set.
pub struct Client {
    id: ClientId,
    username: RwLock<String>,
    room: RwLock<Option<RoomName>>,
    pusher: Arc<dyn MessagePusher>,
}

impl Client {
    pub fn new(id: ClientId, username: String, pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            id,
            username: RwLock::new(username),
            room: RwLock::new(None),
            pusher,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub async fn username(&self) -> String {
        self.username.read().await.clone()
    }

    /// Rebind the username, returning the previous one
    pub async fn set_username(&self, username: String) -> String {
        std::mem::replace(&mut *self.username.write().await, username)
    }

    pub async fn room(&self) -> Option<RoomName> {
        self.room.read().await.clone()
    }

    pub(crate) async fn set_room(&self, room: Option<RoomName>) {
        *self.room.write().await = room;
    }

    /// Push one line to this client. Failures are logged, never returned.
    pub async fn send(&self, line: &str) {
        if let Err(e) = self.pusher.push(line).await {
            tracing::warn!("Failed to push message to client '{}': {}", self.id, e);
        }
    }

    /// Push one line to this client, reporting the failure to the caller
    pub(crate) async fn try_send(&self, line: &str) -> Result<(), super::PushError> {
        self.pusher.push(line).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PushError, pusher::MockMessagePusher};

    #[tokio::test]
    async fn test_set_username_returns_previous_name() {
        // テスト項目: ユーザー名を変更すると以前の名前が返される
        // given (前提条件):
        let client = Client::new(
            ClientId::generate(),
            "User_1".to_string(),
            Arc::new(MockMessagePusher::new()),
        );

        // when (操作):
        let old = client.set_username("alice".to_string()).await;

        // then (期待する結果):
        assert_eq!(old, "User_1");
        assert_eq!(client.username().await, "alice");
    }

    #[tokio::test]
    async fn test_send_swallows_push_failure() {
        // テスト項目: 送信失敗はログに記録されるだけでパニックしない
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push()
            .times(1)
            .returning(|_| Err(PushError::Closed));
        let client = Client::new(ClientId::generate(), "alice".to_string(), Arc::new(pusher));

        // when (操作):
        client.send("hello").await;

        // then (期待する結果): no panic, expectation satisfied on drop
        assert!(client.room().await.is_none());
    }
}
