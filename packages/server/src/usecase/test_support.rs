//! Helpers shared by the registry unit tests.

use std::sync::Arc;

use chatrelay_shared::time::FixedClock;
use chrono::NaiveTime;
use tokio::sync::mpsc;

use crate::{
    domain::{Client, RoomName},
    infrastructure::message_pusher::ChannelMessagePusher,
};

use super::{ChatRegistry, DEFAULT_ROOMS};

/// Timestamp every room line carries in tests
pub(crate) const TEST_STAMP: &str = "[12:34]";

pub(crate) fn room(name: &str) -> RoomName {
    RoomName::new(name).unwrap()
}

pub(crate) fn create_test_registry() -> ChatRegistry {
    let clock = FixedClock::new(NaiveTime::from_hms_opt(12, 34, 56).unwrap());
    ChatRegistry::new(Arc::new(clock), DEFAULT_ROOMS.iter().map(|name| room(name)))
}

/// A registered client plus the receiving end of its outbound queue
pub(crate) struct TestClient {
    pub(crate) client: Arc<Client>,
    pub(crate) rx: mpsc::Receiver<String>,
}

impl TestClient {
    /// Everything queued for this client so far
    pub(crate) fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

pub(crate) async fn connect(registry: &ChatRegistry) -> TestClient {
    let (tx, rx) = mpsc::channel(64);
    let client = registry
        .register(Arc::new(ChannelMessagePusher::new(tx)))
        .await;
    TestClient { client, rx }
}

/// Register a client, name it, join `room_name`, and discard the setup output
pub(crate) async fn connect_named_in_room(
    registry: &ChatRegistry,
    name: &str,
    room_name: &str,
) -> TestClient {
    let mut test_client = connect(registry).await;
    registry
        .set_username(&test_client.client, name)
        .await
        .unwrap();
    registry.join_room(&test_client.client, room(room_name)).await;
    test_client.drain();
    test_client
}
