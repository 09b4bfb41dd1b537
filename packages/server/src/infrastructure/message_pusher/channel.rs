//! Bounded-queue `MessagePusher` implementation.
//!
//! ## 責務
//!
//! - 接続ごとの `mpsc::Sender` を保持する
//! - 行をキューへ積むだけで、ソケットへの書き込みは行わない
//!
//! ## 設計ノート
//!
//! キューの受信側は UI 層（`ui/session.rs`）の writer タスクが所有し、
//! TCP の書き込み側へ 1 行ずつ流します。ブロードキャスト中に遅い受信者が
//! いても他の受信者への配信は止まりません。キューが満杯の場合、その行は
//! その受信者に対してのみ破棄されます。

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::{MessagePusher, PushError};

/// `MessagePusher` backed by one connection's bounded outbound queue
pub struct ChannelMessagePusher {
    sender: mpsc::Sender<String>,
}

impl ChannelMessagePusher {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl MessagePusher for ChannelMessagePusher {
    async fn push(&self, line: &str) -> Result<(), PushError> {
        match self.sender.try_send(line.to_string()) {
            Ok(()) => {
                tracing::debug!("Queued line: {}", line);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(PushError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(PushError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_success() {
        // テスト項目: キューに空きがあれば行が積まれる
        // given (前提条件):
        let (tx, mut rx) = mpsc::channel(4);
        let pusher = ChannelMessagePusher::new(tx);

        // when (操作):
        let result = pusher.push("Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_full_queue_drops_line() {
        // テスト項目: キューが満杯の場合は QueueFull を返し、既存の行は残る
        // given (前提条件):
        let (tx, mut rx) = mpsc::channel(1);
        let pusher = ChannelMessagePusher::new(tx);
        pusher.push("first").await.unwrap();

        // when (操作):
        let result = pusher.push("second").await;

        // then (期待する結果):
        assert_eq!(result, Err(PushError::QueueFull));
        assert_eq!(rx.recv().await, Some("first".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped() {
        // テスト項目: writer タスク終了後（受信側 drop 後）は Closed を返す
        // given (前提条件):
        let (tx, rx) = mpsc::channel(4);
        let pusher = ChannelMessagePusher::new(tx);
        drop(rx);

        // when (操作):
        let result = pusher.push("Hello").await;

        // then (期待する結果):
        assert_eq!(result, Err(PushError::Closed));
    }
}
