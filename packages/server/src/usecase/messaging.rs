//! Directed and broadcast messaging on the registry.

use std::sync::Arc;

use crate::domain::{ChatError, Client, Message};

use super::registry::{ChatRegistry, LastMessage};

impl ChatRegistry {
    /// `/msg`: deliver `text` to the client named `target_name` and make the
    /// two parties each other's reply target.
    pub async fn send_private_message(
        &self,
        client: &Arc<Client>,
        target_name: &str,
        text: &str,
    ) -> Result<(), ChatError> {
        let target = self
            .find_client(target_name)
            .await
            .ok_or_else(|| ChatError::UserNotFound(target_name.to_string()))?;
        self.deliver_private_message(client, &target, target_name, text)
            .await
    }

    /// Second half of `/msg`, once `target` has been looked up by name.
    ///
    /// The target may have unregistered since the lookup; that is checked
    /// again under the write lock and reported as not found.
    async fn deliver_private_message(
        &self,
        client: &Arc<Client>,
        target: &Arc<Client>,
        target_name: &str,
        text: &str,
    ) -> Result<(), ChatError> {
        if target.id() == client.id() {
            return Err(ChatError::SelfMessage);
        }
        let username = client.username().await;

        {
            let mut state = self.state.write().await;
            if !state.clients.contains_key(&target.id()) {
                return Err(ChatError::UserNotFound(target_name.to_string()));
            }
            state.set_reply_target(target.id(), client.clone());
            state.set_reply_target(client.id(), target.clone());
            state.last_message = Some(LastMessage {
                sender: client.id(),
                message: Message::chat(
                    username.clone(),
                    format!("[Private to {}] {}", target_name, text),
                ),
            });
        }

        target
            .send(&format!("[Private from {}]: {}", username, text))
            .await;
        client
            .send(&format!("[Private to {}]: {}", target_name, text))
            .await;
        Ok(())
    }

    /// `/all`: chat to the sender's current room, echoed back to the sender.
    ///
    /// Every other member's reply target becomes the sender.
    pub async fn send_to_room(&self, client: &Arc<Client>, text: &str) -> Result<(), ChatError> {
        let room_name = client.room().await.ok_or(ChatError::NotInRoom)?;
        let message = Message::chat(client.username().await, text);

        let room = {
            let mut state = self.state.write().await;
            let room = state
                .rooms
                .get(&room_name)
                .cloned()
                .ok_or(ChatError::NotInRoom)?;
            for member in room.member_ids().await {
                if member != client.id() {
                    state.set_reply_target(member, client.clone());
                }
            }
            state.last_message = Some(LastMessage {
                sender: client.id(),
                message: message.clone(),
            });
            room
        };

        room.broadcast(&message, None).await;
        Ok(())
    }

    /// `/global`: deliver to every other connected client, with a separate
    /// confirmation to the sender. No room membership required.
    pub async fn broadcast_global(&self, client: &Arc<Client>, text: &str) {
        let username = client.username().await;

        let recipients: Vec<Arc<Client>> = {
            let mut state = self.state.write().await;
            let recipients: Vec<Arc<Client>> = state
                .clients
                .values()
                .filter(|other| other.id() != client.id())
                .cloned()
                .collect();
            for recipient in &recipients {
                state.set_reply_target(recipient.id(), client.clone());
            }
            state.last_message = Some(LastMessage {
                sender: client.id(),
                message: Message::chat(username.clone(), text),
            });
            recipients
        };

        let line = format!("[GLOBAL] {}: {}", username, text);
        for recipient in &recipients {
            recipient.send(&line).await;
        }
        client
            .send(&format!("[GLOBAL MESSAGE SENT]: {}", text))
            .await;

        tracing::debug!(
            "Global message from '{}' delivered to {} clients",
            username,
            recipients.len()
        );
    }

    /// `/r`: deliver `text` to the caller's reply target only.
    ///
    /// A target that is no longer registered is reported and purged. Replying
    /// does not change any reply target.
    pub async fn reply(&self, client: &Arc<Client>, text: &str) -> Result<(), ChatError> {
        let target = {
            let mut state = self.state.write().await;
            let current = state.reply_targets.get(&client.id()).cloned();
            match current {
                Some(target) if state.clients.contains_key(&target.id()) => target,
                Some(stale) => {
                    state.reply_targets.remove(&client.id());
                    return Err(ChatError::ReplyTargetGone(stale.username().await));
                }
                None => {
                    return match state.departed_reply_targets.remove(&client.id()) {
                        Some(departed) => Err(ChatError::ReplyTargetGone(departed)),
                        None => Err(ChatError::NothingToReplyTo),
                    };
                }
            }
        };

        let username = client.username().await;
        let target_name = target.username().await;
        let content = format!("@{} {}", target_name, text);

        target
            .send(&format!("[REPLY from {}]: {}", username, content))
            .await;
        client
            .send(&format!("[REPLY to {}]: {}", target_name, content))
            .await;
        Ok(())
    }

    /// `/users`: list the members of the caller's room, marking the caller
    pub async fn list_users(&self, client: &Client) -> Result<(), ChatError> {
        let room_name = client.room().await.ok_or(ChatError::NotInRoom)?;
        let room = self.room(&room_name).await.ok_or(ChatError::NotInRoom)?;

        let members = room.list_usernames().await;
        if members.is_empty() {
            client.send("No users in this room").await;
            return Ok(());
        }

        client.send(&format!("Users in {}:", room_name)).await;
        for (id, username) in members {
            if id == client.id() {
                client.send(&format!("  - {} (you)", username)).await;
            } else {
                client.send(&format!("  - {}", username)).await;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageKind, pusher::MockMessagePusher},
        usecase::test_support::{
            TEST_STAMP, connect, connect_named_in_room, create_test_registry, room,
        },
    };

    #[tokio::test]
    async fn test_private_message_sets_bidirectional_reply_targets() {
        // テスト項目: /msg で双方の返信先が互いに設定される
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "tech").await;

        // when (操作):
        let result = registry
            .send_private_message(&alice.client, "bob", "hello")
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(bob.drain(), vec!["[Private from alice]: hello"]);
        assert_eq!(alice.drain(), vec!["[Private to bob]: hello"]);
        assert_eq!(
            registry.reply_target(&alice.client.id()).await,
            Some(bob.client.id())
        );
        assert_eq!(
            registry.reply_target(&bob.client.id()).await,
            Some(alice.client.id())
        );
        let last = registry.last_message().await.unwrap();
        assert_eq!(last.sender, alice.client.id());
        assert_eq!(last.message.content, "[Private to bob] hello");
    }

    #[tokio::test]
    async fn test_private_message_unknown_target() {
        // テスト項目: 存在しないユーザーへの /msg は "not found" になり状態は変わらない
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect_named_in_room(&registry, "alice", "general").await;

        // when (操作):
        let result = registry
            .send_private_message(&alice.client, "nobody", "hello")
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::UserNotFound("nobody".to_string())));
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
        assert!(registry.last_message().await.is_none());
    }

    #[tokio::test]
    async fn test_private_message_to_target_unregistered_after_lookup() {
        // テスト項目: 名前解決後に切断した相手への /msg は "not found" になり、返信先も確認も残らない
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "tech").await;
        let target = registry.find_client("bob").await.unwrap();
        registry.unregister(&bob.client).await;

        // when (操作):
        let result = registry
            .deliver_private_message(&alice.client, &target, "bob", "hello")
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::UserNotFound("bob".to_string())));
        assert!(registry.reply_target(&bob.client.id()).await.is_none());
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
        assert!(registry.last_message().await.is_none());
        assert!(alice.drain().is_empty());
        assert!(bob.drain().is_empty());
    }

    #[tokio::test]
    async fn test_private_message_to_self_is_rejected() {
        // テスト項目: 自分自身への /msg は拒否される
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect_named_in_room(&registry, "alice", "general").await;

        // when (操作):
        let result = registry
            .send_private_message(&alice.client, "alice", "hello")
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::SelfMessage));
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_reply_is_delivered_only_to_target() {
        // テスト項目: /msg の後の /r は相手だけに届き、返信先は変化しない
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "general").await;
        let mut carol = connect_named_in_room(&registry, "carol", "general").await;
        registry
            .send_private_message(&alice.client, "bob", "hello")
            .await
            .unwrap();
        alice.drain();
        bob.drain();
        carol.drain();

        // when (操作):
        let result = registry.reply(&bob.client, "hi back").await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(alice.drain(), vec!["[REPLY from bob]: @alice hi back"]);
        assert_eq!(bob.drain(), vec!["[REPLY to alice]: @alice hi back"]);
        assert!(carol.drain().is_empty());
        assert_eq!(
            registry.reply_target(&bob.client.id()).await,
            Some(alice.client.id())
        );
    }

    #[tokio::test]
    async fn test_reply_without_target() {
        // テスト項目: 返信先がない場合は "No one to reply to"
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect(&registry).await;

        // when (操作):
        let result = registry.reply(&alice.client, "anyone?").await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::NothingToReplyTo));
    }

    #[tokio::test]
    async fn test_reply_after_target_disconnected() {
        // テスト項目: 返信先が切断済みなら "no longer connected" が 1 度だけ報告され、対応付けは消えている
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect_named_in_room(&registry, "alice", "general").await;
        let bob = connect_named_in_room(&registry, "bob", "tech").await;
        registry
            .send_private_message(&alice.client, "bob", "hello")
            .await
            .unwrap();
        registry.unregister(&bob.client).await;

        // when (操作):
        let first = registry.reply(&alice.client, "still there?").await;
        let second = registry.reply(&alice.client, "hello?").await;

        // then (期待する結果):
        assert_eq!(first, Err(ChatError::ReplyTargetGone("bob".to_string())));
        assert_eq!(second, Err(ChatError::NothingToReplyTo));
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_reply_purges_stale_entry() {
        // テスト項目: 登録されていないクライアントを指す古い返信先は報告後に削除される
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect(&registry).await;
        let ghost = connect(&registry).await;
        registry.set_username(&ghost.client, "ghost").await.unwrap();
        {
            let mut state = registry.state.write().await;
            state.set_reply_target(alice.client.id(), ghost.client.clone());
            state.clients.remove(&ghost.client.id());
        }

        // when (操作):
        let result = registry.reply(&alice.client, "boo").await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::ReplyTargetGone("ghost".to_string())));
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_new_reply_target_clears_departed_notice() {
        // テスト項目: 切断通知が残っていても、新しい返信先が設定されればそちらが優先される
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let bob = connect_named_in_room(&registry, "bob", "general").await;
        let mut carol = connect_named_in_room(&registry, "carol", "tech").await;
        registry
            .send_private_message(&alice.client, "bob", "hello")
            .await
            .unwrap();
        registry.unregister(&bob.client).await;
        registry
            .send_private_message(&carol.client, "alice", "hey")
            .await
            .unwrap();
        alice.drain();
        carol.drain();

        // when (操作):
        let result = registry.reply(&alice.client, "hi carol").await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(carol.drain(), vec!["[REPLY from alice]: @carol hi carol"]);
    }

    #[tokio::test]
    async fn test_room_message_echoes_to_sender() {
        // テスト項目: /all はルーム全員（送信者を含む）に同じ形式で届く
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "general").await;
        let mut carol = connect_named_in_room(&registry, "carol", "tech").await;
        alice.drain();

        // when (操作):
        let result = registry.send_to_room(&alice.client, "hi").await;

        // then (期待する結果):
        let expected = vec![format!("{} alice: hi", TEST_STAMP)];
        assert_eq!(result, Ok(()));
        assert_eq!(alice.drain(), expected);
        assert_eq!(bob.drain(), expected);
        assert!(carol.drain().is_empty());
    }

    #[tokio::test]
    async fn test_room_message_sets_reply_targets_for_other_members() {
        // テスト項目: /all で同じルームの他メンバーの返信先が送信者になる
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect_named_in_room(&registry, "alice", "general").await;
        let bob = connect_named_in_room(&registry, "bob", "general").await;
        let carol = connect_named_in_room(&registry, "carol", "tech").await;

        // when (操作):
        registry.send_to_room(&alice.client, "hi").await.unwrap();

        // then (期待する結果):
        assert_eq!(
            registry.reply_target(&bob.client.id()).await,
            Some(alice.client.id())
        );
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
        assert!(registry.reply_target(&carol.client.id()).await.is_none());
        let last = registry.last_message().await.unwrap();
        assert_eq!(last.message.kind, MessageKind::Chat);
        assert_eq!(last.message.content, "hi");
    }

    #[tokio::test]
    async fn test_room_message_requires_room() {
        // テスト項目: ルーム未参加での /all はエラーになる
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect(&registry).await;

        // when (操作):
        let result = registry.send_to_room(&alice.client, "hi").await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::NotInRoom));
        assert!(registry.last_message().await.is_none());
    }

    #[tokio::test]
    async fn test_global_message_excludes_sender_and_confirms() {
        // テスト項目: /global は送信者以外の全員に届き、送信者には確認だけが届く
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "tech").await;
        let mut lurker = connect(&registry).await;

        // when (操作):
        registry.broadcast_global(&alice.client, "hi").await;

        // then (期待する結果):
        assert_eq!(alice.drain(), vec!["[GLOBAL MESSAGE SENT]: hi"]);
        assert_eq!(bob.drain(), vec!["[GLOBAL] alice: hi"]);
        assert_eq!(lurker.drain(), vec!["[GLOBAL] alice: hi"]);
        assert_eq!(
            registry.reply_target(&lurker.client.id()).await,
            Some(alice.client.id())
        );
        assert!(registry.reply_target(&alice.client.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_global_message_delivery_is_exact() {
        // テスト項目: /global の受信者には整形済みの 1 行だけが 1 回送られる
        // given (前提条件):
        let registry = create_test_registry();
        let mut recipient = MockMessagePusher::new();
        recipient
            .expect_push()
            .withf(|line| line == "[GLOBAL] User_1: ping")
            .times(1)
            .returning(|_| Ok(()));
        let sender = connect(&registry).await;
        let _recipient = registry.register(Arc::new(recipient)).await;

        // when (操作):
        registry.broadcast_global(&sender.client, "ping").await;

        // then (期待する結果): mock expectations are verified on drop
        assert_eq!(registry.client_count().await, 2);
    }

    #[tokio::test]
    async fn test_list_users_marks_caller() {
        // テスト項目: 3 人が general に参加し、/users で 3 人が表示され自分に (you) が付く
        // given (前提条件):
        let registry = create_test_registry();
        let _alice = connect_named_in_room(&registry, "alice", "general").await;
        let mut bob = connect_named_in_room(&registry, "bob", "general").await;
        let _carol = connect_named_in_room(&registry, "carol", "general").await;
        bob.drain();

        // when (操作):
        let result = registry.list_users(&bob.client).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(
            bob.drain(),
            vec![
                "Users in general:",
                "  - alice",
                "  - bob (you)",
                "  - carol",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_users_requires_room() {
        // テスト項目: ルーム未参加での /users はエラーになる
        // given (前提条件):
        let registry = create_test_registry();
        let alice = connect(&registry).await;

        // when (操作):
        let result = registry.list_users(&alice.client).await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::NotInRoom));
    }

    #[tokio::test]
    async fn test_list_users_in_empty_room() {
        // テスト項目: メンバーが 0 人のスナップショットでは "No users in this room"
        // given (前提条件):
        let registry = create_test_registry();
        let mut alice = connect_named_in_room(&registry, "alice", "general").await;
        let general = registry.room(&room("general")).await.unwrap();
        general.remove(&alice.client.id()).await;

        // when (操作):
        let result = registry.list_users(&alice.client).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert_eq!(alice.drain(), vec!["No users in this room"]);
    }
}
