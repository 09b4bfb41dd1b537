//! Command dispatcher.

use std::sync::Arc;

use crate::domain::{ChatError, Client, Command};

use super::registry::ChatRegistry;

impl ChatRegistry {
    /// Parse and execute one input line from `client`.
    ///
    /// Any [`ChatError`] is reported back to the client as a single line;
    /// the session always continues.
    pub async fn dispatch(&self, client: &Arc<Client>, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        tracing::debug!("Client '{}' sent: {}", client.id(), line);

        let result = match Command::parse(line) {
            Ok(command) => self.execute(client, command).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::debug!("Command from client '{}' rejected: {}", client.id(), e);
            client.send(&e.to_string()).await;
        }
    }

    /// Execute an already parsed command
    pub async fn execute(&self, client: &Arc<Client>, command: Command) -> Result<(), ChatError> {
        match command {
            Command::SetName { name } => self.set_username(client, &name).await,
            Command::ListRooms => {
                self.list_rooms(client).await;
                Ok(())
            }
            Command::Join { room } => {
                self.join_room(client, room).await;
                Ok(())
            }
            Command::PrivateMessage { target, text } => {
                self.send_private_message(client, &target, &text).await
            }
            Command::RoomMessage { text } => self.send_to_room(client, &text).await,
            Command::Global { text } => {
                self.broadcast_global(client, &text).await;
                Ok(())
            }
            Command::Reply { text } => self.reply(client, &text).await,
            Command::ListUsers => self.list_users(client).await,
            Command::Create { room } => {
                self.create_room(room.clone()).await;
                client
                    .send(&format!(
                        "Room '{}' created! Use /join {} to enter.",
                        room, room
                    ))
                    .await;
                Ok(())
            }
        }
    }
}
