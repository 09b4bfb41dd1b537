//! Connection session loop.
//!
//! One task per accepted connection. The session task reads lines and runs
//! the registry's dispatcher itself; the write side is a separate task
//! draining the client's outbound queue. A dispatch always runs to
//! completion: the session only stops between lines, when the connection
//! ends or the writer task has finished. The client is then unregistered.

use std::{borrow::Cow, net::SocketAddr, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::codec::{AnyDelimiterCodec, FramedRead, FramedWrite, LinesCodec};

use crate::{
    config::ServerConfig, domain::Client,
    infrastructure::message_pusher::ChannelMessagePusher, usecase::ChatRegistry,
};

/// Per-connection limits taken from [`ServerConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub outbound_queue_capacity: usize,
    pub max_line_length: usize,
}

impl From<&ServerConfig> for SessionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            outbound_queue_capacity: config.outbound_queue_capacity,
            max_line_length: config.max_line_length,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// Run one session from registration to unregistration.
///
/// The connection is closed when this returns, whichever side ended it.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<ChatRegistry>,
    settings: SessionSettings,
) {
    let (reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::channel(settings.outbound_queue_capacity);

    let client = registry
        .register(Arc::new(ChannelMessagePusher::new(tx)))
        .await;
    tracing::info!("Client '{}' connected from {}", client.id(), peer);
    client
        .send(&format!(
            "Connected as {}. Use /setname <name> to change it.",
            client.username().await
        ))
        .await;

    let mut send_task = pusher_loop(rx, FramedWrite::new(writer, LinesCodec::new()));
    let lines = FramedRead::new(reader, line_codec(settings.max_line_length));

    read_loop(lines, &mut send_task, &registry, &client).await;
    send_task.abort();

    registry.unregister(&client).await;
    tracing::info!("Client '{}' from {} disconnected", client.id(), peer);
}

/// `\n`-delimited byte lines, capped at `max_line_length`
fn line_codec(max_line_length: usize) -> AnyDelimiterCodec {
    AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_line_length)
}

/// Decode one raw line; invalid UTF-8 is replaced, a trailing `\r` dropped
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Read lines and dispatch the non-blank ones until the connection ends or
/// the writer task finishes.
///
/// Only the wait for the next line races the writer, never a dispatch.
async fn read_loop(
    mut lines: FramedRead<OwnedReadHalf, AnyDelimiterCodec>,
    send_task: &mut JoinHandle<()>,
    registry: &ChatRegistry,
    client: &Arc<Client>,
) {
    loop {
        let raw = tokio::select! {
            next = lines.next() => match next {
                Some(Ok(raw)) => raw,
                Some(Err(e)) => {
                    tracing::warn!("Read error from client '{}': {}", client.id(), e);
                    return;
                }
                None => return,
            },
            _ = &mut *send_task => {
                tracing::debug!("Writer for client '{}' finished", client.id());
                return;
            }
        };

        let line = decode_line(&raw);
        if line.trim().is_empty() {
            continue;
        }
        registry.dispatch(client, &line).await;
    }
}

/// Drain the outbound queue into the connection, one line per message.
///
/// A write failure ends the task and with it the session.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sink: FramedWrite<OwnedWriteHalf, LinesCodec>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = sink.send(line).await {
                tracing::warn!("Write error, closing connection: {}", e);
                break;
            }
        }
    })
}
