//! TCP client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::{
    error::ClientError,
    input::{InputAction, classify, handshake_line},
    ui::redisplay_prompt,
};

/// Run one chat session against the server at `addr`.
///
/// Returns `Ok` when the user quits (`/quit`, Ctrl+C or Ctrl+D) and
/// [`ClientError::ConnectionLost`] when the server goes away first.
pub async fn run_client_session(addr: &str, username: &str) -> Result<(), ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.to_string(),
            source,
        })?;
    tracing::info!("Connected to chat server at {}", addr);

    let (reader, writer) = stream.into_split();
    let mut lines = FramedRead::new(reader, LinesCodec::new());
    let mut sink = FramedWrite::new(writer, LinesCodec::new());

    sink.send(handshake_line(username))
        .await
        .map_err(|e| ClientError::ConnectionLost(e.to_string()))?;
    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Type /quit to exit.\n",
        username
    );

    // Spawn a task to print incoming lines
    let username_for_read = username.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => {
                    println!("\r{}", line);
                    redisplay_prompt(&username_for_read);
                }
                Err(e) => {
                    tracing::warn!("Read error: {}", e);
                    return;
                }
            }
        }
        tracing::info!("Server closed the connection");
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", username);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.trim()).ok();
                    }
                    let quit = classify(&line) == InputAction::Quit;
                    if input_tx.send(line).is_err() || quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Forward typed lines; returns whether the connection failed
    let mut write_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            match classify(&line) {
                InputAction::Skip => continue,
                InputAction::Quit => break,
                InputAction::Send(line) => {
                    if let Err(e) = sink.send(line).await {
                        tracing::warn!("Failed to send line: {}", e);
                        return true;
                    }
                }
            }
        }
        false
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            Err(ClientError::ConnectionLost("Server closed the connection".to_string()))
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(true) {
                Err(ClientError::ConnectionLost("Failed to send".to_string()))
            } else {
                tracing::info!("Client session ended normally");
                Ok(())
            }
        }
    }
}
