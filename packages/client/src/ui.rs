//! Terminal helpers for the client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{error::ClientError, input::resolve_username};

/// Redisplay the prompt after printing a received line
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Ask for a username on the terminal; blank input becomes `Anonymous`
pub fn prompt_username() -> Result<String, ClientError> {
    let mut rl = DefaultEditor::new().map_err(|e| ClientError::Readline(e.to_string()))?;
    match rl.readline("Enter your username: ") {
        Ok(line) => Ok(resolve_username(Some(&line))),
        Err(ReadlineError::Eof) => Ok(resolve_username(None)),
        Err(e) => Err(ClientError::Readline(e.to_string())),
    }
}
