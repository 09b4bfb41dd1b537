//! Pure input handling for the client session.

/// Name used when the user leaves the username prompt blank
pub const DEFAULT_USERNAME: &str = "Anonymous";

/// Input line that ends the session locally
pub const QUIT_COMMAND: &str = "/quit";

/// What to do with one line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Forward the line to the server
    Send(String),
    /// Close the connection
    Quit,
    /// Nothing to send
    Skip,
}

/// Classify a line typed by the user
pub fn classify(line: &str) -> InputAction {
    let line = line.trim();
    if line.is_empty() {
        InputAction::Skip
    } else if line == QUIT_COMMAND {
        InputAction::Quit
    } else {
        InputAction::Send(line.to_string())
    }
}

/// Trimmed username, or [`DEFAULT_USERNAME`] when blank
pub fn resolve_username(input: Option<&str>) -> String {
    match input.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_USERNAME.to_string(),
    }
}

/// First line the client sends after connecting
pub fn handshake_line(username: &str) -> String {
    format!("/setname {}", username)
}
