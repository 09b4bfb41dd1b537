//! Error types for the chat domain.
//!
//! The `Display` text of [`ChatError`] is exactly the line sent back to the
//! client that issued the failing command.

use thiserror::Error;

/// Validation errors raised while building value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Username cannot be empty or just whitespace!")]
    EmptyUsername,

    #[error("Username cannot contain spaces! Please choose a different username.")]
    UsernameContainsSpaces,

    #[error("Room name cannot be empty!")]
    EmptyRoomName,

    #[error("Room name cannot contain spaces!")]
    RoomNameContainsSpaces,
}

/// Message-level failures. None of these ends a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Input did not start with `/`
    #[error(
        "Commands must start with /. Try /list, /join <room>, /msg <username> <message>, /all <message>, /global <message>, or /r <reply>"
    )]
    NotACommand,

    #[error(
        "Unknown command. Available: /list, /join <room>, /msg <username> <message>, /all <message>, /global <message>, /r <reply>, /users, /create <room>"
    )]
    UnknownCommand,

    /// A required argument was missing; carries the command synopsis
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),

    #[error("Username already taken! Please choose a different username.")]
    UsernameTaken,

    #[error("User '{0}' not found or not online")]
    UserNotFound(String),

    #[error("You cannot send a private message to yourself!")]
    SelfMessage,

    #[error("You must join a room first! Use /list to see available rooms.")]
    NotInRoom,

    #[error("No one to reply to. Send or receive a message first.")]
    NothingToReplyTo,

    /// Stale reply target; carries the departed username
    #[error("Cannot reply - {0} is no longer connected.")]
    ReplyTargetGone(String),
}

/// Failure to hand a line to one recipient's outbound queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("outbound queue is full")]
    QueueFull,

    #[error("connection is closed")]
    Closed,
}
