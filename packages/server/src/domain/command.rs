//! Parsing of client input lines into commands.

use super::{error::ChatError, value_object::RoomName};

pub const SETNAME_USAGE: &str = "/setname <username>";
pub const JOIN_USAGE: &str = "/join <room_name>";
pub const MSG_USAGE: &str = "/msg <username> <message>";
pub const ALL_USAGE: &str = "/all <your_message>";
pub const GLOBAL_USAGE: &str = "/global <your_message>";
pub const REPLY_USAGE: &str = "/r <reply_message>";
pub const CREATE_USAGE: &str = "/create <room_name>";

/// One parsed client command with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/setname <name>`; the name is validated by the registry
    SetName { name: String },
    /// `/list`
    ListRooms,
    /// `/join <room>`
    Join { room: RoomName },
    /// `/msg <user> <text>`
    PrivateMessage { target: String, text: String },
    /// `/all <text>`
    RoomMessage { text: String },
    /// `/global <text>`
    Global { text: String },
    /// `/r <text>`
    Reply { text: String },
    /// `/users`
    ListUsers,
    /// `/create <room>`
    Create { room: RoomName },
}

impl Command {
    /// Parse one input line.
    ///
    /// Commands are case-sensitive. A missing required argument yields
    /// [`ChatError::Usage`] for that command and nothing else.
    pub fn parse(line: &str) -> Result<Self, ChatError> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Err(ChatError::NotACommand);
        }

        let (name, rest) = match line.split_once(' ') {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let required = |usage: &'static str| {
            if rest.is_empty() {
                Err(ChatError::Usage(usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match name {
            "/setname" => Ok(Self::SetName {
                name: required(SETNAME_USAGE)?,
            }),
            "/list" => Ok(Self::ListRooms),
            "/join" => Ok(Self::Join {
                room: RoomName::new(&required(JOIN_USAGE)?)?,
            }),
            "/msg" => {
                let args = required(MSG_USAGE)?;
                let (target, text) = args
                    .split_once(' ')
                    .map(|(target, text)| (target, text.trim()))
                    .filter(|(_, text)| !text.is_empty())
                    .ok_or(ChatError::Usage(MSG_USAGE))?;
                Ok(Self::PrivateMessage {
                    target: target.to_string(),
                    text: text.to_string(),
                })
            }
            "/all" => Ok(Self::RoomMessage {
                text: required(ALL_USAGE)?,
            }),
            "/global" => Ok(Self::Global {
                text: required(GLOBAL_USAGE)?,
            }),
            "/r" => Ok(Self::Reply {
                text: required(REPLY_USAGE)?,
            }),
            "/users" => Ok(Self::ListUsers),
            "/create" => Ok(Self::Create {
                room: RoomName::new(&required(CREATE_USAGE)?)?,
            }),
            _ => Err(ChatError::UnknownCommand),
        }
    }
}
