//! Slash-command parsing for the input line.
//!
//! Lines starting with `/` are commands; anything else is a chat message.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/connect`: reconnect to the server.
    Connect,
    /// `/join <room> [name]`: join a room, optionally choosing a name.
    Join {
        /// Room code.
        room_id: String,
        /// Display name. `None` to use the configured default.
        display_name: Option<String>,
    },
    /// `/leave`: leave the joined room.
    Leave,
    /// `/quit`: exit.
    Quit,
    /// Plain text to send.
    Message {
        /// Message text, unmodified.
        body: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The command as typed.
        input: String,
    },
    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name.
        command: &'static str,
        /// What was wrong.
        error: &'static str,
    },
}

const NO_ARGS: &str = "takes no arguments";
const JOIN_USAGE: &str = "usage: /join <room> [name]";

/// Parse an input line.
pub fn parse(line: &str) -> Command {
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message { body: line.to_string() };
    };

    let mut words = rest.split_whitespace();
    let Some(name) = words.next() else {
        return Command::Unknown { input: line.to_string() };
    };
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("connect", []) => Command::Connect,
        ("connect", _) => Command::InvalidArgs { command: "connect", error: NO_ARGS },
        ("join" | "j", []) => Command::InvalidArgs { command: "join", error: JOIN_USAGE },
        ("join" | "j", [room]) => {
            Command::Join { room_id: (*room).to_string(), display_name: None }
        },
        ("join" | "j", [room, name @ ..]) => Command::Join {
            room_id: (*room).to_string(),
            display_name: Some(name.join(" ")),
        },
        ("leave" | "part", []) => Command::Leave,
        ("leave" | "part", _) => Command::InvalidArgs { command: "leave", error: NO_ARGS },
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Unknown { input: line.to_string() },
    }
}
