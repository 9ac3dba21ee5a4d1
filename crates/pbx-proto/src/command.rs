//! Parsing of client -> server command lines (PBX wire protocol, § 6.2).

/// A single parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pickup,
    Hangup,
    Dial(i64),
    Chat(String),
}

/// Parses one already-trimmed line (no trailing `\r\n`) into a [`Command`].
///
/// Returns `None` for anything that isn't a recognized command, including a
/// `dial` line whose argument doesn't parse as a signed integer -- per spec
/// such lines are silently ignored before ever reaching the engine.
pub fn parse_command(line: &str) -> Option<Command> {
    if line == "pickup" {
        return Some(Command::Pickup);
    }
    if line == "hangup" {
        return Some(Command::Hangup);
    }
    if let Some(rest) = line.strip_prefix("dial ") {
        return rest.parse::<i64>().ok().map(Command::Dial);
    }
    if line == "chat" {
        return Some(Command::Chat(String::new()));
    }
    if let Some(rest) = line.strip_prefix("chat ") {
        return Some(Command::Chat(rest.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_pickup_and_hangup() {
        assert_eq!(parse_command("pickup"), Some(Command::Pickup));
        assert_eq!(parse_command("hangup"), Some(Command::Hangup));
    }

    #[test]
    fn parses_dial_argument() {
        assert_eq!(parse_command("dial 5"), Some(Command::Dial(5)));
        assert_eq!(parse_command("dial -1"), Some(Command::Dial(-1)));
    }

    #[test]
    fn ignores_malformed_dial() {
        assert_eq!(parse_command("dial five"), None);
        assert_eq!(parse_command("dial"), None);
    }

    #[test]
    fn parses_chat_with_and_without_message() {
        assert_eq!(
            parse_command("chat hello there"),
            Some(Command::Chat("hello there".to_string()))
        );
        assert_eq!(parse_command("chat"), Some(Command::Chat(String::new())));
    }

    #[test]
    fn ignores_unknown_lines() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("PICKUP"), None);
        assert_eq!(parse_command("dialtone"), None);
    }
}
