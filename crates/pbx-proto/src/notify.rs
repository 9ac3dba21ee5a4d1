//! Formatting of server -> client lines (PBX wire protocol, § 6.2).

/// Formats a state notification line.
///
/// `suffix` is `Some(extension)` for `ON_HOOK`, `Some(peer_extension)` for
/// `CONNECTED`, and `None` for every other state -- the caller decides which,
/// since this module has no notion of TU state.
pub fn format_notification(state_name: &str, suffix: Option<i64>) -> Vec<u8> {
    match suffix {
        Some(n) => format!("{state_name} {n}\r\n").into_bytes(),
        None => format!("{state_name}\r\n").into_bytes(),
    }
}

/// Formats a `CHAT` delivery line. Unlike state notifications this is
/// terminated by a bare `\n`, matching the source's observable behavior.
pub fn format_chat(message: &str) -> Vec<u8> {
    format!("CHAT {message}\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_on_hook_with_extension() {
        assert_eq!(format_notification("ON_HOOK", Some(4)), b"ON_HOOK 4\r\n");
    }

    #[test]
    fn formats_connected_with_peer() {
        assert_eq!(format_notification("CONNECTED", Some(5)), b"CONNECTED 5\r\n");
    }

    #[test]
    fn formats_bare_state() {
        assert_eq!(format_notification("DIAL_TONE", None), b"DIAL_TONE\r\n");
        assert_eq!(format_notification("RINGING", None), b"RINGING\r\n");
    }

    #[test]
    fn formats_chat_with_lf_only() {
        assert_eq!(format_chat("hello"), b"CHAT hello\n");
    }
}
