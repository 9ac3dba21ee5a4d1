//! TU state (§ 3).

/// The state of a single telephone unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuState {
    /// Idle; handset down.
    OnHook,
    /// Being called by a peer.
    Ringing,
    /// Off-hook, awaiting dialing.
    DialTone,
    /// Calling a peer that is ringing.
    RingBack,
    /// Last dial attempt found the peer non-idle.
    BusySignal,
    /// In an active call with a peer.
    Connected,
    /// Last dial targeted a non-existent extension.
    Error,
}

impl TuState {
    /// The exact uppercase wire token for this state (§ 6.2).
    pub fn wire_name(self) -> &'static str {
        match self {
            TuState::OnHook => "ON_HOOK",
            TuState::Ringing => "RINGING",
            TuState::DialTone => "DIAL_TONE",
            TuState::RingBack => "RING_BACK",
            TuState::BusySignal => "BUSY_SIGNAL",
            TuState::Connected => "CONNECTED",
            TuState::Error => "ERROR",
        }
    }

    /// True for states in which a `peer_extension` must be present
    /// (invariant 1, § 3).
    pub fn has_peer(self) -> bool {
        matches!(self, TuState::Ringing | TuState::RingBack | TuState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_spec_tokens() {
        assert_eq!(TuState::OnHook.wire_name(), "ON_HOOK");
        assert_eq!(TuState::Ringing.wire_name(), "RINGING");
        assert_eq!(TuState::DialTone.wire_name(), "DIAL_TONE");
        assert_eq!(TuState::RingBack.wire_name(), "RING_BACK");
        assert_eq!(TuState::BusySignal.wire_name(), "BUSY_SIGNAL");
        assert_eq!(TuState::Connected.wire_name(), "CONNECTED");
        assert_eq!(TuState::Error.wire_name(), "ERROR");
    }

    #[test]
    fn has_peer_matches_invariant_1() {
        for state in [TuState::Ringing, TuState::RingBack, TuState::Connected] {
            assert!(state.has_peer());
        }
        for state in [TuState::OnHook, TuState::DialTone, TuState::BusySignal, TuState::Error] {
            assert!(!state.has_peer());
        }
    }
}
