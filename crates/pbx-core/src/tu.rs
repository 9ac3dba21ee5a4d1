//! The TU record (§ 3, § 4.1).

use crate::sink::Sink;
use crate::state::TuState;

/// One registered telephone unit.
///
/// Owned exclusively by the [`crate::Pbx`] registry; every field is only
/// ever read or mutated while the registry's lock is held (§ 5).
pub struct Tu {
    extension: usize,
    state: TuState,
    peer: Option<usize>,
    sink: Box<dyn Sink>,
}

impl Tu {
    pub(crate) fn new(extension: usize, sink: Box<dyn Sink>) -> Self {
        Self {
            extension,
            state: TuState::OnHook,
            peer: None,
            sink,
        }
    }

    /// The stable extension number this TU occupies in the registry.
    pub fn extension(&self) -> usize {
        self.extension
    }

    /// The TU's current state.
    pub fn state(&self) -> TuState {
        self.state
    }

    /// The peer extension, valid iff `state.has_peer()` (invariant 1, § 3).
    pub fn peer(&self) -> Option<usize> {
        self.peer
    }

    pub(crate) fn set_state(&mut self, state: TuState) {
        self.state = state;
    }

    pub(crate) fn set_peer(&mut self, peer: Option<usize>) {
        self.peer = peer;
    }

    pub(crate) fn sink_mut(&mut self) -> &mut dyn Sink {
        self.sink.as_mut()
    }
}
