//! The PBX registry (§ 4.2, § 5): a fixed-capacity, mutex-serialized table
//! of TUs, and the public operations the service loop drives it with.

use std::fmt;
use std::sync::Mutex;

use crate::engine;
use crate::error::PbxError;
use crate::sink::Sink;
use crate::tu::Tu;

/// Capacity used by [`Pbx::new`] when no explicit capacity is given.
/// Corresponds to the source's `PBX_MAX_EXTENSIONS`.
pub const DEFAULT_MAX_EXTENSIONS: usize = 1024;

/// A stable handle to a registered TU, valid for the lifetime of its
/// registration. Opaque outside this crate beyond its numeric value,
/// which callers may use for display/logging and as the `<ext>` argument
/// to [`Pbx::dial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extension(usize);

impl Extension {
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The PBX: a fixed-capacity extension registry plus the four
/// state-engine operations (§ 4.3), all serialized by a single
/// process-wide lock (§ 5).
pub struct Pbx {
    capacity: usize,
    slots: Mutex<Vec<Option<Tu>>>,
}

impl Pbx {
    /// Creates a PBX with [`DEFAULT_MAX_EXTENSIONS`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EXTENSIONS)
    }

    /// Creates a PBX with a caller-chosen extension capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        tracing::info!(capacity, "PBX registry initialized");
        Self {
            capacity,
            slots: Mutex::new(slots),
        }
    }

    /// The configured extension capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a new TU, assigning it the lowest free extension.
    ///
    /// `conn_id` is an opaque caller-supplied identifier (e.g. a socket's
    /// peer address or file descriptor) used only for log correlation; it
    /// plays no role in extension assignment (§ 3, Open Question).
    pub fn register(&self, conn_id: u64, sink: Box<dyn Sink>) -> Result<Extension, PbxError> {
        let mut slots = self.slots.lock().unwrap();
        let free = slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(PbxError::RegistryFull)?;

        let mut tu = Tu::new(free, sink);
        let line = pbx_proto::notify::format_notification(tu.state().wire_name(), Some(free as i64));
        if let Err(e) = tu.sink_mut().write_line(&line) {
            tracing::warn!(conn_id, extension = free, error = %e, "failed writing initial notification");
        }
        slots[free] = Some(tu);

        tracing::debug!(conn_id, extension = free, "TU registered");
        Ok(Extension(free))
    }

    /// Unregisters a TU, performing the hangup-style joint transition on
    /// its peer if it was in a call-related state (§ 4.2). The caller is
    /// responsible for closing the TU's own sink afterward.
    pub fn unregister(&self, tu: Extension) -> Result<(), PbxError> {
        let mut slots = self.slots.lock().unwrap();
        if slots.get(tu.0).and_then(Option::as_ref).is_none() {
            return Err(PbxError::InvalidExtension(tu.as_i64()));
        }
        engine::unregister_joint_effect(&mut slots, tu.0);
        slots[tu.0] = None;
        tracing::debug!(extension = tu.0, "TU unregistered");
        Ok(())
    }

    /// Pickup (§ 4.3).
    pub fn pickup(&self, tu: Extension) -> Result<(), PbxError> {
        let mut slots = self.slots.lock().unwrap();
        engine::pickup(&mut slots, tu.0)
    }

    /// Hangup (§ 4.3).
    pub fn hangup(&self, tu: Extension) -> Result<(), PbxError> {
        let mut slots = self.slots.lock().unwrap();
        engine::hangup(&mut slots, tu.0)
    }

    /// Dial (§ 4.3).
    pub fn dial(&self, tu: Extension, target: i64) -> Result<(), PbxError> {
        let mut slots = self.slots.lock().unwrap();
        engine::dial(&mut slots, tu.0, target)
    }

    /// Chat (§ 4.3).
    pub fn chat(&self, tu: Extension, message: &str) -> Result<(), PbxError> {
        let mut slots = self.slots.lock().unwrap();
        engine::chat(&mut slots, tu.0, message)
    }

    /// Returns a registered TU's current state and peer, for tests and
    /// diagnostics. Not part of the command surface itself.
    pub fn snapshot(&self, tu: Extension) -> Option<(crate::state::TuState, Option<usize>)> {
        let slots = self.slots.lock().unwrap();
        slots
            .get(tu.0)
            .and_then(Option::as_ref)
            .map(|t| (t.state(), t.peer()))
    }

    /// Shuts down the PBX (§ 4.5): force-closes every registered TU's
    /// sink, which unblocks each service loop at its next read. Idempotent
    /// in the sense that a PBX with no registered TUs is a no-op; callers
    /// drive repeat-shutdown idempotence (a second signal) at a higher
    /// level, since by the time this returns the registry's slots are
    /// untouched (unregistration still happens through the normal service
    /// loop path as each connection observes end-of-input).
    pub fn shutdown(&self) {
        let mut slots = self.slots.lock().unwrap();
        let mut closed = 0;
        for slot in slots.iter_mut().flatten() {
            slot.sink_mut().shutdown();
            closed += 1;
        }
        tracing::info!(closed, "PBX shutdown: closed all TU sinks");
    }
}

impl Default for Pbx {
    fn default() -> Self {
        Self::new()
    }
}
