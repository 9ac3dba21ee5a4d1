//! The state engine: transition tables for pickup/hangup/dial/chat and the
//! joint updates they perform on a peer TU (§ 4.3).
//!
//! Every function here assumes the caller already holds the registry lock
//! for its entire duration, per § 5 -- none of them lock anything
//! themselves.

use crate::error::PbxError;
use crate::state::TuState;
use crate::tu::Tu;

type Slots = [Option<Tu>];

fn get(slots: &Slots, ext: usize) -> Result<&Tu, PbxError> {
    slots
        .get(ext)
        .and_then(Option::as_ref)
        .ok_or(PbxError::InvalidExtension(ext as i64))
}

fn get_mut(slots: &mut Slots, ext: usize) -> Result<&mut Tu, PbxError> {
    slots
        .get_mut(ext)
        .and_then(Option::as_mut)
        .ok_or(PbxError::InvalidExtension(ext as i64))
}

fn state_line(tu: &Tu) -> Vec<u8> {
    let suffix = match tu.state() {
        TuState::OnHook => Some(tu.extension() as i64),
        TuState::Connected => tu.peer().map(|p| p as i64),
        _ => None,
    };
    pbx_proto::notify::format_notification(tu.state().wire_name(), suffix)
}

/// Re-emits `tu`'s current state to its own sink, per § 4.1's line format.
/// Propagated as an error to the caller -- the one case in which a TU's own
/// transport failure surfaces through the public API (§ 6.1, § 7).
fn notify_self(tu: &mut Tu) -> Result<(), PbxError> {
    let line = state_line(tu);
    tu.sink_mut().write_line(&line).map_err(PbxError::from)
}

/// Notifies a peer affected by a joint transition. Per § 4.1, sink write
/// failures here are logged and otherwise ignored -- they must never roll
/// back the state change that already happened, and they are not this
/// command's own I/O result.
fn notify_peer_best_effort(tu: &mut Tu) {
    let line = state_line(tu);
    if let Err(e) = tu.sink_mut().write_line(&line) {
        tracing::warn!(extension = tu.extension(), error = %e, "failed writing peer notification");
    }
}

/// Pickup (§ 4.3).
pub(crate) fn pickup(slots: &mut Slots, ext: usize) -> Result<(), PbxError> {
    let current = get(slots, ext)?.state();

    match current {
        TuState::OnHook => {
            get_mut(slots, ext)?.set_state(TuState::DialTone);
        }
        TuState::Ringing => {
            let peer_ext = get(slots, ext)?.peer();
            get_mut(slots, ext)?.set_state(TuState::Connected);
            if let Some(peer_ext) = peer_ext {
                if let Ok(peer) = get_mut(slots, peer_ext) {
                    peer.set_state(TuState::Connected);
                    notify_peer_best_effort(peer);
                }
            }
        }
        _ => {}
    }

    tracing::debug!(extension = ext, ?current, "pickup");
    notify_self(get_mut(slots, ext)?)
}

/// Hangup (§ 4.3).
pub(crate) fn hangup(slots: &mut Slots, ext: usize) -> Result<(), PbxError> {
    let current = get(slots, ext)?.state();

    match current {
        TuState::Connected | TuState::RingBack | TuState::Ringing => {
            let peer_ext = get(slots, ext)?.peer();
            let peer_new_state = match current {
                TuState::Connected => TuState::DialTone,
                TuState::RingBack => TuState::OnHook,
                TuState::Ringing => TuState::DialTone,
                _ => unreachable!(),
            };

            get_mut(slots, ext)?.set_state(TuState::OnHook);
            get_mut(slots, ext)?.set_peer(None);

            if let Some(peer_ext) = peer_ext {
                if let Ok(peer) = get_mut(slots, peer_ext) {
                    peer.set_state(peer_new_state);
                    peer.set_peer(None);
                    notify_peer_best_effort(peer);
                }
            }
        }
        TuState::DialTone | TuState::BusySignal | TuState::Error => {
            get_mut(slots, ext)?.set_state(TuState::OnHook);
        }
        TuState::OnHook => {}
    }

    tracing::debug!(extension = ext, ?current, "hangup");
    notify_self(get_mut(slots, ext)?)
}

/// Dial (§ 4.3). The target-existence precondition is checked first and
/// unconditionally, regardless of `self`'s current state -- this matches
/// the original implementation and is called out in the spec as an
/// intentional, testable rule.
pub(crate) fn dial(slots: &mut Slots, ext: usize, target: i64) -> Result<(), PbxError> {
    let target_idx = usize::try_from(target).ok().filter(|&i| i < slots.len());
    let target_exists = target_idx.is_some_and(|i| slots[i].is_some());

    if !target_exists {
        tracing::debug!(extension = ext, target, "dial: target not registered -> ERROR");
        get_mut(slots, ext)?.set_state(TuState::Error);
        return notify_self(get_mut(slots, ext)?);
    }
    let target_idx = target_idx.unwrap();

    let self_state = get(slots, ext)?.state();
    if self_state != TuState::DialTone {
        return notify_self(get_mut(slots, ext)?);
    }

    let target_state = get(slots, target_idx)?.state();
    if target_state == TuState::OnHook {
        {
            let target_tu = get_mut(slots, target_idx)?;
            target_tu.set_peer(Some(ext));
            target_tu.set_state(TuState::Ringing);
            notify_peer_best_effort(target_tu);
        }
        let tu = get_mut(slots, ext)?;
        tu.set_peer(Some(target_idx));
        tu.set_state(TuState::RingBack);
        tracing::debug!(extension = ext, target = target_idx, "dial: ring back");
    } else {
        get_mut(slots, ext)?.set_state(TuState::BusySignal);
        tracing::debug!(extension = ext, target = target_idx, "dial: busy");
    }

    notify_self(get_mut(slots, ext)?)
}

/// Chat (§ 4.3). No state change in any case.
pub(crate) fn chat(slots: &mut Slots, ext: usize, message: &str) -> Result<(), PbxError> {
    let state = get(slots, ext)?.state();

    if state != TuState::Connected {
        notify_self(get_mut(slots, ext)?)?;
        return Err(PbxError::NotConnected);
    }

    let peer_ext = get(slots, ext)?.peer();
    if let Some(peer_ext) = peer_ext {
        if let Ok(peer) = get_mut(slots, peer_ext) {
            let line = pbx_proto::notify::format_chat(message);
            if let Err(e) = peer.sink_mut().write_line(&line) {
                tracing::warn!(extension = peer_ext, error = %e, "failed delivering chat");
            }
        }
    }

    notify_self(get_mut(slots, ext)?)
}

/// Unregister's joint effect on a peer (§ 4.2): "as if the TU executed
/// hangup", using the current state to pick the same joint rule hangup
/// would have used. The departing TU itself is never notified here -- its
/// sink is about to be closed by the caller.
pub(crate) fn unregister_joint_effect(slots: &mut Slots, ext: usize) {
    let Ok(tu) = get(slots, ext) else { return };
    let current = tu.state();
    let peer_ext = tu.peer();

    let peer_new_state = match current {
        TuState::Connected => Some(TuState::DialTone),
        TuState::RingBack => Some(TuState::OnHook),
        TuState::Ringing => Some(TuState::DialTone),
        _ => None,
    };

    if let (Some(peer_new_state), Some(peer_ext)) = (peer_new_state, peer_ext) {
        if let Ok(peer) = get_mut(slots, peer_ext) {
            peer.set_state(peer_new_state);
            peer.set_peer(None);
            notify_peer_best_effort(peer);
        }
    }
}
