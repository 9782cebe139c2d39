//! Session state for one ESC/VP.net connection
//!
//! A session tracks:
//! - Lifecycle state (disconnected, handshaking, ready)
//! - Sequence number of the last command, for log correlation
//! - Whether an exchange was abandoned half way

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport open
    Disconnected,

    /// Transport open, handshake token not yet sent
    Handshaking,

    /// Handshake sent, commands accepted
    Ready,
}

/// Session manager
///
/// Thread-safe and can be cloned cheaply (Arc internally).
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Commands sent on the current connection
    sequence: AtomicU64,

    /// Set while a command is written but its reply not yet read
    in_flight: AtomicBool,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                sequence: AtomicU64::new(0),
                in_flight: AtomicBool::new(false),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if the handshake has been sent
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), SessionState::Ready)
    }

    /// Transport opened: `Disconnected -> Handshaking`
    pub fn begin_handshake(&self) -> Result<()> {
        self.transition(SessionState::Disconnected, SessionState::Handshaking)?;
        self.inner.sequence.store(0, Ordering::Release);
        self.inner.in_flight.store(false, Ordering::Release);
        Ok(())
    }

    /// Handshake sent: `Handshaking -> Ready`
    pub fn mark_ready(&self) -> Result<()> {
        self.transition(SessionState::Handshaking, SessionState::Ready)
    }

    fn transition(&self, from: SessionState, to: SessionState) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != from {
            trace!("Rejected session transition {:?} -> {:?}", *state, to);
            return Err(Error::InvalidSessionState { from: *state, to });
        }

        debug!("Session {:?} -> {:?}", from, to);
        *state = to;
        Ok(())
    }

    /// Close session
    ///
    /// Returns the state the session was in.
    pub fn close(&self) -> SessionState {
        self.inner.in_flight.store(false, Ordering::Release);
        std::mem::replace(&mut *self.inner.state.write(), SessionState::Disconnected)
    }

    /// Mark the start of an exchange and get its sequence number
    pub fn begin_exchange(&self) -> u64 {
        self.inner.in_flight.store(true, Ordering::Release);
        self.inner.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Mark the end of an exchange, whatever its outcome
    pub fn end_exchange(&self) {
        self.inner.in_flight.store(false, Ordering::Release);
    }

    /// Check if a previous exchange was dropped before it finished
    pub fn has_abandoned_exchange(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Commands sent on the current connection
    pub fn sequence(&self) -> u64 {
        self.inner.sequence.load(Ordering::Acquire)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
