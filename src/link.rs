//! Link State and ARQ Hooks
//!
//! One [`LinkState`] per link endpoint holds the modulo-128 send and
//! receive sequence counters. The assembler reads and steps the send
//! counter; the parser reads and steps the receive counter. No other code
//! may set them, and no invariant couples the two: if transmit and receive
//! run on separate threads, each counter only needs its own lock.
//!
//! The engine detects sequence mismatches but does not itself retransmit —
//! retransmission timers belong to the caller. [`ArqControl`] is the
//! explicit per-endpoint state machine that turns timer and
//! sequence-mismatch events into the actions the caller should take, and
//! [`SupervisoryHandler`] is the dispatch seam for received flow-control
//! frames (replacing a function-pointer table keyed by control code).

use tracing::debug;

use crate::control::SupervisoryKind;
use crate::frame::SupervisoryEvent;

/// Sequence numbers wrap at this window size (2-byte control fields).
pub const SEQUENCE_MODULO: u8 = 128;

/// Send/receive sequence counters for one link endpoint.
///
/// The only entity in this crate with cross-call state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkState {
    send_sequence: u8,
    receive_sequence: u8,
}

impl LinkState {
    /// Fresh link state with both counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// N(S) to place in the next transmitted information frame.
    pub fn send_sequence(&self) -> u8 {
        self.send_sequence
    }

    /// N(S) expected in the next accepted information frame.
    pub fn receive_sequence(&self) -> u8 {
        self.receive_sequence
    }

    /// Step the send counter after a successful assembly.
    pub fn increment_send(&mut self) {
        self.send_sequence = (self.send_sequence + 1) % SEQUENCE_MODULO;
    }

    /// Step the receive counter after a successfully accepted I frame.
    pub fn increment_receive(&mut self) {
        self.receive_sequence = (self.receive_sequence + 1) % SEQUENCE_MODULO;
    }
}

/// Receiver-side handling of supervisory frames, one method per function
/// code.
pub trait SupervisoryHandler {
    fn receive_ready(&mut self, event: &SupervisoryEvent);
    fn receive_not_ready(&mut self, event: &SupervisoryEvent);
    fn reject(&mut self, event: &SupervisoryEvent);
    fn selective_reject(&mut self, event: &SupervisoryEvent);
}

/// Route a parsed supervisory frame to the matching handler method.
pub fn dispatch_supervisory<H: SupervisoryHandler>(handler: &mut H, event: &SupervisoryEvent) {
    debug!(kind = ?event.kind, nr = event.nr, "dispatching supervisory frame");
    match event.kind {
        SupervisoryKind::ReceiveReady => handler.receive_ready(event),
        SupervisoryKind::ReceiveNotReady => handler.receive_not_ready(event),
        SupervisoryKind::Reject => handler.reject(event),
        SupervisoryKind::SelectiveReject => handler.selective_reject(event),
    }
}

/// ARQ machine states for one link endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArqState {
    /// Nothing outstanding
    Idle,
    /// An I frame is in flight, waiting for its acknowledgment
    AwaitingAck,
    /// A retransmission was requested and has not yet been re-sent
    Retransmitting,
}

/// Events fed into the ARQ machine by the caller and by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArqEvent {
    /// An information frame with the given N(S) was handed to the radio
    FrameSent(u8),
    /// A supervisory acknowledgment arrived carrying N(R)
    AckReceived(u8),
    /// A REJ/SREJ arrived carrying N(R)
    RejectReceived(u8),
    /// The caller's retransmission timer fired
    TimerExpired,
    /// The parser saw an out-of-sequence information frame
    SequenceMismatch { expected: u8 },
}

/// What the caller should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArqAction {
    None,
    /// Arm the retransmission timer
    StartTimer,
    /// Disarm the retransmission timer
    StopTimer,
    /// Re-send the information frame with this N(S)
    Retransmit(u8),
    /// Send a REJ supervisory frame asking the peer to resend from N(R)
    SendReject(u8),
}

/// Explicit ARQ state machine (stop-and-wait over the mod-128 numbering).
///
/// The timer itself lives with the caller; this type only decides what a
/// timer or frame event means in the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArqControl {
    state: ArqState,
    /// N(S) of the frame in flight, if any
    outstanding: Option<u8>,
}

impl ArqControl {
    pub fn new() -> Self {
        Self {
            state: ArqState::Idle,
            outstanding: None,
        }
    }

    pub fn state(&self) -> ArqState {
        self.state
    }

    /// Advance the machine and return the caller's next action.
    pub fn on_event(&mut self, event: ArqEvent) -> ArqAction {
        match (self.state, event) {
            (_, ArqEvent::FrameSent(ns)) => {
                self.state = ArqState::AwaitingAck;
                self.outstanding = Some(ns);
                ArqAction::StartTimer
            }
            (ArqState::AwaitingAck, ArqEvent::AckReceived(nr)) => {
                // N(R) acknowledges everything up to N(R)-1.
                if self
                    .outstanding
                    .is_some_and(|ns| (ns + 1) % SEQUENCE_MODULO == nr % SEQUENCE_MODULO)
                {
                    self.state = ArqState::Idle;
                    self.outstanding = None;
                    ArqAction::StopTimer
                } else {
                    debug!(nr, "acknowledgment does not cover outstanding frame");
                    ArqAction::None
                }
            }
            (ArqState::AwaitingAck, ArqEvent::RejectReceived(nr)) => {
                self.state = ArqState::Retransmitting;
                ArqAction::Retransmit(nr % SEQUENCE_MODULO)
            }
            (ArqState::AwaitingAck, ArqEvent::TimerExpired) => {
                self.state = ArqState::Retransmitting;
                // Timer expiry without feedback: re-send the frame in flight.
                match self.outstanding {
                    Some(ns) => ArqAction::Retransmit(ns),
                    None => ArqAction::None,
                }
            }
            // Receive-side: ask the peer to resend from the expected N(S).
            (_, ArqEvent::SequenceMismatch { expected }) => ArqAction::SendReject(expected),
            _ => ArqAction::None,
        }
    }
}

impl Default for ArqControl {
    fn default() -> Self {
        Self::new()
    }
}
