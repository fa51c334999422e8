//! Control Field Codec
//!
//! The control field distinguishes information (I), supervisory (S) and
//! unnumbered (U) frames and carries the modulo-128 sequence numbers:
//!
//! ```text
//! I frame (2 bytes):  | N(S) << 1 | 0 |   | N(R) << 1 | P |
//! S frame (2 bytes):  | 0 0 0 0 S S 0 1 | | N(R) << 1 | F |
//! U frame (1 byte):   | M M M P/F M M 1 1 |
//! ```
//!
//! Bit 0 of the first control byte is `0` for information frames — that is
//! the only thing that separates them from S/U frames. The two supervisory
//! function bits `SS` select receive-ready, receive-not-ready, reject or
//! selective-reject.

use crate::types::{LinkError, LinkResult};

/// Unnumbered Information (UI) modifier byte with P/F clear
pub const UI_CONTROL: u8 = 0x03;

/// Supervisory frame function codes (bits 2–3 of the first control byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisoryKind {
    /// RR — ready to receive, acknowledges frames up to N(R)-1
    ReceiveReady,
    /// RNR — temporarily unable to accept further I frames
    ReceiveNotReady,
    /// REJ — request retransmission starting at N(R)
    Reject,
    /// SREJ — request retransmission of the single frame N(R)
    SelectiveReject,
}

impl SupervisoryKind {
    /// The 2-bit function code.
    pub fn code(self) -> u8 {
        match self {
            SupervisoryKind::ReceiveReady => 0b00,
            SupervisoryKind::ReceiveNotReady => 0b01,
            SupervisoryKind::Reject => 0b10,
            SupervisoryKind::SelectiveReject => 0b11,
        }
    }

    fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0b00 => SupervisoryKind::ReceiveReady,
            0b01 => SupervisoryKind::ReceiveNotReady,
            0b10 => SupervisoryKind::Reject,
            _ => SupervisoryKind::SelectiveReject,
        }
    }
}

/// A decoded or to-be-encoded control field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlField {
    /// Sequenced information frame
    Information { ns: u8, nr: u8, poll: bool },
    /// Flow-control frame, no payload
    Supervisory {
        kind: SupervisoryKind,
        nr: u8,
        final_bit: bool,
    },
    /// Unnumbered frame; only UI is used on this link
    Unnumbered { control: u8 },
}

impl ControlField {
    /// UI frame control field.
    pub fn unnumbered_information(poll: bool) -> Self {
        ControlField::Unnumbered {
            control: UI_CONTROL | ((poll as u8) << 4),
        }
    }

    /// Encoded length in bytes: 2 for I and S frames, 1 for U frames.
    /// These are the protocol's only two legal control lengths.
    pub fn encoded_len(&self) -> usize {
        match self {
            ControlField::Unnumbered { .. } => 1,
            _ => 2,
        }
    }

    /// Serialize the control field, sequence numbers masked modulo 128.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            ControlField::Information { ns, nr, poll } => {
                vec![(ns & 0x7F) << 1, ((nr & 0x7F) << 1) | poll as u8]
            }
            ControlField::Supervisory {
                kind,
                nr,
                final_bit,
            } => vec![
                0b01 | (kind.code() << 2),
                ((nr & 0x7F) << 1) | final_bit as u8,
            ],
            ControlField::Unnumbered { control } => vec![control],
        }
    }

    /// Decode the two control bytes of an information frame.
    ///
    /// Bit 0 of the first byte must be `0`; anything else is not an
    /// information frame and the caller's length classification was wrong.
    pub fn decode_information(bytes: &[u8; 2]) -> LinkResult<Self> {
        if bytes[0] & 0x01 != 0 {
            return Err(LinkError::Framing(format!(
                "control byte 0x{:02X} is not an information frame",
                bytes[0]
            )));
        }
        Ok(ControlField::Information {
            ns: bytes[0] >> 1,
            nr: bytes[1] >> 1,
            poll: bytes[1] & 0x01 != 0,
        })
    }

    /// Decode the two control bytes of a supervisory frame.
    ///
    /// The low two bits of the first byte must be `01` and the upper four
    /// bits zero; any other pattern is an unknown supervisory code.
    pub fn decode_supervisory(bytes: &[u8; 2]) -> LinkResult<Self> {
        if bytes[0] & 0b11 != 0b01 || bytes[0] & 0xF0 != 0 {
            return Err(LinkError::UnknownSupervisoryCode(bytes[0]));
        }
        Ok(ControlField::Supervisory {
            kind: SupervisoryKind::from_code(bytes[0] >> 2),
            nr: bytes[1] >> 1,
            final_bit: bytes[1] & 0x01 != 0,
        })
    }
}
