//! # AX.25 Link-Layer Framing Engine
//!
//! This crate implements the data-link layer of a CubeSat radio
//! downlink/uplink: AX.25-style address/control/PID framing, bit-level
//! transparency (zero-bit stuffing), a CRC-16/X.25 frame-check sequence,
//! and frame-type dispatch with modulo-128 sequence bookkeeping.
//!
//! ## Signal Flow
//!
//! ```text
//! TX: payload → address + control + PID + info + FCS → bit-stuff → flags → radio
//! RX: radio → flags → destuff → classify (I/S) → FCS → address → control → payload
//! ```
//!
//! The two pipelines share the bit codec, FCS engine and address codec;
//! [`link::LinkState`] is the only cross-call state. Everything above
//! (Reed-Solomon FEC, session commands, retransmission timers) and below
//! (modem drivers) this layer belongs to the caller.
//!
//! ## Example
//!
//! ```rust
//! use axlink::prelude::*;
//!
//! let ground = StationAddress::new("N7LEM", 97).unwrap();
//! let cubesat = StationAddress::new("NJ7P", 224).unwrap();
//!
//! // Ground side: frame a telemetry block for the spacecraft.
//! let assembler = FrameAssembler::new(ground);
//! let mut tx_link = LinkState::new();
//! let raw = assembler
//!     .assemble(&mut tx_link, &cubesat, b"hello world", FrameType::Information)
//!     .unwrap();
//!
//! // Spacecraft side: recover the information field.
//! let parser = FrameParser::new(cubesat);
//! let mut rx_link = LinkState::new();
//! let event = parser.parse(&mut rx_link, &raw).unwrap();
//! assert!(matches!(event, FrameEvent::Information { .. }));
//! ```

pub mod address;
pub mod bit_codec;
pub mod config;
pub mod control;
pub mod fcs;
pub mod frame;
pub mod link;
pub mod logging;
pub mod types;

// Re-export main types
pub use address::{AddressField, StationAddress};
pub use config::LinkConfig;
pub use control::{ControlField, SupervisoryKind};
pub use fcs::Fcs16;
pub use frame::{
    FrameAssembler, FrameEvent, FrameParser, FrameType, InfoField, SupervisoryEvent,
};
pub use link::{ArqAction, ArqControl, ArqEvent, ArqState, LinkState, SupervisoryHandler};
pub use logging::{init_logging, LogConfig};
pub use types::{LinkError, LinkResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::StationAddress;
    pub use crate::frame::{FrameAssembler, FrameEvent, FrameParser, FrameType};
    pub use crate::link::{ArqControl, LinkState};
    pub use crate::types::{LinkError, LinkResult};
}
