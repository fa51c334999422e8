//! Address Field Codec
//!
//! Encodes and decodes the AX.25 address field: a destination and a source
//! station, each a 6-character space-padded callsign plus a 4-bit SSID.
//!
//! Callsign bytes are ASCII shifted left by one bit (bit 0 of every address
//! byte is reserved for the extension bit). The SSID byte carries the SSID
//! in bits 1–4 and the reserved bits `0x60`; bit 0 is the "last address"
//! marker, set only on the final byte of the source sub-field.
//!
//! ## Example
//!
//! ```rust
//! use axlink::address::{AddressField, StationAddress};
//!
//! let field = AddressField {
//!     destination: StationAddress::new("NJ7P", 224).unwrap(),
//!     source: StationAddress::new("N7LEM", 97).unwrap(),
//! };
//! let bytes = field.encode();
//! let decoded = AddressField::decode(&bytes).unwrap();
//! assert_eq!(decoded.source.callsign, "N7LEM");
//! ```

use std::fmt;

use crate::types::{LinkError, LinkResult};

/// Maximum callsign length in characters
pub const CALLSIGN_LEN: usize = 6;

/// One encoded address sub-field: callsign + SSID byte
pub const SUBFIELD_LEN: usize = 7;

/// Encoded length of a single destination/source station pair
pub const ADDRESS_LEN: usize = 2 * SUBFIELD_LEN;

/// SSID byte reserved bits (bits 5 and 6 are transmitted as ones)
const SSID_RESERVED: u8 = 0x60;

/// A station identifier: callsign plus numeric sub-identifier (SSID).
///
/// Only the low 4 bits of the SSID are representable on the wire; the
/// original ground segment uses wider station numbers (e.g. 97, 224) and
/// relies on the encoder masking them down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationAddress {
    /// Callsign, up to 6 ASCII characters
    pub callsign: String,
    /// Numeric sub-identifier; masked to its low nibble on encode
    pub ssid: u8,
}

impl StationAddress {
    /// Create a station address, rejecting callsigns longer than 6
    /// characters or containing non-ASCII bytes.
    pub fn new(callsign: &str, ssid: u8) -> LinkResult<Self> {
        if callsign.len() > CALLSIGN_LEN {
            return Err(LinkError::InvalidArgument(format!(
                "callsign '{}' exceeds {} characters",
                callsign, CALLSIGN_LEN
            )));
        }
        if !callsign.is_ascii() {
            return Err(LinkError::InvalidArgument(format!(
                "callsign '{}' is not ASCII",
                callsign
            )));
        }
        Ok(Self {
            callsign: callsign.to_string(),
            ssid,
        })
    }

    /// Encode into 7 address bytes. `last` sets the extension bit that
    /// terminates the address field.
    pub fn encode_subfield(&self, last: bool) -> [u8; SUBFIELD_LEN] {
        let mut bytes = [(b' ') << 1; SUBFIELD_LEN];
        for (i, byte) in self.callsign.bytes().take(CALLSIGN_LEN).enumerate() {
            bytes[i] = byte << 1;
        }
        bytes[CALLSIGN_LEN] = ((self.ssid & 0x0F) << 1) | SSID_RESERVED | (last as u8);
        bytes
    }

    /// Decode 7 address bytes. Returns the station and whether the
    /// extension ("last address") bit was set.
    pub fn decode_subfield(bytes: &[u8]) -> LinkResult<(Self, bool)> {
        if bytes.len() < SUBFIELD_LEN {
            return Err(LinkError::InvalidArgument(format!(
                "address sub-field needs {} bytes, got {}",
                SUBFIELD_LEN,
                bytes.len()
            )));
        }
        let callsign: String = bytes[..CALLSIGN_LEN]
            .iter()
            .map(|&b| (b >> 1) as char)
            .collect::<String>()
            .trim_end()
            .to_string();
        let ssid = (bytes[CALLSIGN_LEN] >> 1) & 0x0F;
        let last = bytes[CALLSIGN_LEN] & 0x01 != 0;
        Ok((Self { callsign, ssid }, last))
    }

    /// Whether two addresses identify the same station on the wire
    /// (callsigns equal, SSIDs equal after masking to 4 bits).
    pub fn matches(&self, other: &StationAddress) -> bool {
        self.callsign == other.callsign && self.ssid & 0x0F == other.ssid & 0x0F
    }
}

impl fmt::Display for StationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid & 0x0F > 0 {
            write!(f, "{}-{}", self.callsign, self.ssid & 0x0F)
        } else {
            write!(f, "{}", self.callsign)
        }
    }
}

/// The complete 14-byte address field of a frame with one station pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressField {
    pub destination: StationAddress,
    pub source: StationAddress,
}

impl AddressField {
    /// Encode destination then source; the extension bit is set only on the
    /// final source byte.
    pub fn encode(&self) -> [u8; ADDRESS_LEN] {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[..SUBFIELD_LEN].copy_from_slice(&self.destination.encode_subfield(false));
        bytes[SUBFIELD_LEN..].copy_from_slice(&self.source.encode_subfield(true));
        bytes
    }

    /// Decode a 14-byte address field. Rejects short input and an address
    /// field that does not terminate at the source sub-field.
    pub fn decode(bytes: &[u8]) -> LinkResult<Self> {
        if bytes.len() < ADDRESS_LEN {
            return Err(LinkError::InvalidArgument(format!(
                "address field needs {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            )));
        }
        let (destination, dest_last) = StationAddress::decode_subfield(&bytes[..SUBFIELD_LEN])?;
        if dest_last {
            return Err(LinkError::Framing(
                "address field terminates after destination".into(),
            ));
        }
        let (source, src_last) = StationAddress::decode_subfield(&bytes[SUBFIELD_LEN..])?;
        if !src_last {
            return Err(LinkError::Framing(
                "source sub-field missing the last-address bit".into(),
            ));
        }
        Ok(Self {
            destination,
            source,
        })
    }
}
