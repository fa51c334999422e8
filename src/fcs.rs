//! Frame Check Sequence Engine
//!
//! CRC-16/X.25 as used for the AX.25 FCS field: initial value `0xFFFF`,
//! reflected polynomial `0x8408`, final XOR `0xFFFF`.
//!
//! The FCS covers everything between the leading flag and the FCS field
//! itself (address + control + PID + information field). AX.25 serializes
//! every field least-significant bit first, *except* the FCS, whose most
//! significant bits lead on the wire. [`Fcs16::compute`] therefore reverses
//! the bit order of the 16-bit value before it is split into bytes, and
//! [`Fcs16::verify`] undoes that reversal on the received value.
//!
//! ## Example
//!
//! ```rust
//! use axlink::fcs::Fcs16;
//!
//! let fcs = Fcs16::new();
//! let value = fcs.compute(b"123456789");
//! assert!(fcs.verify(b"123456789", value));
//! ```

/// CRC-16/X.25 polynomial (reflected form)
const FCS_POLY: u16 = 0x8408;

/// Table-driven CRC-16/X.25 engine.
#[derive(Clone)]
pub struct Fcs16 {
    table: [u16; 256],
}

impl Fcs16 {
    /// Create a new FCS engine, precomputing the byte-at-a-time table.
    pub fn new() -> Self {
        let mut table = [0u16; 256];
        for i in 0..256u16 {
            let mut crc = i;
            for _ in 0..8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ FCS_POLY;
                } else {
                    crc >>= 1;
                }
            }
            table[i as usize] = crc;
        }
        Self { table }
    }

    /// CRC-16/X.25 of `data` in computation order (no transmission reversal).
    fn raw(&self, data: &[u8]) -> u16 {
        let mut fcs: u16 = 0xFFFF;
        for &byte in data {
            let idx = ((fcs ^ byte as u16) & 0xFF) as usize;
            fcs = (fcs >> 8) ^ self.table[idx];
        }
        fcs ^ 0xFFFF
    }

    /// Compute the FCS of `data` in transmission order.
    ///
    /// The returned value already has its bit order reversed; append its low
    /// byte, then its high byte, after the information field.
    pub fn compute(&self, data: &[u8]) -> u16 {
        self.raw(data).reverse_bits()
    }

    /// Verify a received FCS (in transmission order) against `data`.
    pub fn verify(&self, data: &[u8], received: u16) -> bool {
        self.raw(data) == received.reverse_bits()
    }
}

impl Default for Fcs16 {
    fn default() -> Self {
        Self::new()
    }
}
