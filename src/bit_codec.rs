//! Bit Channel Codec
//!
//! Bit-level transparency for the region between the frame flags:
//!
//! - **Stuffing**: insert a `0` after every five consecutive `1` bits, so
//!   the flag pattern (`0x7E`, six ones framed by zeros) can never appear
//!   inside frame content.
//! - **Destuffing**: the inverse — a `0` that immediately follows five
//!   consecutive `1`s is a stuff bit and is discarded.
//!
//! Also provides the LSB-first byte/bit conversions used to serialize the
//! frame body (AX.25 sends the least significant bit of each byte first;
//! only the FCS deviates, and that is handled inside [`crate::fcs`]).
//!
//! Both transformations are pure: they allocate their output, never write
//! past the caller's stated capacity, and fail by returning an error.
//!
//! ## Example
//!
//! ```rust
//! use axlink::bit_codec::{stuff, destuff, bytes_to_bits, bits_to_bytes};
//!
//! let bits = bytes_to_bits(&[0xFF, 0xFF]);
//! let stuffed = stuff(&bits);
//! assert!(stuffed.len() > bits.len()); // stuff bits were inserted
//!
//! let recovered = destuff(&stuffed, bits.len()).unwrap();
//! assert_eq!(recovered, bits);
//! assert_eq!(bits_to_bytes(&recovered), vec![0xFF, 0xFF]);
//! ```

use crate::types::{BitBuf, LinkError, LinkResult};

/// Unpack bytes into individual bits, least significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> BitBuf {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in 0..8 {
            bits.push((byte >> i) & 1 != 0);
        }
    }
    bits
}

/// Pack bits into bytes, least significant bit first.
///
/// If the bit count is not a multiple of 8, the final byte is padded with
/// zero bits.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}

/// Apply zero-bit insertion to a logical frame's bits.
///
/// After five consecutive `1`s a `0` is inserted and the run counter resets;
/// any `0` in the input also resets it. The output therefore never contains
/// six consecutive `1` bits. Flags are not part of the input: they are never
/// stuffed.
pub fn stuff(bits: &[bool]) -> BitBuf {
    let mut out = Vec::with_capacity(bits.len() + bits.len() / 5);
    let mut ones = 0u32;
    for &bit in bits {
        out.push(bit);
        if bit {
            ones += 1;
            if ones == 5 {
                out.push(false);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }
    out
}

/// Remove zero-bit insertion from a received bit sequence.
///
/// A `0` immediately following five consecutive `1`s is discarded. Six or
/// more consecutive `1`s cannot occur in legally stuffed content and are
/// rejected, as is any input whose destuffed size would exceed `max_out_bits`
/// — malformed input must bound output writes rather than grow without
/// limit.
pub fn destuff(bits: &[bool], max_out_bits: usize) -> LinkResult<BitBuf> {
    let mut out = Vec::with_capacity(bits.len().min(max_out_bits));
    let mut ones = 0u32;
    for &bit in bits {
        if bit {
            ones += 1;
            if ones > 5 {
                return Err(LinkError::Framing(
                    "six consecutive one-bits inside frame content".into(),
                ));
            }
        } else if ones == 5 {
            // Stuff bit: drop it.
            ones = 0;
            continue;
        } else {
            ones = 0;
        }
        if out.len() == max_out_bits {
            return Err(LinkError::Framing(format!(
                "destuffed frame exceeds {} bits",
                max_out_bits
            )));
        }
        out.push(bit);
    }
    Ok(out)
}
