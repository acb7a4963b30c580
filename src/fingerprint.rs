//! Fingerprint System - Display Checksums for Artifacts
//!
//! Provides the short deterministic digest shown next to generated content.
//! The default algorithm is a checksum, NOT a cryptographic hash: it has no
//! collision resistance and exists only as a stable, human-displayable
//! identifier. Real hashing swaps in behind [`Fingerprinter`].

use sha2::{Digest, Sha256};

/// Maximum number of hex characters after the `0x` prefix.
const MAX_HEX_CHARS: usize = 64;

/// Compute the display checksum of `text`, formatted as `0x` + lowercase hex.
///
/// The accumulator is 32-bit signed with wraparound arithmetic:
/// `acc = (acc << 5) - acc + codepoint` for each character in order.
/// Equal input always yields equal output; the empty string yields `0x0`.
pub fn fingerprint(text: &str) -> String {
    let mut acc: i32 = 0;
    for c in text.chars() {
        acc = acc
            .wrapping_shl(5)
            .wrapping_sub(acc)
            .wrapping_add(c as i32);
    }
    // Negative accumulators render as their unsigned 32-bit pattern so the
    // output stays a pure hex string.
    format_hex(&format!("{:x}", acc as u32))
}

fn format_hex(hex: &str) -> String {
    let truncated = if hex.len() > MAX_HEX_CHARS {
        &hex[..MAX_HEX_CHARS]
    } else {
        hex
    };
    format!("0x{}", truncated)
}

/// Seam for fingerprint computation.
///
/// The workflow computes artifact fingerprints through this trait so a real
/// digest can replace the display checksum without touching the controller.
pub trait Fingerprinter {
    /// Digest `text` into a `0x`-prefixed lowercase hex string.
    fn fingerprint(&self, text: &str) -> String;
}

/// The default checksum fingerprinter (see [`fingerprint`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFingerprinter;

impl Fingerprinter for DisplayFingerprinter {
    fn fingerprint(&self, text: &str) -> String {
        fingerprint(text)
    }
}

/// SHA-256 fingerprinter - the drop-in substitute when a real content hash
/// is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprinter;

impl Fingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format_hex(&hex)
    }
}
