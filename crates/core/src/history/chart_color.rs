//! Deterministic chart line colors.

use sha2::{Digest, Sha256};

/// `#rrggbb` color derived from the first three bytes of SHA-256(symbol).
///
/// The symbol is uppercased first, so `aapl` and `AAPL` share a color.
pub fn symbol_color(symbol: &str) -> String {
    let digest = Sha256::digest(symbol.trim().to_uppercase().as_bytes());
    format!("#{}", hex::encode(&digest[..3]))
}
