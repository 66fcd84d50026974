//! Identity-based color assignment for rendered log lines.

/// Fixed xterm-256 color for the timestamp column.
pub const TIMESTAMP_COLOR: u8 = 106;

/// Start of the reserved band used when an identity hashes to 0.
const RESERVED_BAND: u8 = 207;

/// Wrap text in an xterm-256 foreground SGR sequence.
pub fn ansi_colorize(text: &str, code: u8) -> String {
    format!("\x1b[38;5;{code}m{text}\x1b[0m")
}

/// Pick a display color for a grouping identity (pod or container name).
///
/// Sums the code points of the identity and reduces mod 256, so every record
/// sharing an identity gets the same color. A sum that reduces to exactly 0
/// is remapped into a reserved 10-wide band instead, keeping the result
/// deterministic. Plain character-sum hashing has no collision resistance;
/// that is fine here, the color is cosmetic grouping only.
pub fn color_for(identity: &str) -> u8 {
    let sum: u64 = identity.chars().map(|c| c as u64).sum();
    let code = (sum % 256) as u8;
    if code == 0 {
        RESERVED_BAND + (sum % 10) as u8
    } else {
        code
    }
}
