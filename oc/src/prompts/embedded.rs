//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// System instruction for the correction oracle
pub const CORRECT_SYSTEM: &str = include_str!("../../prompts/correct-system.pmt");

/// User turn wrapping one chunk
pub const CORRECT_USER: &str = include_str!("../../prompts/correct-user.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "correct-system" => Some(CORRECT_SYSTEM),
        "correct-user" => Some(CORRECT_USER),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
