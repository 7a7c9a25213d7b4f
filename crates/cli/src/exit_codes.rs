//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args)               |
//! | 3       | Universal        | I/O error (missing or unwritable file)   |
//! | 30-39   | replay           | Script replay codes                      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Replay (30-39)
// =============================================================================

/// Script line or input workbook is not valid JSON for its schema.
pub const EXIT_REPLAY_PARSE: u8 = 30;

/// A step was rejected (validation failure, bad sheet op) under --strict.
pub const EXIT_REPLAY_REJECTED: u8 = 31;

/// An undo/redo dropped a history entry whose sheet is gone, under --strict.
pub const EXIT_REPLAY_DROPPED: u8 = 32;

/// Final fingerprint differs from the one given with --expect.
pub const EXIT_REPLAY_MISMATCH: u8 = 33;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_REPLAY_PARSE,
            EXIT_REPLAY_REJECTED,
            EXIT_REPLAY_DROPPED,
            EXIT_REPLAY_MISMATCH,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
