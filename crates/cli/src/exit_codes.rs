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
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | link             | Record linkage run codes                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `link_exit_code` or the command's error handling

use reclink_linkage::LinkageError;

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Link (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation (including bounds
/// given on the command line).
pub const EXIT_LINK_INVALID_CONFIG: u8 = 60;

/// An input table or training file could not be read or parsed.
pub const EXIT_LINK_INPUT: u8 = 61;

/// Training failed: empty training set, or a pair references an index that
/// is not in its table.
pub const EXIT_LINK_TRAINING: u8 = 62;

/// The output artifact could not be written.
pub const EXIT_LINK_OUTPUT: u8 = 63;

/// Map an engine error to its exit code.
///
/// Output write failures never come through here; callers tag them with
/// `EXIT_LINK_OUTPUT` directly.
pub fn link_exit_code(err: &LinkageError) -> u8 {
    match err {
        LinkageError::ConfigParse(_)
        | LinkageError::ConfigValidation(_)
        | LinkageError::InvalidBound { .. } => EXIT_LINK_INVALID_CONFIG,
        LinkageError::Io(_)
        | LinkageError::MissingColumn { .. }
        | LinkageError::IndexParse { .. }
        | LinkageError::DuplicateIndex { .. }
        | LinkageError::PairParse { .. } => EXIT_LINK_INPUT,
        LinkageError::EmptyTrainingSet { .. } | LinkageError::UnknownIndex { .. } => {
            EXIT_LINK_TRAINING
        }
    }
}
