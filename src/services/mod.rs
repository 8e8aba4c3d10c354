pub mod meetings;
pub mod movies;

use crate::error::{CommandError, CommandResult};

/// Translates a 1-based position from a command into a 0-based index.
pub(crate) fn to_index(position: i64, len: usize) -> CommandResult<usize> {
    if position < 1 || position as u64 > len as u64 {
        return Err(CommandError::IndexOutOfRange {
            index: position,
            len,
        });
    }
    Ok(position as usize - 1)
}
