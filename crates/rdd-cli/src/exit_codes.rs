//! Stable exit codes for `rdd` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: bad input, failed precondition, or a git error.
pub const FAILURE: i32 = 1;
/// Nothing to do: empty workspace to clear, push in local-only mode,
/// update-from-main with nothing to merge.
pub const NO_OP: i32 = 2;
/// Interrupted by Ctrl-C or a cancelled prompt.
pub const INTERRUPTED: i32 = 130;

/// What a successful command accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    NoOp,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done => OK,
            Outcome::NoOp => NO_OP,
        }
    }
}
