pub mod exit_codes;
pub mod output;
pub mod prompt;
pub mod root;
pub mod signal;
