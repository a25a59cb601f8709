pub mod branch;
pub mod config;
pub mod error;
pub mod execlog;
pub mod git;
pub mod io;
pub mod journal;
pub mod naming;
pub mod paths;
pub mod templates;
pub mod workspace;

pub use error::{RddError, Result};
